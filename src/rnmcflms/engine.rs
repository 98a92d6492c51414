use alloc::{boxed::Box, vec};

use crate::common::{complex_fft, complex_ifft, real_to_spectrum, refined_sqrt, Complex32};
use crate::config::Initialization;
use crate::filter_bank::FilterBank;
use crate::rnmcflms::{PowerSpectrumTracker, SpectralFrameBuffer};

/// The adaptive state of the regularized normalized multichannel frequency
/// domain LMS algorithm: the estimated filter bank `ĥ` and the scratch
/// spectra used by each block update.
///
/// Each estimated filter is kept zero padded to the transform size. Taps at
/// index `filter_length` and above are zero after every update.
pub struct Rnmcflms {
    /// Zero padded time domain estimates, `fft_size` values per channel.
    estimate: Box<[f32]>,
    /// Spectra of the zero padded estimates, recomputed at the start of each update.
    estimate_spectra: Box<[Complex32]>,
    /// Per channel gradient, accumulated over all channel pairs.
    gradient: Box<[Complex32]>,
    /// Cross-relation error of the current channel pair.
    error: Box<[Complex32]>,
    channel_count: usize,
    filter_length: usize,
    fft_size: usize,
    hop_size: usize,
    step_size: f32,
    update_count: usize,
}

impl Rnmcflms {
    pub fn new(
        channel_count: usize,
        filter_length: usize,
        fft_size: usize,
        hop_size: usize,
        step_size: f32,
        initialization: Initialization,
    ) -> Self {
        if fft_size < filter_length.saturating_mul(2) {
            panic!("fft_size must be at least twice the filter length")
        }
        if hop_size == 0 || hop_size > filter_length {
            panic!("Hop size must be > 0 and <= filter_length")
        }
        let mut engine = Rnmcflms {
            estimate: vec![0.0; channel_count * fft_size].into_boxed_slice(),
            estimate_spectra: vec![Complex32::new(0.0, 0.0); channel_count * fft_size]
                .into_boxed_slice(),
            gradient: vec![Complex32::new(0.0, 0.0); channel_count * fft_size].into_boxed_slice(),
            error: vec![Complex32::new(0.0, 0.0); fft_size].into_boxed_slice(),
            channel_count,
            filter_length,
            fft_size,
            hop_size,
            step_size,
            update_count: 0,
        };
        engine.initialize(initialization);
        engine
    }

    /// Overwrites the estimate with the seed described by `initialization`.
    pub fn initialize(&mut self, initialization: Initialization) {
        self.estimate.fill(0.0);
        if let Initialization::UnitImpulse = initialization {
            let tap = 1.0 / refined_sqrt(self.channel_count as f32);
            for k in 0..self.channel_count {
                self.estimate[k * self.fft_size] = tap;
            }
        }
        self.update_count = 0;
    }

    /// Overwrites the estimate with the taps of `bank`, which must have
    /// `channel_count` channels of `filter_length` taps.
    pub fn set_estimate(&mut self, bank: &FilterBank) {
        if bank.channel_count() != self.channel_count || bank.filter_length() != self.filter_length
        {
            panic!(
                "Got a {}x{} filter bank, expected {}x{}",
                bank.channel_count(),
                bank.filter_length(),
                self.channel_count,
                self.filter_length
            )
        }
        self.estimate.fill(0.0);
        for (k, taps) in bank.channels().enumerate() {
            let start = k * self.fft_size;
            self.estimate[start..start + self.filter_length].copy_from_slice(taps);
        }
        self.update_count = 0;
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn filter_length(&self) -> usize {
        self.filter_length
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// The number of block updates performed since the last initialization.
    pub fn update_count(&self) -> usize {
        self.update_count
    }

    /// The `filter_length` taps of the estimate of channel `k`.
    pub fn estimate_channel(&self, k: usize) -> &[f32] {
        let start = k * self.fft_size;
        &self.estimate[start..start + self.filter_length]
    }

    /// The estimate of channel `k` zero padded to `fft_size`, as it enters
    /// the forward transform of the next update.
    pub fn padded_estimate_channel(&self, k: usize) -> &[f32] {
        &self.estimate[k * self.fft_size..(k + 1) * self.fft_size]
    }

    /// Copies the current estimate into a new filter bank.
    pub fn estimate(&self) -> FilterBank {
        let mut bank = FilterBank::zeros(self.channel_count, self.filter_length);
        self.copy_estimate_into(&mut bank);
        bank
    }

    /// Copies the current estimate into an existing filter bank of matching shape.
    pub fn copy_estimate_into(&self, bank: &mut FilterBank) {
        for k in 0..self.channel_count {
            bank.channel_mut(k).copy_from_slice(self.estimate_channel(k));
        }
    }

    /// Performs one block update using the spectra of the current windows and
    /// the power spectrum already updated for the same block.
    pub fn update(&mut self, frames: &SpectralFrameBuffer, power: &PowerSpectrumTracker) {
        let fft_size = self.fft_size;
        let valid_start = fft_size - self.hop_size;

        // Spectra of the zero padded estimates
        for k in 0..self.channel_count {
            let range = k * fft_size..(k + 1) * fft_size;
            real_to_spectrum(&self.estimate[range.clone()], &mut self.estimate_spectra[range]);
        }

        // Accumulate G_k = Σ_{i≠k} conj(X_i) E_ik over the unordered pairs (i, j), i < j,
        // with E_ij = X_i H_j - X_j H_i and E_ji = -E_ij.
        self.gradient.fill(Complex32::new(0.0, 0.0));
        for i in 0..self.channel_count {
            let x_i = frames.spectrum(i);
            let h_i = &self.estimate_spectra[i * fft_size..(i + 1) * fft_size];
            for j in (i + 1)..self.channel_count {
                let x_j = frames.spectrum(j);
                let h_j = &self.estimate_spectra[j * fft_size..(j + 1) * fft_size];
                for (b, error) in self.error.iter_mut().enumerate() {
                    *error = x_i[b] * h_j[b] - x_j[b] * h_i[b];
                }

                // Overlap-save: only the newest hop_size samples of the
                // circular convolution are valid linear convolution outputs.
                complex_ifft(&mut self.error);
                for value in self.error.iter_mut().take(valid_start) {
                    *value = Complex32::new(0.0, 0.0);
                }
                for value in self.error.iter_mut().skip(valid_start) {
                    value.im = 0.0;
                }
                complex_fft(&mut self.error);

                for (b, error) in self.error.iter().enumerate() {
                    self.gradient[j * fft_size + b] += x_i[b].conj() * error;
                    self.gradient[i * fft_size + b] -= x_j[b].conj() * error;
                }
            }
        }

        // Normalize, return to the time domain and keep the causal part.
        let delta = power.delta();
        for k in 0..self.channel_count {
            if frames.is_silent(k) {
                continue;
            }
            let averaged = power.averaged(k);
            let gradient = &mut self.gradient[k * fft_size..(k + 1) * fft_size];
            for (g, p) in gradient.iter_mut().zip(averaged.iter()) {
                let denominator = p + delta;
                *g = if denominator > 0.0 {
                    *g * (self.step_size / denominator)
                } else {
                    Complex32::new(0.0, 0.0)
                };
            }
            complex_ifft(gradient);

            let estimate = &mut self.estimate[k * fft_size..(k + 1) * fft_size];
            for (tap, g) in estimate
                .iter_mut()
                .zip(gradient.iter())
                .take(self.filter_length)
            {
                *tap -= g.re;
            }
        }

        self.update_count += 1;
    }
}
