use alloc::{boxed::Box, vec};

use crate::common::{real_to_spectrum, Complex32, F32ArrayExt};

/// Keeps the most recent `fft_size` samples of each channel and their spectra.
///
/// Windows start out as zeros, so the first blocks see a causal start with no
/// history. Each call to [`advance`](SpectralFrameBuffer::advance) drops the
/// oldest `hop_size` samples of every window and appends the newest ones.
pub struct SpectralFrameBuffer {
    windows: Box<[f32]>,
    spectra: Box<[Complex32]>,
    energies: Box<[f32]>,
    channel_count: usize,
    fft_size: usize,
    hop_size: usize,
}

impl SpectralFrameBuffer {
    pub fn new(channel_count: usize, fft_size: usize, hop_size: usize) -> Self {
        if hop_size == 0 || hop_size > fft_size {
            panic!("Hop size must be > 0 and <= fft_size")
        }
        SpectralFrameBuffer {
            windows: vec![0.0; channel_count * fft_size].into_boxed_slice(),
            spectra: vec![Complex32::new(0.0, 0.0); channel_count * fft_size].into_boxed_slice(),
            energies: vec![0.0; channel_count].into_boxed_slice(),
            channel_count,
            fft_size,
            hop_size,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Clears all windows back to the zero history start.
    pub fn reset(&mut self) {
        self.windows.fill(0.0);
        self.spectra.fill(Complex32::new(0.0, 0.0));
        self.energies.fill(0.0);
    }

    /// Shifts `hop_size` new samples into the window of `channel` and updates
    /// that channel's spectrum.
    pub fn advance(&mut self, channel: usize, samples: &[f32]) {
        if samples.len() != self.hop_size {
            panic!(
                "Got {} samples, expected a hop of {}",
                samples.len(),
                self.hop_size
            )
        }
        let range = channel * self.fft_size..(channel + 1) * self.fft_size;
        let window = &mut self.windows[range.clone()];
        window.rotate_left(self.hop_size);
        window[self.fft_size - self.hop_size..].copy_from_slice(samples);
        self.energies[channel] = window.energy();
        real_to_spectrum(window, &mut self.spectra[range]);
    }

    /// The current time domain window of `channel`, oldest sample first.
    pub fn window(&self, channel: usize) -> &[f32] {
        &self.windows[channel * self.fft_size..(channel + 1) * self.fft_size]
    }

    /// The spectrum of the current window of `channel`.
    pub fn spectrum(&self, channel: usize) -> &[Complex32] {
        &self.spectra[channel * self.fft_size..(channel + 1) * self.fft_size]
    }

    /// The energy of the current window of `channel`.
    pub fn energy(&self, channel: usize) -> f32 {
        self.energies[channel]
    }

    /// Returns true if the current window of `channel` contains only zeros.
    pub fn is_silent(&self, channel: usize) -> bool {
        self.energies[channel] == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn test_windowing() {
        let mut buffer = SpectralFrameBuffer::new(2, 8, 3);
        let samples: Vec<f32> = (1..=9).map(|i| i as f32).collect();

        buffer.advance(0, &samples[0..3]);
        assert_eq!(buffer.window(0), &[0., 0., 0., 0., 0., 1., 2., 3.]);
        buffer.advance(0, &samples[3..6]);
        assert_eq!(buffer.window(0), &[0., 0., 1., 2., 3., 4., 5., 6.]);
        buffer.advance(0, &samples[6..9]);
        assert_eq!(buffer.window(0), &[2., 3., 4., 5., 6., 7., 8., 9.]);

        // The other channel is untouched
        assert!(buffer.is_silent(1));
        assert_eq!(buffer.window(1), &[0.0; 8]);
        assert!(!buffer.is_silent(0));
    }

    #[test]
    fn test_spectrum_matches_window() {
        let mut buffer = SpectralFrameBuffer::new(2, 8, 2);
        buffer.advance(1, &[1.0, 0.0]);
        // A single impulse at index 6 gives exp(-2 pi i k 6 / 8)
        let spectrum = buffer.spectrum(1);
        for (k, value) in spectrum.iter().enumerate() {
            let phase = -2.0 * core::f32::consts::PI * (k as f32) * 6.0 / 8.0;
            assert!((value.re - phase.cos()).abs() <= 1e-5);
            assert!((value.im - phase.sin()).abs() <= 1e-5);
        }
        assert_eq!(buffer.energy(1), 1.0);
    }

    #[test]
    fn test_reset() {
        let mut buffer = SpectralFrameBuffer::new(2, 8, 4);
        buffer.advance(0, &[1.0, 2.0, 3.0, 4.0]);
        buffer.reset();
        assert!(buffer.is_silent(0));
        assert_eq!(buffer.window(0), &[0.0; 8]);
    }

    #[test]
    #[should_panic]
    fn test_wrong_hop_length() {
        let mut buffer = SpectralFrameBuffer::new(2, 8, 4);
        buffer.advance(0, &[1.0, 2.0]);
    }
}
