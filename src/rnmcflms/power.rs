use alloc::{boxed::Box, vec};

use crate::config::PowerPolicy;
use crate::rnmcflms::SpectralFrameBuffer;

/// Recursively averaged per-bin input power, `P ← λ P + (1 - λ) P_x`,
/// and the regularization floor `δ` derived from the instantaneous power.
pub struct PowerSpectrumTracker {
    /// One spectrum for [`PowerPolicy::Shared`], one per channel otherwise.
    averaged: Box<[f32]>,
    /// Total power `Σ_i |X_i|²` of the latest block.
    total: Box<[f32]>,
    delta: f32,
    forgetting_factor: f32,
    regularization: f32,
    policy: PowerPolicy,
    channel_count: usize,
    fft_size: usize,
    has_processed_first_block: bool,
}

impl PowerSpectrumTracker {
    pub fn new(
        channel_count: usize,
        fft_size: usize,
        forgetting_factor: f32,
        regularization: f32,
        policy: PowerPolicy,
    ) -> Self {
        let spectrum_count = match policy {
            PowerPolicy::Shared => 1,
            PowerPolicy::OtherChannels => channel_count,
        };
        PowerSpectrumTracker {
            averaged: vec![0.0; spectrum_count * fft_size].into_boxed_slice(),
            total: vec![0.0; fft_size].into_boxed_slice(),
            delta: 0.0,
            forgetting_factor,
            regularization,
            policy,
            channel_count,
            fft_size,
            has_processed_first_block: false,
        }
    }

    pub fn reset(&mut self) {
        self.averaged.fill(0.0);
        self.total.fill(0.0);
        self.delta = 0.0;
        self.has_processed_first_block = false;
    }

    /// Returns true once the first block has seeded the average.
    pub fn has_processed_first_block(&self) -> bool {
        self.has_processed_first_block
    }

    pub fn policy(&self) -> PowerPolicy {
        self.policy
    }

    /// The current regularization floor `δ`.
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// The averaged power spectrum normalizing the gradient of `channel`.
    pub fn averaged(&self, channel: usize) -> &[f32] {
        match self.policy {
            PowerPolicy::Shared => &self.averaged,
            PowerPolicy::OtherChannels => {
                &self.averaged[channel * self.fft_size..(channel + 1) * self.fft_size]
            }
        }
    }

    /// Folds the spectra of the latest block into the average. The first
    /// block replaces the average instead of being weighted against zero.
    pub fn update(&mut self, frames: &SpectralFrameBuffer) {
        let m = self.channel_count as f32;

        self.total.fill(0.0);
        for channel in 0..self.channel_count {
            for (total, x) in self.total.iter_mut().zip(frames.spectrum(channel)) {
                *total += x.norm_sqr();
            }
        }

        // Mean over bins of the channel mean power
        let mean_power = self.total.iter().sum::<f32>() / (m * self.fft_size as f32);
        self.delta = self.regularization * (m - 1.0) * mean_power;

        let lambda = if self.has_processed_first_block {
            self.forgetting_factor
        } else {
            0.0
        };

        match self.policy {
            PowerPolicy::Shared => {
                let scale = (m - 1.0) / m;
                for (averaged, total) in self.averaged.iter_mut().zip(self.total.iter()) {
                    *averaged = lambda * *averaged + (1.0 - lambda) * scale * total;
                }
            }
            PowerPolicy::OtherChannels => {
                for channel in 0..self.channel_count {
                    let averaged =
                        &mut self.averaged[channel * self.fft_size..(channel + 1) * self.fft_size];
                    let own = frames.spectrum(channel);
                    for ((averaged, total), x) in
                        averaged.iter_mut().zip(self.total.iter()).zip(own)
                    {
                        // Clamp rounding below zero when the other channels are silent
                        let others = (*total - x.norm_sqr()).max(0.0);
                        *averaged = lambda * *averaged + (1.0 - lambda) * others;
                    }
                }
            }
        }

        self.has_processed_first_block = true;
    }
}
