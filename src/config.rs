//! Identifier configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::common::is_supported_fft_size;
use crate::error::Error;

/// How the per-bin power spectrum normalizing each channel's gradient is formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PowerPolicy {
    /// A single spectrum shared by all channels, `(M - 1) / M` times the
    /// power summed over all channels.
    Shared,
    /// One spectrum per channel `k`, the power summed over all channels except `k`.
    OtherChannels,
}

/// The estimate the identifier starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Initialization {
    /// All taps zero. The cross-relation gradient vanishes for a zero estimate,
    /// so this mostly makes sense for testing.
    Zero,
    /// First tap of every channel set to `1 / sqrt(M)`, giving a unit norm bank.
    UnitImpulse,
}

/// Configuration supplied once when creating an identifier.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// The number of channels `M`.
    pub channel_count: usize,
    /// The number of taps `L` of each estimated filter.
    pub filter_length: usize,
    /// The transform size `F`. Must be a power of two and at least `2 L`.
    pub fft_size: usize,
    /// The number of new samples `ns` per channel consumed by each block update.
    pub hop_size: usize,
    /// Step size `ρ` in (0, 2).
    pub step_size: f32,
    /// Forgetting factor `λ` in (0, 1) of the averaged power spectrum.
    pub forgetting_factor: f32,
    /// Scale `κ` of the regularization floor `δ = κ (M - 1) mean(P)`.
    pub regularization: f32,
    /// How the power spectrum normalizing each channel's gradient is formed.
    pub power_policy: PowerPolicy,
    /// The seed estimate, also restored by a reset.
    pub initialization: Initialization,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            channel_count: 2,
            filter_length: 256,
            fft_size: 512,
            hop_size: 256,
            step_size: 0.8,
            forgetting_factor: 0.9,
            regularization: 1.0,
            power_policy: PowerPolicy::Shared,
            initialization: Initialization::UnitImpulse,
        }
    }
}

impl Config {
    /// Creates a configuration for `channel_count` channels and filters of length
    /// `filter_length`. The transform size is the smallest supported power of two
    /// not less than `2 * filter_length` and the hop size equals the filter length.
    pub fn new(channel_count: usize, filter_length: usize) -> Self {
        // Saturates for lengths no transform can hold, which validate() rejects
        let fft_size = filter_length
            .saturating_mul(2)
            .max(8)
            .checked_next_power_of_two()
            .unwrap_or(usize::MAX);
        Config {
            channel_count,
            filter_length,
            fft_size,
            hop_size: filter_length,
            ..Config::default()
        }
    }

    pub fn with_fft_size(mut self, fft_size: usize) -> Self {
        self.fft_size = fft_size;
        self
    }

    pub fn with_hop_size(mut self, hop_size: usize) -> Self {
        self.hop_size = hop_size;
        self
    }

    pub fn with_step_size(mut self, step_size: f32) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn with_forgetting_factor(mut self, forgetting_factor: f32) -> Self {
        self.forgetting_factor = forgetting_factor;
        self
    }

    pub fn with_regularization(mut self, regularization: f32) -> Self {
        self.regularization = regularization;
        self
    }

    pub fn with_power_policy(mut self, power_policy: PowerPolicy) -> Self {
        self.power_policy = power_policy;
        self
    }

    pub fn with_initialization(mut self, initialization: Initialization) -> Self {
        self.initialization = initialization;
        self
    }

    /// Checks that the configuration describes a runnable identifier.
    pub fn validate(&self) -> Result<(), Error> {
        if self.channel_count < 2 {
            return Err(Error::TooFewChannels(self.channel_count));
        }
        if self.filter_length == 0 {
            return Err(Error::ZeroFilterLength);
        }
        if self.fft_size < self.filter_length.saturating_mul(2) {
            return Err(Error::TransformTooShort {
                fft_size: self.fft_size,
                filter_length: self.filter_length,
            });
        }
        if !is_supported_fft_size(self.fft_size) {
            return Err(Error::UnsupportedTransformSize(self.fft_size));
        }
        if self.hop_size == 0 || self.hop_size > self.filter_length {
            return Err(Error::InvalidHopSize {
                hop_size: self.hop_size,
                filter_length: self.filter_length,
            });
        }
        // Written so that NaN fails too
        if !(self.step_size > 0.0 && self.step_size < 2.0) {
            return Err(Error::InvalidStepSize(self.step_size));
        }
        if !(self.forgetting_factor > 0.0 && self.forgetting_factor < 1.0) {
            return Err(Error::InvalidForgettingFactor(self.forgetting_factor));
        }
        if !(self.regularization >= 0.0 && self.regularization.is_finite()) {
            return Err(Error::InvalidRegularization(self.regularization));
        }
        Ok(())
    }
}
