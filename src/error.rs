use thiserror::Error;

/// Errors reported by the identifier and the convergence metric.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    #[error("Channel count must be at least 2, got {0}")]
    TooFewChannels(usize),
    #[error("Filter length must be greater than 0")]
    ZeroFilterLength,
    #[error("Transform size {fft_size} must be at least twice the filter length {filter_length}")]
    TransformTooShort {
        fft_size: usize,
        filter_length: usize,
    },
    #[error("Unsupported transform size {0}, expected a power of two between 8 and 4096")]
    UnsupportedTransformSize(usize),
    #[error("Hop size must be > 0 and <= the filter length {filter_length}, got {hop_size}")]
    InvalidHopSize {
        hop_size: usize,
        filter_length: usize,
    },
    #[error("Step size must be in (0, 2), got {0}")]
    InvalidStepSize(f32),
    #[error("Forgetting factor must be in (0, 1), got {0}")]
    InvalidForgettingFactor(f32),
    #[error("Regularization scale must be finite and non-negative, got {0}")]
    InvalidRegularization(f32),
    #[error("Expected {expected} channels, got {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },
    #[error("Expected {expected} samples in channel {channel}, got {actual}")]
    BlockLengthMismatch {
        channel: usize,
        expected: usize,
        actual: usize,
    },
    #[error("{0} samples per channel collected by process are waiting for the rest of their block")]
    PendingSamples(usize),
    #[error("Expected filters of length {expected}, got {actual}")]
    FilterLengthMismatch { expected: usize, actual: usize },
}
