//! Synthetic signals shared by the tests.

use alloc::vec;
use alloc::vec::Vec;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Uniform white noise in [-1, 1].
pub fn white_noise(sample_count: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..sample_count).map(|_| rng.gen_range(-1.0..=1.0)).collect()
}

/// Causal linear convolution truncated to the length of `signal`.
pub fn convolve(signal: &[f32], h: &[f32]) -> Vec<f32> {
    let mut result = vec![0.0; signal.len()];
    for (n, value) in result.iter_mut().enumerate() {
        for (k, tap) in h.iter().enumerate().take(n + 1) {
            *value += tap * signal[n - k];
        }
    }
    result
}

/// A sine wave completing `cycles` periods every `period_samples` samples.
pub fn tone(sample_count: usize, cycles: usize, period_samples: usize) -> Vec<f32> {
    (0..sample_count)
        .map(|n| {
            let phase = 2.0 * core::f32::consts::PI * ((cycles * n) % period_samples) as f32
                / period_samples as f32;
            phase.sin()
        })
        .collect()
}

#[test]
fn test_convolve() {
    assert_eq!(
        convolve(&[1.0, 2.0, 3.0, 4.0], &[1.0, 0.5]),
        vec![1.0, 2.5, 4.0, 5.5]
    );
}
