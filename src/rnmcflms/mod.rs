//! Blind multichannel system identification using the regularized normalized
//! multichannel frequency domain LMS (RNMCFLMS) algorithm, described in
//! [A class of frequency-domain adaptive approaches to blind multichannel identification](https://doi.org/10.1109/TSP.2002.806559)
//! by Yiteng Huang and Jacob Benesty.
//!
//! A single unknown source `s` reaches `M` microphones through unknown FIR
//! channels, `x_i = h_i * s`. For the true channels the cross-relation
//! `x_i * h_j = x_j * h_i` holds for every channel pair, since both sides equal
//! `h_i * h_j * s`. The algorithm adapts an estimate `ĥ` to drive the
//! cross-relation error towards zero, which happens only when `ĥ` is
//! proportional to the truth. The global scale is never recovered, see
//! [`npm`](crate::npm) for scale-invariant scoring.
//!
//! Each block update
//! * shifts `hop_size` new samples into per-channel windows of `fft_size` samples
//!   and transforms them ([`SpectralFrameBuffer`])
//! * updates the recursively averaged power spectrum and the regularization
//!   floor `δ` ([`PowerSpectrumTracker`])
//! * computes the overlap-save cross-relation errors, forms the gradient
//!   normalized by `P + δ` and applies it to the causal part of the estimate
//!   ([`Rnmcflms`])
//!
//! [`Identifier`] ties these together and collects input of any chunk size.
//!
//! # Examples
//!
//! ```
//! use rand::{rngs::StdRng, Rng, SeedableRng};
//! use micro_bsi::npm::{npm, to_db};
//! use micro_bsi::{Config, FilterBank, Identifier};
//!
//! // Two channels without common zeros
//! let truth = FilterBank::from_channels(&[[1.0, 0.4, -0.2], [0.3, 1.0, 0.2]]).unwrap();
//!
//! // Microphone signals from a white noise source
//! let sample_count = 3 * 1000;
//! let mut rng = StdRng::seed_from_u64(123);
//! let source: Vec<f32> = (0..sample_count).map(|_| rng.gen_range(-1.0..=1.0)).collect();
//! let microphones: Vec<Vec<f32>> = truth
//!     .channels()
//!     .map(|h| {
//!         (0..sample_count)
//!             .map(|n| (0..h.len()).filter(|k| *k <= n).map(|k| h[k] * source[n - k]).sum())
//!             .collect()
//!     })
//!     .collect();
//!
//! // Three taps per channel, fft size 8, hop size 3
//! let mut identifier = Identifier::new(Config::new(2, 3).with_step_size(1.0)).unwrap();
//! identifier.process(&microphones, |_, _| {}).unwrap();
//!
//! let estimate = identifier.finish();
//! assert!(to_db(npm(&truth, &estimate).unwrap()) < -20.0);
//! ```

mod engine;
mod frame_buffer;
mod identifier;
mod power;
#[cfg(test)]
mod test_signals;

pub use engine::Rnmcflms;
pub use frame_buffer::SpectralFrameBuffer;
pub use identifier::{Identifier, Stage};
pub use power::PowerSpectrumTracker;
