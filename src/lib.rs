//! A `no_std` rust implementation of blind multichannel acoustic system identification
//! using the regularized normalized multichannel frequency domain LMS (RNMCFLMS) algorithm.
//!
//! Given only the signals picked up by several microphones from one unknown source,
//! the identifier estimates the impulse responses of the acoustic channels between
//! the source and each microphone, up to a global scale factor.
//!
//! Features
//! * Overlap-save block processing with a configurable hop size.
//! * Per-bin step normalization by a recursively averaged power spectrum,
//!   regularized to stay stable in spectral nulls.
//! * Scale-invariant scoring of estimates by normalized projection misalignment (NPM).
//! * No memory is allocated apart from a modest amount on initialization.
//!
//! # Examples
//!
//! Streaming API, collecting input chunks of any size into blocks.
//!
//! ```
//! use micro_bsi::{Config, Identifier};
//!
//! let config = Config::new(3, 64);
//! let mut identifier = Identifier::new(config).unwrap();
//!
//! let chunk = [vec![0.0; 100], vec![0.0; 100], vec![0.0; 100]];
//! identifier.process(&chunk, |sample_index, engine| {
//!     // Called after each block update
//!     assert_eq!(sample_index % 64, 0);
//!     assert_eq!(engine.estimate_channel(0).len(), 64);
//! }).unwrap();
//!
//! let estimate = identifier.finish();
//! assert_eq!(estimate.channel_count(), 3);
//! ```
//!
//! Invalid configurations are rejected before any processing takes place.
//!
//! ```
//! use micro_bsi::{Config, Error, Identifier};
//!
//! let result = Identifier::new(Config::new(1, 64));
//! assert_eq!(result.err(), Some(Error::TooFewChannels(1)));
//! ```

#![no_std]

extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod common;
mod config;
mod error;
mod filter_bank;
pub mod npm;
pub mod rnmcflms;

pub use config::{Config, Initialization, PowerPolicy};
pub use error::Error;
pub use filter_bank::FilterBank;
pub use rnmcflms::{Identifier, Stage};
