//! [Normalized projection misalignment](https://doi.org/10.1109/89.748118) (NPM),
//! the convergence metric of blind system identification.
//!
//! A blindly identified filter bank is only determined up to a global scale, so
//! the estimate is first projected onto the known bank before the residual is
//! measured. An estimate that is a scaled copy of the truth has zero misalignment.
//!
//! # Examples
//!
//! ```
//! use micro_bsi::FilterBank;
//! use micro_bsi::npm::{npm, to_db};
//!
//! let truth = FilterBank::from_channels(&[[1.0, 0.5, 0.0], [0.0, 1.0, 0.3]]).unwrap();
//! let estimate = FilterBank::from_channels(&[[-2.0, -1.0, 0.0], [0.0, -2.0, -0.6]]).unwrap();
//! let misalignment = npm(&truth, &estimate).unwrap();
//! assert!(to_db(misalignment) < -60.0);
//! ```

mod history;
mod misalignment;

pub use history::NpmHistory;
pub use misalignment::{npm, npm_db, to_db};
