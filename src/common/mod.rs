//! Common algorithms and utilities.

mod f32_array_ext;
mod fft;

pub use f32_array_ext::{refined_log10, refined_sqrt, F32ArrayExt};
pub use fft::{complex_fft, complex_ifft, is_supported_fft_size, real_to_spectrum};
pub use microfft::Complex32;
