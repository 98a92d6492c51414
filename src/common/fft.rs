use core::convert::TryInto;

use microfft::Complex32;

/// Returns true if `fft_size` is a transform size supported by [`complex_fft`].
pub fn is_supported_fft_size(fft_size: usize) -> bool {
    fft_size.is_power_of_two() && (8..=4096).contains(&fft_size)
}

/// Performs an in-place forward FFT on a given buffer.
pub fn complex_fft(buffer: &mut [Complex32]) {
    let fft_size = buffer.len();
    match fft_size {
        8 => {
            let _ = microfft::complex::cfft_8(buffer.try_into().unwrap());
        }
        16 => {
            let _ = microfft::complex::cfft_16(buffer.try_into().unwrap());
        }
        32 => {
            let _ = microfft::complex::cfft_32(buffer.try_into().unwrap());
        }
        64 => {
            let _ = microfft::complex::cfft_64(buffer.try_into().unwrap());
        }
        128 => {
            let _ = microfft::complex::cfft_128(buffer.try_into().unwrap());
        }
        256 => {
            let _ = microfft::complex::cfft_256(buffer.try_into().unwrap());
        }
        512 => {
            let _ = microfft::complex::cfft_512(buffer.try_into().unwrap());
        }
        1024 => {
            let _ = microfft::complex::cfft_1024(buffer.try_into().unwrap());
        }
        2048 => {
            let _ = microfft::complex::cfft_2048(buffer.try_into().unwrap());
        }
        4096 => {
            let _ = microfft::complex::cfft_4096(buffer.try_into().unwrap());
        }
        _ => panic!("Unsupported fft size {}", fft_size),
    }
}

/// Performs an in-place inverse FFT, including the `1 / N` scaling,
/// by conjugating the input and output of a forward transform.
pub fn complex_ifft(buffer: &mut [Complex32]) {
    for value in buffer.iter_mut() {
        *value = value.conj();
    }
    complex_fft(buffer);
    let scale = 1.0 / (buffer.len() as f32);
    for value in buffer.iter_mut() {
        *value = value.conj() * scale;
    }
}

/// Zero pads a real buffer into a complex one and transforms it.
pub fn real_to_spectrum(input: &[f32], spectrum: &mut [Complex32]) {
    if input.len() > spectrum.len() {
        panic!(
            "Got input of length {}, longer than the spectrum length {}",
            input.len(),
            spectrum.len()
        )
    }
    for (value, sample) in spectrum.iter_mut().zip(input.iter()) {
        *value = Complex32::new(*sample, 0.0);
    }
    for value in spectrum.iter_mut().skip(input.len()) {
        *value = Complex32::new(0.0, 0.0);
    }
    complex_fft(spectrum);
}
