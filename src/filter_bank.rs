use alloc::boxed::Box;
use alloc::vec;

use crate::error::Error;

/// `M` FIR filters of `L` taps each, stored channel after channel.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBank {
    taps: Box<[f32]>,
    channel_count: usize,
    filter_length: usize,
}

impl FilterBank {
    /// Creates a bank of `channel_count` all-zero filters.
    pub fn zeros(channel_count: usize, filter_length: usize) -> Self {
        FilterBank {
            taps: vec![0.0; channel_count * filter_length].into_boxed_slice(),
            channel_count,
            filter_length,
        }
    }

    /// Creates a bank from one slice per channel. All slices must have the same length.
    pub fn from_channels<T: AsRef<[f32]>>(channels: &[T]) -> Result<Self, Error> {
        let filter_length = channels.first().map_or(0, |c| c.as_ref().len());
        let mut bank = FilterBank::zeros(channels.len(), filter_length);
        for (k, channel) in channels.iter().enumerate() {
            let channel = channel.as_ref();
            if channel.len() != filter_length {
                return Err(Error::FilterLengthMismatch {
                    expected: filter_length,
                    actual: channel.len(),
                });
            }
            bank.channel_mut(k).copy_from_slice(channel);
        }
        Ok(bank)
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn filter_length(&self) -> usize {
        self.filter_length
    }

    /// Returns the taps of channel `k`.
    pub fn channel(&self, k: usize) -> &[f32] {
        &self.taps[k * self.filter_length..(k + 1) * self.filter_length]
    }

    pub fn channel_mut(&mut self, k: usize) -> &mut [f32] {
        &mut self.taps[k * self.filter_length..(k + 1) * self.filter_length]
    }

    /// Iterates over the channels in order.
    pub fn channels(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact panics on a zero chunk size
        self.taps.chunks_exact(self.filter_length.max(1))
    }

    /// All taps, channel after channel.
    pub fn as_flat(&self) -> &[f32] {
        &self.taps
    }

    /// Multiplies every tap by `factor`.
    pub fn scale(&mut self, factor: f32) {
        for tap in self.taps.iter_mut() {
            *tap *= factor;
        }
    }
}
