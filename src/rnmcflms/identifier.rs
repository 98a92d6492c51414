use alloc::{boxed::Box, vec};

use crate::config::Config;
use crate::error::Error;
use crate::filter_bank::FilterBank;
use crate::npm::npm;
use crate::rnmcflms::{PowerSpectrumTracker, Rnmcflms, SpectralFrameBuffer};

/// Where an [`Identifier`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Windows are zeroed and the estimate holds its seed. The averaged power
    /// spectrum is set from the first block rather than averaged.
    Seeded,
    /// At least one block update has been performed.
    SteadyState,
}

/// * Collects multichannel input into blocks of `hop_size` new samples
/// * Runs one frame buffer, power spectrum and adaptive update per block
/// * Exposes the estimated filter bank between blocks
pub struct Identifier {
    config: Config,
    frames: SpectralFrameBuffer,
    power: PowerSpectrumTracker,
    engine: Rnmcflms,
    /// Samples of the block being collected, `hop_size` per channel.
    pending: Box<[f32]>,
    pending_count: usize,
    /// Samples consumed since the identifier was created or reset.
    sample_counter: usize,
    initial_estimate: Option<FilterBank>,
}

impl Identifier {
    /// Creates an identifier, failing with a configuration error before any
    /// state is allocated if `config` is not valid.
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;
        log::debug!(
            "Creating identifier: {} channels, {} taps, fft size {}, hop {}, step {}, forgetting factor {}",
            config.channel_count,
            config.filter_length,
            config.fft_size,
            config.hop_size,
            config.step_size,
            config.forgetting_factor
        );
        Ok(Identifier {
            frames: SpectralFrameBuffer::new(
                config.channel_count,
                config.fft_size,
                config.hop_size,
            ),
            power: PowerSpectrumTracker::new(
                config.channel_count,
                config.fft_size,
                config.forgetting_factor,
                config.regularization,
                config.power_policy,
            ),
            engine: Rnmcflms::new(
                config.channel_count,
                config.filter_length,
                config.fft_size,
                config.hop_size,
                config.step_size,
                config.initialization,
            ),
            pending: vec![0.0; config.channel_count * config.hop_size].into_boxed_slice(),
            pending_count: 0,
            sample_counter: 0,
            initial_estimate: None,
            config,
        })
    }

    /// Creates an identifier starting from a caller supplied estimate instead
    /// of the configured initialization.
    pub fn with_estimate(config: Config, estimate: FilterBank) -> Result<Self, Error> {
        let mut identifier = Identifier::new(config)?;
        if estimate.channel_count() != config.channel_count {
            return Err(Error::ChannelCountMismatch {
                expected: config.channel_count,
                actual: estimate.channel_count(),
            });
        }
        if estimate.filter_length() != config.filter_length {
            return Err(Error::FilterLengthMismatch {
                expected: config.filter_length,
                actual: estimate.filter_length(),
            });
        }
        identifier.engine.set_estimate(&estimate);
        identifier.initial_estimate = Some(estimate);
        Ok(identifier)
    }

    /// Returns to the seeded stage. All windows, the averaged power spectrum
    /// and the estimate are restored; the configuration is kept.
    pub fn reset(&mut self) {
        self.frames.reset();
        self.power.reset();
        match &self.initial_estimate {
            Some(estimate) => self.engine.set_estimate(estimate),
            None => self.engine.initialize(self.config.initialization),
        }
        self.pending.fill(0.0);
        self.pending_count = 0;
        self.sample_counter = 0;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        if self.power.has_processed_first_block() {
            Stage::SteadyState
        } else {
            Stage::Seeded
        }
    }

    /// Returns the number of block updates since the identifier was created or reset.
    pub fn block_count(&self) -> usize {
        self.engine.update_count()
    }

    /// Returns the number of samples per channel consumed since the identifier
    /// was created or reset, including samples of a partially collected block.
    pub fn sample_counter(&self) -> usize {
        self.sample_counter
    }

    pub fn engine(&self) -> &Rnmcflms {
        &self.engine
    }

    pub fn frames(&self) -> &SpectralFrameBuffer {
        &self.frames
    }

    pub fn power(&self) -> &PowerSpectrumTracker {
        &self.power
    }

    /// Copies the current estimate into a new filter bank.
    pub fn estimate(&self) -> FilterBank {
        self.engine.estimate()
    }

    /// Scores the current estimate against a known filter bank.
    pub fn npm_against(&self, truth: &FilterBank) -> Result<f32, Error> {
        npm(truth, &self.engine.estimate())
    }

    /// Consumes the identifier and returns the final estimate.
    pub fn finish(self) -> FilterBank {
        log::debug!(
            "Finished identification after {} blocks",
            self.engine.update_count()
        );
        self.engine.estimate()
    }

    /// Performs one block update from exactly `hop_size` new samples per channel.
    ///
    /// Fails with [`Error::PendingSamples`] while [`Identifier::process`] holds
    /// a partially collected block, since the new samples would otherwise skip
    /// ahead of the collected ones. Complete the block with `process` first.
    pub fn process_block<T: AsRef<[f32]>>(&mut self, block: &[T]) -> Result<(), Error> {
        if self.pending_count != 0 {
            return Err(Error::PendingSamples(self.pending_count));
        }
        self.check_channel_count(block.len())?;
        for (channel, samples) in block.iter().enumerate() {
            let samples = samples.as_ref();
            if samples.len() != self.config.hop_size {
                return Err(Error::BlockLengthMismatch {
                    channel,
                    expected: self.config.hop_size,
                    actual: samples.len(),
                });
            }
        }
        for (channel, samples) in block.iter().enumerate() {
            self.frames.advance(channel, samples.as_ref());
        }
        self.sample_counter += self.config.hop_size;
        self.run_update();
        Ok(())
    }

    /// Consumes equal length chunks of any size, one per channel. Every time
    /// `hop_size` new samples have been collected a block update is performed
    /// and `handler` is called with the index of the next sample to process
    /// and the updated engine.
    pub fn process<T, F>(&mut self, chunks: &[T], mut handler: F) -> Result<(), Error>
    where
        T: AsRef<[f32]>,
        F: FnMut(usize, &Rnmcflms),
    {
        self.check_channel_count(chunks.len())?;
        let chunk_length = chunks[0].as_ref().len();
        for (channel, chunk) in chunks.iter().enumerate() {
            if chunk.as_ref().len() != chunk_length {
                return Err(Error::BlockLengthMismatch {
                    channel,
                    expected: chunk_length,
                    actual: chunk.as_ref().len(),
                });
            }
        }

        let hop_size = self.config.hop_size;
        let mut read_index = 0;
        while read_index < chunk_length {
            let count = (hop_size - self.pending_count).min(chunk_length - read_index);
            for (channel, chunk) in chunks.iter().enumerate() {
                let start = channel * hop_size + self.pending_count;
                self.pending[start..start + count]
                    .copy_from_slice(&chunk.as_ref()[read_index..read_index + count]);
            }
            self.pending_count += count;
            self.sample_counter += count;
            read_index += count;

            if self.pending_count == hop_size {
                self.pending_count = 0;
                for channel in 0..self.config.channel_count {
                    let samples = &self.pending[channel * hop_size..(channel + 1) * hop_size];
                    self.frames.advance(channel, samples);
                }
                self.run_update();
                handler(self.sample_counter, &self.engine);
            }
        }
        Ok(())
    }

    fn check_channel_count(&self, channel_count: usize) -> Result<(), Error> {
        if channel_count != self.config.channel_count {
            return Err(Error::ChannelCountMismatch {
                expected: self.config.channel_count,
                actual: channel_count,
            });
        }
        Ok(())
    }

    fn run_update(&mut self) {
        let is_first_block = !self.power.has_processed_first_block();
        self.power.update(&self.frames);
        if is_first_block {
            log::debug!(
                "Seeded averaged power spectrum from the first block, delta {}",
                self.power.delta()
            );
        }
        self.engine.update(&self.frames, &self.power);
        log::trace!(
            "Block {} done, delta {}",
            self.engine.update_count(),
            self.power.delta()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Initialization;
    use crate::rnmcflms::test_signals::{convolve, white_noise};
    use alloc::vec::Vec;

    #[test]
    fn test_config_error_before_processing() {
        assert_eq!(
            Identifier::new(Config::new(1, 8)).err(),
            Some(Error::TooFewChannels(1))
        );
        assert!(Identifier::new(Config::new(2, 8).with_hop_size(9)).is_err());
    }

    #[test]
    fn test_shape_errors() {
        let mut identifier = Identifier::new(Config::new(2, 4)).unwrap();
        assert_eq!(
            identifier.process_block(&[[0.0; 4]]),
            Err(Error::ChannelCountMismatch {
                expected: 2,
                actual: 1
            })
        );
        let block: [&[f32]; 2] = [&[0.0; 4], &[0.0; 3]];
        assert_eq!(
            identifier.process_block(&block),
            Err(Error::BlockLengthMismatch {
                channel: 1,
                expected: 4,
                actual: 3
            })
        );
        assert!(identifier.process(&block, |_, _| {}).is_err());
        assert_eq!(identifier.block_count(), 0);
        assert_eq!(identifier.stage(), Stage::Seeded);
    }

    #[test]
    fn test_estimate_shape_is_stable() {
        let config = Config::new(4, 16).with_fft_size(64).with_hop_size(5);
        let mut identifier = Identifier::new(config).unwrap();
        let source = white_noise(1000, 7);
        let truth = [
            [1.0, 0.3, -0.2],
            [0.5, 1.0, 0.1],
            [-0.4, 0.2, 1.0],
            [0.2, -0.6, 0.3],
        ];
        let channels: Vec<Vec<f32>> = truth.iter().map(|h| convolve(&source, h)).collect();
        identifier
            .process(&channels, |_, engine| {
                for k in 0..4 {
                    assert_eq!(engine.estimate_channel(k).len(), 16);
                    assert!(engine.padded_estimate_channel(k)[16..]
                        .iter()
                        .all(|t| *t == 0.0));
                }
            })
            .unwrap();
        assert_eq!(identifier.block_count(), 1000 / 5);
        let estimate = identifier.estimate();
        assert_eq!(estimate.channel_count(), 4);
        assert_eq!(estimate.filter_length(), 16);
    }

    #[test]
    fn test_silence_leaves_estimate_unchanged() {
        let config = Config::new(3, 8).with_fft_size(16).with_hop_size(4);
        let mut identifier = Identifier::new(config).unwrap();
        let seed = identifier.estimate();
        for _ in 0..10 {
            identifier.process_block(&[[0.0; 4]; 3]).unwrap();
        }
        assert_eq!(identifier.block_count(), 10);
        assert_eq!(identifier.estimate(), seed);
    }

    #[test]
    fn test_chunking() {
        // Processing in odd sized chunks gives the same result as processing
        // block by block.
        let config = Config::new(2, 4).with_hop_size(3);
        let source = white_noise(300, 3);
        let x_1 = convolve(&source, &[1.0, 0.5]);
        let x_2 = convolve(&source, &[0.2, 1.0, -0.4]);

        let mut by_block = Identifier::new(config).unwrap();
        for (a, b) in x_1.chunks_exact(3).zip(x_2.chunks_exact(3)) {
            by_block.process_block(&[a, b]).unwrap();
        }

        let mut by_chunk = Identifier::new(config).unwrap();
        let mut sample_indices = Vec::new();
        for (a, b) in x_1.chunks(7).zip(x_2.chunks(7)) {
            by_chunk
                .process(&[a, b], |sample_index, _| sample_indices.push(sample_index))
                .unwrap();
        }

        assert_eq!(by_chunk.block_count(), 100);
        assert_eq!(by_chunk.sample_counter(), 300);
        assert_eq!(sample_indices[0], 3);
        assert!(sample_indices.windows(2).all(|w| w[1] - w[0] == 3));
        assert_eq!(by_chunk.estimate(), by_block.estimate());
    }

    #[test]
    fn test_explicit_block_after_partial_chunk() {
        let mut identifier = Identifier::new(Config::new(2, 4)).unwrap();
        identifier
            .process(&[[1.0, 2.0], [3.0, 4.0]], |_, _| {})
            .unwrap();
        assert_eq!(
            identifier.process_block(&[[5.0, 6.0, 7.0, 8.0], [0.0; 4]]),
            Err(Error::PendingSamples(2))
        );
        assert_eq!(identifier.block_count(), 0);
        assert_eq!(identifier.sample_counter(), 2);

        // Completing the block keeps the collected samples in order
        identifier
            .process(&[[5.0, 6.0], [7.0, 8.0]], |_, _| {})
            .unwrap();
        assert_eq!(identifier.block_count(), 1);
        assert_eq!(identifier.sample_counter(), 4);
        assert_eq!(
            identifier.frames().window(0),
            &[0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 5.0, 6.0]
        );
        assert_eq!(
            identifier.frames().window(1),
            &[0.0, 0.0, 0.0, 0.0, 3.0, 4.0, 7.0, 8.0]
        );
        assert!(identifier
            .process_block(&[[1.0, 2.0, 3.0, 4.0], [0.0; 4]])
            .is_ok());

        // Reset drops the partial block
        identifier.process(&[[1.0], [2.0]], |_, _| {}).unwrap();
        identifier.reset();
        assert!(identifier.process_block(&[[0.0; 4]; 2]).is_ok());
    }

    #[test]
    fn test_stages_and_reset() {
        let mut identifier = Identifier::new(Config::new(2, 4)).unwrap();
        let seed = identifier.estimate();
        assert_eq!(identifier.stage(), Stage::Seeded);
        identifier
            .process_block(&[[1.0, 0.0, 0.5, 0.0], [0.0, 1.0, 0.0, -0.5]])
            .unwrap();
        assert_eq!(identifier.stage(), Stage::SteadyState);
        assert_ne!(identifier.estimate(), seed);

        identifier.reset();
        assert_eq!(identifier.stage(), Stage::Seeded);
        assert_eq!(identifier.block_count(), 0);
        assert_eq!(identifier.estimate(), seed);
        assert!(identifier.frames().is_silent(0));
    }

    #[test]
    fn test_with_estimate() {
        let config = Config::new(2, 2).with_initialization(Initialization::Zero);
        let estimate = FilterBank::from_channels(&[[1.0, 0.0], [0.0, 1.0]]).unwrap();
        let mut identifier = Identifier::with_estimate(config, estimate.clone()).unwrap();
        assert_eq!(identifier.estimate(), estimate);
        identifier.process_block(&[[1.0, 2.0], [3.0, -1.0]]).unwrap();
        identifier.reset();
        assert_eq!(identifier.estimate(), estimate);

        let wrong_shape = FilterBank::zeros(3, 2);
        assert!(Identifier::with_estimate(config, wrong_shape).is_err());
    }

    #[test]
    fn test_two_channel_convergence() {
        let truth = FilterBank::from_channels(&[[1.0, 0.4, -0.2], [0.3, 1.0, 0.2]]).unwrap();
        let config = Config::new(2, 3).with_step_size(1.0);
        let mut identifier = Identifier::new(config).unwrap();

        let source = white_noise(3 * 1000, 11);
        let channels: Vec<Vec<f32>> = truth.channels().map(|h| convolve(&source, h)).collect();
        identifier.process(&channels, |_, _| {}).unwrap();

        let misalignment = identifier.npm_against(&truth).unwrap();
        assert!(crate::npm::to_db(misalignment) < -20.0);

        // Up to scale, the estimate matches the truth tap by tap
        let estimate = identifier.finish();
        let scale = truth.channel(0)[0] / estimate.channel(0)[0];
        for (h, h_hat) in truth.as_flat().iter().zip(estimate.as_flat()) {
            assert!((h - scale * h_hat).abs() <= 0.1);
        }
    }
}
