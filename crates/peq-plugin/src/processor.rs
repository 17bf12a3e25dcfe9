//! Block processor driven by a host audio callback.
//!
//! Handles the real-time side of a plugin instance: picks up parameter
//! changes from the [`ParameterStore`], clears surplus output channels and
//! runs the equalizer in place.

use peq_engine::{ConfigError, EngineConfig, EngineState, EqualizerEngine};

use crate::shared::ParameterStore;

/// Channel count the processor prepares its engine for.
pub const CHANNELS: usize = 2;

/// Audio-side processor wrapping an [`EqualizerEngine`].
///
/// Lifecycle mirrors a host's: [`prepare_to_play`](Self::prepare_to_play)
/// before playback, [`process_block`](Self::process_block) per callback,
/// [`release_resources`](Self::release_resources) when playback stops.
#[derive(Debug)]
pub struct EqProcessor {
    store: ParameterStore,
    engine: EqualizerEngine,
    /// Store version the engine last saw, `None` until prepared.
    seen_version: Option<u32>,
}

impl EqProcessor {
    /// Creates a processor reading parameters from `store`.
    pub fn new(store: ParameterStore) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Creates a processor with a custom engine configuration.
    pub fn with_config(store: ParameterStore, config: EngineConfig) -> Self {
        Self {
            store,
            engine: EqualizerEngine::with_config(config),
            seen_version: None,
        }
    }

    /// The shared parameter store.
    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &EqualizerEngine {
        &self.engine
    }

    /// Prepares a stereo engine and applies the current parameters without
    /// smoothing.
    pub fn prepare_to_play(&mut self, sample_rate: f32, max_block_size: usize) {
        self.engine.prepare(sample_rate, max_block_size, CHANNELS);
        self.sync_parameters(true);
        tracing::info!(sample_rate, max_block_size, "processor prepared to play");
    }

    /// Processes one host block in place.
    ///
    /// `channels` holds the output buffers, the first `input_channels` of
    /// which carry input audio. Outputs without a matching input are
    /// cleared. Parameter changes made since the previous block are picked
    /// up first.
    pub fn process_block(&mut self, input_channels: usize, channels: &mut [&mut [f32]]) {
        let inputs = input_channels.min(channels.len());
        for extra in &mut channels[inputs..] {
            extra.fill(0.0);
        }

        self.sync_parameters(false);
        self.engine.process_block(&mut channels[..inputs]);
    }

    /// Clears all filter memory, for example after a transport jump.
    pub fn reset(&mut self) {
        self.engine.reset();
    }

    /// Frees the engine's per-channel state.
    pub fn release_resources(&mut self) {
        self.engine.release();
        self.seen_version = None;
        tracing::info!("processor released resources");
    }

    /// Replaces the engine configuration.
    pub fn set_config(&mut self, config: EngineConfig) -> Result<(), ConfigError> {
        self.engine.set_config(config)
    }

    /// `true` between `prepare_to_play` and `release_resources`.
    pub fn is_prepared(&self) -> bool {
        self.engine.state() != EngineState::Uninitialized
    }

    fn sync_parameters(&mut self, force: bool) {
        let version = self.store.version();
        if force || self.seen_version != Some(version) {
            self.seen_version = Some(version);
            self.engine.update_coefficients(self.store.snapshot());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peq_engine::{ChainSettings, EqParam};

    fn prepared() -> EqProcessor {
        let mut processor = EqProcessor::new(ParameterStore::default());
        processor.prepare_to_play(48000.0, 256);
        processor
    }

    #[test]
    fn prepare_applies_store_immediately() {
        let store = ParameterStore::default();
        store.set(EqParam::HiGain, 6.0);
        let mut processor = EqProcessor::new(store);
        processor.prepare_to_play(48000.0, 256);

        assert!(processor.is_prepared());
        assert_eq!(processor.engine().num_channels(), CHANNELS);
        assert_eq!(processor.engine().settings().hi_gain, 6.0);
        assert!(!processor.engine().is_smoothing());
    }

    #[test]
    fn store_changes_picked_up_next_block() {
        let mut processor = prepared();
        let mut left = vec![0.0; 64];
        let mut right = vec![0.0; 64];
        processor.process_block(2, &mut [&mut left[..], &mut right[..]]);

        processor.store().set(EqParam::LowGain, -6.0);
        assert_eq!(processor.engine().settings().low_gain, 0.0);
        processor.process_block(2, &mut [&mut left[..], &mut right[..]]);
        assert_eq!(processor.engine().settings().low_gain, -6.0);
        assert!(processor.engine().is_smoothing());
    }

    #[test]
    fn extra_outputs_are_cleared() {
        let mut processor = prepared();
        let mut left = vec![0.5; 32];
        let mut right = vec![0.5; 32];
        processor.process_block(1, &mut [&mut left[..], &mut right[..]]);
        assert!(left.iter().all(|&s| s == 0.5), "flat settings pass input");
        assert!(right.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn channels_beyond_stereo_are_silenced() {
        let mut processor = prepared();
        let mut a = vec![0.5; 16];
        let mut b = vec![0.5; 16];
        let mut c = vec![0.5; 16];
        processor.process_block(3, &mut [&mut a[..], &mut b[..], &mut c[..]]);
        assert!(a.iter().all(|&s| s == 0.5));
        assert!(b.iter().all(|&s| s == 0.5));
        assert!(c.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn release_and_reprepare() {
        let mut processor = prepared();
        processor.release_resources();
        assert!(!processor.is_prepared());

        let mut left = vec![0.5; 16];
        processor.process_block(1, &mut [&mut left[..]]);
        assert!(left.iter().all(|&s| s == 0.0), "unprepared output is silent");

        processor
            .store()
            .apply_settings(&ChainSettings::default().with(EqParam::HpFreq, 100.0));
        processor.prepare_to_play(44100.0, 128);
        assert_eq!(processor.engine().settings().hp_freq, 100.0);
        assert_eq!(processor.engine().sample_rate(), 44100.0);
    }

    #[test]
    fn reset_clears_memory() {
        let mut processor = prepared();
        processor.store().set(EqParam::HiGain, 12.0);
        let mut left = vec![1.0; 64];
        let mut right = vec![1.0; 64];
        processor.process_block(2, &mut [&mut left[..], &mut right[..]]);

        processor.reset();
        let mut left = vec![0.0; 64];
        let mut right = vec![0.0; 64];
        processor.process_block(2, &mut [&mut left[..], &mut right[..]]);
        assert!(left.iter().chain(&right).all(|&s| s == 0.0));
    }
}
