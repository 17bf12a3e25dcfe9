//! The equalizer engine: one [`ChannelChain`] per channel plus the
//! lifecycle around it.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --prepare--> Prepared --process--> Processing
//!       ^                       ^                      |
//!       |                       +--------reset---------+
//!       +-------------------- release -----------------+
//! ```
//!
//! While [`EngineState::Prepared`] (nothing processed since `prepare` or
//! `reset`), coefficient updates apply immediately. Once audio is flowing
//! they are smoothed.

use std::sync::Arc;

use crate::chain::ChannelChain;
use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::response::ChainCoefficients;
use crate::settings::ChainSettings;
use crate::slot::{SettingsPublisher, SettingsSlot};

/// Sample rate used when `prepare` receives an unusable one.
pub const FALLBACK_SAMPLE_RATE: f32 = 48000.0;

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No chains allocated. Processing outputs silence.
    Uninitialized,
    /// Chains allocated; no audio processed since `prepare` or `reset`.
    Prepared,
    /// Audio has been processed.
    Processing,
}

/// Four-band parametric equalizer with high-pass and low-pass cut filters.
///
/// # Example
///
/// ```rust
/// use peq_engine::{ChainSettings, EqParam, EqualizerEngine};
///
/// let mut engine = EqualizerEngine::new();
/// engine.prepare(48000.0, 512, 2);
/// engine.update_coefficients(
///     ChainSettings::default()
///         .with(EqParam::HiFreq, 1000.0)
///         .with(EqParam::HiGain, 6.0),
/// );
///
/// let mut left = vec![0.0f32; 512];
/// let mut right = vec![0.0f32; 512];
/// engine.process(0, &mut left);
/// engine.process(1, &mut right);
/// assert!((engine.magnitude_db(1000.0) - 6.0).abs() < 0.1);
/// ```
#[derive(Debug)]
pub struct EqualizerEngine {
    config: EngineConfig,
    settings: ChainSettings,
    chains: Vec<ChannelChain>,
    sample_rate: f32,
    max_block_size: usize,
    state: EngineState,
    slot: Arc<SettingsSlot>,
    last_seq: u32,
    /// Current block number. A block starts when a channel is processed a
    /// second time, or on every `process_block`.
    block: u64,
    /// Block each channel last ran in.
    channel_blocks: Vec<u64>,
}

impl Default for EqualizerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EqualizerEngine {
    /// Creates an unprepared engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an unprepared engine with `config`.
    ///
    /// Out-of-range fields are clamped (see [`EngineConfig::sanitized`]);
    /// use [`EngineConfig::validate`] first to reject them instead.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config: config.sanitized(),
            settings: ChainSettings::default(),
            chains: Vec::new(),
            sample_rate: FALLBACK_SAMPLE_RATE,
            max_block_size: 0,
            state: EngineState::Uninitialized,
            slot: Arc::new(SettingsSlot::new()),
            last_seq: 0,
            block: 0,
            channel_blocks: Vec::new(),
        }
    }

    /// Allocates one chain per channel, zeroes all filter memory and snaps
    /// smoothing to the current settings.
    ///
    /// Not real-time safe. May be called again whenever the sample rate,
    /// block size or channel count changes.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize, num_channels: usize) {
        let sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            tracing::warn!(
                sample_rate,
                fallback = FALLBACK_SAMPLE_RATE,
                "invalid sample rate, using fallback"
            );
            FALLBACK_SAMPLE_RATE
        };

        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.poll_publisher();
        self.chains = (0..num_channels)
            .map(|_| ChannelChain::new(&self.settings, &self.config, sample_rate))
            .collect();
        self.block = 0;
        self.channel_blocks = vec![0; num_channels];
        self.state = EngineState::Prepared;

        tracing::info!(
            sample_rate,
            max_block_size,
            num_channels,
            "equalizer prepared"
        );
    }

    /// Sets new target settings for every channel.
    ///
    /// Values are clamped to their declared ranges. While processing, the
    /// change is smoothed; otherwise it applies immediately.
    pub fn update_coefficients(&mut self, settings: ChainSettings) {
        let settings = settings.clamped();
        self.settings = settings;
        match self.state {
            EngineState::Processing => {
                for chain in &mut self.chains {
                    chain.set_targets(&settings);
                }
            }
            EngineState::Prepared => {
                for chain in &mut self.chains {
                    chain.apply_immediately(&settings);
                }
            }
            EngineState::Uninitialized => {}
        }
    }

    /// Handle for publishing settings from another thread.
    ///
    /// Published settings are picked up at the start of the next block.
    pub fn publisher(&self) -> SettingsPublisher {
        SettingsPublisher::new(Arc::clone(&self.slot))
    }

    /// Filters one channel in place.
    ///
    /// Channels may be processed in any order. Processing a channel that
    /// already ran in the current block starts a new block, and settings
    /// from the [`publisher`](Self::publisher) are picked up there, before
    /// any chain runs again. Before `prepare`, or for a channel that was not
    /// prepared, the slice is filled with silence.
    pub fn process(&mut self, channel: usize, samples: &mut [f32]) {
        match self.channel_blocks.get(channel) {
            Some(&last) if last == self.block => self.begin_block(),
            Some(_) => {}
            None => {
                samples.fill(0.0);
                return;
            }
        }
        self.process_channel(channel, samples);
    }

    /// Filters every channel of a block in place, channel `i` through chain `i`.
    pub fn process_block(&mut self, channels: &mut [&mut [f32]]) {
        self.begin_block();
        for (index, samples) in channels.iter_mut().enumerate() {
            self.process_channel(index, samples);
        }
    }

    /// Zeroes all delay memory. Coefficients and smoothing state are kept.
    pub fn reset(&mut self) {
        for chain in &mut self.chains {
            chain.clear();
        }
        if self.state == EngineState::Processing {
            self.state = EngineState::Prepared;
        }
    }

    /// Frees all chains and returns to [`EngineState::Uninitialized`].
    pub fn release(&mut self) {
        self.chains = Vec::new();
        self.channel_blocks = Vec::new();
        self.state = EngineState::Uninitialized;
        tracing::info!("equalizer released");
    }

    /// Replaces the configuration and redesigns every chain.
    ///
    /// A change of cut slope takes effect immediately; new sections start
    /// from silence.
    pub fn set_config(&mut self, config: EngineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        for chain in &mut self.chains {
            chain.set_config(&config);
        }
        tracing::debug!(?config, "engine config updated");
        self.config = config;
        Ok(())
    }

    /// Analytic magnitude response of the target settings, in dB.
    pub fn magnitude_db(&self, frequency: f32) -> f32 {
        self.target_coefficients().magnitude_db(frequency)
    }

    /// Coefficients the chains converge to for the current target settings.
    pub fn target_coefficients(&self) -> ChainCoefficients {
        ChainCoefficients::design(&self.settings, &self.config, self.sample_rate)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Sample rate in use (the fallback until prepared).
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Number of prepared channels.
    pub fn num_channels(&self) -> usize {
        self.chains.len()
    }

    /// Block size given to the last `prepare`.
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Latest (clamped) target settings.
    pub fn settings(&self) -> ChainSettings {
        self.settings
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// `true` while any channel is mid-transition.
    pub fn is_smoothing(&self) -> bool {
        self.chains.iter().any(ChannelChain::is_smoothing)
    }

    /// The chain for one channel.
    pub fn chain(&self, channel: usize) -> Option<&ChannelChain> {
        self.chains.get(channel)
    }

    fn process_channel(&mut self, channel: usize, samples: &mut [f32]) {
        let Some(chain) = self.chains.get_mut(channel) else {
            samples.fill(0.0);
            return;
        };
        chain.process(samples);
        self.channel_blocks[channel] = self.block;
        self.state = EngineState::Processing;
    }

    fn begin_block(&mut self) {
        self.block += 1;
        self.poll_publisher();
    }

    fn poll_publisher(&mut self) {
        if let Some((seq, settings)) = self.slot.read_newer(self.last_seq) {
            self.last_seq = seq;
            self.update_coefficients(settings);
        }
    }
}
