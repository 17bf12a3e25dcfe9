//! Host-facing glue for the peq equalizer.
//!
//! - [`ParameterStore`] - the ten automatable parameters as lock-free
//!   atomics, shared by host, editor and audio threads
//! - [`EqProcessor`] - per-block adapter that snapshots the store and runs
//!   the [`EqualizerEngine`](peq_engine::EqualizerEngine)
//!
//! Plugin-format wrappers (bus negotiation, event decoding, state chunks)
//! call into these two types and nothing else.
//!
//! ```rust
//! use peq_engine::EqParam;
//! use peq_plugin::{EqProcessor, ParameterStore};
//!
//! let store = ParameterStore::default();
//! let mut processor = EqProcessor::new(store.clone());
//! processor.prepare_to_play(48000.0, 256);
//!
//! // Host automation on another thread writes to the store...
//! store.set(EqParam::HiMidGain, -4.0);
//!
//! // ...and the next audio callback picks it up.
//! let mut left = vec![0.0f32; 256];
//! let mut right = vec![0.0f32; 256];
//! processor.process_block(2, &mut [&mut left[..], &mut right[..]]);
//! assert_eq!(processor.engine().settings().hi_mid_gain, -4.0);
//! ```

pub mod processor;
pub mod shared;

pub use processor::{CHANNELS, EqProcessor};
pub use shared::ParameterStore;
