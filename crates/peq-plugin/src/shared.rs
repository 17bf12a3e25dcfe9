//! Thread-safe parameter store shared between host, editor and audio threads.
//!
//! `ParameterStore` lives for the lifetime of the plugin instance. Parameter
//! values are stored as atomic `u32` (f32 bit-cast) for lock-free access,
//! and a change counter lets the audio thread skip snapshotting when nothing
//! moved since the previous block.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use peq_core::{ParamDescriptor, ParamId};
use peq_engine::{ChainSettings, EqParam};

/// Inner storage for the parameter store.
///
/// Held behind an `Arc` so `ParameterStore` can be cheaply cloned into
/// `'static + Send` closures on any thread.
struct StoreData {
    /// Parameter descriptors in [`EqParam`] layout order.
    descriptors: [ParamDescriptor; EqParam::COUNT],
    /// Current parameter values as f32 bit-cast to u32 for atomic access.
    values: [AtomicU32; EqParam::COUNT],
    /// Incremented after every value write.
    version: AtomicU32,
    /// Host notification callback, called after every value change so the
    /// host can schedule a process or flush call while transport is stopped.
    host_notify: Option<Box<dyn Fn() + Send + Sync>>,
}

/// The ten automatable equalizer parameters, shared across threads.
///
/// Writers (host automation, editors, the command line) call
/// [`set_value`](Self::set_value); the audio thread reads a consistent
/// [`ChainSettings`] via [`snapshot`](Self::snapshot). Every access is
/// lock-free and allocation-free.
#[derive(Clone)]
pub struct ParameterStore {
    inner: Arc<StoreData>,
}

impl core::fmt::Debug for ParameterStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParameterStore")
            .field("settings", &self.snapshot())
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ParameterStore {
    /// Create a store with every parameter at its default.
    ///
    /// `host_notify` is called from the writing thread after every value
    /// change. Pass `None` for standalone/test use.
    pub fn new(host_notify: Option<Box<dyn Fn() + Send + Sync>>) -> Self {
        let descriptors = EqParam::ALL.map(EqParam::descriptor);
        let values = core::array::from_fn(|i| AtomicU32::new(descriptors[i].default.to_bits()));
        Self {
            inner: Arc::new(StoreData {
                descriptors,
                values,
                version: AtomicU32::new(0),
                host_notify,
            }),
        }
    }

    /// Number of parameters.
    pub fn param_count(&self) -> usize {
        EqParam::COUNT
    }

    /// Get parameter descriptor by index.
    pub fn descriptor(&self, index: usize) -> Option<&ParamDescriptor> {
        self.inner.descriptors.get(index)
    }

    /// All parameter descriptors.
    pub fn descriptors(&self) -> &[ParamDescriptor] {
        &self.inner.descriptors
    }

    /// Find parameter index by stable `ParamId`.
    pub fn index_by_id(&self, id: ParamId) -> Option<usize> {
        self.inner.descriptors.iter().position(|d| d.id == id)
    }

    /// Find parameter index by display name or string id (case-insensitive).
    pub fn index_by_name(&self, name: &str) -> Option<usize> {
        EqParam::find(name).map(EqParam::index)
    }

    /// Read the current value of a parameter (lock-free).
    pub fn get_value(&self, index: usize) -> Option<f32> {
        self.inner
            .values
            .get(index)
            .map(|v| f32::from_bits(v.load(Ordering::Acquire)))
    }

    /// Write a parameter value (lock-free). Clamps to descriptor bounds;
    /// NaN resets the parameter to its default.
    pub fn set_value(&self, index: usize, value: f32) {
        if let Some((atomic, desc)) = self
            .inner
            .values
            .get(index)
            .zip(self.inner.descriptors.get(index))
        {
            atomic.store(desc.clamp(value).to_bits(), Ordering::Release);
            self.inner.version.fetch_add(1, Ordering::Release);
            self.notify_host();
        }
    }

    /// Current value of `param`.
    pub fn get(&self, param: EqParam) -> f32 {
        self.get_value(param.index()).unwrap_or_default()
    }

    /// Sets `param`, clamped to its range.
    pub fn set(&self, param: EqParam, value: f32) {
        self.set_value(param.index(), value);
    }

    /// Value of a parameter in normalized `[0, 1]` space.
    pub fn get_normalized(&self, index: usize) -> Option<f32> {
        let desc = self.descriptor(index)?;
        self.get_value(index).map(|v| desc.normalize(v))
    }

    /// Sets a parameter from a normalized `[0, 1]` host value.
    pub fn set_normalized(&self, index: usize, normalized: f32) {
        if let Some(desc) = self.descriptor(index) {
            let value = desc.denormalize(normalized);
            self.set_value(index, value);
        }
    }

    /// Reads every parameter into one [`ChainSettings`] (lock-free).
    pub fn snapshot(&self) -> ChainSettings {
        let values = core::array::from_fn(|i| {
            f32::from_bits(self.inner.values[i].load(Ordering::Acquire))
        });
        ChainSettings::from_values(&values)
    }

    /// Writes every field of `settings` into the store.
    pub fn apply_settings(&self, settings: &ChainSettings) {
        for (i, value) in settings.to_values().into_iter().enumerate() {
            self.set_value(i, value);
        }
    }

    /// Restores every parameter to its default.
    pub fn reset_to_defaults(&self) {
        self.apply_settings(&ChainSettings::default());
    }

    /// Change counter. Differs from a previous reading if any value was
    /// written in between.
    pub fn version(&self) -> u32 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Notify the host that parameter changes are pending.
    ///
    /// No-op if no callback is set (standalone mode).
    pub fn notify_host(&self) {
        if let Some(cb) = &self.inner.host_notify {
            cb();
        }
    }
}
