//! Single-slot settings hand-off from control threads to the audio thread.
//!
//! [`SettingsSlot`] holds the most recently published [`ChainSettings`] as
//! `f32` bit patterns in `AtomicU32` cells, guarded by a sequence counter.
//! An odd sequence means a write is in flight. The reader never blocks or
//! retries in a loop: if the counter moved while it was copying, the copy is
//! thrown away and the next block tries again.
//!
//! Writers serialize among themselves by claiming the odd sequence with a
//! compare-and-swap. Only control threads ever wait on that.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering, fence};

use crate::params::EqParam;
use crate::settings::ChainSettings;

/// Sequence-counter protected storage for one settings snapshot.
#[derive(Debug)]
pub struct SettingsSlot {
    seq: AtomicU32,
    values: [AtomicU32; EqParam::COUNT],
}

impl Default for SettingsSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsSlot {
    /// Creates an empty slot holding the default settings.
    pub fn new() -> Self {
        let defaults = ChainSettings::default().to_values();
        Self {
            seq: AtomicU32::new(0),
            values: core::array::from_fn(|i| AtomicU32::new(defaults[i].to_bits())),
        }
    }

    /// Stores `settings` as the latest snapshot.
    pub fn publish(&self, settings: &ChainSettings) {
        let seq = self.lock_for_write();
        fence(Ordering::Release);
        for (cell, value) in self.values.iter().zip(settings.to_values()) {
            cell.store(value.to_bits(), Ordering::Relaxed);
        }
        self.seq.store(seq.wrapping_add(2), Ordering::Release);
    }

    /// Reads the latest snapshot if it is newer than `last_seen`.
    ///
    /// Returns the snapshot with its sequence number, or `None` when nothing
    /// new was published or a write raced the read.
    pub fn read_newer(&self, last_seen: u32) -> Option<(u32, ChainSettings)> {
        let before = self.seq.load(Ordering::Acquire);
        if before & 1 == 1 || before == last_seen {
            return None;
        }
        let values: [f32; EqParam::COUNT] =
            core::array::from_fn(|i| f32::from_bits(self.values[i].load(Ordering::Relaxed)));
        fence(Ordering::Acquire);
        let after = self.seq.load(Ordering::Relaxed);
        (before == after).then(|| (after, ChainSettings::from_values(&values)))
    }

    /// Current sequence number. Even when no write is in flight.
    pub fn sequence(&self) -> u32 {
        self.seq.load(Ordering::Acquire)
    }

    /// Claims the writer side; returns the even sequence observed.
    fn lock_for_write(&self) -> u32 {
        let mut seq = self.seq.load(Ordering::Relaxed);
        loop {
            if seq & 1 == 1 {
                std::hint::spin_loop();
                seq = self.seq.load(Ordering::Relaxed);
                continue;
            }
            match self.seq.compare_exchange_weak(
                seq,
                seq.wrapping_add(1),
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return seq,
                Err(current) => seq = current,
            }
        }
    }
}

/// Control-thread handle for pushing settings to a running engine.
///
/// Cheap to clone; every clone feeds the same engine. Publishing never
/// allocates and never waits on the audio thread.
#[derive(Debug, Clone)]
pub struct SettingsPublisher {
    slot: Arc<SettingsSlot>,
}

impl SettingsPublisher {
    pub(crate) fn new(slot: Arc<SettingsSlot>) -> Self {
        Self { slot }
    }

    /// Hands `settings` (clamped) to the engine. Takes effect at the start
    /// of the engine's next block.
    pub fn update_coefficients(&self, settings: ChainSettings) {
        self.slot.publish(&settings.clamped());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn empty_slot_reports_nothing_new() {
        let slot = SettingsSlot::new();
        assert!(slot.read_newer(0).is_none());
    }

    #[test]
    fn publish_then_read_once() {
        let slot = SettingsSlot::new();
        let settings = ChainSettings::default().with(EqParam::LowGain, -6.0);
        slot.publish(&settings);

        let (seq, read) = slot.read_newer(0).expect("new snapshot");
        assert_eq!(read, settings);
        assert_eq!(seq, 2);
        assert!(slot.read_newer(seq).is_none(), "same snapshot is not re-read");
    }

    #[test]
    fn latest_publish_wins() {
        let slot = SettingsSlot::new();
        slot.publish(&ChainSettings::default().with(EqParam::HiGain, 1.0));
        slot.publish(&ChainSettings::default().with(EqParam::HiGain, 2.0));
        let (_, read) = slot.read_newer(0).expect("new snapshot");
        assert_eq!(read.hi_gain, 2.0);
    }

    #[test]
    fn publisher_clamps() {
        let slot = Arc::new(SettingsSlot::new());
        let publisher = SettingsPublisher::new(Arc::clone(&slot));
        let mut wild = ChainSettings::default();
        wild.hi_gain = 99.0;
        publisher.update_coefficients(wild);
        let (_, read) = slot.read_newer(0).expect("new snapshot");
        assert_eq!(read.hi_gain, 24.0);
    }

    #[test]
    fn concurrent_writers_never_tear() {
        let slot = Arc::new(SettingsSlot::new());
        // Each writer publishes snapshots whose ten values are all equal
        // (as raw values), so a torn read shows up as a mix.
        let writers: Vec<_> = (0..4)
            .map(|w| {
                let slot = Arc::clone(&slot);
                thread::spawn(move || {
                    for i in 0..2000 {
                        let v = (w * 10_000 + i) as f32;
                        slot.publish(&ChainSettings::from_values(&[v; EqParam::COUNT]));
                    }
                })
            })
            .collect();

        let mut last = 0;
        while writers.iter().any(|h| !h.is_finished()) {
            if let Some((seq, s)) = slot.read_newer(last) {
                let values = s.to_values();
                assert!(values.iter().all(|&v| v == values[0]), "torn read: {values:?}");
                last = seq;
            }
        }
        for h in writers {
            h.join().unwrap();
        }
        let (_, s) = slot.read_newer(0).expect("final snapshot");
        let values = s.to_values();
        assert!(values.iter().all(|&v| v == values[0]));
        assert_eq!(slot.sequence(), 2 * 4 * 2000);
    }
}
