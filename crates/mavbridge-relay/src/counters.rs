use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Diagnostic counters for one relay process.
///
/// Observability only: nothing reads these to make a decision.
#[derive(Debug, Default)]
pub struct Counters {
    datagrams: AtomicU64,
    bytes: AtomicU64,
    frames: AtomicU64,
    events: AtomicU64,
    truncations: AtomicU64,
    unrecognized: AtomicU64,
    undersized: AtomicU64,
    filtered: AtomicU64,
    delivered: AtomicU64,
    skipped: AtomicU64,
    dropped: AtomicU64,
}

/// Point-in-time copy of [`Counters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub datagrams: u64,
    pub bytes: u64,
    pub frames: u64,
    pub events: u64,
    /// Buffers whose tail held an incomplete frame.
    pub truncations: u64,
    pub unrecognized: u64,
    pub undersized: u64,
    pub filtered: u64,
    pub delivered: u64,
    pub skipped: u64,
    pub dropped: u64,
}

fn bump(counter: &AtomicU64, by: u64) {
    counter.fetch_add(by, Ordering::Relaxed);
}

impl Counters {
    pub const fn new() -> Self {
        Self {
            datagrams: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
            frames: AtomicU64::new(0),
            events: AtomicU64::new(0),
            truncations: AtomicU64::new(0),
            unrecognized: AtomicU64::new(0),
            undersized: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    pub(crate) fn record_datagram(&self, len: usize) {
        bump(&self.datagrams, 1);
        bump(&self.bytes, len as u64);
    }

    pub(crate) fn record_frame(&self) {
        bump(&self.frames, 1);
    }

    pub(crate) fn record_event(&self) {
        bump(&self.events, 1);
    }

    pub(crate) fn record_truncation(&self) {
        bump(&self.truncations, 1);
    }

    pub(crate) fn record_unrecognized(&self) {
        bump(&self.unrecognized, 1);
    }

    pub(crate) fn record_undersized(&self) {
        bump(&self.undersized, 1);
    }

    pub(crate) fn record_filtered(&self) {
        bump(&self.filtered, 1);
    }

    pub(crate) fn record_delivery(&self, delivered: usize, skipped: usize, dropped: usize) {
        bump(&self.delivered, delivered as u64);
        bump(&self.skipped, skipped as u64);
        bump(&self.dropped, dropped as u64);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        CounterSnapshot {
            datagrams: load(&self.datagrams),
            bytes: load(&self.bytes),
            frames: load(&self.frames),
            events: load(&self.events),
            truncations: load(&self.truncations),
            unrecognized: load(&self.unrecognized),
            undersized: load(&self.undersized),
            filtered: load(&self.filtered),
            delivered: load(&self.delivered),
            skipped: load(&self.skipped),
            dropped: load(&self.dropped),
        }
    }

    /// Zero every counter. Called when the relay starts.
    pub fn reset(&self) {
        for counter in [
            &self.datagrams,
            &self.bytes,
            &self.frames,
            &self.events,
            &self.truncations,
            &self.unrecognized,
            &self.undersized,
            &self.filtered,
            &self.delivered,
            &self.skipped,
            &self.dropped,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_values() {
        let counters = Counters::new();
        counters.record_datagram(40);
        counters.record_datagram(2);
        counters.record_frame();
        counters.record_event();
        counters.record_delivery(3, 1, 0);

        let snap = counters.snapshot();
        assert_eq!(snap.datagrams, 2);
        assert_eq!(snap.bytes, 42);
        assert_eq!(snap.frames, 1);
        assert_eq!(snap.events, 1);
        assert_eq!((snap.delivered, snap.skipped, snap.dropped), (3, 1, 0));
    }

    #[test]
    fn reset_zeroes_everything() {
        let counters = Counters::default();
        counters.record_truncation();
        counters.record_unrecognized();
        counters.record_undersized();
        counters.record_filtered();

        counters.reset();
        assert_eq!(counters.snapshot(), CounterSnapshot::default());
    }

    #[test]
    fn snapshot_serializes_flat() {
        let value = serde_json::to_value(CounterSnapshot {
            frames: 7,
            ..CounterSnapshot::default()
        })
        .unwrap();
        assert_eq!(value["frames"], 7);
        assert_eq!(value.as_object().unwrap().len(), 11);
    }
}
