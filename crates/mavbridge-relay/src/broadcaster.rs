use std::sync::Arc;

use mavbridge_message::TelemetryEvent;
use tracing::trace;

use crate::error::Result;
use crate::registry::SubscriberRegistry;
use crate::subscriber::SendError;

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Subscribers that accepted the record.
    pub delivered: usize,
    /// Subscribers skipped because they were not ready.
    pub skipped: usize,
    /// Ready subscribers whose queue could not take the record.
    pub dropped: usize,
}

/// Delivers events to every ready subscriber.
///
/// Subscribers that are not ready are skipped, not removed; removal is the
/// connection layer's job once it sees the disconnect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Broadcaster;

impl Broadcaster {
    pub fn new() -> Self {
        Self
    }

    /// Serialize `event` once and hand it to every ready subscriber.
    pub fn broadcast(
        &self,
        event: &TelemetryEvent,
        registry: &mut SubscriberRegistry,
    ) -> Result<BroadcastReport> {
        if registry.is_empty() {
            return Ok(BroadcastReport::default());
        }
        let record: Arc<str> = event.to_record()?.into();
        Ok(self.broadcast_record(&record, registry))
    }

    /// Hand an already serialized record to every ready subscriber.
    pub fn broadcast_record(
        &self,
        record: &Arc<str>,
        registry: &mut SubscriberRegistry,
    ) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        for subscriber in registry.snapshot() {
            if !subscriber.is_ready() {
                report.skipped += 1;
                continue;
            }
            match subscriber.send(record) {
                Ok(()) => report.delivered += 1,
                Err(SendError::Full) => {
                    trace!(id = %subscriber.id(), "subscriber queue full; record dropped");
                    report.dropped += 1;
                }
                // Went away between the readiness check and the send.
                Err(SendError::Closed) => report.skipped += 1,
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use mavbridge_message::Attitude;

    use super::*;
    use crate::subscriber::test_support::RecordingSubscriber;
    use crate::subscriber::SubscriberId;

    fn attitude(yaw_deg: f64) -> TelemetryEvent {
        TelemetryEvent::Attitude(Attitude {
            roll_deg: 0.0,
            pitch_deg: 0.0,
            yaw_deg,
        })
    }

    #[test]
    fn delivers_to_every_ready_subscriber() {
        let mut registry = SubscriberRegistry::new();
        let (a, a_rx) = RecordingSubscriber::new(1);
        let (b, b_rx) = RecordingSubscriber::new(2);
        registry.add(Box::new(a));
        registry.add(Box::new(b));

        let report = Broadcaster::new()
            .broadcast(&attitude(10.0), &mut registry)
            .unwrap();

        assert_eq!(
            report,
            BroadcastReport {
                delivered: 2,
                skipped: 0,
                dropped: 0
            }
        );
        let expected = r#"{"type":"attitude","roll":0.0,"pitch":0.0,"yaw":10.0}"#;
        assert_eq!(a_rx.lock().unwrap().as_slice(), &[expected.to_string()]);
        assert_eq!(b_rx.lock().unwrap().as_slice(), &[expected.to_string()]);
    }

    #[test]
    fn skips_but_keeps_subscribers_that_are_not_ready() {
        let mut registry = SubscriberRegistry::new();
        let (open, open_rx) = RecordingSubscriber::new(1);
        let (mut closing, closing_rx) = RecordingSubscriber::new(2);
        closing.ready = false;
        registry.add(Box::new(open));
        registry.add(Box::new(closing));

        let report = Broadcaster::new()
            .broadcast(&attitude(1.0), &mut registry)
            .unwrap();

        assert_eq!(report.delivered, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(open_rx.lock().unwrap().len(), 1);
        assert!(closing_rx.lock().unwrap().is_empty());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn full_queue_drops_only_for_that_subscriber() {
        let mut registry = SubscriberRegistry::new();
        let (mut slow, slow_rx) = RecordingSubscriber::new(1);
        slow.full = true;
        let (fast, fast_rx) = RecordingSubscriber::new(2);
        registry.add(Box::new(slow));
        registry.add(Box::new(fast));

        let report = Broadcaster::new()
            .broadcast(&attitude(2.0), &mut registry)
            .unwrap();

        assert_eq!(report.dropped, 1);
        assert_eq!(report.delivered, 1);
        assert!(slow_rx.lock().unwrap().is_empty());
        assert_eq!(fast_rx.lock().unwrap().len(), 1);
    }

    #[test]
    fn subscriber_closed_during_send_is_skipped_and_kept() {
        let mut registry = SubscriberRegistry::new();
        let (mut gone, gone_rx) = RecordingSubscriber::new(1);
        gone.closed = true;
        let (open, open_rx) = RecordingSubscriber::new(2);
        registry.add(Box::new(gone));
        registry.add(Box::new(open));

        let report = Broadcaster::new()
            .broadcast(&attitude(3.0), &mut registry)
            .unwrap();

        assert_eq!(
            report,
            BroadcastReport {
                delivered: 1,
                skipped: 1,
                dropped: 0
            }
        );
        assert!(gone_rx.lock().unwrap().is_empty());
        assert_eq!(open_rx.lock().unwrap().len(), 1);
        assert_eq!(
            registry.ids().collect::<Vec<_>>(),
            vec![SubscriberId(1), SubscriberId(2)]
        );
    }

    #[test]
    fn per_subscriber_order_follows_broadcast_order() {
        let mut registry = SubscriberRegistry::new();
        let (sub, rx) = RecordingSubscriber::new(1);
        registry.add(Box::new(sub));

        let broadcaster = Broadcaster::new();
        for yaw in [1.0, 2.0, 3.0] {
            broadcaster.broadcast(&attitude(yaw), &mut registry).unwrap();
        }

        let yaws: Vec<f64> = rx
            .lock()
            .unwrap()
            .iter()
            .map(|record| match TelemetryEvent::from_record(record).unwrap() {
                TelemetryEvent::Attitude(att) => att.yaw_deg,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(yaws, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn empty_registry_is_a_no_op() {
        let mut registry = SubscriberRegistry::new();
        let report = Broadcaster::new()
            .broadcast(&attitude(0.0), &mut registry)
            .unwrap();
        assert_eq!(report, BroadcastReport::default());
    }
}
