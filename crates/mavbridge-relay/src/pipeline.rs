use mavbridge_frame::{scan, FrameDescriptor};
use mavbridge_message::{Decode, Decoder, DecoderConfig, TelemetryEvent};
use tracing::{trace, warn};

use crate::broadcaster::Broadcaster;
use crate::counters::Counters;
use crate::registry::SubscriberRegistry;

/// What one datagram produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatagramReport {
    pub frames: usize,
    pub events: usize,
    /// The buffer ended in an incomplete frame.
    pub truncated: bool,
    pub delivered: usize,
    pub skipped: usize,
    pub dropped: usize,
}

/// Scanner, decoder and broadcaster for one datagram at a time.
///
/// Holds no state between datagrams apart from the diagnostic counters.
#[derive(Debug, Default)]
pub struct Pipeline {
    decoder: Decoder,
    broadcaster: Broadcaster,
    counters: Counters,
}

impl Pipeline {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            decoder: Decoder::new(config),
            broadcaster: Broadcaster::new(),
            counters: Counters::new(),
        }
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Scan and decode `buf`, calling `on_event` for each event in frame order.
    pub fn for_each_event<F>(&self, buf: &[u8], mut on_event: F) -> DatagramReport
    where
        F: FnMut(&FrameDescriptor, TelemetryEvent),
    {
        self.counters.record_datagram(buf.len());
        let mut report = DatagramReport::default();

        let mut scanner = scan(buf);
        for frame in scanner.by_ref() {
            report.frames += 1;
            self.counters.record_frame();

            match self.decoder.classify(&frame, buf) {
                Decode::Event(event) => {
                    report.events += 1;
                    self.counters.record_event();
                    on_event(&frame, event);
                }
                Decode::Unrecognized { message_id } => {
                    trace!(message_id, "frame skipped");
                    self.counters.record_unrecognized();
                }
                Decode::Undersized { .. } => self.counters.record_undersized(),
                Decode::Filtered => self.counters.record_filtered(),
            }
        }

        if scanner.halt().is_some_and(|halt| halt.is_truncation()) {
            report.truncated = true;
            self.counters.record_truncation();
        }
        report
    }

    /// Decode `buf` and collect its events.
    pub fn decode_datagram(&self, buf: &[u8]) -> Vec<(FrameDescriptor, TelemetryEvent)> {
        let mut events = Vec::new();
        self.for_each_event(buf, |frame, event| events.push((*frame, event)));
        events
    }

    /// Decode `buf` and broadcast each event as soon as it is decoded.
    pub fn process_datagram(
        &self,
        buf: &[u8],
        registry: &mut SubscriberRegistry,
    ) -> DatagramReport {
        let mut delivered = 0;
        let mut skipped = 0;
        let mut dropped = 0;

        let mut report = self.for_each_event(buf, |frame, event| {
            match self.broadcaster.broadcast(&event, registry) {
                Ok(sent) => {
                    delivered += sent.delivered;
                    skipped += sent.skipped;
                    dropped += sent.dropped;
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        message_id = frame.message_id,
                        "failed to encode event"
                    );
                }
            }
        });

        self.counters.record_delivery(delivered, skipped, dropped);
        report.delivered = delivered;
        report.skipped = skipped;
        report.dropped = dropped;
        report
    }
}
