use std::fmt;
use std::sync::Arc;

/// Identity of one subscriber connection, unique for the relay's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Why a record was not handed to a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The subscriber's outbound queue is full; the record was dropped.
    #[error("subscriber queue full")]
    Full,
    /// The subscriber has gone away.
    #[error("subscriber closed")]
    Closed,
}

/// A downstream consumer of serialized telemetry records.
pub trait Subscriber {
    fn id(&self) -> SubscriberId;

    /// Whether the connection is open and accepting records.
    fn is_ready(&self) -> bool;

    /// Hand over one record without blocking.
    fn send(&mut self, record: &Arc<str>) -> Result<(), SendError>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Arc, Mutex};

    use super::{SendError, Subscriber, SubscriberId};

    /// In-memory subscriber that records what it receives.
    pub(crate) struct RecordingSubscriber {
        pub id: SubscriberId,
        pub ready: bool,
        pub full: bool,
        /// Reports ready but refuses the send, as if it hung up in between.
        pub closed: bool,
        pub received: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingSubscriber {
        pub(crate) fn new(id: u64) -> (Self, Arc<Mutex<Vec<String>>>) {
            let received = Arc::new(Mutex::new(Vec::new()));
            let sub = Self {
                id: SubscriberId(id),
                ready: true,
                full: false,
                closed: false,
                received: received.clone(),
            };
            (sub, received)
        }
    }

    impl Subscriber for RecordingSubscriber {
        fn id(&self) -> SubscriberId {
            self.id
        }

        fn is_ready(&self) -> bool {
            self.ready
        }

        fn send(&mut self, record: &Arc<str>) -> Result<(), SendError> {
            if self.closed {
                return Err(SendError::Closed);
            }
            if self.full {
                return Err(SendError::Full);
            }
            self.received.lock().unwrap().push(record.to_string());
            Ok(())
        }
    }
}
