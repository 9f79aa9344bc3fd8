//! Per-subscriber connection tasks.
//!
//! Each accepted stream gets a bounded queue and a writer task that drains it
//! as newline-delimited JSON. The relay loop only ever `try_send`s into the
//! queue, so a slow subscriber loses records instead of stalling everyone
//! else. When the task ends it reports the subscriber id back to the relay
//! loop, which removes it from the registry.

use std::sync::Arc;

use futures_util::SinkExt;
use tokio::io::AsyncReadExt;
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::codec::{FramedWrite, LinesCodec, LinesCodecError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::subscriber::{SendError, Subscriber, SubscriberId};

/// Registry handle for one connected subscriber.
pub struct QueuedSubscriber {
    id: SubscriberId,
    tx: mpsc::Sender<Arc<str>>,
}

impl QueuedSubscriber {
    pub(crate) fn new(id: SubscriberId, tx: mpsc::Sender<Arc<str>>) -> Self {
        Self { id, tx }
    }
}

impl Subscriber for QueuedSubscriber {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn is_ready(&self) -> bool {
        !self.tx.is_closed()
    }

    fn send(&mut self, record: &Arc<str>) -> Result<(), SendError> {
        self.tx
            .try_send(Arc::clone(record))
            .map_err(|err| match err {
                TrySendError::Full(_) => SendError::Full,
                TrySendError::Closed(_) => SendError::Closed,
            })
    }
}

/// Start the writer task for `stream` and return its registry handle.
///
/// `closed_tx` receives `id` once the task has finished, whatever the reason.
pub fn spawn_connection(
    id: SubscriberId,
    stream: UnixStream,
    queue: usize,
    closed_tx: mpsc::UnboundedSender<SubscriberId>,
    cancel: CancellationToken,
) -> QueuedSubscriber {
    let (tx, rx) = mpsc::channel(queue.max(1));

    tokio::spawn(async move {
        match run_connection(id, stream, rx, cancel).await {
            Ok(()) => debug!(%id, "subscriber connection closed"),
            Err(err) => warn!(%id, error = %err, "subscriber connection failed"),
        }
        // The relay loop may already be gone during shutdown.
        let _ = closed_tx.send(id);
    });

    QueuedSubscriber::new(id, tx)
}

async fn run_connection(
    id: SubscriberId,
    stream: UnixStream,
    mut rx: mpsc::Receiver<Arc<str>>,
    cancel: CancellationToken,
) -> Result<(), LinesCodecError> {
    let (mut reader, writer) = stream.into_split();
    let mut sink = FramedWrite::new(writer, LinesCodec::new());
    let mut scratch = [0u8; 256];

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            record = rx.recv() => match record {
                Some(record) => sink.send(record).await?,
                // Removed from the registry.
                None => return Ok(()),
            },
            read = reader.read(&mut scratch) => match read? {
                0 => {
                    debug!(%id, "subscriber hung up");
                    return Ok(());
                }
                n => trace!(%id, n, "ignoring bytes from subscriber"),
            },
        }
    }
}
