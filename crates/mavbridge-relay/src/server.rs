use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use mavbridge_transport::{IngestSocket, SubscriberSocket, TransportError};
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::RelayConfig;
use crate::connection::spawn_connection;
use crate::counters::{CounterSnapshot, Counters};
use crate::error::{RelayError, Result};
use crate::pipeline::Pipeline;
use crate::registry::SubscriberRegistry;

/// A bound relay: UDP ingest in, NDJSON records out to Unix socket subscribers.
///
/// ```no_run
/// # async fn demo() -> mavbridge_relay::Result<()> {
/// use mavbridge_relay::{Relay, RelayConfig};
/// use tokio_util::sync::CancellationToken;
///
/// let relay = Relay::bind(RelayConfig::default()).await?;
/// let totals = relay.run(CancellationToken::new()).await?;
/// println!("{} events", totals.events);
/// # Ok(())
/// # }
/// ```
pub struct Relay {
    config: RelayConfig,
    ingest: IngestSocket,
    subscribers: SubscriberSocket,
    pipeline: Pipeline,
    registry: SubscriberRegistry,
}

impl Relay {
    /// Bind both sockets. Must be called from within a tokio runtime.
    pub async fn bind(config: RelayConfig) -> Result<Self> {
        let ingest = IngestSocket::bind_with_buffer(config.udp_addr, config.recv_buffer).await?;
        let subscribers = SubscriberSocket::bind(&config.socket_path)?;
        let pipeline = Pipeline::new(config.decoder.clone());

        Ok(Self {
            config,
            ingest,
            subscribers,
            pipeline,
            registry: SubscriberRegistry::new(),
        })
    }

    /// Address the ingest socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.ingest.local_addr()
    }

    pub fn socket_path(&self) -> &Path {
        self.subscribers.path()
    }

    pub fn counters(&self) -> &Counters {
        self.pipeline.counters()
    }

    /// Run until `cancel` fires or the ingest socket cannot be recovered.
    ///
    /// Datagrams are handled one at a time, to completion, on this task.
    /// Returns the final counter values.
    pub async fn run(self, cancel: CancellationToken) -> Result<CounterSnapshot> {
        let Self {
            config,
            mut ingest,
            subscribers,
            pipeline,
            mut registry,
        } = self;

        pipeline.counters().reset();
        let (closed_tx, mut closed_rx) = mpsc::unbounded_channel();
        let mut stats = config.stats_interval.map(stats_timer);

        info!(
            udp = %ingest.local_addr(),
            socket = ?subscribers.path(),
            "relay running"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("relay cancelled");
                    break;
                }
                received = ingest.recv() => match received {
                    Ok(datagram) => {
                        let report = pipeline.process_datagram(&datagram.bytes, &mut registry);
                        trace!(
                            len = datagram.bytes.len(),
                            frames = report.frames,
                            events = report.events,
                            truncated = report.truncated,
                            delivered = report.delivered,
                            "datagram processed"
                        );
                    }
                    Err(err) => {
                        warn!(error = %err, "ingest socket failed");
                        match rebind(ingest, err, &config, &cancel).await? {
                            Some(socket) => ingest = socket,
                            None => break,
                        }
                    }
                },
                accepted = subscribers.accept() => match accepted {
                    Ok(stream) => {
                        let id = registry.allocate_id();
                        let subscriber = spawn_connection(
                            id,
                            stream,
                            config.subscriber_queue,
                            closed_tx.clone(),
                            cancel.child_token(),
                        );
                        registry.add(Box::new(subscriber));
                        info!(%id, subscribers = registry.len(), "subscriber connected");
                    }
                    Err(err) => warn!(error = %err, "failed to accept subscriber"),
                },
                Some(id) = closed_rx.recv() => {
                    if registry.remove(id) {
                        info!(%id, subscribers = registry.len(), "subscriber disconnected");
                    }
                }
                _ = next_tick(&mut stats) => log_stats(pipeline.counters(), registry.len()),
            }
        }

        let totals = pipeline.counters().snapshot();
        info!(
            datagrams = totals.datagrams,
            events = totals.events,
            delivered = totals.delivered,
            "relay stopped"
        );
        Ok(totals)
    }
}

fn stats_timer(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn next_tick(stats: &mut Option<Interval>) {
    match stats {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn log_stats(counters: &Counters, subscribers: usize) {
    let s = counters.snapshot();
    info!(
        datagrams = s.datagrams,
        bytes = s.bytes,
        frames = s.frames,
        events = s.events,
        truncations = s.truncations,
        unrecognized = s.unrecognized,
        undersized = s.undersized,
        filtered = s.filtered,
        delivered = s.delivered,
        skipped = s.skipped,
        dropped = s.dropped,
        subscribers,
        "relay stats"
    );
}

/// Delay before rebind attempt `attempt` (0-based): 50ms, 100ms, 200ms, ...
fn rebind_backoff(attempt: u32) -> Duration {
    Duration::from_millis(50 * (1u64 << attempt.min(6)))
}

/// Replace a failed ingest socket with a fresh one on the same address.
///
/// Returns `Ok(None)` if cancelled while waiting.
async fn rebind(
    failed: IngestSocket,
    cause: TransportError,
    config: &RelayConfig,
    cancel: &CancellationToken,
) -> Result<Option<IngestSocket>> {
    let addr = failed.local_addr();
    drop(failed);

    let mut last_error = cause;
    for attempt in 0..config.max_rebind_attempts {
        let backoff = rebind_backoff(attempt);
        debug!(%addr, attempt = attempt + 1, ?backoff, "rebinding ingest socket");
        tokio::select! {
            _ = cancel.cancelled() => return Ok(None),
            _ = tokio::time::sleep(backoff) => {}
        }

        match IngestSocket::bind_with_buffer(addr, config.recv_buffer).await {
            Ok(socket) => {
                info!(%addr, attempt = attempt + 1, "ingest socket rebound");
                return Ok(Some(socket));
            }
            Err(err) => {
                warn!(%addr, attempt = attempt + 1, error = %err, "ingest rebind failed");
                last_error = err;
            }
        }
    }

    Err(RelayError::RebindExhausted {
        attempts: config.max_rebind_attempts,
        source: last_error,
    })
}
