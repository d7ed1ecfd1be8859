//! Connectivity monitoring and queue flush triggers

use crate::client::SubmissionClient;
use crate::transport::Transport;
use tokio::sync::watch;
use vignette_domain::RecordStore;

/// Watches a binary connectivity signal and flushes the queue on restore
///
/// The signal is best-effort, not authoritative: it may be stale or
/// unavailable, so a successful submit remains the only true
/// deliverability signal. Going offline triggers nothing beyond a log
/// line. At startup the monitor waits a short fixed delay and flushes
/// once if the signal reads online.
pub struct ConnectivityMonitor<T: Transport, S: RecordStore> {
    client: SubmissionClient<T, S>,
    connectivity: watch::Receiver<bool>,
}

impl<T, S> ConnectivityMonitor<T, S>
where
    T: Transport,
    S: RecordStore,
    S::Error: std::fmt::Display,
{
    /// Create a monitor over the given connectivity signal
    pub fn new(client: SubmissionClient<T, S>, connectivity: watch::Receiver<bool>) -> Self {
        Self {
            client,
            connectivity,
        }
    }

    /// Run until the signal source is dropped or ctrl-c arrives
    ///
    /// Returns the client so the caller can keep using it afterwards.
    pub async fn run(self) -> SubmissionClient<T, S> {
        let Self {
            mut client,
            mut connectivity,
        } = self;

        tokio::time::sleep(client.config().startup_flush_delay()).await;

        let mut online = *connectivity.borrow();
        tracing::info!(online, "connectivity monitor started");
        if online {
            flush_quietly(&mut client).await;
        }

        loop {
            tokio::select! {
                changed = connectivity.changed() => {
                    if changed.is_err() {
                        // Signal source gone; nothing left to observe
                        break;
                    }
                    let now_online = *connectivity.borrow();
                    if now_online && !online {
                        tracing::info!("connectivity restored, flushing queued submissions");
                        flush_quietly(&mut client).await;
                    } else if !now_online && online {
                        tracing::info!("connectivity lost");
                    }
                    online = now_online;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown signal received, stopping monitor");
                    break;
                }
            }
        }

        client
    }
}

/// Flush the queue, logging outcomes instead of propagating them
///
/// Flush failures leave entries queued; the next transition or startup
/// tries again.
async fn flush_quietly<T, S>(client: &mut SubmissionClient<T, S>)
where
    T: Transport,
    S: RecordStore,
    S::Error: std::fmt::Display,
{
    match client.flush_queued().await {
        Ok(report) if report.attempted > 0 || report.skipped_malformed > 0 => {
            tracing::info!(
                delivered = report.delivered,
                remaining = report.remaining,
                skipped = report.skipped_malformed,
                "queue flush finished"
            );
        }
        Ok(_) => {}
        Err(e) => {
            tracing::error!("queue flush failed: {}", e);
        }
    }
}
