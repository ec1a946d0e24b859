use crate::api::{ApiClient, Outcome};
use crate::feed::FeedSnapshot;
use crate::notify::{self, Notifier};
use crate::render::RenderSink;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Owns the repeating fetch-and-reconcile cycle.
///
/// Cycles run sequentially inside one spawned task, so a slow fetch delays
/// the next tick instead of overlapping it. `stop` only prevents future
/// cycles; an in-flight fetch is allowed to finish, but its effects are
/// discarded because the generation it was started under is no longer
/// current.
#[derive(Clone)]
pub struct FeedPoller {
    api: ApiClient,
    render: Arc<dyn RenderSink>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    inner: Arc<RwLock<PollerInner>>,
}

struct PollerInner {
    snapshot: FeedSnapshot,
    handle: Option<PollHandle>,
    generation: u64,
}

// Dropping the handle detaches rather than aborts: the loop notices the
// generation moved on and exits on its own, so an in-flight request is never
// cancelled mid-cycle.
struct PollHandle {
    task: JoinHandle<()>,
}

impl FeedPoller {
    pub fn new(
        api: ApiClient,
        render: Arc<dyn RenderSink>,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
    ) -> Self {
        Self {
            api,
            render,
            notifier,
            interval,
            inner: Arc::new(RwLock::new(PollerInner {
                snapshot: FeedSnapshot::default(),
                handle: None,
                generation: 0,
            })),
        }
    }

    /// Arms the repeating cycle. The first cycle fires immediately.
    /// Starting an already-running poller is a no-op.
    pub fn start(&self) {
        let mut inner = self.inner.write();
        if inner.handle.is_some() {
            return;
        }
        inner.generation += 1;
        let generation = inner.generation;
        let poller = self.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poller.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !poller.is_current(generation) {
                    break;
                }
                poller.run_cycle(generation).await;
            }
            debug!(generation, "feed poll loop exited");
        });
        inner.handle = Some(PollHandle { task });
        debug!(generation, interval_ms = self.interval.as_millis() as u64, "feed poller started");
    }

    /// Disarms future cycles. Stopping an already-stopped poller is a no-op.
    pub fn stop(&self) {
        let mut inner = self.inner.write();
        if inner.handle.take().is_none() {
            return;
        }
        inner.generation += 1;
        debug!("feed poller stopped");
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .read()
            .handle
            .as_ref()
            .map(|handle| !handle.task.is_finished())
            .unwrap_or(false)
    }

    /// Drops the dedup baseline. Called on logout so a cycle started under a
    /// later session never compares against another user's feed.
    pub fn reset(&self) {
        self.inner.write().snapshot = FeedSnapshot::default();
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.inner.read().snapshot.clone()
    }

    fn is_current(&self, generation: u64) -> bool {
        let inner = self.inner.read();
        inner.generation == generation && inner.handle.is_some()
    }

    /// One fetch-and-reconcile cycle. Failures are contained here so the
    /// schedule survives them.
    async fn run_cycle(&self, generation: u64) {
        let outcome = match self.api.fetch_feed().await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(%err, "poll cycle failed at the transport");
                self.render.set_status(&format!("Error: {err}"), true);
                return;
            }
        };

        match outcome {
            Outcome::Success(messages) => {
                let current = FeedSnapshot::new(messages);
                let previous = {
                    let inner = self.inner.read();
                    if inner.generation != generation {
                        debug!("discarding stale poll cycle");
                        return;
                    }
                    inner.snapshot.clone()
                };
                let identity = self.api.session().get().identity;
                let alerts = notify::evaluate(&previous, &current, identity.as_deref());
                {
                    let mut inner = self.inner.write();
                    if inner.generation != generation {
                        debug!("discarding stale poll cycle");
                        return;
                    }
                    inner.snapshot = current.clone();
                }
                notify::dispatch_alerts(self.notifier.as_ref(), &alerts).await;
                self.render.show_feed(current.messages());
            }
            Outcome::AuthFailure => {
                // The ApiClient has already cleared the session and announced
                // `Expired`; no further cycle may fire until a new login.
                self.stop();
            }
            Outcome::OtherFailure(message) => {
                self.render.set_status(&format!("Error: {message}"), true);
            }
        }
    }
}
