use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use docqa_logging::{docqa_debug, docqa_trace};
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::EngineEvent;

const MIN_PERIOD: Duration = Duration::from_millis(1);

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

struct Ticker {
    period: Duration,
    token: CancellationToken,
}

/// Owns the refresh timer, the task-poll timer and pending notice expiries.
///
/// At most one refresh ticker and one task-poll ticker exist at any time.
/// Every timer hangs off a root token, so `shutdown` stops all of them.
pub struct Timers {
    runtime: Handle,
    sink: Arc<dyn EventSink>,
    root: CancellationToken,
    refresh: Option<Ticker>,
    task_poll: Option<Ticker>,
    refresh_restarts: u64,
}

impl Timers {
    pub fn new(runtime: Handle, sink: Arc<dyn EventSink>) -> Self {
        Self {
            runtime,
            sink,
            root: CancellationToken::new(),
            refresh: None,
            task_poll: None,
            refresh_restarts: 0,
        }
    }

    /// Replaces the refresh ticker. Returns false when one already runs at `period`.
    pub fn restart_refresh(&mut self, period: Duration) -> bool {
        let period = period.max(MIN_PERIOD);
        if self.root.is_cancelled() {
            return false;
        }
        if let Some(current) = &self.refresh {
            if current.period == period && !current.token.is_cancelled() {
                return false;
            }
            current.token.cancel();
        }
        docqa_debug!("refresh timer period={}ms", period.as_millis());
        self.refresh = Some(self.spawn_ticker(period, || EngineEvent::RefreshTick));
        self.refresh_restarts += 1;
        true
    }

    pub fn start_task_polling(&mut self, period: Duration) {
        if self.root.is_cancelled() || self.is_task_polling() {
            return;
        }
        docqa_debug!("task poll timer started period={}ms", period.as_millis());
        self.task_poll = Some(self.spawn_ticker(period, || EngineEvent::TaskPollTick));
    }

    pub fn stop_task_polling(&mut self) {
        if let Some(ticker) = self.task_poll.take() {
            ticker.token.cancel();
            docqa_debug!("task poll timer stopped");
        }
    }

    pub fn is_task_polling(&self) -> bool {
        self.task_poll
            .as_ref()
            .is_some_and(|ticker| !ticker.token.is_cancelled())
    }

    pub fn refresh_period(&self) -> Option<Duration> {
        self.refresh
            .as_ref()
            .filter(|ticker| !ticker.token.is_cancelled())
            .map(|ticker| ticker.period)
    }

    /// How many times a refresh ticker has been (re)started.
    pub fn refresh_restarts(&self) -> u64 {
        self.refresh_restarts
    }

    pub fn expire_notice_after(&self, id: String, after: Duration) {
        if self.root.is_cancelled() {
            return;
        }
        let token = self.root.child_token();
        let sink = self.sink.clone();
        self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(after) => {
                    docqa_trace!("notice {} expired", id);
                    sink.emit(EngineEvent::NoticeExpired { id });
                }
            }
        });
    }

    /// Cancels every timer. Later start requests are ignored.
    pub fn shutdown(&mut self) {
        self.root.cancel();
        self.refresh = None;
        self.task_poll = None;
    }

    fn spawn_ticker(&self, period: Duration, make: fn() -> EngineEvent) -> Ticker {
        let period = period.max(MIN_PERIOD);
        let token = self.root.child_token();
        let cancelled = token.clone();
        let sink = self.sink.clone();
        self.runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => sink.emit(make()),
                }
            }
        });
        Ticker { period, token }
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        self.root.cancel();
    }
}
