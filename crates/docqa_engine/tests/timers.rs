use std::sync::{Arc, Mutex};
use std::time::Duration;

use docqa_engine::{EngineEvent, EventSink, Timers};
use pretty_assertions::assert_eq;
use tokio::runtime::Handle;

#[derive(Default)]
struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl TestSink {
    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }

    fn count(&self, wanted: &EngineEvent) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| *event == wanted)
            .count()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn timers() -> (Timers, Arc<TestSink>) {
    let sink = Arc::new(TestSink::default());
    (Timers::new(Handle::current(), sink.clone()), sink)
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    tokio::task::yield_now().await;
}

#[tokio::test(start_paused = true)]
async fn refresh_ticks_at_configured_period() {
    let (mut timers, sink) = timers();
    assert!(timers.restart_refresh(Duration::from_millis(1000)));

    advance(3500).await;
    assert_eq!(sink.count(&EngineEvent::RefreshTick), 3);
}

#[tokio::test(start_paused = true)]
async fn same_period_does_not_restart() {
    let (mut timers, sink) = timers();
    assert!(timers.restart_refresh(Duration::from_millis(1000)));
    advance(600).await;
    assert!(!timers.restart_refresh(Duration::from_millis(1000)));
    assert_eq!(timers.refresh_restarts(), 1);

    // Phase is kept: the first tick still lands at 1000ms.
    advance(500).await;
    assert_eq!(sink.count(&EngineEvent::RefreshTick), 1);
}

#[tokio::test(start_paused = true)]
async fn new_period_replaces_the_old_ticker() {
    let (mut timers, sink) = timers();
    timers.restart_refresh(Duration::from_millis(5000));
    assert!(timers.restart_refresh(Duration::from_millis(1200)));
    assert_eq!(timers.refresh_restarts(), 2);
    assert_eq!(timers.refresh_period(), Some(Duration::from_millis(1200)));

    advance(5500).await;
    // 1200, 2400, 3600, 4800 and nothing from the cancelled 5000ms ticker.
    assert_eq!(sink.count(&EngineEvent::RefreshTick), 4);
}

#[tokio::test(start_paused = true)]
async fn task_polling_runs_once_and_stops() {
    let (mut timers, sink) = timers();
    timers.start_task_polling(Duration::from_millis(3000));
    timers.start_task_polling(Duration::from_millis(3000));
    assert!(timers.is_task_polling());

    advance(6500).await;
    assert_eq!(sink.count(&EngineEvent::TaskPollTick), 2);

    timers.stop_task_polling();
    assert!(!timers.is_task_polling());
    sink.take();
    advance(9000).await;
    assert!(sink.take().is_empty());
}

#[tokio::test(start_paused = true)]
async fn notice_expires_after_its_ttl() {
    let (timers, sink) = timers();
    timers.expire_notice_after("n1".to_string(), Duration::from_millis(3500));

    advance(3400).await;
    assert!(sink.take().is_empty());
    advance(200).await;
    assert_eq!(
        sink.take(),
        vec![EngineEvent::NoticeExpired {
            id: "n1".to_string()
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn shutdown_silences_everything() {
    let (mut timers, sink) = timers();
    timers.restart_refresh(Duration::from_millis(1000));
    timers.start_task_polling(Duration::from_millis(1000));
    timers.expire_notice_after("n1".to_string(), Duration::from_millis(1500));

    timers.shutdown();
    assert!(!timers.restart_refresh(Duration::from_millis(500)));
    timers.start_task_polling(Duration::from_millis(500));
    assert!(!timers.is_task_polling());
    assert_eq!(timers.refresh_period(), None);

    advance(10_000).await;
    assert!(sink.take().is_empty());
}
