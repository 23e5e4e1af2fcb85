// Panel controller - polls one report on the shared refresh interval
use crate::application::report_source::ReportSource;
use crate::domain::error::FetchError;
use crate::domain::panel::PanelState;
use crate::domain::refresh::RefreshInterval;
use crate::domain::report::{ReportKind, ReportPayload};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{Notify, watch};
use tokio::task::{AbortHandle, JoinSet};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

type FetchOutcome = (u64, Result<ReportPayload, FetchError>);

/// Owns the state of one panel. Runs as its own task and is the only writer
/// of that state; readers see the snapshots it publishes.
pub struct PanelController {
    kind: ReportKind,
    source: Arc<dyn ReportSource>,
    state: PanelState,
    state_tx: watch::Sender<PanelState>,
    interval_rx: watch::Receiver<RefreshInterval>,
    refresh: Arc<Notify>,
    in_flight: JoinSet<FetchOutcome>,
}

/// Handle to a mounted panel. Dropping it tears the panel down.
pub struct PanelHandle {
    kind: ReportKind,
    state_rx: watch::Receiver<PanelState>,
    refresh: Arc<Notify>,
    task: AbortHandle,
}

impl PanelController {
    /// Mount a panel for `kind`: the first fetch is issued before this
    /// returns, later ones on every tick of the shared interval.
    pub fn mount(
        kind: ReportKind,
        source: Arc<dyn ReportSource>,
        interval_rx: watch::Receiver<RefreshInterval>,
    ) -> PanelHandle {
        let state = PanelState::new(kind);
        let (state_tx, state_rx) = watch::channel(state.clone());
        let refresh = Arc::new(Notify::new());

        let mut controller = Self {
            kind,
            source,
            state,
            state_tx,
            interval_rx,
            refresh: Arc::clone(&refresh),
            in_flight: JoinSet::new(),
        };
        controller.issue_fetch();

        let task = tokio::spawn(controller.run()).abort_handle();
        tracing::info!(panel = %kind, "Panel mounted");

        PanelHandle {
            kind,
            state_rx,
            refresh,
            task,
        }
    }

    async fn run(mut self) {
        let mut ticker = Self::ticker(*self.interval_rx.borrow_and_update());
        let mut interval_open = true;

        loop {
            tokio::select! {
                _ = ticker.tick() => self.issue_fetch(),
                changed = self.interval_rx.changed(), if interval_open => match changed {
                    Ok(()) => {
                        let interval = *self.interval_rx.borrow_and_update();
                        tracing::debug!(
                            panel = %self.kind,
                            seconds = interval.as_secs(),
                            "Restarting refresh timer"
                        );
                        ticker = Self::ticker(interval);
                    }
                    // Shell is gone; keep polling on the last period.
                    Err(_) => interval_open = false,
                },
                _ = self.refresh.notified() => self.issue_fetch(),
                Some(joined) = self.in_flight.join_next() => match joined {
                    Ok((seq, result)) => self.settle(seq, result),
                    Err(err) => {
                        tracing::error!(panel = %self.kind, "Fetch task failed: {}", err)
                    }
                },
            }
        }
    }

    /// First tick one full period from now.
    fn ticker(interval: RefreshInterval) -> Interval {
        let period = interval.period();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    fn issue_fetch(&mut self) {
        let seq = self.state.begin_fetch();
        self.publish();

        let source = Arc::clone(&self.source);
        let kind = self.kind;
        tracing::debug!(panel = %kind, seq, "Fetch issued");
        self.in_flight.spawn(async move { (seq, source.fetch(kind).await) });
    }

    fn settle(&mut self, seq: u64, result: Result<ReportPayload, FetchError>) {
        if self.state.apply(seq, result, Utc::now()) {
            tracing::debug!(panel = %self.kind, seq, status = ?self.state.status, "Fetch applied");
            self.publish();
        } else {
            tracing::debug!(panel = %self.kind, seq, "Discarding out-of-order response");
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }
}

impl PanelHandle {
    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn snapshot(&self) -> PanelState {
        self.state_rx.borrow().clone()
    }

    /// Fetch now, in addition to the scheduled polls.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    /// Stop polling. Outstanding fetches are aborted and never applied.
    pub fn shutdown(&self) {
        if !self.task.is_finished() {
            self.task.abort();
            tracing::info!(panel = %self.kind, "Panel torn down");
        }
    }
}

impl Drop for PanelHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::ScriptedSource;
    use crate::domain::panel::PanelStatus;
    use crate::domain::report::SignupSourceRow;
    use std::time::Duration;
    use tokio::time::sleep;

    fn signups(count: u64) -> ReportPayload {
        ReportPayload::SignupSource(vec![SignupSourceRow {
            source: "organic".to_string(),
            count,
        }])
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_fetches_immediately() {
        let source = ScriptedSource::new();
        let (_interval_tx, interval_rx) = watch::channel(RefreshInterval::OneMinute);

        let panel = PanelController::mount(ReportKind::Activity, source.clone(), interval_rx);
        assert_eq!(panel.snapshot().status, PanelStatus::Loading);

        sleep(secs(1)).await;
        let state = panel.snapshot();
        assert_eq!(state.status, PanelStatus::Ready);
        assert!(state.rows.is_empty());
        assert!(state.last_updated.is_some());
        assert_eq!(source.calls(ReportKind::Activity), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_every_period() {
        let source = ScriptedSource::new();
        let (_interval_tx, interval_rx) = watch::channel(RefreshInterval::ThirtySeconds);
        let _panel = PanelController::mount(ReportKind::Players, source.clone(), interval_rx);

        sleep(secs(1)).await;
        assert_eq!(source.calls(ReportKind::Players), 1);
        sleep(secs(30)).await;
        assert_eq!(source.calls(ReportKind::Players), 2);
        sleep(secs(30)).await;
        assert_eq!(source.calls(ReportKind::Players), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_do_not_wait_for_slow_fetches() {
        let source = ScriptedSource::new();
        source.push(
            ReportKind::GamePass,
            secs(90),
            Ok(ReportPayload::empty(ReportKind::GamePass)),
        );
        let (_interval_tx, interval_rx) = watch::channel(RefreshInterval::ThirtySeconds);
        let panel = PanelController::mount(ReportKind::GamePass, source.clone(), interval_rx);

        sleep(secs(61)).await;
        assert_eq!(source.calls(ReportKind::GamePass), 3);
        assert!(panel.snapshot().last_updated.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_is_discarded() {
        let source = ScriptedSource::new();
        source.push(ReportKind::SignupSource, secs(10), Ok(signups(1)));
        source.push(ReportKind::SignupSource, secs(2), Ok(signups(2)));
        let (_interval_tx, interval_rx) = watch::channel(RefreshInterval::FiveMinutes);
        let panel = PanelController::mount(ReportKind::SignupSource, source.clone(), interval_rx);

        sleep(secs(1)).await;
        panel.refresh();

        sleep(secs(4)).await;
        assert_eq!(panel.snapshot().rows, signups(2));

        sleep(secs(10)).await;
        let state = panel.snapshot();
        assert_eq!(source.calls(ReportKind::SignupSource), 2);
        assert_eq!(state.rows, signups(2));
        assert_eq!(state.status, PanelStatus::Ready);
        assert!(!state.is_refreshing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_keeps_rows_and_timestamp() {
        let source = ScriptedSource::new();
        source.push(ReportKind::SignupSource, Duration::ZERO, Ok(signups(4)));
        source.push(
            ReportKind::SignupSource,
            Duration::ZERO,
            Err(FetchError::Network("connection reset".to_string())),
        );
        let (_interval_tx, interval_rx) = watch::channel(RefreshInterval::OneMinute);
        let panel = PanelController::mount(ReportKind::SignupSource, source.clone(), interval_rx);

        sleep(secs(1)).await;
        let first = panel.snapshot();
        assert_eq!(first.status, PanelStatus::Ready);

        panel.refresh();
        sleep(secs(1)).await;
        let state = panel.snapshot();
        assert_eq!(state.status, PanelStatus::Error);
        assert_eq!(state.rows, signups(4));
        assert_eq!(state.last_updated, first.last_updated);
        assert_eq!(
            state.error.as_deref(),
            Some("Failed to fetch signup source data")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_change_restarts_timer() {
        let source = ScriptedSource::new();
        let (interval_tx, interval_rx) = watch::channel(RefreshInterval::OneMinute);
        let _panel = PanelController::mount(ReportKind::Activity, source.clone(), interval_rx);

        sleep(secs(10)).await;
        interval_tx.send_replace(RefreshInterval::ThirtySeconds);

        sleep(secs(29)).await;
        assert_eq!(source.calls(ReportKind::Activity), 1);
        sleep(secs(2)).await;
        assert_eq!(source.calls(ReportKind::Activity), 2);
        sleep(secs(30)).await;
        assert_eq!(source.calls(ReportKind::Activity), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_change_leaves_in_flight_fetch_alone() {
        let source = ScriptedSource::new();
        source.push(
            ReportKind::Players,
            secs(20),
            Ok(ReportPayload::empty(ReportKind::Players)),
        );
        let (interval_tx, interval_rx) = watch::channel(RefreshInterval::OneMinute);
        let panel = PanelController::mount(ReportKind::Players, source.clone(), interval_rx);

        sleep(secs(5)).await;
        interval_tx.send_replace(RefreshInterval::FiveMinutes);

        sleep(secs(20)).await;
        assert_eq!(panel.snapshot().status, PanelStatus::Ready);
        assert_eq!(source.calls(ReportKind::Players), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_polling() {
        let source = ScriptedSource::new();
        let (_interval_tx, interval_rx) = watch::channel(RefreshInterval::ThirtySeconds);
        let panel = PanelController::mount(ReportKind::Activity, source.clone(), interval_rx);

        sleep(secs(1)).await;
        panel.shutdown();

        sleep(secs(300)).await;
        assert_eq!(source.calls(ReportKind::Activity), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_abandons_in_flight_fetch() {
        let source = ScriptedSource::new();
        source.push(ReportKind::SignupSource, secs(10), Ok(signups(9)));
        let (_interval_tx, interval_rx) = watch::channel(RefreshInterval::ThirtySeconds);
        let panel = PanelController::mount(ReportKind::SignupSource, source.clone(), interval_rx);

        sleep(secs(1)).await;
        panel.shutdown();

        sleep(secs(60)).await;
        let state = panel.snapshot();
        assert_eq!(state.status, PanelStatus::Loading);
        assert!(state.rows.is_empty());
        assert_eq!(source.calls(ReportKind::SignupSource), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_polling() {
        let source = ScriptedSource::new();
        let (_interval_tx, interval_rx) = watch::channel(RefreshInterval::ThirtySeconds);
        let panel = PanelController::mount(ReportKind::GamePass, source.clone(), interval_rx);

        sleep(secs(1)).await;
        drop(panel);

        sleep(secs(120)).await;
        assert_eq!(source.calls(ReportKind::GamePass), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keeps_polling_after_interval_sender_drops() {
        let source = ScriptedSource::new();
        let (interval_tx, interval_rx) = watch::channel(RefreshInterval::ThirtySeconds);
        let _panel = PanelController::mount(ReportKind::Players, source.clone(), interval_rx);

        drop(interval_tx);
        sleep(secs(61)).await;
        assert_eq!(source.calls(ReportKind::Players), 3);
    }
}
