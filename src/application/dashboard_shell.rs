// Dashboard shell - owns the refresh interval and the four report panels
use crate::application::panel_controller::{PanelController, PanelHandle};
use crate::application::report_source::ReportSource;
use crate::domain::panel::PanelState;
use crate::domain::refresh::RefreshInterval;
use crate::domain::report::ReportKind;
use std::sync::Arc;
use tokio::sync::watch;

pub struct DashboardShell {
    interval_tx: watch::Sender<RefreshInterval>,
    panels: Vec<PanelHandle>,
}

impl DashboardShell {
    /// Mount one panel per report kind, all reading the same interval.
    pub fn start(source: Arc<dyn ReportSource>, interval: RefreshInterval) -> Self {
        let (interval_tx, _) = watch::channel(interval);
        let panels = ReportKind::ALL
            .into_iter()
            .map(|kind| {
                PanelController::mount(kind, Arc::clone(&source), interval_tx.subscribe())
            })
            .collect();

        tracing::info!(seconds = interval.as_secs(), "Dashboard started");
        Self {
            interval_tx,
            panels,
        }
    }

    pub fn refresh_interval(&self) -> RefreshInterval {
        *self.interval_tx.borrow()
    }

    /// Every panel restarts its timer on the new period. Fetches already in
    /// flight are left to complete.
    pub fn set_refresh_interval(&self, interval: RefreshInterval) {
        let previous = self.interval_tx.send_replace(interval);
        if previous != interval {
            tracing::info!(
                from = previous.as_secs(),
                to = interval.as_secs(),
                "Refresh interval changed"
            );
        }
    }

    pub fn panel(&self, kind: ReportKind) -> Option<&PanelHandle> {
        self.panels.iter().find(|panel| panel.kind() == kind)
    }

    pub fn snapshot(&self, kind: ReportKind) -> Option<PanelState> {
        self.panel(kind).map(PanelHandle::snapshot)
    }

    pub fn snapshots(&self) -> Vec<PanelState> {
        self.panels.iter().map(PanelHandle::snapshot).collect()
    }

    pub fn refresh(&self, kind: ReportKind) -> bool {
        match self.panel(kind) {
            Some(panel) => {
                panel.refresh();
                true
            }
            None => false,
        }
    }

    pub fn refresh_all(&self) {
        self.panels.iter().for_each(PanelHandle::refresh);
    }

    pub fn shutdown(&self) {
        self.panels.iter().for_each(PanelHandle::shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::ScriptedSource;
    use crate::domain::panel::PanelStatus;
    use std::time::Duration;
    use tokio::time::sleep;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_mounts_all_panels_in_order() {
        let source = ScriptedSource::new();
        let shell = DashboardShell::start(source.clone(), RefreshInterval::default());

        sleep(secs(1)).await;
        let kinds: Vec<ReportKind> = shell.snapshots().iter().map(|s| s.kind).collect();
        assert_eq!(kinds, ReportKind::ALL.to_vec());
        for kind in ReportKind::ALL {
            assert_eq!(source.calls(kind), 1);
            assert_eq!(shell.snapshot(kind).unwrap().status, PanelStatus::Ready);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_panel_does_not_affect_others() {
        let source = ScriptedSource::new();
        source.fail_always(ReportKind::GamePass);
        let shell = DashboardShell::start(source.clone(), RefreshInterval::ThirtySeconds);

        sleep(secs(31)).await;
        for kind in ReportKind::ALL {
            let state = shell.snapshot(kind).unwrap();
            if kind == ReportKind::GamePass {
                assert_eq!(state.status, PanelStatus::Error);
                assert_eq!(state.last_updated, None);
            } else {
                assert_eq!(state.status, PanelStatus::Ready);
            }
            assert_eq!(source.calls(kind), 2);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_change_reaches_every_panel() {
        let source = ScriptedSource::new();
        let shell = DashboardShell::start(source.clone(), RefreshInterval::OneMinute);
        assert_eq!(shell.refresh_interval(), RefreshInterval::OneMinute);

        sleep(secs(5)).await;
        shell.set_refresh_interval(RefreshInterval::ThirtySeconds);
        assert_eq!(shell.refresh_interval(), RefreshInterval::ThirtySeconds);

        sleep(secs(31)).await;
        for kind in ReportKind::ALL {
            assert_eq!(source.calls(kind), 2);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh() {
        let source = ScriptedSource::new();
        let shell = DashboardShell::start(source.clone(), RefreshInterval::FiveMinutes);

        sleep(secs(1)).await;
        assert!(shell.refresh(ReportKind::Players));
        sleep(secs(1)).await;
        assert_eq!(source.calls(ReportKind::Players), 2);
        assert_eq!(source.calls(ReportKind::Activity), 1);

        shell.refresh_all();
        sleep(secs(1)).await;
        assert_eq!(source.calls(ReportKind::Players), 3);
        assert_eq!(source.calls(ReportKind::SignupSource), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_every_panel() {
        let source = ScriptedSource::new();
        let shell = DashboardShell::start(source.clone(), RefreshInterval::ThirtySeconds);

        sleep(secs(1)).await;
        shell.shutdown();
        sleep(secs(120)).await;
        for kind in ReportKind::ALL {
            assert_eq!(source.calls(kind), 1);
        }
    }
}
