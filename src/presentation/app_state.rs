// Application state for HTTP handlers
use crate::application::dashboard_shell::DashboardShell;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub shell: Arc<DashboardShell>,
}
