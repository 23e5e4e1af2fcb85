// Application layer - polling use cases
pub mod dashboard_shell;
pub mod panel_controller;
pub mod report_source;

#[cfg(test)]
pub mod testing;
