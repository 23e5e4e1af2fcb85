// Domain layer - report models, panel state and derived views
pub mod error;
pub mod panel;
pub mod refresh;
pub mod report;
pub mod view;
