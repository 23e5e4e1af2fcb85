// Presentation layer - dashboard rendering and HTTP surface
pub mod app_state;
pub mod handlers;
pub mod render;
