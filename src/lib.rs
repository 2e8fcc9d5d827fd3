// ABOUTME: Library crate for ws, the tmux session navigator, exposing its API for testing and reuse

pub mod config;
pub mod dispatch;
pub mod history;
pub mod models;
pub mod navigation;
pub mod picker;
pub mod tmux;
