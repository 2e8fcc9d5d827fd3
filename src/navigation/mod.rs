// ABOUTME: Navigation engine deciding pick, back and kill outcomes

pub mod engine;

pub use engine::{Action, Decision, Fallback, NavigationState, Navigator};
