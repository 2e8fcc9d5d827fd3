// ABOUTME: Navigation history shared between short-lived invocations
// The stack value type and its durable, lock-guarded file store

pub mod stack;
pub mod store;

pub use stack::HistoryStack;
pub use store::{HistoryLock, HistoryStore, StoreError};
