// ABOUTME: Core data models for session navigation: session identifiers and the live session set

pub mod session;

pub use session::{LiveSessions, SessionId, SessionInfo};
