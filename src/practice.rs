//! Practice records: sessions, attempts, and per-sign fluency progress.

pub mod store;
pub mod types;

pub use store::PracticeStore;
pub use types::{NewAttempt, PracticeAttempt, PracticeSession, ProgressWithSign, SessionWithAttempts, UserProgress};
