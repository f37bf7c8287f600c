//! The practice-session controller.
//!
//! Split in three so the interesting part stays testable without any I/O:
//! [`flow`] is a pure state machine over the session lifecycle, [`runner`]
//! drives it with a fixed-period capture loop, and [`client`] talks to the
//! API server.

pub mod client;
pub mod flow;
pub mod runner;

pub use client::ApiClient;
pub use flow::{Advance, AttemptToRecord, FlowError, Phase, PracticeFlow, SignStatus, TargetSign};
pub use runner::{AttemptSink, FrameSource, RunnerCommand, Scorer, SessionRunner};
