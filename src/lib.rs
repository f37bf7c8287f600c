//! SignCoach: a sign-language practice platform.
//!
//! The crate has two halves. The server side is a REST API over SQLite:
//! accounts, a seeded curriculum of lessons and signs, practice sessions
//! with per-sign fluency tracking, and an authenticated proxy in front of
//! the external sign-recognition service. The client side is the practice
//! session controller, a pure state machine plus an async capture loop, kept
//! free of any rendering layer so it can be driven by tests or by any
//! frontend.

pub mod api;
pub mod auth;
pub mod config;
pub mod curriculum;
pub mod db;
pub mod error;
pub mod inference;
pub mod practice;
pub mod session;
pub mod users;

pub use config::Config;
pub use db::Db;
pub use error::{Error, Result};
