//! Practice data shapes.

use crate::curriculum::Sign;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One practice run. Created at session start, immutable afterwards;
/// attempts are appended to it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PracticeSession {
    pub id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
}

/// One recorded inference outcome for one sign within one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeAttempt {
    pub id: String,
    pub session_id: String,
    pub sign_id: String,
    pub is_correct: bool,
    pub accuracy_score: Option<f64>,
    /// Opaque payload from the inference service, stored as-is.
    pub feedback: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Input for recording an attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAttempt {
    pub session_id: String,
    pub sign_id: String,
    pub is_correct: bool,
    pub accuracy_score: Option<f64>,
    pub feedback: Option<serde_json::Value>,
}

/// Per-user-per-sign fluency record. Fluency stays within [0, 100] and never
/// decreases; `last_practiced` tracks the most recent attempt regardless of
/// correctness.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProgress {
    pub id: String,
    pub user_id: String,
    pub sign_id: String,
    pub fluency: i64,
    pub last_practiced: DateTime<Utc>,
}

/// A progress row joined with its sign, as returned from the stats endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressWithSign {
    #[serde(flatten)]
    pub progress: UserProgress,
    pub sign: Sign,
}

/// A session with its attempts, as returned from the stats endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionWithAttempts {
    #[serde(flatten)]
    pub session: PracticeSession,
    pub attempts: Vec<PracticeAttempt>,
}
