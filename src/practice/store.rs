//! Practice session, attempt, and progress persistence.

use crate::curriculum::Sign;
use crate::error::Result;
use crate::practice::types::{
    NewAttempt, PracticeAttempt, PracticeSession, ProgressWithSign, SessionWithAttempts,
    UserProgress,
};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Fluency granted when the first attempt for a (user, sign) pair is correct.
const FLUENCY_INITIAL: i64 = 10;
/// Fluency added for each subsequent correct attempt.
const FLUENCY_STEP: i64 = 5;
/// Upper bound on stored fluency.
const FLUENCY_CAP: i64 = 100;

/// Persistent store for practice sessions, attempts, and fluency progress.
#[derive(Clone)]
pub struct PracticeStore {
    pool: SqlitePool,
}

impl PracticeStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Start a new session owned by `user_id`.
    pub async fn create_session(&self, user_id: &str) -> Result<PracticeSession> {
        let session = PracticeSession {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            started_at: Utc::now(),
        };

        sqlx::query("INSERT INTO practice_sessions (id, user_id, started_at) VALUES (?, ?, ?)")
            .bind(&session.id)
            .bind(&session.user_id)
            .bind(session.started_at)
            .execute(&self.pool)
            .await
            .context("failed to create practice session")?;

        Ok(session)
    }

    /// Fetch a session by id (for ownership checks).
    pub async fn get_session(&self, id: &str) -> Result<Option<PracticeSession>> {
        let session = sqlx::query_as::<_, PracticeSession>(
            "SELECT id, user_id, started_at FROM practice_sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch practice session")?;

        Ok(session)
    }

    /// Insert an attempt and apply the fluency rule in one transaction.
    ///
    /// The progress update is a single conditional upsert, so concurrent
    /// attempts for the same (user, sign) pair can never produce two rows or
    /// lose an increment. The caller must have verified session ownership.
    pub async fn record_attempt(&self, user_id: &str, input: &NewAttempt) -> Result<PracticeAttempt> {
        let attempt = PracticeAttempt {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: input.session_id.clone(),
            sign_id: input.sign_id.clone(),
            is_correct: input.is_correct,
            accuracy_score: input.accuracy_score,
            feedback: input
                .feedback
                .clone()
                .unwrap_or(serde_json::Value::Object(Default::default())),
            created_at: Utc::now(),
        };

        let feedback_json =
            serde_json::to_string(&attempt.feedback).context("failed to encode feedback")?;

        let (initial, increment) = if input.is_correct {
            (FLUENCY_INITIAL, FLUENCY_STEP)
        } else {
            (0, 0)
        };

        let mut tx = self.pool.begin().await.context("failed to begin transaction")?;

        sqlx::query(
            "INSERT INTO practice_attempts
                 (id, session_id, sign_id, is_correct, accuracy_score, feedback, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&attempt.id)
        .bind(&attempt.session_id)
        .bind(&attempt.sign_id)
        .bind(attempt.is_correct)
        .bind(attempt.accuracy_score)
        .bind(&feedback_json)
        .bind(attempt.created_at)
        .execute(&mut *tx)
        .await
        .context("failed to insert practice attempt")?;

        sqlx::query(
            "INSERT INTO user_progress (id, user_id, sign_id, fluency, last_practiced)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(user_id, sign_id)
             DO UPDATE SET fluency = MIN(?, user_progress.fluency + ?),
                           last_practiced = excluded.last_practiced",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(&attempt.sign_id)
        .bind(initial)
        .bind(attempt.created_at)
        .bind(FLUENCY_CAP)
        .bind(increment)
        .execute(&mut *tx)
        .await
        .context("failed to upsert user progress")?;

        tx.commit().await.context("failed to commit attempt")?;

        Ok(attempt)
    }

    /// All progress rows for a user, each joined with its sign.
    pub async fn progress_for_user(&self, user_id: &str) -> Result<Vec<ProgressWithSign>> {
        let rows = sqlx::query_as::<_, ProgressRow>(
            "SELECT p.id, p.user_id, p.sign_id, p.fluency, p.last_practiced,
                    s.id AS s_id, s.name, s.description, s.image_url, s.difficulty,
                    s.handshape, s.location, s.orientation, s.movement
             FROM user_progress p
             JOIN signs s ON s.id = p.sign_id
             WHERE p.user_id = ?
             ORDER BY p.last_practiced DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch user progress")?;

        Ok(rows.into_iter().map(ProgressRow::into_progress).collect())
    }

    /// The user's most recent sessions (newest first), each with its attempts.
    pub async fn recent_sessions(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<SessionWithAttempts>> {
        let sessions = sqlx::query_as::<_, PracticeSession>(
            "SELECT id, user_id, started_at FROM practice_sessions
             WHERE user_id = ?
             ORDER BY started_at DESC
             LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch recent sessions")?;

        let mut result = Vec::with_capacity(sessions.len());
        for session in sessions {
            let attempts = sqlx::query_as::<_, AttemptRow>(
                "SELECT id, session_id, sign_id, is_correct, accuracy_score, feedback, created_at
                 FROM practice_attempts
                 WHERE session_id = ?
                 ORDER BY created_at ASC",
            )
            .bind(&session.id)
            .fetch_all(&self.pool)
            .await
            .context("failed to fetch session attempts")?;

            result.push(SessionWithAttempts {
                session,
                attempts: attempts.into_iter().map(AttemptRow::into_attempt).collect(),
            });
        }

        Ok(result)
    }

    /// Fluency for one (user, sign) pair, if any attempt has been recorded.
    pub async fn progress_for_sign(
        &self,
        user_id: &str,
        sign_id: &str,
    ) -> Result<Option<UserProgress>> {
        let progress = sqlx::query_as::<_, UserProgress>(
            "SELECT id, user_id, sign_id, fluency, last_practiced
             FROM user_progress WHERE user_id = ? AND sign_id = ?",
        )
        .bind(user_id)
        .bind(sign_id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch progress for sign")?;

        Ok(progress)
    }
}

#[derive(sqlx::FromRow)]
struct AttemptRow {
    id: String,
    session_id: String,
    sign_id: String,
    is_correct: bool,
    accuracy_score: Option<f64>,
    feedback: String,
    created_at: DateTime<Utc>,
}

impl AttemptRow {
    fn into_attempt(self) -> PracticeAttempt {
        let feedback = serde_json::from_str(&self.feedback)
            .unwrap_or(serde_json::Value::Object(Default::default()));
        PracticeAttempt {
            id: self.id,
            session_id: self.session_id,
            sign_id: self.sign_id,
            is_correct: self.is_correct,
            accuracy_score: self.accuracy_score,
            feedback,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProgressRow {
    id: String,
    user_id: String,
    sign_id: String,
    fluency: i64,
    last_practiced: DateTime<Utc>,
    s_id: String,
    name: String,
    description: String,
    image_url: String,
    difficulty: i64,
    handshape: String,
    location: String,
    orientation: String,
    movement: String,
}

impl ProgressRow {
    fn into_progress(self) -> ProgressWithSign {
        ProgressWithSign {
            progress: UserProgress {
                id: self.id,
                user_id: self.user_id,
                sign_id: self.sign_id,
                fluency: self.fluency,
                last_practiced: self.last_practiced,
            },
            sign: Sign {
                id: self.s_id,
                name: self.name,
                description: self.description,
                image_url: self.image_url,
                difficulty: self.difficulty,
                handshape: self.handshape,
                location: self.location,
                orientation: self.orientation,
                movement: self.movement,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::{seed, CurriculumStore};
    use crate::db::Db;
    use crate::users::UserStore;

    struct Fixture {
        db: Db,
        store: PracticeStore,
        user_id: String,
        sign_id: String,
    }

    async fn fixture() -> Fixture {
        let db = Db::connect_in_memory().await.unwrap();
        seed::run(&db.pool).await.unwrap();

        let user = UserStore::new(db.pool.clone())
            .create("a@x.com", "hash", None)
            .await
            .unwrap();
        let sign = CurriculumStore::new(db.pool.clone())
            .get_sign_by_name("Hello")
            .await
            .unwrap()
            .unwrap();

        Fixture {
            store: PracticeStore::new(db.pool.clone()),
            db,
            user_id: user.id,
            sign_id: sign.id,
        }
    }

    fn attempt_input(session_id: &str, sign_id: &str, is_correct: bool) -> NewAttempt {
        NewAttempt {
            session_id: session_id.to_string(),
            sign_id: sign_id.to_string(),
            is_correct,
            accuracy_score: Some(if is_correct { 0.9 } else { 0.3 }),
            feedback: None,
        }
    }

    /// N attempts with k correct end at fluency min(100, 10 + 5(k-1)),
    /// or 0 when nothing was ever correct.
    async fn run_sequence(sequence: &[bool]) -> i64 {
        let fx = fixture().await;
        let session = fx.store.create_session(&fx.user_id).await.unwrap();

        for &is_correct in sequence {
            fx.store
                .record_attempt(&fx.user_id, &attempt_input(&session.id, &fx.sign_id, is_correct))
                .await
                .unwrap();
        }

        let progress = fx
            .store
            .progress_for_sign(&fx.user_id, &fx.sign_id)
            .await
            .unwrap()
            .unwrap();
        progress.fluency
    }

    #[tokio::test]
    async fn first_correct_attempt_grants_ten() {
        assert_eq!(run_sequence(&[true]).await, 10);
    }

    #[tokio::test]
    async fn first_incorrect_attempt_grants_zero() {
        assert_eq!(run_sequence(&[false]).await, 0);
    }

    #[tokio::test]
    async fn incorrect_attempts_never_decrease_fluency() {
        assert_eq!(run_sequence(&[true, false, false, true]).await, 15);
    }

    #[tokio::test]
    async fn correct_attempt_after_incorrect_start_steps_from_zero() {
        // Row created at 0, then a single +5 increment.
        assert_eq!(run_sequence(&[false, true]).await, 5);
    }

    #[tokio::test]
    async fn fluency_is_capped_at_one_hundred() {
        let sequence = vec![true; 25];
        assert_eq!(run_sequence(&sequence).await, 100);
    }

    #[tokio::test]
    async fn last_practiced_follows_every_attempt() {
        let fx = fixture().await;
        let session = fx.store.create_session(&fx.user_id).await.unwrap();

        fx.store
            .record_attempt(&fx.user_id, &attempt_input(&session.id, &fx.sign_id, true))
            .await
            .unwrap();
        let first = fx
            .store
            .progress_for_sign(&fx.user_id, &fx.sign_id)
            .await
            .unwrap()
            .unwrap();

        let incorrect = fx
            .store
            .record_attempt(&fx.user_id, &attempt_input(&session.id, &fx.sign_id, false))
            .await
            .unwrap();
        let second = fx
            .store
            .progress_for_sign(&fx.user_id, &fx.sign_id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(second.last_practiced, incorrect.created_at);
        assert!(second.last_practiced >= first.last_practiced);
        assert_eq!(second.fluency, first.fluency);
    }

    #[tokio::test]
    async fn concurrent_first_attempts_produce_exactly_one_progress_row() {
        let fx = fixture().await;
        let session = fx.store.create_session(&fx.user_id).await.unwrap();

        let a = fx.store.clone();
        let b = fx.store.clone();
        let input_a = attempt_input(&session.id, &fx.sign_id, true);
        let input_b = attempt_input(&session.id, &fx.sign_id, true);
        let user_a = fx.user_id.clone();
        let user_b = fx.user_id.clone();

        let (ra, rb) = tokio::join!(
            tokio::spawn(async move { a.record_attempt(&user_a, &input_a).await }),
            tokio::spawn(async move { b.record_attempt(&user_b, &input_b).await }),
        );
        ra.unwrap().unwrap();
        rb.unwrap().unwrap();

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM user_progress WHERE user_id = ? AND sign_id = ?")
                .bind(&fx.user_id)
                .bind(&fx.sign_id)
                .fetch_one(&fx.db.pool)
                .await
                .unwrap();

        assert_eq!(count, 1);
        let progress = fx
            .store
            .progress_for_sign(&fx.user_id, &fx.sign_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(progress.fluency, 15);
    }

    #[tokio::test]
    async fn recent_sessions_come_back_newest_first_with_attempts() {
        let fx = fixture().await;

        let first = fx.store.create_session(&fx.user_id).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = fx.store.create_session(&fx.user_id).await.unwrap();

        fx.store
            .record_attempt(&fx.user_id, &attempt_input(&second.id, &fx.sign_id, true))
            .await
            .unwrap();

        let sessions = fx.store.recent_sessions(&fx.user_id, 5).await.unwrap();

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session.id, second.id);
        assert_eq!(sessions[0].attempts.len(), 1);
        assert_eq!(sessions[1].session.id, first.id);
        assert!(sessions[1].attempts.is_empty());
    }
}
