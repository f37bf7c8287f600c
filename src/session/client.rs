//! HTTP client for the SignCoach API.
//!
//! Used by the session runner (it implements [`Scorer`] via the server-side
//! inference proxy and [`AttemptSink`] for recording) and usable standalone
//! by any frontend or tool that drives the API.

use crate::curriculum::Lesson;
use crate::error::Result;
use crate::inference::{InferenceRequest, InferenceResponse};
use crate::practice::{PracticeSession, ProgressWithSign, SessionWithAttempts};
use crate::session::flow::AttemptToRecord;
use crate::session::runner::{AttemptSink, Scorer};
use crate::users::UserSummary;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Signup/login response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthedUser {
    pub token: String,
    pub user: UserSummary,
}

/// Stats endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct Stats {
    pub progress: Vec<ProgressWithSign>,
    pub recent_sessions: Vec<SessionWithAttempts>,
}

/// Bearer-token API client. Cheap to clone; the token travels with it.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach a previously obtained token.
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    async fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let mut request = self.http.post(format!("{}{path}", self.base_url));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("request to {path} failed"))?
            .error_for_status()
            .with_context(|| format!("{path} returned an error status"))?
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode response from {path}"))?;

        Ok(response)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let mut request = self.http.get(format!("{}{path}", self.base_url));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("request to {path} failed"))?
            .error_for_status()
            .with_context(|| format!("{path} returned an error status"))?
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode response from {path}"))?;

        Ok(response)
    }

    /// Create an account and keep the returned token.
    pub async fn signup(
        &mut self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AuthedUser> {
        let body = json!({ "email": email, "password": password, "name": name });
        let authed: AuthedUser = self.post_json("/auth/signup", Some(&body)).await?;
        self.token = Some(authed.token.clone());
        Ok(authed)
    }

    /// Log in and keep the returned token.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthedUser> {
        let body = json!({ "email": email, "password": password });
        let authed: AuthedUser = self.post_json("/auth/login", Some(&body)).await?;
        self.token = Some(authed.token.clone());
        Ok(authed)
    }

    pub async fn lessons(&self) -> Result<Vec<Lesson>> {
        self.get_json("/curriculum/lessons").await
    }

    pub async fn sign(&self, id: &str) -> Result<crate::curriculum::Sign> {
        self.get_json(&format!("/curriculum/signs/{id}")).await
    }

    pub async fn create_session(&self) -> Result<PracticeSession> {
        self.post_json::<serde_json::Value, _>("/practice/sessions", None)
            .await
    }

    pub async fn record_attempt(
        &self,
        session_id: &str,
        attempt: &AttemptToRecord,
    ) -> Result<crate::practice::PracticeAttempt> {
        let body = json!({
            "session_id": session_id,
            "sign_id": attempt.sign_id,
            "is_correct": attempt.is_correct,
            "accuracy_score": attempt.accuracy_score,
            "feedback": { "lines": attempt.feedback },
        });
        self.post_json("/practice/attempts", Some(&body)).await
    }

    pub async fn infer(&self, request: &InferenceRequest) -> Result<InferenceResponse> {
        self.post_json("/practice/infer", Some(request)).await
    }

    pub async fn stats(&self) -> Result<Stats> {
        self.get_json("/practice/stats").await
    }
}

impl Scorer for ApiClient {
    async fn score(&self, request: &InferenceRequest) -> Result<InferenceResponse> {
        self.infer(request).await
    }
}

impl AttemptSink for ApiClient {
    async fn record(&self, session_id: String, attempt: AttemptToRecord) -> Result<()> {
        self.record_attempt(&session_id, &attempt).await?;
        Ok(())
    }
}
