use super::ApiState;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::inference::{InferenceRequest, InferenceResponse};
use crate::practice::{NewAttempt, PracticeAttempt, PracticeSession, ProgressWithSign, SessionWithAttempts};

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

/// How many recent sessions the stats endpoint returns.
const RECENT_SESSION_LIMIT: i64 = 5;

/// `POST /practice/sessions`: start a session owned by the caller.
pub(super) async fn create_session(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
) -> Result<Json<PracticeSession>, ApiError> {
    let session = state.practice.create_session(&user.user_id).await?;
    tracing::debug!(session_id = %session.id, "practice session started");
    Ok(Json(session))
}

/// `POST /practice/attempts`: record one inference outcome and apply the
/// fluency rule. Ownership is checked before anything is written: an attempt
/// against someone else's session leaves no trace.
pub(super) async fn record_attempt(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Json(input): Json<NewAttempt>,
) -> Result<Json<PracticeAttempt>, ApiError> {
    let session = state
        .practice
        .get_session(&input.session_id)
        .await?
        .ok_or(ApiError::Forbidden)?;

    if session.user_id != user.user_id {
        return Err(ApiError::Forbidden);
    }

    let attempt = state.practice.record_attempt(&user.user_id, &input).await?;
    Ok(Json(attempt))
}

#[derive(Serialize)]
pub(super) struct StatsResponse {
    progress: Vec<ProgressWithSign>,
    recent_sessions: Vec<SessionWithAttempts>,
}

/// `GET /practice/stats`: dashboard data for the caller.
pub(super) async fn get_stats(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
) -> Result<Json<StatsResponse>, ApiError> {
    let progress = state.practice.progress_for_user(&user.user_id).await?;
    let recent_sessions = state
        .practice
        .recent_sessions(&user.user_id, RECENT_SESSION_LIMIT)
        .await?;

    Ok(Json(StatsResponse {
        progress,
        recent_sessions,
    }))
}

/// `POST /practice/infer`: proxy one frame to the inference service.
///
/// Keeps the inference endpoint off the public internet: callers need a
/// valid token, and the upstream address stays server-side configuration.
pub(super) async fn infer(
    State(state): State<Arc<ApiState>>,
    _user: AuthUser,
    Json(request): Json<InferenceRequest>,
) -> Result<Json<InferenceResponse>, ApiError> {
    let response = state.inference.infer(&request).await.map_err(|error| {
        tracing::warn!(%error, "inference proxy call failed");
        ApiError::Upstream
    })?;

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::test_router;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt as _;
    use serde_json::{json, Value};
    use tower::ServiceExt as _;

    async fn send(
        router: &Router,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn signup(router: &Router, email: &str) -> String {
        let (status, body) = send(
            router,
            "POST",
            "/auth/signup",
            None,
            Some(json!({"email": email, "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    async fn first_sign_id(router: &Router, token: &str) -> String {
        let (_, lessons) = send(router, "GET", "/curriculum/lessons", Some(token), None).await;
        lessons[0]["signs"][0]["sign"]["id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn one_correct_attempt_shows_up_in_stats() {
        let (router, _state) = test_router().await;
        let token = signup(&router, "a@x.com").await;
        let sign_id = first_sign_id(&router, &token).await;

        let (status, session) =
            send(&router, "POST", "/practice/sessions", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &router,
            "POST",
            "/practice/attempts",
            Some(&token),
            Some(json!({
                "session_id": session["id"],
                "sign_id": sign_id,
                "is_correct": true,
                "accuracy_score": 0.9
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, stats) = send(&router, "GET", "/practice/stats", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let progress = stats["progress"].as_array().unwrap();
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0]["fluency"], 10);
        assert_eq!(progress[0]["sign"]["id"].as_str().unwrap(), sign_id);

        let sessions = stats["recent_sessions"].as_array().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0]["attempts"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn attempts_against_someone_elses_session_are_forbidden_and_writeless() {
        let (router, _state) = test_router().await;
        let owner_token = signup(&router, "owner@x.com").await;
        let intruder_token = signup(&router, "intruder@x.com").await;
        let sign_id = first_sign_id(&router, &owner_token).await;

        let (_, session) =
            send(&router, "POST", "/practice/sessions", Some(&owner_token), None).await;

        let (status, _) = send(
            &router,
            "POST",
            "/practice/attempts",
            Some(&intruder_token),
            Some(json!({
                "session_id": session["id"],
                "sign_id": sign_id,
                "is_correct": true
            })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // No attempt and no progress row may exist for anyone.
        let (_, intruder_stats) =
            send(&router, "GET", "/practice/stats", Some(&intruder_token), None).await;
        assert!(intruder_stats["progress"].as_array().unwrap().is_empty());

        let (_, owner_stats) =
            send(&router, "GET", "/practice/stats", Some(&owner_token), None).await;
        assert!(owner_stats["progress"].as_array().unwrap().is_empty());
        assert!(owner_stats["recent_sessions"][0]["attempts"]
            .as_array()
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn unknown_session_is_forbidden_too() {
        let (router, _state) = test_router().await;
        let token = signup(&router, "a@x.com").await;
        let sign_id = first_sign_id(&router, &token).await;

        let (status, _) = send(
            &router,
            "POST",
            "/practice/attempts",
            Some(&token),
            Some(json!({
                "session_id": "no-such-session",
                "sign_id": sign_id,
                "is_correct": true
            })),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn infer_requires_a_token_before_any_upstream_call() {
        let (router, _state) = test_router().await;

        let (status, _) = send(
            &router,
            "POST",
            "/practice/infer",
            None,
            Some(json!({"target_sign_id": "Hello"})),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
