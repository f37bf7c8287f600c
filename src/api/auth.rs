use super::ApiState;
use crate::auth::{hash_password, verify_password};
use crate::error::ApiError;
use crate::users::UserSummary;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Deserialize)]
pub(super) struct SignupRequest {
    email: String,
    password: String,
    name: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
pub(super) struct AuthResponse {
    token: String,
    user: UserSummary,
}

/// Minimal structural check: something before and after an `@`, and a dot in
/// the domain part. Deliverability is not our problem.
fn email_is_valid(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

/// `POST /auth/signup`: validate, hash, create, issue a token.
pub(super) async fn signup(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if !email_is_valid(&request.email) {
        return Err(ApiError::Validation("invalid email".into()));
    }
    if request.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let existing = state.users.find_by_email(&request.email).await?;
    if existing.is_some() {
        return Err(ApiError::Conflict);
    }

    let password_hash = hash_password(&request.password).map_err(|error| {
        tracing::error!(%error, "password hashing failed");
        ApiError::Internal
    })?;

    let user = state
        .users
        .create(&request.email, &password_hash, request.name.as_deref())
        .await?;

    let token = state.tokens.issue(&user.id).map_err(|error| {
        tracing::error!(%error, "token issuance failed");
        ApiError::Internal
    })?;

    tracing::info!(user_id = %user.id, "user signed up");

    Ok(Json(AuthResponse {
        token,
        user: UserSummary::from(&user),
    }))
}

/// `POST /auth/login`: unknown email and wrong password produce the same
/// response, so the endpoint cannot be used to enumerate accounts.
pub(super) async fn login(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .users
        .find_by_email(&request.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(&user.id).map_err(|error| {
        tracing::error!(%error, "token issuance failed");
        ApiError::Internal
    })?;

    Ok(Json(AuthResponse {
        token,
        user: UserSummary::from(&user),
    }))
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

    async fn post_json(router: Router, path: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn signup_then_login_returns_the_same_user() {
        let (router, _state) = test_router().await;

        let (status, signed_up) = post_json(
            router.clone(),
            "/auth/signup",
            json!({"email": "a@x.com", "password": "secret1", "name": "Alice"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(signed_up["token"].is_string());

        let (status, logged_in) = post_json(
            router,
            "/auth/login",
            json!({"email": "a@x.com", "password": "secret1"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(logged_in["user"]["id"], signed_up["user"]["id"]);
    }

    #[tokio::test]
    async fn duplicate_signup_conflicts() {
        let (router, _state) = test_router().await;
        let body = json!({"email": "a@x.com", "password": "secret1"});

        let (status, _) = post_json(router.clone(), "/auth/signup", body.clone()).await;
        assert_eq!(status, StatusCode::OK);

        let (status, error) = post_json(router, "/auth/signup", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "user already exists");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let (router, _state) = test_router().await;

        post_json(
            router.clone(),
            "/auth/signup",
            json!({"email": "a@x.com", "password": "secret1"}),
        )
        .await;

        let (wrong_status, wrong_body) = post_json(
            router.clone(),
            "/auth/login",
            json!({"email": "a@x.com", "password": "wrong-1"}),
        )
        .await;
        let (unknown_status, unknown_body) = post_json(
            router,
            "/auth/login",
            json!({"email": "nobody@x.com", "password": "secret1"}),
        )
        .await;

        assert_eq!(wrong_status, StatusCode::BAD_REQUEST);
        assert_eq!(wrong_status, unknown_status);
        assert_eq!(wrong_body, unknown_body);
    }

    #[tokio::test]
    async fn short_passwords_and_bad_emails_are_rejected() {
        let (router, _state) = test_router().await;

        let (status, _) = post_json(
            router.clone(),
            "/auth/signup",
            json!({"email": "a@x.com", "password": "short"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post_json(
            router,
            "/auth/signup",
            json!({"email": "not-an-email", "password": "secret1"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
