//! HTTP API surface.
//!
//! Stateless request-per-call handlers over the stores. Handlers are grouped
//! per area (`auth`, `curriculum`, `practice`); everything except signup,
//! login, and the health check sits behind the bearer-token extractor.

mod auth;
mod curriculum;
mod practice;

use crate::auth::TokenService;
use crate::curriculum::CurriculumStore;
use crate::inference::InferenceClient;
use crate::practice::PracticeStore;
use crate::users::UserStore;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared state behind every handler.
pub struct ApiState {
    pub users: UserStore,
    pub curriculum: CurriculumStore,
    pub practice: PracticeStore,
    pub tokens: TokenService,
    pub inference: InferenceClient,
}

/// Build the application router. The web client is served from a different
/// origin, so CORS is open like the original deployment.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/curriculum/lessons", get(curriculum::list_lessons))
        .route("/curriculum/signs/{id}", get(curriculum::get_sign))
        .route("/practice/sessions", post(practice::create_session))
        .route("/practice/attempts", post(practice::record_attempt))
        .route("/practice/stats", get(practice::get_stats))
        .route("/practice/infer", post(practice::infer))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "api",
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::db::Db;

    /// Router over a freshly migrated and seeded in-memory database.
    pub async fn test_router() -> (Router, Arc<ApiState>) {
        let db = Db::connect_in_memory().await.unwrap();
        crate::curriculum::seed::run(&db.pool).await.unwrap();

        let state = Arc::new(ApiState {
            users: UserStore::new(db.pool.clone()),
            curriculum: CurriculumStore::new(db.pool.clone()),
            practice: PracticeStore::new(db.pool.clone()),
            tokens: TokenService::new("test-secret", 1),
            inference: InferenceClient::new("http://localhost:5000", 1).unwrap(),
        });

        (router(state.clone()), state)
    }
}
