use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{ApplicationView, ReviewApplicationRequest},
    services,
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiJson, ApiPath},
    state::AppState,
};

pub fn application_routes() -> Router<AppState> {
    Router::new()
        .route("/applications", get(my_applications))
        .route(
            "/applications/:id",
            post(submit_application).put(review_application),
        )
}

#[instrument(skip(state))]
pub async fn my_applications(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<ApplicationView>>, ApiError> {
    Ok(Json(
        services::list_for_user(state.store.as_ref(), user_id).await?,
    ))
}

/// `id` is the opportunity being applied for.
#[instrument(skip(state))]
pub async fn submit_application(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<(StatusCode, Json<ApplicationView>), ApiError> {
    let view = services::submit(state.store.as_ref(), user_id, id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// `id` is the application under review.
#[instrument(skip(state, body))]
pub async fn review_application(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ReviewApplicationRequest>,
) -> Result<Json<ApplicationView>, ApiError> {
    Ok(Json(
        services::review(state.store.as_ref(), user_id, id, body.status).await?,
    ))
}
