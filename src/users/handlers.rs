use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{MessageResponse, ProfileView, UpdateProfileRequest},
    services,
};
use crate::{
    applications::{self, dto::ApplicationView},
    auth::AuthUser,
    error::{ApiError, ApiJson, ApiPath},
    events,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/profile", get(get_profile).put(update_profile))
        .route("/users/events/:id/register", post(register_for_event))
        .route("/users/opportunities/:id/apply", post(apply_for_opportunity))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileView>, ApiError> {
    Ok(Json(services::profile(state.store.as_ref(), user_id).await?))
}

#[instrument(skip(state, body))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> Result<Json<ProfileView>, ApiError> {
    Ok(Json(
        services::update_profile(state.store.as_ref(), user_id, body).await?,
    ))
}

#[instrument(skip(state))]
pub async fn register_for_event(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    events::services::register(state.store.as_ref(), user_id, id).await?;
    Ok(Json(MessageResponse::new("Successfully registered for event")))
}

/// Same as `POST /applications/:id`.
#[instrument(skip(state))]
pub async fn apply_for_opportunity(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<(StatusCode, Json<ApplicationView>), ApiError> {
    let view = applications::services::submit(state.store.as_ref(), user_id, id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}
