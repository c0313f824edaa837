use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::instrument;

use super::{
    dto::{CreateEventRequest, EventView},
    services,
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiJson},
    state::AppState,
};

pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/registrations", get(my_registrations))
}

#[instrument(skip(state))]
pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<EventView>>, ApiError> {
    Ok(Json(services::list_all(state.store.as_ref()).await?))
}

#[instrument(skip(state, body))]
pub async fn create_event(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventView>), ApiError> {
    let view = services::create(state.store.as_ref(), user_id, body).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[instrument(skip(state))]
pub async fn my_registrations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<EventView>>, ApiError> {
    Ok(Json(
        services::list_registered(state.store.as_ref(), user_id).await?,
    ))
}
