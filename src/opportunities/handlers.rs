use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateOpportunityRequest, OpportunityView, OwnedOpportunityView},
    model::OpportunityPatch,
    services,
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiJson, ApiPath},
    state::AppState,
    users::dto::MessageResponse,
};

pub fn opportunity_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/opportunities",
            get(list_opportunities).post(create_opportunity),
        )
        .route("/opportunities/my-opportunities", get(my_opportunities))
        .route(
            "/opportunities/:id",
            put(update_opportunity).delete(delete_opportunity),
        )
}

#[instrument(skip(state))]
pub async fn list_opportunities(
    State(state): State<AppState>,
) -> Result<Json<Vec<OpportunityView>>, ApiError> {
    Ok(Json(services::list_open(state.store.as_ref()).await?))
}

#[instrument(skip(state))]
pub async fn my_opportunities(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<OwnedOpportunityView>>, ApiError> {
    Ok(Json(services::list_owned(state.store.as_ref(), user_id).await?))
}

#[instrument(skip(state, body))]
pub async fn create_opportunity(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<CreateOpportunityRequest>,
) -> Result<(StatusCode, Json<OpportunityView>), ApiError> {
    let view = services::create(state.store.as_ref(), user_id, body).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[instrument(skip(state, patch))]
pub async fn update_opportunity(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<OpportunityPatch>,
) -> Result<Json<OpportunityView>, ApiError> {
    Ok(Json(
        services::update(state.store.as_ref(), user_id, id, patch).await?,
    ))
}

#[instrument(skip(state))]
pub async fn delete_opportunity(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::delete(state.store.as_ref(), user_id, id).await?;
    Ok(Json(MessageResponse::new("Opportunity deleted successfully")))
}
