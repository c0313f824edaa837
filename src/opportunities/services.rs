use std::collections::HashMap;

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::dto::{CreateOpportunityRequest, OpportunityView, OwnedOpportunityView};
use super::model::{NewOpportunity, Opportunity, OpportunityFilter, OpportunityPatch};
use crate::applications::model::{Application, ApplicationFilter};
use crate::error::ApiError;
use crate::policy;
use crate::store::Store;
use crate::users::model::{ApplicantSummary, OrganizationSummary, User};
use crate::users::services::load_actor;

fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    Ok(())
}

fn validate(
    title: &str,
    description: &str,
    location: &str,
    start_date: OffsetDateTime,
    end_date: Option<OffsetDateTime>,
) -> Result<(), ApiError> {
    require_text("Title", title)?;
    require_text("Description", description)?;
    require_text("Location", location)?;
    if matches!(end_date, Some(end) if end < start_date) {
        return Err(ApiError::validation("End date must not be before start date"));
    }
    Ok(())
}

async fn find(store: &dyn Store, id: Uuid) -> Result<Opportunity, ApiError> {
    store
        .find_opportunity(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Opportunity not found"))
}

async fn applications_of(store: &dyn Store, id: Uuid) -> Result<Vec<Application>, ApiError> {
    Ok(store
        .list_applications(ApplicationFilter::by_opportunity(id))
        .await?)
}

async fn users_by_id(store: &dyn Store, ids: Vec<Uuid>) -> Result<HashMap<Uuid, User>, ApiError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(store
        .users_by_ids(&ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect())
}

/// Joins organization summaries and relation ids onto `opportunities`.
pub(crate) async fn public_views(
    store: &dyn Store,
    opportunities: Vec<Opportunity>,
) -> Result<Vec<OpportunityView>, ApiError> {
    let orgs = users_by_id(
        store,
        opportunities.iter().map(|o| o.organization_id).collect(),
    )
    .await?;

    let mut out = Vec::with_capacity(opportunities.len());
    for opportunity in opportunities {
        let apps = applications_of(store, opportunity.id).await?;
        out.push(OpportunityView {
            organization: orgs
                .get(&opportunity.organization_id)
                .map(OrganizationSummary::from),
            applicants: apps.iter().map(|a| a.user_id).collect(),
            applications: apps.iter().map(|a| a.id).collect(),
            opportunity,
        });
    }
    Ok(out)
}

async fn public_view(store: &dyn Store, opportunity: Opportunity) -> Result<OpportunityView, ApiError> {
    public_views(store, vec![opportunity])
        .await?
        .pop()
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("empty opportunity view")))
}

pub async fn list_open(store: &dyn Store) -> Result<Vec<OpportunityView>, ApiError> {
    let opportunities = store.list_opportunities(OpportunityFilter::open()).await?;
    public_views(store, opportunities).await
}

pub async fn list_owned(
    store: &dyn Store,
    actor_id: Uuid,
) -> Result<Vec<OwnedOpportunityView>, ApiError> {
    let opportunities = store
        .list_opportunities(OpportunityFilter::owned_by(actor_id))
        .await?;

    let mut out = Vec::with_capacity(opportunities.len());
    for opportunity in opportunities {
        let apps = applications_of(store, opportunity.id).await?;
        let applicants = users_by_id(store, apps.iter().map(|a| a.user_id).collect()).await?;
        out.push(OwnedOpportunityView {
            applicants: apps
                .iter()
                .filter_map(|a| applicants.get(&a.user_id))
                .map(ApplicantSummary::from)
                .collect(),
            applications: apps.iter().map(|a| a.id).collect(),
            opportunity,
        });
    }
    Ok(out)
}

pub async fn create(
    store: &dyn Store,
    actor_id: Uuid,
    req: CreateOpportunityRequest,
) -> Result<OpportunityView, ApiError> {
    let actor = load_actor(store, actor_id).await?;
    policy::can_create_opportunity(&actor)?;

    let new = NewOpportunity {
        title: req.title.trim().to_string(),
        description: req.description.trim().to_string(),
        location: req.location.trim().to_string(),
        required_skills: req.required_skills,
        organization_id: actor.id,
        start_date: req.start_date,
        end_date: req.end_date,
    };
    validate(
        &new.title,
        &new.description,
        &new.location,
        new.start_date,
        new.end_date,
    )?;

    let opportunity = store.insert_opportunity(new).await?;
    info!(opportunity_id = %opportunity.id, organization_id = %actor.id, "opportunity created");
    public_view(store, opportunity).await
}

pub async fn update(
    store: &dyn Store,
    actor_id: Uuid,
    opportunity_id: Uuid,
    patch: OpportunityPatch,
) -> Result<OpportunityView, ApiError> {
    let mut opportunity = find(store, opportunity_id).await?;
    let actor = load_actor(store, actor_id).await?;
    policy::can_mutate_opportunity(&actor, &opportunity)?;

    opportunity.apply(patch);
    validate(
        &opportunity.title,
        &opportunity.description,
        &opportunity.location,
        opportunity.start_date,
        opportunity.end_date,
    )?;

    let saved = store.update_opportunity(&opportunity).await?;
    info!(%opportunity_id, status = saved.status.as_str(), "opportunity updated");
    public_view(store, saved).await
}

/// Applications pointing at the opportunity are kept; their joins turn
/// `null` from here on.
pub async fn delete(store: &dyn Store, actor_id: Uuid, opportunity_id: Uuid) -> Result<(), ApiError> {
    let opportunity = find(store, opportunity_id).await?;
    let actor = load_actor(store, actor_id).await?;
    policy::can_mutate_opportunity(&actor, &opportunity)?;

    if !store.delete_opportunity(opportunity_id).await? {
        return Err(ApiError::not_found("Opportunity not found"));
    }
    info!(%opportunity_id, "opportunity deleted");
    Ok(())
}
