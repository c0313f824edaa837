use std::collections::HashMap;

use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{ApplicationOpportunity, ApplicationView};
use super::model::{Application, ApplicationFilter, ApplicationStatus, NewApplication};
use crate::error::ApiError;
use crate::policy;
use crate::store::Store;
use crate::users::model::OrganizationSummary;
use crate::users::services::load_actor;

async fn views(
    store: &dyn Store,
    applications: Vec<Application>,
) -> Result<Vec<ApplicationView>, ApiError> {
    let mut opp_ids: Vec<Uuid> = applications.iter().map(|a| a.opportunity_id).collect();
    opp_ids.sort_unstable();
    opp_ids.dedup();

    let opportunities = if opp_ids.is_empty() {
        Vec::new()
    } else {
        store.opportunities_by_ids(&opp_ids).await?
    };
    let org_ids: Vec<Uuid> = opportunities.iter().map(|o| o.organization_id).collect();
    let orgs: HashMap<Uuid, OrganizationSummary> = if org_ids.is_empty() {
        HashMap::new()
    } else {
        store
            .users_by_ids(&org_ids)
            .await?
            .iter()
            .map(|u| (u.id, OrganizationSummary::from(u)))
            .collect()
    };
    let opportunities: HashMap<Uuid, _> = opportunities.into_iter().map(|o| (o.id, o)).collect();

    Ok(applications
        .into_iter()
        .map(|application| ApplicationView {
            opportunity: opportunities
                .get(&application.opportunity_id)
                .map(|o| ApplicationOpportunity {
                    organization: orgs.get(&o.organization_id).cloned(),
                    opportunity: o.clone(),
                }),
            application,
        })
        .collect())
}

async fn view(store: &dyn Store, application: Application) -> Result<ApplicationView, ApiError> {
    views(store, vec![application])
        .await?
        .pop()
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("empty application view")))
}

/// The caller's applications, most recent first.
pub async fn list_for_user(
    store: &dyn Store,
    user_id: Uuid,
) -> Result<Vec<ApplicationView>, ApiError> {
    load_actor(store, user_id).await?;
    let applications = store
        .list_applications(ApplicationFilter::by_user(user_id))
        .await?;
    views(store, applications).await
}

pub async fn submit(
    store: &dyn Store,
    actor_id: Uuid,
    opportunity_id: Uuid,
) -> Result<ApplicationView, ApiError> {
    let actor = load_actor(store, actor_id).await?;
    let opportunity = store
        .find_opportunity(opportunity_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Opportunity not found"))?;
    let existing = store.find_application_for(actor.id, opportunity.id).await?;
    if let Err(denial) = policy::can_apply(&actor, &opportunity, existing.as_ref()) {
        warn!(user_id = %actor.id, %opportunity_id, reason = %denial, "application refused");
        return Err(denial.into());
    }

    // the store re-checks the pair, so a racing duplicate still fails here
    let application = store
        .insert_application(NewApplication {
            user_id: actor.id,
            opportunity_id: opportunity.id,
        })
        .await?;
    info!(application_id = %application.id, user_id = %actor.id, %opportunity_id, "application submitted");
    view(store, application).await
}

pub async fn review(
    store: &dyn Store,
    actor_id: Uuid,
    application_id: Uuid,
    status: ApplicationStatus,
) -> Result<ApplicationView, ApiError> {
    let application = store
        .find_application(application_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;
    let actor = load_actor(store, actor_id).await?;
    let opportunity = store
        .find_opportunity(application.opportunity_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Opportunity not found"))?;
    policy::can_review_application(&actor, &application, &opportunity)?;

    if !status.is_terminal() {
        return Err(ApiError::validation(
            "Status must be either accepted or rejected",
        ));
    }
    if !application.status.can_transition_to(status) {
        return Err(ApiError::Conflict(format!(
            "Application has already been {}",
            application.status.as_str()
        )));
    }

    let updated = store
        .set_application_status(application.id, status)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;
    info!(%application_id, status = status.as_str(), "application reviewed");
    view(store, updated).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opportunities::model::NewOpportunity;
    use crate::state::AppState;
    use crate::users::model::{IndividualProfile, NewUser, OrganizationProfile, Profile, User};
    use time::OffsetDateTime;

    struct World {
        state: AppState,
        acme: User,
        bob: User,
        opportunity_id: Uuid,
    }

    async fn user(store: &dyn Store, username: &str, profile: Profile) -> User {
        store
            .insert_user(NewUser {
                username: username.into(),
                email: format!("{username}@x.org"),
                password_hash: "h".into(),
                name: username.into(),
                profile,
            })
            .await
            .unwrap()
    }

    async fn world() -> World {
        let state = AppState::fake();
        let store = state.store.as_ref();
        let acme = user(
            store,
            "acme",
            Profile::Organization(OrganizationProfile {
                organization_name: "Acme".into(),
                ..Default::default()
            }),
        )
        .await;
        let bob = user(store, "bob", Profile::Individual(IndividualProfile::default())).await;
        let opportunity_id = store
            .insert_opportunity(NewOpportunity {
                title: "Beach Cleanup".into(),
                description: "Pick up litter".into(),
                location: "Shore".into(),
                required_skills: vec![],
                organization_id: acme.id,
                start_date: OffsetDateTime::now_utc(),
                end_date: None,
            })
            .await
            .unwrap()
            .id;
        World {
            state,
            acme,
            bob,
            opportunity_id,
        }
    }

    #[tokio::test]
    async fn submit_joins_opportunity_and_organization() {
        let w = world().await;
        let store = w.state.store.as_ref();
        let view = submit(store, w.bob.id, w.opportunity_id).await.unwrap();
        assert_eq!(view.application.status, ApplicationStatus::Pending);
        let opp = view.opportunity.unwrap();
        assert_eq!(opp.opportunity.title, "Beach Cleanup");
        assert_eq!(
            opp.organization.unwrap().organization_name.as_deref(),
            Some("Acme")
        );
    }

    #[tokio::test]
    async fn second_submit_conflicts() {
        let w = world().await;
        let store = w.state.store.as_ref();
        submit(store, w.bob.id, w.opportunity_id).await.unwrap();
        let err = submit(store, w.bob.id, w.opportunity_id).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(list_for_user(store, w.bob.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ngo_cannot_apply_and_missing_opportunity_is_not_found() {
        let w = world().await;
        let store = w.state.store.as_ref();
        let err = submit(store, w.acme.id, w.opportunity_id).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        let err = submit(store, w.bob.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn review_transitions_once() {
        let w = world().await;
        let store = w.state.store.as_ref();
        let app_id = submit(store, w.bob.id, w.opportunity_id)
            .await
            .unwrap()
            .application
            .id;

        let err = review(store, w.bob.id, app_id, ApplicationStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err = review(store, w.acme.id, app_id, ApplicationStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let view = review(store, w.acme.id, app_id, ApplicationStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(view.application.status, ApplicationStatus::Accepted);

        let err = review(store, w.acme.id, app_id, ApplicationStatus::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn concurrent_reviews_settle_once() {
        let w = world().await;
        let app_id = submit(w.state.store.as_ref(), w.bob.id, w.opportunity_id)
            .await
            .unwrap()
            .application
            .id;

        let mut handles = Vec::new();
        for status in [ApplicationStatus::Accepted, ApplicationStatus::Rejected] {
            let state = w.state.clone();
            let acme_id = w.acme.id;
            handles.push(tokio::spawn(async move {
                review(state.store.as_ref(), acme_id, app_id, status).await
            }));
        }
        let mut settled = Vec::new();
        for h in handles {
            match h.await.unwrap() {
                Ok(view) => settled.push(view.application.status),
                Err(e) => assert!(matches!(e, ApiError::Conflict(_)), "{e}"),
            }
        }
        assert_eq!(settled.len(), 1);

        let stored = w
            .state
            .store
            .find_application(app_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, settled[0]);
    }

    #[tokio::test]
    async fn deleted_opportunity_joins_as_none() {
        let w = world().await;
        let store = w.state.store.as_ref();
        submit(store, w.bob.id, w.opportunity_id).await.unwrap();
        store.delete_opportunity(w.opportunity_id).await.unwrap();

        let list = list_for_user(store, w.bob.id).await.unwrap();
        assert_eq!(list.len(), 1);
        assert!(list[0].opportunity.is_none());
        assert_eq!(list[0].application.opportunity_id, w.opportunity_id);
    }
}
