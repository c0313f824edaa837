use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{ProfileView, UpdateProfileRequest};
use super::model::User;
use crate::applications::model::ApplicationFilter;
use crate::auth::services::{is_valid_email, normalize_email, validate_profile, MIN_NAME_LEN};
use crate::error::ApiError;
use crate::opportunities::model::OpportunityFilter;
use crate::store::Store;

/// Loads the user behind a verified token.
pub async fn load_actor(store: &dyn Store, user_id: Uuid) -> Result<User, ApiError> {
    store
        .find_user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

pub async fn profile(store: &dyn Store, user_id: Uuid) -> Result<ProfileView, ApiError> {
    let user = load_actor(store, user_id).await?;
    populate(store, user).await
}

async fn populate(store: &dyn Store, user: User) -> Result<ProfileView, ApiError> {
    let event_ids = store.event_ids_for_user(user.id).await?;
    let events = if event_ids.is_empty() {
        Vec::new()
    } else {
        store.list_events(Some(&event_ids)).await?
    };

    let posted = store
        .list_opportunities(OpportunityFilter::owned_by(user.id))
        .await?;

    let applied_ids: Vec<Uuid> = store
        .list_applications(ApplicationFilter::by_user(user.id))
        .await?
        .into_iter()
        .map(|a| a.opportunity_id)
        .collect();
    let applied = if applied_ids.is_empty() {
        Vec::new()
    } else {
        store.opportunities_by_ids(&applied_ids).await?
    };

    Ok(ProfileView::new(user, events, posted, applied))
}

pub async fn update_profile(
    store: &dyn Store,
    user_id: Uuid,
    req: UpdateProfileRequest,
) -> Result<ProfileView, ApiError> {
    let mut user = load_actor(store, user_id).await?;

    if let Some(requested) = req.user_type {
        if requested != user.user_type() {
            warn!(%user_id, from = %user.user_type(), to = %requested, "user type change refused");
            return Err(ApiError::validation("userType cannot be changed"));
        }
    }
    if let Some(name) = req.name {
        let name = name.trim().to_string();
        if name.chars().count() < MIN_NAME_LEN {
            return Err(ApiError::validation(format!(
                "Name must be at least {MIN_NAME_LEN} characters"
            )));
        }
        user.name = name;
    }
    if let Some(email) = req.email {
        let email = normalize_email(&email);
        if !is_valid_email(&email) {
            return Err(ApiError::validation("Invalid email address"));
        }
        user.email = email;
    }
    user.profile.apply(req.attributes);
    validate_profile(&user.profile)?;

    let saved = store.update_user(&user).await?;
    info!(%user_id, "profile updated");
    populate(store, saved).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::model::{NewEvent, Registration};
    use crate::state::AppState;
    use crate::users::model::{IndividualProfile, NewUser, Profile, UserType};

    async fn bob(store: &dyn Store) -> User {
        store
            .insert_user(NewUser {
                username: "bob".into(),
                email: "bob@x.org".into(),
                password_hash: "h".into(),
                name: "Bob".into(),
                profile: Profile::Individual(IndividualProfile::default()),
            })
            .await
            .unwrap()
    }

    fn request(body: serde_json::Value) -> UpdateProfileRequest {
        serde_json::from_value(body).unwrap()
    }

    #[tokio::test]
    async fn update_ignores_password_and_other_role_fields() {
        let state = AppState::fake();
        let store = state.store.as_ref();
        let user = bob(store).await;

        let view = update_profile(
            store,
            user.id,
            request(serde_json::json!({
                "name": "Robert",
                "password": "hunter22",
                "bio": "Likes beaches",
                "organizationName": "Not an NGO",
            })),
        )
        .await
        .unwrap();

        assert_eq!(view.name, "Robert");
        match view.profile {
            Profile::Individual(p) => assert_eq!(p.bio.as_deref(), Some("Likes beaches")),
            other => panic!("profile changed role: {other:?}"),
        }
        let stored = store.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "h");
    }

    #[tokio::test]
    async fn user_type_change_is_rejected() {
        let state = AppState::fake();
        let store = state.store.as_ref();
        let user = bob(store).await;

        let err = update_profile(store, user.id, request(serde_json::json!({ "userType": "ngo" })))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        // restating the current type is fine
        update_profile(
            store,
            user.id,
            request(serde_json::json!({ "userType": "individual" })),
        )
        .await
        .unwrap();
        let stored = store.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.user_type(), UserType::Individual);
    }

    #[tokio::test]
    async fn invalid_email_and_short_name_are_rejected() {
        let state = AppState::fake();
        let store = state.store.as_ref();
        let user = bob(store).await;

        let err = update_profile(store, user.id, request(serde_json::json!({ "email": "nope" })))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        let err = update_profile(store, user.id, request(serde_json::json!({ "name": "B" })))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn profile_populates_registered_events() {
        let state = AppState::fake();
        let store = state.store.as_ref();
        let user = bob(store).await;
        let event = store
            .insert_event(NewEvent {
                title: "Park Planting".into(),
                description: "Plant trees".into(),
                date: "2024-05-01".into(),
                time: "10:00".into(),
                location: "City Park".into(),
                organizer_id: user.id,
            })
            .await
            .unwrap();
        store
            .register_for_event(Registration {
                event_id: event.id,
                user_id: user.id,
            })
            .await
            .unwrap();

        let view = profile(store, user.id).await.unwrap();
        assert_eq!(view.events.len(), 1);
        assert_eq!(view.events[0].id, event.id);
        assert!(view.posted_opportunities.is_empty());
        assert!(view.applied_opportunities.is_empty());

        let err = profile(store, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
