use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use super::dto::{CreateEventRequest, EventView};
use super::model::{Event, NewEvent, Registration};
use crate::error::ApiError;
use crate::store::Store;
use crate::users::model::{OrganizationSummary, User, UserName};
use crate::users::services::load_actor;

async fn views(store: &dyn Store, events: Vec<Event>) -> Result<Vec<EventView>, ApiError> {
    if events.is_empty() {
        return Ok(Vec::new());
    }
    let event_ids: Vec<Uuid> = events.iter().map(|e| e.id).collect();
    let registrations = store.registrations_for_events(&event_ids).await?;

    let mut user_ids: Vec<Uuid> = events
        .iter()
        .map(|e| e.organizer_id)
        .chain(registrations.iter().map(|r| r.user_id))
        .collect();
    user_ids.sort_unstable();
    user_ids.dedup();
    let users: HashMap<Uuid, User> = store
        .users_by_ids(&user_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(events
        .into_iter()
        .map(|event| EventView {
            organizer: users.get(&event.organizer_id).map(OrganizationSummary::from),
            registered_users: registrations
                .iter()
                .filter(|r| r.event_id == event.id)
                .filter_map(|r| users.get(&r.user_id))
                .map(UserName::from)
                .collect(),
            event,
        })
        .collect())
}

pub async fn list_all(store: &dyn Store) -> Result<Vec<EventView>, ApiError> {
    let events = store.list_events(None).await?;
    views(store, events).await
}

/// Events the user has registered for.
pub async fn list_registered(store: &dyn Store, user_id: Uuid) -> Result<Vec<EventView>, ApiError> {
    load_actor(store, user_id).await?;
    let ids = store.event_ids_for_user(user_id).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let events = store.list_events(Some(&ids)).await?;
    views(store, events).await
}

pub async fn create(
    store: &dyn Store,
    actor_id: Uuid,
    req: CreateEventRequest,
) -> Result<EventView, ApiError> {
    let actor = load_actor(store, actor_id).await?;

    let new = NewEvent {
        title: req.title.trim().to_string(),
        description: req.description.trim().to_string(),
        date: req.date.trim().to_string(),
        time: req.time.trim().to_string(),
        location: req.location.trim().to_string(),
        organizer_id: actor.id,
    };
    for (field, value) in [
        ("Title", &new.title),
        ("Description", &new.description),
        ("Date", &new.date),
        ("Time", &new.time),
        ("Location", &new.location),
    ] {
        if value.is_empty() {
            return Err(ApiError::validation(format!("{field} is required")));
        }
    }

    let event = store.insert_event(new).await?;
    info!(event_id = %event.id, organizer_id = %actor.id, "event created");
    views(store, vec![event])
        .await?
        .pop()
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("empty event view")))
}

/// Registering twice is a no-op.
pub async fn register(store: &dyn Store, actor_id: Uuid, event_id: Uuid) -> Result<(), ApiError> {
    let actor = load_actor(store, actor_id).await?;
    let event = store
        .find_event(event_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;
    store
        .register_for_event(Registration {
            event_id: event.id,
            user_id: actor.id,
        })
        .await?;
    info!(%event_id, user_id = %actor.id, "registered for event");
    Ok(())
}
