use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    Store, StoreError, StoreResult, ALREADY_REVIEWED, DUPLICATE_APPLICATION, DUPLICATE_IDENTITY,
};
use crate::applications::model::{
    Application, ApplicationFilter, ApplicationStatus, NewApplication,
};
use crate::events::model::{Event, EventStatus, NewEvent, Registration};
use crate::opportunities::model::{
    NewOpportunity, Opportunity, OpportunityFilter, OpportunityStatus,
};
use crate::users::model::{NewUser, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    opportunities: Vec<Opportunity>,
    applications: Vec<Application>,
    events: Vec<Event>,
    registrations: Vec<Registration>,
}

/// Process-local store. Each call takes the lock once, so every write
/// (uniqueness checks included) is atomic with respect to other calls.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, new: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if t
            .users
            .iter()
            .any(|u| u.username == new.username || u.email == new.email)
        {
            return Err(StoreError::Conflict(DUPLICATE_IDENTITY.into()));
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            name: new.name,
            profile: new.profile,
            created_at: now,
            updated_at: now,
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn identity_taken(&self, username: &str, email: &str) -> StoreResult<bool> {
        let t = self.tables.read().await;
        Ok(t
            .users
            .iter()
            .any(|u| u.username == username || u.email == email))
    }

    async fn update_user(&self, user: &User) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if t
            .users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(StoreError::Conflict(DUPLICATE_IDENTITY.into()));
        }
        let stored = t
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| StoreError::Corrupt(format!("user {} vanished", user.id)))?;
        if stored.user_type() != user.user_type() {
            return Err(StoreError::Corrupt("user type cannot change".into()));
        }
        stored.name = user.name.clone();
        stored.email = user.email.clone();
        stored.profile = user.profile.clone();
        stored.updated_at = OffsetDateTime::now_utc();
        Ok(stored.clone())
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let t = self.tables.read().await;
        Ok(t.users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn insert_opportunity(&self, new: NewOpportunity) -> StoreResult<Opportunity> {
        let mut t = self.tables.write().await;
        let now = OffsetDateTime::now_utc();
        let opportunity = Opportunity {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            location: new.location,
            required_skills: new.required_skills,
            organization_id: new.organization_id,
            start_date: new.start_date,
            end_date: new.end_date,
            status: OpportunityStatus::Open,
            created_at: now,
            updated_at: now,
        };
        t.opportunities.push(opportunity.clone());
        Ok(opportunity)
    }

    async fn find_opportunity(&self, id: Uuid) -> StoreResult<Option<Opportunity>> {
        let t = self.tables.read().await;
        Ok(t.opportunities.iter().find(|o| o.id == id).cloned())
    }

    async fn update_opportunity(&self, opportunity: &Opportunity) -> StoreResult<Opportunity> {
        let mut t = self.tables.write().await;
        let stored = t
            .opportunities
            .iter_mut()
            .find(|o| o.id == opportunity.id)
            .ok_or_else(|| StoreError::Corrupt(format!("opportunity {} vanished", opportunity.id)))?;
        let organization_id = stored.organization_id;
        let created_at = stored.created_at;
        *stored = Opportunity {
            organization_id,
            created_at,
            updated_at: OffsetDateTime::now_utc(),
            ..opportunity.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_opportunity(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.opportunities.len();
        t.opportunities.retain(|o| o.id != id);
        Ok(t.opportunities.len() != before)
    }

    async fn list_opportunities(&self, filter: OpportunityFilter) -> StoreResult<Vec<Opportunity>> {
        let t = self.tables.read().await;
        let mut out: Vec<Opportunity> = t
            .opportunities
            .iter()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        out.reverse();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn opportunities_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Opportunity>> {
        let t = self.tables.read().await;
        Ok(t.opportunities
            .iter()
            .filter(|o| ids.contains(&o.id))
            .cloned()
            .collect())
    }

    async fn insert_application(&self, new: NewApplication) -> StoreResult<Application> {
        let mut t = self.tables.write().await;
        if t
            .applications
            .iter()
            .any(|a| a.user_id == new.user_id && a.opportunity_id == new.opportunity_id)
        {
            return Err(StoreError::Conflict(DUPLICATE_APPLICATION.into()));
        }
        let application = Application {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            opportunity_id: new.opportunity_id,
            status: ApplicationStatus::Pending,
            applied_at: OffsetDateTime::now_utc(),
        };
        t.applications.push(application.clone());
        Ok(application)
    }

    async fn find_application(&self, id: Uuid) -> StoreResult<Option<Application>> {
        let t = self.tables.read().await;
        Ok(t.applications.iter().find(|a| a.id == id).cloned())
    }

    async fn find_application_for(
        &self,
        user_id: Uuid,
        opportunity_id: Uuid,
    ) -> StoreResult<Option<Application>> {
        let t = self.tables.read().await;
        Ok(t.applications
            .iter()
            .find(|a| a.user_id == user_id && a.opportunity_id == opportunity_id)
            .cloned())
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> StoreResult<Option<Application>> {
        let mut t = self.tables.write().await;
        let Some(application) = t.applications.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        if application.status.is_terminal() {
            return Err(StoreError::Conflict(ALREADY_REVIEWED.into()));
        }
        application.status = status;
        Ok(Some(application.clone()))
    }

    async fn list_applications(&self, filter: ApplicationFilter) -> StoreResult<Vec<Application>> {
        let t = self.tables.read().await;
        let mut out: Vec<Application> = t
            .applications
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        // newest insert first on equal timestamps
        out.reverse();
        out.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(out)
    }

    async fn insert_event(&self, new: NewEvent) -> StoreResult<Event> {
        let mut t = self.tables.write().await;
        let now = OffsetDateTime::now_utc();
        let event = Event {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            date: new.date,
            time: new.time,
            location: new.location,
            organizer_id: new.organizer_id,
            status: EventStatus::Upcoming,
            created_at: now,
            updated_at: now,
        };
        t.events.push(event.clone());
        Ok(event)
    }

    async fn find_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let t = self.tables.read().await;
        Ok(t.events.iter().find(|e| e.id == id).cloned())
    }

    async fn list_events(&self, ids: Option<&[Uuid]>) -> StoreResult<Vec<Event>> {
        let t = self.tables.read().await;
        Ok(t.events
            .iter()
            .filter(|e| ids.map_or(true, |ids| ids.contains(&e.id)))
            .cloned()
            .collect())
    }

    async fn register_for_event(&self, registration: Registration) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if !t.registrations.contains(&registration) {
            t.registrations.push(registration);
        }
        Ok(())
    }

    async fn registrations_for_events(&self, event_ids: &[Uuid]) -> StoreResult<Vec<Registration>> {
        let t = self.tables.read().await;
        Ok(t.registrations
            .iter()
            .filter(|r| event_ids.contains(&r.event_id))
            .copied()
            .collect())
    }

    async fn event_ids_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let t = self.tables.read().await;
        Ok(t.registrations
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.event_id)
            .collect())
    }
}
