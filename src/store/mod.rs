//! Persistence seam.
//!
//! Every relationship is stored once, on the record that owns it: an
//! application row links a user to an opportunity, a registration row links a
//! user to an event, and `organization_id` links an opportunity to its NGO.
//! The "other side" of each relationship is read back through the query
//! methods below instead of being written a second time, so a single store
//! call is always enough to keep both sides consistent.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::applications::model::{
    Application, ApplicationFilter, ApplicationStatus, NewApplication,
};
use crate::events::model::{Event, NewEvent, Registration};
use crate::opportunities::model::{NewOpportunity, Opportunity, OpportunityFilter};
use crate::users::model::{NewUser, User};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be mapped back onto the domain model.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub const DUPLICATE_IDENTITY: &str = "Username or email already exists";
pub const DUPLICATE_APPLICATION: &str = "You have already applied for this opportunity";
pub const ALREADY_REVIEWED: &str = "Application has already been reviewed";

#[async_trait]
pub trait Store: Send + Sync {
    // users
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn identity_taken(&self, username: &str, email: &str) -> StoreResult<bool>;
    /// Persists name, email and profile attributes. Username and role are
    /// never rewritten.
    async fn update_user(&self, user: &User) -> StoreResult<User>;
    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>>;

    // opportunities
    async fn insert_opportunity(&self, opportunity: NewOpportunity) -> StoreResult<Opportunity>;
    async fn find_opportunity(&self, id: Uuid) -> StoreResult<Option<Opportunity>>;
    async fn update_opportunity(&self, opportunity: &Opportunity) -> StoreResult<Opportunity>;
    async fn delete_opportunity(&self, id: Uuid) -> StoreResult<bool>;
    async fn list_opportunities(&self, filter: OpportunityFilter) -> StoreResult<Vec<Opportunity>>;
    async fn opportunities_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Opportunity>>;

    // applications
    /// Fails with [`StoreError::Conflict`] when the (user, opportunity) pair
    /// already has an application.
    async fn insert_application(&self, application: NewApplication) -> StoreResult<Application>;
    async fn find_application(&self, id: Uuid) -> StoreResult<Option<Application>>;
    async fn find_application_for(
        &self,
        user_id: Uuid,
        opportunity_id: Uuid,
    ) -> StoreResult<Option<Application>>;
    /// Moves a pending application to `status`. `None` when the application
    /// does not exist, [`StoreError::Conflict`] when it was already reviewed.
    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> StoreResult<Option<Application>>;
    /// Most recent first.
    async fn list_applications(&self, filter: ApplicationFilter) -> StoreResult<Vec<Application>>;

    // events
    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event>;
    async fn find_event(&self, id: Uuid) -> StoreResult<Option<Event>>;
    /// All events when `ids` is `None`, otherwise only the listed ones.
    async fn list_events(&self, ids: Option<&[Uuid]>) -> StoreResult<Vec<Event>>;
    /// Idempotent: registering twice leaves a single registration.
    async fn register_for_event(&self, registration: Registration) -> StoreResult<()>;
    async fn registrations_for_events(&self, event_ids: &[Uuid]) -> StoreResult<Vec<Registration>>;
    async fn event_ids_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Uuid>>;
}
