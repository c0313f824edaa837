use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::{Profile, ProfilePatch, User, UserType};
use crate::events::model::Event;
use crate::opportunities::model::Opportunity;

/// Body of `PUT /users/profile`. A `password` key, if sent, is not
/// deserialized and so can never be changed through this route.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub user_type: Option<UserType>,
    #[serde(flatten)]
    pub attributes: ProfilePatch,
}

/// The caller's own profile with its relations populated.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    #[serde(flatten)]
    pub profile: Profile,
    pub events: Vec<Event>,
    pub posted_opportunities: Vec<Opportunity>,
    pub applied_opportunities: Vec<Opportunity>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl ProfileView {
    pub fn new(
        user: User,
        events: Vec<Event>,
        posted_opportunities: Vec<Opportunity>,
        applied_opportunities: Vec<Opportunity>,
    ) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
            profile: user.profile,
            events,
            posted_opportunities,
            applied_opportunities,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
