use serde::{Deserialize, Serialize};

use super::model::Event;
use crate::users::model::{OrganizationSummary, UserName};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub organizer: Option<OrganizationSummary>,
    pub registered_users: Vec<UserName>,
}
