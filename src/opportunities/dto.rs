use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::Opportunity;
use crate::users::model::{ApplicantSummary, OrganizationSummary};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOpportunityRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(deserialize_with = "crate::dates::deserialize")]
    pub start_date: OffsetDateTime,
    #[serde(default, deserialize_with = "crate::dates::option::deserialize")]
    pub end_date: Option<OffsetDateTime>,
}

/// Public listing entry: the opportunity, its organization, and the ids
/// behind its applicant and application relations.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityView {
    #[serde(flatten)]
    pub opportunity: Opportunity,
    pub organization: Option<OrganizationSummary>,
    pub applicants: Vec<Uuid>,
    pub applications: Vec<Uuid>,
}

/// Owner's listing entry, with applicant contact details.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedOpportunityView {
    #[serde(flatten)]
    pub opportunity: Opportunity,
    pub applicants: Vec<ApplicantSummary>,
    pub applications: Vec<Uuid>,
}
