use serde::{Deserialize, Serialize};

use super::model::{Application, ApplicationStatus};
use crate::opportunities::model::Opportunity;
use crate::users::model::OrganizationSummary;

#[derive(Debug, Deserialize)]
pub struct ReviewApplicationRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationOpportunity {
    #[serde(flatten)]
    pub opportunity: Opportunity,
    pub organization: Option<OrganizationSummary>,
}

/// An application joined with its opportunity. `opportunity` is `null` once
/// the opportunity has been deleted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: Application,
    pub opportunity: Option<ApplicationOpportunity>,
}
