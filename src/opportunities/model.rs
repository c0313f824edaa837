use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityStatus {
    #[default]
    Open,
    Closed,
}

impl OpportunityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl std::str::FromStr for OpportunityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(format!("unknown opportunity status `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub required_skills: Vec<String>,
    pub organization_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
    pub status: OpportunityStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Opportunity {
    pub fn apply(&mut self, patch: OpportunityPatch) {
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.location {
            self.location = v;
        }
        if let Some(v) = patch.required_skills {
            self.required_skills = v;
        }
        if let Some(v) = patch.start_date {
            self.start_date = v;
        }
        if let Some(v) = patch.end_date {
            self.end_date = Some(v);
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewOpportunity {
    pub title: String,
    pub description: String,
    pub location: String,
    pub required_skills: Vec<String>,
    pub organization_id: Uuid,
    pub start_date: OffsetDateTime,
    pub end_date: Option<OffsetDateTime>,
}

/// Owner-editable fields. `organizationId` is deliberately absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub required_skills: Option<Vec<String>>,
    #[serde(default, deserialize_with = "crate::dates::option::deserialize")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "crate::dates::option::deserialize")]
    pub end_date: Option<OffsetDateTime>,
    pub status: Option<OpportunityStatus>,
}

/// Filter for opportunity listings; `None` fields match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpportunityFilter {
    pub status: Option<OpportunityStatus>,
    pub organization_id: Option<Uuid>,
}

impl OpportunityFilter {
    pub fn open() -> Self {
        Self {
            status: Some(OpportunityStatus::Open),
            ..Default::default()
        }
    }

    pub fn owned_by(organization_id: Uuid) -> Self {
        Self {
            organization_id: Some(organization_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, o: &Opportunity) -> bool {
        self.status.map_or(true, |s| o.status == s)
            && self.organization_id.map_or(true, |id| o.organization_id == id)
    }
}
