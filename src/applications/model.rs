use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Review state of an application. `pending` may move to `accepted` or
/// `rejected`; both of those are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted) | (Self::Pending, Self::Rejected)
        )
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown application status `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub user_id: Uuid,
    pub opportunity_id: Uuid,
    pub status: ApplicationStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub applied_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy)]
pub struct NewApplication {
    pub user_id: Uuid,
    pub opportunity_id: Uuid,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationFilter {
    pub user_id: Option<Uuid>,
    pub opportunity_id: Option<Uuid>,
}

impl ApplicationFilter {
    pub fn by_user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn by_opportunity(opportunity_id: Uuid) -> Self {
        Self {
            opportunity_id: Some(opportunity_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, a: &Application) -> bool {
        self.user_id.map_or(true, |id| a.user_id == id)
            && self.opportunity_id.map_or(true, |id| a.opportunity_id == id)
    }
}
