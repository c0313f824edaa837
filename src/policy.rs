//! Authorization rules evaluated before every mutation.
//!
//! Each rule is a pure function of the acting user and the resources it
//! touches. Callers resolve the resources first (absent ones are `NotFound`)
//! and only then ask the policy, so a denial never stands in for a missing
//! record.

use thiserror::Error;

use crate::applications::model::Application;
use crate::error::ApiError;
use crate::opportunities::model::Opportunity;
use crate::users::model::{User, UserType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("Only NGOs can create opportunities")]
    NotAnOrganization,

    #[error("Not authorized to modify this opportunity")]
    NotOpportunityOwner,

    #[error("Only individuals can apply for opportunities")]
    NotAnIndividual,

    #[error("You have already applied for this opportunity")]
    AlreadyApplied,

    #[error("Not authorized to update this application")]
    NotApplicationReviewer,
}

impl From<Denial> for ApiError {
    fn from(d: Denial) -> Self {
        match d {
            Denial::AlreadyApplied => ApiError::Conflict(d.to_string()),
            other => ApiError::Forbidden(other.to_string()),
        }
    }
}

pub type Decision = Result<(), Denial>;

pub fn can_create_opportunity(actor: &User) -> Decision {
    match actor.user_type() {
        UserType::Ngo => Ok(()),
        UserType::Individual => Err(Denial::NotAnOrganization),
    }
}

pub fn can_mutate_opportunity(actor: &User, opportunity: &Opportunity) -> Decision {
    if opportunity.organization_id == actor.id {
        Ok(())
    } else {
        Err(Denial::NotOpportunityOwner)
    }
}

/// `existing` is the actor's application for `opportunity`, if any.
pub fn can_apply(
    actor: &User,
    opportunity: &Opportunity,
    existing: Option<&Application>,
) -> Decision {
    if actor.user_type() != UserType::Individual {
        return Err(Denial::NotAnIndividual);
    }
    match existing {
        Some(a) if a.user_id == actor.id && a.opportunity_id == opportunity.id => {
            Err(Denial::AlreadyApplied)
        }
        _ => Ok(()),
    }
}

/// `opportunity` must be the one `application.opportunity_id` points at.
pub fn can_review_application(
    actor: &User,
    application: &Application,
    opportunity: &Opportunity,
) -> Decision {
    let owns = actor.user_type() == UserType::Ngo
        && application.opportunity_id == opportunity.id
        && opportunity.organization_id == actor.id;
    if owns {
        Ok(())
    } else {
        Err(Denial::NotApplicationReviewer)
    }
}
