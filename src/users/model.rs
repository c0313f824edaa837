use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Account role. Fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Individual,
    Ngo,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Ngo => "ngo",
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationProfile {
    #[serde(default)]
    pub organization_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub service_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// Role-specific attributes, tagged by `userType` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "userType")]
pub enum Profile {
    #[serde(rename = "individual")]
    Individual(IndividualProfile),
    #[serde(rename = "ngo")]
    Organization(OrganizationProfile),
}

impl Profile {
    pub fn user_type(&self) -> UserType {
        match self {
            Self::Individual(_) => UserType::Individual,
            Self::Organization(_) => UserType::Ngo,
        }
    }

    pub fn organization_name(&self) -> Option<&str> {
        match self {
            Self::Organization(o) => Some(o.organization_name.as_str()),
            Self::Individual(_) => None,
        }
    }

    /// Applies the attributes in `patch` that belong to this profile's role.
    /// Attributes of the other role are ignored.
    pub fn apply(&mut self, patch: ProfilePatch) {
        match self {
            Self::Individual(p) => {
                if let Some(v) = patch.bio {
                    p.bio = Some(v);
                }
                if let Some(v) = patch.location {
                    p.location = Some(v);
                }
                if let Some(v) = patch.skills {
                    p.skills = v;
                }
            }
            Self::Organization(p) => {
                if let Some(v) = patch.organization_name {
                    p.organization_name = v;
                }
                if let Some(v) = patch.contact_phone {
                    p.contact_phone = Some(v);
                }
                if let Some(v) = patch.address {
                    p.address = Some(v);
                }
                if let Some(v) = patch.service_types {
                    p.service_types = v;
                }
                if let Some(v) = patch.operating_hours {
                    p.operating_hours = Some(v);
                }
                if let Some(v) = patch.website {
                    p.website = Some(v);
                }
            }
        }
    }
}

/// Partial set of role attributes, as sent to `PUT /users/profile`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfilePatch {
    pub bio: Option<String>,
    pub location: Option<String>,
    pub skills: Option<Vec<String>>,
    pub organization_name: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub service_types: Option<Vec<String>>,
    pub operating_hours: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub profile: Profile,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    pub fn user_type(&self) -> UserType {
        self.profile.user_type()
    }
}

/// Fields required to insert a user; the store assigns the id and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub profile: Profile,
}

/// The identity fields returned from register and login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub user_type: UserType,
    pub name: String,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
            user_type: u.user_type(),
            name: u.name.clone(),
        }
    }
}

/// Organization summary joined onto opportunities and events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSummary {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
}

impl From<&User> for OrganizationSummary {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            organization_name: u.profile.organization_name().map(str::to_owned),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicantSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for ApplicantSummary {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserName {
    pub id: Uuid,
    pub name: String,
}

impl From<&User> for UserName {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_is_tagged_by_user_type() {
        let p: Profile = serde_json::from_value(json!({
            "userType": "ngo",
            "organizationName": "Acme",
            "serviceTypes": ["food"]
        }))
        .unwrap();
        assert_eq!(p.user_type(), UserType::Ngo);
        assert_eq!(p.organization_name(), Some("Acme"));

        let v = serde_json::to_value(Profile::Individual(IndividualProfile {
            bio: Some("hi".into()),
            ..Default::default()
        }))
        .unwrap();
        assert_eq!(v["userType"], "individual");
        assert_eq!(v["bio"], "hi");
    }

    #[test]
    fn unknown_user_type_is_rejected() {
        let res: Result<Profile, _> = serde_json::from_value(json!({ "userType": "admin" }));
        assert!(res.is_err());
    }

    #[test]
    fn apply_ignores_attributes_of_the_other_role() {
        let mut p = Profile::Individual(IndividualProfile::default());
        p.apply(ProfilePatch {
            bio: Some("gardener".into()),
            organization_name: Some("Sneaky Org".into()),
            ..Default::default()
        });
        assert_eq!(p.user_type(), UserType::Individual);
        assert_eq!(p.organization_name(), None);
        match p {
            Profile::Individual(ind) => assert_eq!(ind.bio.as_deref(), Some("gardener")),
            Profile::Organization(_) => unreachable!(),
        }
    }
}
