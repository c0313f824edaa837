use serde::{Deserialize, Serialize};

use crate::users::model::{Profile, PublicUser};

/// Request body for `POST /users/register`. Role attributes sit next to the
/// identity fields, selected by `userType`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub name: String,
    #[serde(flatten)]
    pub profile: Profile,
}

/// Request body for `POST /users/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response returned after register or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}
