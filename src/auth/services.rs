use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::dto::{AuthResponse, LoginRequest, RegisterRequest};
use super::jwt::JwtKeys;
use super::password::{hash_password, verify_nobody, verify_password};
use crate::error::ApiError;
use crate::store::{Store, DUPLICATE_IDENTITY};
use crate::users::model::{NewUser, Profile, PublicUser};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_NAME_LEN: usize = 2;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref URL_RE: Regex = Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_valid_url(url: &str) -> bool {
    URL_RE.is_match(url)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Role-specific invariants shared by registration and profile edits.
pub(crate) fn validate_profile(profile: &Profile) -> Result<(), ApiError> {
    if let Profile::Organization(org) = profile {
        if org.organization_name.trim().is_empty() {
            return Err(ApiError::validation("Organization name is required for NGOs"));
        }
        if let Some(site) = org.website.as_deref() {
            if !is_valid_url(site) {
                return Err(ApiError::validation("Invalid website URL"));
            }
        }
    }
    Ok(())
}

fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    if req.username.chars().count() < MIN_USERNAME_LEN {
        return Err(ApiError::validation(format!(
            "Username must be at least {MIN_USERNAME_LEN} characters"
        )));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if !is_valid_email(&req.email) {
        return Err(ApiError::validation("Invalid email address"));
    }
    if req.name.trim().chars().count() < MIN_NAME_LEN {
        return Err(ApiError::validation(format!(
            "Name must be at least {MIN_NAME_LEN} characters"
        )));
    }
    validate_profile(&req.profile)
}

pub async fn register(
    store: &dyn Store,
    keys: &JwtKeys,
    mut req: RegisterRequest,
) -> Result<AuthResponse, ApiError> {
    req.username = req.username.trim().to_string();
    req.email = normalize_email(&req.email);
    validate_registration(&req)?;

    if store.identity_taken(&req.username, &req.email).await? {
        warn!(username = %req.username, "username or email already registered");
        return Err(ApiError::Conflict(DUPLICATE_IDENTITY.into()));
    }

    let password_hash = hash_password(&req.password)?;
    let user = store
        .insert_user(NewUser {
            username: req.username,
            email: req.email,
            password_hash,
            name: req.name.trim().to_string(),
            profile: req.profile,
        })
        .await?;

    let token = keys.sign(user.id)?;
    info!(user_id = %user.id, user_type = %user.user_type(), "user registered");
    Ok(AuthResponse {
        token,
        user: PublicUser::from(&user),
    })
}

pub async fn login(
    store: &dyn Store,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<AuthResponse, ApiError> {
    let username = req.username.trim();
    let Some(user) = store.find_user_by_username(username).await? else {
        verify_nobody(&req.password);
        warn!(%username, "login unknown username");
        return Err(ApiError::Unauthenticated(INVALID_CREDENTIALS.into()));
    };

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthenticated(INVALID_CREDENTIALS.into()));
    }

    let token = keys.sign(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(AuthResponse {
        token,
        user: PublicUser::from(&user),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use crate::users::model::{IndividualProfile, OrganizationProfile, UserType};
    use axum::extract::FromRef;

    fn individual(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            password: "secret-pass".into(),
            email: email.into(),
            name: "Bob Builder".into(),
            profile: Profile::Individual(IndividualProfile::default()),
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("acme@x.org"));
        assert!(!is_valid_email("acme@x"));
        assert!(!is_valid_email("a cme@x.org"));
    }

    #[test]
    fn ngo_requires_organization_name() {
        let profile = Profile::Organization(OrganizationProfile::default());
        assert!(matches!(
            validate_profile(&profile),
            Err(ApiError::Validation(_))
        ));

        let profile = Profile::Organization(OrganizationProfile {
            organization_name: "Acme".into(),
            website: Some("ftp://acme".into()),
            ..Default::default()
        });
        assert!(validate_profile(&profile).is_err());
    }

    #[tokio::test]
    async fn register_then_login() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);

        let res = register(state.store.as_ref(), &keys, individual("bob", " Bob@X.org "))
            .await
            .unwrap();
        assert_eq!(res.user.email, "bob@x.org");
        assert_eq!(res.user.user_type, UserType::Individual);
        assert_eq!(keys.verify(&res.token).unwrap().sub, res.user.id);

        let res = login(
            state.store.as_ref(),
            &keys,
            LoginRequest {
                username: "bob".into(),
                password: "secret-pass".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(res.user.username, "bob");
    }

    #[tokio::test]
    async fn duplicate_identity_conflicts() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        register(state.store.as_ref(), &keys, individual("bob", "bob@x.org"))
            .await
            .unwrap();

        let err = register(state.store.as_ref(), &keys, individual("bob", "new@x.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        let err = register(state.store.as_ref(), &keys, individual("robert", "BOB@x.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn bad_login_messages_are_identical() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        register(state.store.as_ref(), &keys, individual("bob", "bob@x.org"))
            .await
            .unwrap();

        let unknown = login(
            state.store.as_ref(),
            &keys,
            LoginRequest {
                username: "nobody".into(),
                password: "secret-pass".into(),
            },
        )
        .await
        .unwrap_err();
        let wrong = login(
            state.store.as_ref(),
            &keys,
            LoginRequest {
                username: "bob".into(),
                password: "wrong-pass".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(unknown.status_code(), wrong.status_code());
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let mut req = individual("bob", "bob@x.org");
        req.password = "123".into();
        let err = register(state.store.as_ref(), &keys, req).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
