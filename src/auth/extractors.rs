use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::error::ApiError;

/// Resolves the bearer token to the acting user's id.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                ApiError::Unauthenticated("No authentication token, access denied".into())
            })?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ApiError::Unauthenticated("No authentication token, access denied".into())
            })?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::Unauthenticated("Token is invalid or expired".into())
        })?;

        Ok(AuthUser(claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<Uuid, ApiError> {
        let state = AppState::fake();
        let mut builder = Request::builder().uri("/api/users/profile");
        if let Some(h) = header {
            builder = builder.header("authorization", h);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, &state)
            .await
            .map(|AuthUser(id)| id)
    }

    #[tokio::test]
    async fn accepts_valid_bearer_token() {
        let state = AppState::fake();
        let user_id = Uuid::new_v4();
        let token = JwtKeys::from_ref(&state).sign(user_id).unwrap();
        let got = extract(Some(&format!("Bearer {token}"))).await.unwrap();
        assert_eq!(got, user_id);
    }

    #[tokio::test]
    async fn missing_header_is_unauthenticated() {
        assert!(matches!(extract(None).await, Err(ApiError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn wrong_scheme_or_bad_token_is_unauthenticated() {
        assert!(matches!(
            extract(Some("Basic dXNlcjpwYXNz")).await,
            Err(ApiError::Unauthenticated(_))
        ));
        assert!(matches!(
            extract(Some("Bearer nope")).await,
            Err(ApiError::Unauthenticated(_))
        ));
        assert!(matches!(
            extract(Some("Bearer ")).await,
            Err(ApiError::Unauthenticated(_))
        ));
    }
}
