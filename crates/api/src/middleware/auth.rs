//! Identity extractors.
//!
//! Authentication itself is an upstream concern: a proxy in front of this
//! service resolves the session/JWT and injects `x-user-id` and
//! `x-user-role` headers. These extractors only read the result; no core
//! operation runs without a resolved identity.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use toy_trove_core::UserId;

use crate::error::AppError;

const USER_ID_HEADER: &str = "x-user-id";
const USER_ROLE_HEADER: &str = "x-user-role";

/// Role of the calling user as asserted by the auth proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Admin,
}

/// Extractor providing the resolved caller identity.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(AuthUser { user_id, .. }: AuthUser) -> impl IntoResponse {
///     format!("hello, user {user_id}")
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: UserId,
    pub role: Role,
}

/// Extractor that additionally requires the admin role.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin(pub AuthUser);

fn parse_identity(headers: &HeaderMap) -> Result<AuthUser, AppError> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i32>().ok())
        .map(UserId::new)
        .ok_or(AppError::Unauthorized)?;

    let role = match headers.get(USER_ROLE_HEADER).and_then(|v| v.to_str().ok()) {
        Some("admin") => Role::Admin,
        _ => Role::Customer,
    };

    Ok(AuthUser { user_id, role })
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parse_identity(&parts.headers)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parse_identity(&parts.headers)?;
        if user.role != Role::Admin {
            return Err(AppError::Forbidden);
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(
                axum::http::HeaderName::try_from(*k).expect("header name"),
                HeaderValue::from_str(v).expect("header value"),
            );
        }
        map
    }

    #[test]
    fn missing_user_header_is_unauthorized() {
        let result = parse_identity(&headers(&[]));
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn non_numeric_user_header_is_unauthorized() {
        let result = parse_identity(&headers(&[("x-user-id", "abc")]));
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn role_defaults_to_customer() {
        let user = parse_identity(&headers(&[("x-user-id", "7")])).expect("identity");
        assert_eq!(user.user_id, UserId::new(7));
        assert_eq!(user.role, Role::Customer);
    }

    #[test]
    fn admin_role_is_recognized() {
        let user = parse_identity(&headers(&[("x-user-id", "7"), ("x-user-role", "admin")]))
            .expect("identity");
        assert_eq!(user.role, Role::Admin);
    }
}
