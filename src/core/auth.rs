//! Session context and role-based access
//!
//! Sessions are explicit values handed to every [`ClinicApi`] call instead of
//! living in ambient storage. The [`SessionRegistry`] resolves bearer tokens
//! presented to the HTTP surface.
//!
//! [`ClinicApi`]: crate::core::service::ClinicApi

use crate::core::error::{ClinicError, ClinicResult, RequestError};
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{HeaderMap, header, request::Parts};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Role carried by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Dentist,
    Staff,
    Patient,
    Admin,
}

impl Role {
    /// Parse a role name, accepting the `ROLE_` prefix used by the backend
    pub fn parse(s: &str) -> Option<Self> {
        let name = s.strip_prefix("ROLE_").unwrap_or(s);
        match name.to_ascii_uppercase().as_str() {
            "DENTIST" => Some(Role::Dentist),
            "STAFF" => Some(Role::Staff),
            "PATIENT" => Some(Role::Patient),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Dentist => "DENTIST",
            Role::Staff => "STAFF",
            Role::Patient => "PATIENT",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated session
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub token: String,
    pub user_id: String,
    /// Name stamped on clinical notes written in this session
    pub display_name: String,
    pub role: Role,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            token: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            display_name: display_name.into(),
            role,
        }
    }

    /// Fail with `Forbidden` unless the session has `role`
    pub fn require_role(&self, role: Role) -> ClinicResult<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(RequestError::Forbidden {
                message: format!("requires role {}, session has {}", role, self.role),
            }
            .into())
        }
    }
}

// Keeps bearer tokens out of logs
impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("user_id", &self.user_id)
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Token → session lookup shared by the HTTP handlers
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SessionContext>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for a user and return it (token included)
    pub fn issue(
        &self,
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        role: Role,
    ) -> ClinicResult<SessionContext> {
        let session = SessionContext::new(user_id, display_name, role);
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| ClinicError::internal(format!("Failed to acquire write lock: {}", e)))?;
        sessions.insert(session.token.clone(), session.clone());
        tracing::debug!(user_id = %session.user_id, role = %session.role, "session issued");
        Ok(session)
    }

    pub fn revoke(&self, token: &str) -> ClinicResult<bool> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| ClinicError::internal(format!("Failed to acquire write lock: {}", e)))?;
        Ok(sessions.remove(token).is_some())
    }

    pub fn resolve(&self, token: &str) -> ClinicResult<Option<SessionContext>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| ClinicError::internal(format!("Failed to acquire read lock: {}", e)))?;
        Ok(sessions.get(token).cloned())
    }

    /// Resolve the `Authorization: Bearer <token>` header
    pub fn authenticate(&self, headers: &HeaderMap) -> ClinicResult<SessionContext> {
        let token = bearer_token(headers).ok_or_else(|| RequestError::Unauthorized {
            message: "missing bearer token".to_string(),
        })?;

        self.resolve(token)?.ok_or_else(|| {
            RequestError::Unauthorized {
                message: "unknown or expired session".to_string(),
            }
            .into()
        })
    }
}

/// Extract the bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Handlers take a `SessionContext` argument to require an authenticated caller
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
    SessionRegistry: FromRef<S>,
{
    type Rejection = ClinicError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        SessionRegistry::from_ref(state).authenticate(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_role_parse_accepts_backend_prefix() {
        assert_eq!(Role::parse("ROLE_DENTIST"), Some(Role::Dentist));
        assert_eq!(Role::parse("patient"), Some(Role::Patient));
        assert_eq!(Role::parse("ROLE_JANITOR"), None);
    }

    #[test]
    fn test_require_role() {
        let session = SessionContext::new("u1", "Dr. Nowak", Role::Dentist);
        assert!(session.require_role(Role::Dentist).is_ok());
        let err = session.require_role(Role::Patient).unwrap_err();
        assert_eq!(err.error_code(), "FORBIDDEN");
    }

    #[test]
    fn test_debug_hides_token() {
        let session = SessionContext::new("u1", "Anna", Role::Patient);
        let rendered = format!("{:?}", session);
        assert!(!rendered.contains(&session.token));
        assert!(rendered.contains("u1"));
    }

    #[test]
    fn test_authenticate_with_bearer_header() {
        let registry = SessionRegistry::new();
        let session = registry.issue("u1", "Anna", Role::Patient).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", session.token)).unwrap(),
        );

        let resolved = registry.authenticate(&headers).unwrap();
        assert_eq!(resolved, session);
    }

    #[test]
    fn test_authenticate_rejects_missing_and_unknown_tokens() {
        let registry = SessionRegistry::new();
        let err = registry.authenticate(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.error_code(), "UNAUTHORIZED");

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer nope"));
        assert!(registry.authenticate(&headers).is_err());
    }

    #[test]
    fn test_revoke() {
        let registry = SessionRegistry::new();
        let session = registry.issue("u1", "Anna", Role::Patient).unwrap();
        assert!(registry.revoke(&session.token).unwrap());
        assert!(registry.resolve(&session.token).unwrap().is_none());
    }
}
