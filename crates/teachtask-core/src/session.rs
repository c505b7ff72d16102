//! Session gate: every list operation runs on behalf of a resolved identity.

use crate::error::ErrorCode;
use serde::{Deserialize, Serialize};

/// The authenticated user a list operation runs for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no authenticated user")]
    Unauthenticated,

    #[error("session provider failed: {0}")]
    Provider(String),
}

impl SessionError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Unauthenticated => ErrorCode::NotAuthenticated,
            Self::Provider(_) => ErrorCode::InternalUnexpected,
        }
    }
}

/// Source of the current identity (an auth service, the CLI environment, ...).
pub trait SessionProvider {
    /// The signed-in identity, or `None` when nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Provider`] if the identity source itself fails.
    fn current_identity(&self) -> Result<Option<Identity>, SessionError>;
}

/// A fixed identity (or none).
#[derive(Debug, Clone, Default)]
pub struct StaticSession(Option<Identity>);

impl StaticSession {
    #[must_use]
    pub const fn signed_in(identity: Identity) -> Self {
        Self(Some(identity))
    }

    #[must_use]
    pub const fn signed_out() -> Self {
        Self(None)
    }
}

impl SessionProvider for StaticSession {
    fn current_identity(&self) -> Result<Option<Identity>, SessionError> {
        Ok(self.0.clone())
    }
}

/// Resolve the identity or refuse. Blank user ids count as signed out.
///
/// # Errors
///
/// Returns [`SessionError::Unauthenticated`] when no usable identity exists.
pub fn require_identity(provider: &dyn SessionProvider) -> Result<Identity, SessionError> {
    match provider.current_identity()? {
        Some(identity) if !identity.user_id.trim().is_empty() => Ok(identity),
        _ => {
            tracing::debug!("session gate rejected caller without identity");
            Err(SessionError::Unauthenticated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_in_identity_passes() {
        let session = StaticSession::signed_in(Identity::new("u-1").with_email("a@school.edu"));
        let identity = require_identity(&session).unwrap();
        assert_eq!(identity.user_id, "u-1");
        assert_eq!(identity.email.as_deref(), Some("a@school.edu"));
    }

    #[test]
    fn signed_out_is_rejected() {
        assert_eq!(
            require_identity(&StaticSession::signed_out()),
            Err(SessionError::Unauthenticated)
        );
    }

    #[test]
    fn blank_user_id_is_rejected() {
        let session = StaticSession::signed_in(Identity::new("   "));
        assert_eq!(
            require_identity(&session),
            Err(SessionError::Unauthenticated)
        );
    }

    #[test]
    fn provider_failure_propagates() {
        struct Broken;
        impl SessionProvider for Broken {
            fn current_identity(&self) -> Result<Option<Identity>, SessionError> {
                Err(SessionError::Provider("token expired".into()))
            }
        }
        assert_eq!(
            require_identity(&Broken),
            Err(SessionError::Provider("token expired".into()))
        );
    }
}
