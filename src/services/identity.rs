//! Identity Collaborator
//!
//! The signed-in user's id and bearer token come from the surrounding
//! application's auth session. This crate never caches the token: it asks for
//! a fresh one right before every persist call.

use crate::error::Result;

/// Source of request credentials for the persist call
pub trait IdentityProvider: Send + Sync {
    /// Id of the signed-in user, `None` when signed out
    fn current_uid(&self) -> Option<String>;

    /// Obtain a fresh bearer token for the signed-in user
    ///
    /// Failures should be reported as [`crate::error::Error::Network`].
    fn fetch_token(&self) -> impl Future<Output = Result<String>> + Send;
}

/// Fixed credentials, for headless shells and tests
#[derive(Clone)]
pub struct StaticIdentity {
    uid: Option<String>,
    token: String,
}

impl StaticIdentity {
    pub fn new(uid: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            token: token.into(),
        }
    }

    /// An identity with nobody signed in
    pub fn signed_out() -> Self {
        Self {
            uid: None,
            token: String::new(),
        }
    }
}

impl std::fmt::Debug for StaticIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticIdentity")
            .field("uid", &self.uid)
            .finish_non_exhaustive()
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_uid(&self) -> Option<String> {
        self.uid.clone()
    }

    async fn fetch_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}
