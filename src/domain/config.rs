//! Config - Backend Connection Credentials

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Backend connection credentials as published to the rest of the application
///
/// Field order matters: it is the order the editor shows them in.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    /// Web API key
    pub api_key: String,
    /// Auth domain (e.g., "myapp.firebaseapp.com")
    pub auth_domain: String,
    /// Project ID
    pub project_id: String,
    /// Storage bucket (e.g., "myapp.appspot.com")
    pub storage_bucket: String,
    /// App ID (e.g., "1:123:web:abc")
    pub app_id: String,
    /// Any further non-secret keys the user pasted (messagingSenderId, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Previously stored secret, never shown in the editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl FirebaseConfig {
    /// The stored secret, if one is set
    pub fn secret(&self) -> Option<&str> {
        self.password.as_deref().filter(|pwd| !pwd.is_empty())
    }

    pub fn has_secret(&self) -> bool {
        self.secret().is_some()
    }

    /// Copy of this config with the secret removed
    pub fn without_secret(&self) -> Self {
        Self {
            password: None,
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("api_key", &self.api_key)
            .field("auth_domain", &self.auth_domain)
            .field("project_id", &self.project_id)
            .field("storage_bucket", &self.storage_bucket)
            .field("app_id", &self.app_id)
            .field("extra", &self.extra)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
