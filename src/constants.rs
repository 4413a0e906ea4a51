//! Pipeline Constants
//!
//! Centralized field names, defaults and user-facing strings.

/// Keys every submitted config must carry with a truthy value
pub const REQUIRED_FIELDS: [&str; 5] = ["apiKey", "projectId", "appId", "authDomain", "storageBucket"];

/// Key of the stored secret that is never shown in, or read from, the editor
pub const SECRET_FIELD: &str = "password";

/// Remote store defaults
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_CONFIG_PATH: &str = "/api/config";
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const USER_AGENT: &str = concat!("firefiles-config/", env!("CARGO_PKG_VERSION"));

/// Diagnostic prefix the backend puts in front of its error messages
pub const DEFAULT_ERROR_PREFIX: &str = "Firebase: ";

/// Request metadata header names
pub const UID_HEADER: &str = "uid";
pub const TOKEN_HEADER: &str = "token";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Indentation used when seeding the editor
pub const EDITOR_INDENT: &[u8] = b"    ";

/// Nesting limit for the literal parser
pub const MAX_NESTING_DEPTH: usize = 64;

/// User-facing messages
pub const MISSING_FIELDS_MESSAGE: &str = "One or more fields are missing from the config.";
pub const UPDATED_NOTICE: &str = "Firebase credentials updated successfully.";
pub const REQUIRED_FIELDS_HINT: &str = "The fields apiKey, authDomain, projectId, storageBucket and appId must be present in the JSON.";

/// Example shown in the empty editor
pub const PLACEHOLDER_TEXT: &str = r#"{
  apiKey: "AIzafeaubu13ub13j",
  authDomain: "myapp-f3190.firebaseapp.com",
  projectId: "myapp-f3190",
  storageBucket: "myapp-f3190.appspot.com",
  appId: "1:8931361818:web:132af17fejaj3695cf"
}"#;
