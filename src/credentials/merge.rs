//! Secret carry-over

use super::ValidatedFields;
use crate::constants::SECRET_FIELD;
use crate::domain::FirebaseConfig;
use serde_json::{Map, Value};

/// Build the candidate config from new fields plus the prior secret
///
/// The secret comes only from `prior`. A `password` key in the new fields is
/// dropped, so an edit can never replace or expose the stored secret.
pub fn merge_secret(fields: ValidatedFields, prior: Option<&FirebaseConfig>) -> FirebaseConfig {
    let mut extra = fields.into_map();
    extra.remove(SECRET_FIELD);

    FirebaseConfig {
        api_key: take_text(&mut extra, "apiKey"),
        auth_domain: take_text(&mut extra, "authDomain"),
        project_id: take_text(&mut extra, "projectId"),
        storage_bucket: take_text(&mut extra, "storageBucket"),
        app_id: take_text(&mut extra, "appId"),
        extra,
        password: prior.and_then(FirebaseConfig::secret).map(str::to_owned),
    }
}

/// Remove a field and render it as text; numbers and booleans keep their literal form
fn take_text(map: &mut Map<String, Value>, key: &str) -> String {
    match map.remove(key) {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
