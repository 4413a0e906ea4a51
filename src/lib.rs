//! Firefiles Config Core
//!
//! Lets a signed-in user paste the Firebase connection credentials their file
//! storage runs against, checks them, and persists them to the backend without
//! ever re-entering or exposing the stored secret.
//!
//! The pipeline, driven by [`features::config::ConfigController`]:
//!
//! ```text
//! text ─► literal::parse_object ─► credentials::validate_fields
//!      ─► credentials::merge_secret ─► ConfigRemote::persist ─► ConfigSink::replace
//! ```

pub mod constants;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod features;
pub mod helpers;
pub mod literal;
pub mod services;
pub mod state;

pub use error::{Error, Result};
