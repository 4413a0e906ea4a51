//! State - Shared Application State
//!
//! The published config store, and the per-edit submission context owned by
//! the config controller.

pub mod config_state;
pub mod submission_state;

pub use config_state::{AppConfigStore, ConfigSink};
pub use submission_state::{SubmissionContext, SubmissionState};
