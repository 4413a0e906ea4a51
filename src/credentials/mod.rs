//! Credential Checks
//!
//! Validation of freshly parsed configs and the merge that carries the stored
//! secret into the candidate config.

mod merge;
mod validate;

pub use merge::*;
pub use validate::*;
