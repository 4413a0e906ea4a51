//! Domain - Pure Data Structures
//!
//! The credential config itself and the client settings used to reach the
//! remote store.

pub mod config;
pub mod settings;

pub use config::FirebaseConfig;
pub use settings::{ClientSettings, settings_path};
