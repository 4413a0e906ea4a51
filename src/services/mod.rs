//! Service Layer
//!
//! Abstraction over the external collaborators of a submission: the auth
//! session that supplies request credentials, and the remote store that
//! persists the config.
//!
//! ```text
//! ConfigController ──► IdentityProvider::fetch_token()
//!        │
//!        └───────────► ConfigRemote::persist()  ──►  POST /api/config
//! ```

mod identity;
mod remote;

pub use identity::*;
pub use remote::*;
