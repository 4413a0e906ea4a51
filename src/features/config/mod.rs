mod controller;

pub use controller::{ConfigController, SubmitOutcome};
