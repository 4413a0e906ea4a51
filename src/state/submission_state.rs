//! SubmissionContext - Editor State for One Config Edit

use crate::domain::FirebaseConfig;
use crate::error::{Error, Result};
use crate::literal::editable_text;
use std::sync::Arc;

/// Phase of the current submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    /// No attempt running
    #[default]
    Idle,
    /// Attempt in flight
    Submitting,
    /// Last attempt persisted and published
    Succeeded,
    /// Last attempt failed
    Failed(Arc<str>),
}

impl SubmissionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Get error message if any
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Input text, error and progress of the config editor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionContext {
    /// Raw text as typed
    pub input: String,
    /// Message from the last failed attempt
    pub error: Option<Arc<str>>,
    pub loading: bool,
    pub state: SubmissionState,
}

impl SubmissionContext {
    /// Context whose input is the editable form of `config`
    pub fn seeded(config: Option<&FirebaseConfig>) -> Result<Self> {
        Ok(Self {
            input: editable_text(config)?,
            ..Self::default()
        })
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Enter `Submitting`, clearing the previous error
    ///
    /// Refused with [`Error::Busy`] while an attempt is in flight; the context
    /// is left untouched in that case.
    pub fn begin(&mut self) -> Result<()> {
        if self.state.is_submitting() {
            return Err(Error::Busy);
        }
        self.error = None;
        self.loading = true;
        self.state = SubmissionState::Submitting;
        Ok(())
    }

    pub fn succeed(&mut self) {
        self.error = None;
        self.loading = false;
        self.state = SubmissionState::Succeeded;
    }

    pub fn fail(&mut self, message: impl Into<Arc<str>>) {
        let message = message.into();
        self.error = Some(message.clone());
        self.loading = false;
        self.state = SubmissionState::Failed(message);
    }

    /// Back to `Idle` with the input kept
    pub fn reset(&mut self) {
        self.error = None;
        self.loading = false;
        self.state = SubmissionState::Idle;
    }
}
