//! Config Controller
//!
//! Drives one config edit: parse the typed text, validate it, carry the stored
//! secret over, persist the candidate with fresh credentials and publish it.
//!
//! ```text
//! Idle ──submit()──► Submitting ──► Succeeded
//!                         │
//!                         └───────► Failed(message)
//! ```

use crate::constants::UPDATED_NOTICE;
use crate::credentials::{merge_secret, validate_fields};
use crate::domain::{ClientSettings, FirebaseConfig};
use crate::error::{Error, Result};
use crate::literal::parse_object;
use crate::services::{
    ConfigRemote, HttpConfigRemote, IdentityProvider, PersistRequest, generate_request_id,
};
use crate::state::{ConfigSink, SubmissionContext};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{Instrument, debug, info, info_span, warn};

/// Result of one `submit()` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Persisted and published
    Updated {
        config: FirebaseConfig,
        notice: &'static str,
    },
    /// The attempt failed; `message` is what the user sees
    Failed { message: Arc<str> },
    /// Another attempt was already in flight, nothing changed
    Busy,
}

impl SubmitOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Updated { notice, .. } => Some(*notice),
            Self::Failed { message } => Some(message.as_ref()),
            Self::Busy => None,
        }
    }
}

/// Config edit controller
pub struct ConfigController<R, I, S> {
    remote: R,
    identity: I,
    sink: S,
    error_prefix: Arc<str>,
    context: Mutex<SubmissionContext>,
}

impl<I: IdentityProvider, S: ConfigSink> ConfigController<HttpConfigRemote, I, S> {
    /// Create a controller persisting over HTTP
    pub fn with_http(settings: &ClientSettings, identity: I, sink: S) -> Result<Self> {
        let remote = HttpConfigRemote::new(settings)?;
        info!(endpoint = remote.endpoint(), "Config controller persisting over HTTP");
        Self::new(remote, identity, sink, settings)
    }
}

impl<R, I, S> ConfigController<R, I, S>
where
    R: ConfigRemote,
    I: IdentityProvider,
    S: ConfigSink,
{
    /// Create a controller; the editor text is seeded from the published config
    pub fn new(remote: R, identity: I, sink: S, settings: &ClientSettings) -> Result<Self> {
        let context = SubmissionContext::seeded(sink.snapshot().as_ref())?;
        Ok(Self {
            remote,
            identity,
            sink,
            error_prefix: settings.error_prefix.as_str().into(),
            context: Mutex::new(context),
        })
    }

    fn context(&self) -> MutexGuard<'_, SubmissionContext> {
        lock(&self.context)
    }

    pub fn set_input(&self, input: impl Into<String>) {
        self.context().set_input(input);
    }

    /// Copy of the editor state for rendering
    pub fn snapshot(&self) -> SubmissionContext {
        self.context().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.context().loading
    }

    /// Return to `Idle`; refused while an attempt is in flight
    pub fn reset(&self) -> Result<()> {
        let mut context = self.context();
        if context.state.is_submitting() {
            return Err(Error::Busy);
        }
        context.reset();
        Ok(())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run one submission attempt with the current input
    ///
    /// Dropping the returned future before it completes puts the controller
    /// back to `Idle` with the input kept.
    pub async fn submit(&self) -> SubmitOutcome {
        let input = {
            let mut context = self.context();
            if context.begin().is_err() {
                debug!("Submit ignored, an attempt is already in flight");
                return SubmitOutcome::Busy;
            }
            context.input.clone()
        };
        let in_flight = InFlight::new(&self.context);

        let request_id = generate_request_id();
        let span = info_span!("config_submit", %request_id);
        let result = self
            .attempt(&input, &request_id)
            .instrument(span.clone())
            .await;

        span.in_scope(|| self.finish(result, in_flight))
    }

    async fn attempt(&self, input: &str, request_id: &str) -> Result<FirebaseConfig> {
        let fields = validate_fields(parse_object(input)?)?;
        let candidate = merge_secret(fields, self.sink.snapshot().as_ref());

        let uid = self.identity.current_uid().ok_or(Error::SignedOut)?;
        let token = self.identity.fetch_token().await?;

        debug!(uid = %uid, has_secret = candidate.has_secret(), "Persisting config");
        self.remote
            .persist(PersistRequest {
                config: &candidate,
                uid: &uid,
                token: &token,
                request_id,
            })
            .await?;

        self.sink.replace(candidate.clone());
        Ok(candidate)
    }

    fn finish(&self, result: Result<FirebaseConfig>, in_flight: InFlight<'_>) -> SubmitOutcome {
        match result {
            Ok(config) => {
                in_flight.settle(SubmissionContext::succeed);
                info!(project_id = %config.project_id, "Config updated");
                SubmitOutcome::Updated {
                    config,
                    notice: UPDATED_NOTICE,
                }
            }
            Err(e) => {
                let message: Arc<str> = e.user_message(&self.error_prefix).into();
                if e.is_local() {
                    info!(error = %message, "Config rejected");
                } else {
                    warn!(error = %message, "Config update failed");
                }
                in_flight.settle(|context| context.fail(message.clone()));
                SubmitOutcome::Failed { message }
            }
        }
    }
}

fn lock(context: &Mutex<SubmissionContext>) -> MutexGuard<'_, SubmissionContext> {
    context.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks an attempt in flight; dropped unsettled, it returns the context to `Idle`
struct InFlight<'a> {
    context: &'a Mutex<SubmissionContext>,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(context: &'a Mutex<SubmissionContext>) -> Self {
        Self {
            context,
            armed: true,
        }
    }

    /// Record the outcome of the attempt
    fn settle(mut self, outcome: impl FnOnce(&mut SubmissionContext)) {
        self.armed = false;
        outcome(&mut *lock(self.context));
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Submission dropped before completing");
            lock(self.context).reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MISSING_FIELDS_MESSAGE;
    use crate::state::{AppConfigStore, SubmissionState};
    use serde_json::Map;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Semaphore;

    const SCENARIO_A: &str = r#"{apiKey:"k1",authDomain:"a.com",projectId:"p1",storageBucket:"p1.appspot.com",appId:"1:1:web:1"}"#;

    #[derive(Debug, Clone)]
    struct Recorded {
        config: FirebaseConfig,
        uid: String,
        token: String,
        request_id: String,
    }

    #[derive(Default)]
    struct FakeRemote {
        calls: Mutex<Vec<Recorded>>,
        failure: Option<&'static str>,
        gate: Option<Arc<Semaphore>>,
        /// Next call never completes
        stall_once: AtomicBool,
    }

    impl FakeRemote {
        fn failing(message: &'static str) -> Self {
            Self {
                failure: Some(message),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Recorded> {
            self.calls.lock().expect("calls").clone()
        }
    }

    impl ConfigRemote for FakeRemote {
        async fn persist(&self, request: PersistRequest<'_>) -> Result<()> {
            self.calls.lock().expect("calls").push(Recorded {
                config: request.config.clone(),
                uid: request.uid.to_string(),
                token: request.token.to_string(),
                request_id: request.request_id.to_string(),
            });

            if self.stall_once.swap(false, Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }

            if let Some(gate) = &self.gate {
                let _permit = gate.acquire().await.map_err(|e| Error::Network {
                    message: e.to_string(),
                })?;
            }

            match self.failure {
                Some(message) => Err(Error::Network {
                    message: message.to_string(),
                }),
                None => Ok(()),
            }
        }
    }

    /// Hands out `tok-1`, `tok-2`, ... for the signed-in user
    #[derive(Default)]
    struct FakeIdentity {
        signed_out: bool,
        token_failure: bool,
        fetched: AtomicUsize,
    }

    impl IdentityProvider for FakeIdentity {
        fn current_uid(&self) -> Option<String> {
            (!self.signed_out).then(|| "user-1".to_string())
        }

        async fn fetch_token(&self) -> Result<String> {
            let n = self.fetched.fetch_add(1, Ordering::SeqCst) + 1;
            if self.token_failure {
                return Err(Error::Network {
                    message: "Firebase: Token has expired".to_string(),
                });
            }
            Ok(format!("tok-{n}"))
        }
    }

    type Controller = ConfigController<FakeRemote, FakeIdentity, AppConfigStore>;

    fn stored(password: Option<&str>) -> FirebaseConfig {
        FirebaseConfig {
            api_key: "k0".to_string(),
            auth_domain: "old.com".to_string(),
            project_id: "p0".to_string(),
            storage_bucket: "p0.appspot.com".to_string(),
            app_id: "1:0:web:0".to_string(),
            extra: Map::new(),
            password: password.map(str::to_owned),
        }
    }

    fn controller(remote: FakeRemote, identity: FakeIdentity, prior: Option<FirebaseConfig>) -> Controller {
        let store = AppConfigStore::new(prior);
        ConfigController::new(remote, identity, store, &ClientSettings::default()).expect("controller")
    }

    #[tokio::test]
    async fn test_first_setup_persists_without_secret() {
        let controller = controller(FakeRemote::default(), FakeIdentity::default(), None);
        controller.set_input(SCENARIO_A);

        let outcome = controller.submit().await;
        assert_eq!(outcome.message(), Some("Firebase credentials updated successfully."));

        let calls = controller.remote.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].config.api_key, "k1");
        assert_eq!(calls[0].config.password, None);
        assert_eq!(calls[0].uid, "user-1");
        assert_eq!(calls[0].token, "tok-1");
        assert!(!calls[0].request_id.is_empty());

        assert_eq!(controller.sink().current(), Some(calls[0].config.clone()));
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.state, SubmissionState::Succeeded);
        assert_eq!(snapshot.error, None);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_missing_field_never_reaches_network() {
        let prior = stored(Some("secret1"));
        let controller = controller(FakeRemote::default(), FakeIdentity::default(), Some(prior.clone()));
        controller.set_input(r#"{apiKey:"k1",authDomain:"a.com",projectId:"p1",storageBucket:"p1.appspot.com"}"#);

        let outcome = controller.submit().await;
        assert_eq!(outcome.message(), Some(MISSING_FIELDS_MESSAGE));

        assert!(controller.remote.calls().is_empty());
        assert_eq!(controller.identity.fetched.load(Ordering::SeqCst), 0);
        assert_eq!(controller.sink().current(), Some(prior));
        assert!(!controller.is_loading());
        assert_eq!(controller.snapshot().error.as_deref(), Some(MISSING_FIELDS_MESSAGE));
    }

    #[tokio::test]
    async fn test_edit_keeps_stored_secret() {
        let controller = controller(
            FakeRemote::default(),
            FakeIdentity::default(),
            Some(stored(Some("secret1"))),
        );
        controller.set_input(r#"{apiKey:"k2",authDomain:"a.com",projectId:"p1",storageBucket:"p1.appspot.com",appId:"1:1:web:1"}"#);

        let outcome = controller.submit().await;
        let SubmitOutcome::Updated { config, .. } = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        assert_eq!(config.api_key, "k2");
        assert_eq!(config.password.as_deref(), Some("secret1"));

        let calls = controller.remote.calls();
        assert_eq!(calls[0].config.password.as_deref(), Some("secret1"));
        assert_eq!(controller.sink().current(), Some(config));
    }

    #[tokio::test]
    async fn test_rejected_persist_keeps_published_config() {
        let prior = stored(Some("secret1"));
        let controller = controller(
            FakeRemote::failing("Firebase: Permission denied"),
            FakeIdentity::default(),
            Some(prior.clone()),
        );
        controller.set_input(SCENARIO_A);

        let outcome = controller.submit().await;
        assert_eq!(
            outcome,
            SubmitOutcome::Failed {
                message: "Permission denied".into()
            }
        );
        assert_eq!(controller.remote.calls().len(), 1);
        assert_eq!(controller.sink().current(), Some(prior));

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.error.as_deref(), Some("Permission denied"));
        assert!(snapshot.state.is_failed());
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_parse_failure_reports_position() {
        let controller = controller(FakeRemote::default(), FakeIdentity::default(), None);
        controller.set_input("{\n  apiKey: process.env.KEY\n}");

        let outcome = controller.submit().await;
        let message = outcome.message().expect("message");
        assert!(message.contains("line 2"), "{message}");
        assert!(controller.remote.calls().is_empty());
    }

    #[tokio::test]
    async fn test_signed_out_fails_before_token_fetch() {
        let identity = FakeIdentity {
            signed_out: true,
            ..FakeIdentity::default()
        };
        let controller = controller(FakeRemote::default(), identity, None);
        controller.set_input(SCENARIO_A);

        let outcome = controller.submit().await;
        assert_eq!(outcome.message(), Some("You must be signed in to update the config."));
        assert_eq!(controller.identity.fetched.load(Ordering::SeqCst), 0);
        assert!(controller.remote.calls().is_empty());
    }

    #[tokio::test]
    async fn test_token_failure_is_surfaced_without_prefix() {
        let identity = FakeIdentity {
            token_failure: true,
            ..FakeIdentity::default()
        };
        let controller = controller(FakeRemote::default(), identity, None);
        controller.set_input(SCENARIO_A);

        let outcome = controller.submit().await;
        assert_eq!(outcome.message(), Some("Token has expired"));
        assert!(controller.remote.calls().is_empty());
        assert_eq!(controller.sink().current(), None);
    }

    #[tokio::test]
    async fn test_resubmit_is_idempotent_with_fresh_tokens() {
        let controller = controller(
            FakeRemote::default(),
            FakeIdentity::default(),
            Some(stored(Some("secret1"))),
        );
        controller.set_input(SCENARIO_A);

        assert!(controller.submit().await.is_updated());
        let after_first = controller.sink().current();
        assert!(controller.submit().await.is_updated());
        assert_eq!(controller.sink().current(), after_first);

        let calls = controller.remote.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].config, calls[1].config);
        assert_eq!(calls[0].token, "tok-1");
        assert_eq!(calls[1].token, "tok-2");
        assert_ne!(calls[0].request_id, calls[1].request_id);
    }

    #[tokio::test]
    async fn test_new_attempt_clears_previous_error() {
        let controller = controller(FakeRemote::default(), FakeIdentity::default(), None);
        controller.set_input("{apiKey: 'k1'}");
        assert!(!controller.submit().await.is_updated());
        assert!(controller.snapshot().error.is_some());

        controller.set_input(SCENARIO_A);
        assert!(controller.submit().await.is_updated());
        assert_eq!(controller.snapshot().error, None);
    }

    #[tokio::test]
    async fn test_submit_while_in_flight_is_refused() {
        let gate = Arc::new(Semaphore::new(0));
        let remote = FakeRemote {
            gate: Some(gate.clone()),
            ..FakeRemote::default()
        };
        let controller = Arc::new(controller(remote, FakeIdentity::default(), None));
        controller.set_input(SCENARIO_A);

        let first = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit().await }
        });
        while controller.remote.calls().is_empty() {
            tokio::task::yield_now().await;
        }

        assert!(controller.is_loading());
        assert_eq!(controller.submit().await, SubmitOutcome::Busy);
        assert!(matches!(controller.reset(), Err(Error::Busy)));

        gate.add_permits(1);
        assert!(first.await.expect("join").is_updated());
        assert_eq!(controller.remote.calls().len(), 1);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn test_abandoned_submit_returns_to_idle() {
        let remote = FakeRemote {
            stall_once: AtomicBool::new(true),
            ..FakeRemote::default()
        };
        let controller = controller(remote, FakeIdentity::default(), None);
        controller.set_input(SCENARIO_A);

        let abandoned = tokio::time::timeout(Duration::from_millis(50), controller.submit()).await;
        assert!(abandoned.is_err());

        let snapshot = controller.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.state, SubmissionState::Idle);
        assert_eq!(snapshot.input, SCENARIO_A);
        assert_eq!(controller.sink().current(), None);

        assert!(controller.reset().is_ok());
        assert!(controller.submit().await.is_updated());
        assert_eq!(controller.remote.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_seeded_input_hides_secret() {
        let controller = controller(
            FakeRemote::default(),
            FakeIdentity::default(),
            Some(stored(Some("secret1"))),
        );
        let input = controller.snapshot().input;
        assert!(input.contains("\"apiKey\": \"k0\""));
        assert!(!input.contains("secret1"));
        assert!(!input.contains("password"));

        // the seeded text is itself a valid submission
        let outcome = controller.submit().await;
        let SubmitOutcome::Updated { config, .. } = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        assert_eq!(config, stored(Some("secret1")));
    }

    #[test]
    fn test_with_http_builds_client() {
        let store = AppConfigStore::default();
        let controller =
            ConfigController::with_http(&ClientSettings::default(), FakeIdentity::default(), store)
                .expect("controller");
        assert!(controller.snapshot().input.is_empty());
    }
}
