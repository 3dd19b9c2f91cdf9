use crate::backends::http::HttpCompletionBackend;
use crate::backends::CompletionBackend;
use crate::completion::CompletionRequest;
use crate::config::ChatConfig;
use crate::failure::FailureKind;
use crate::fallback::FallbackResponder;
use chatdeck_core::{Message, SessionId};
use chatdeck_session::{Preferences, SessionRepository};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Receives the "thinking" start/stop notifications of a send.
pub trait ActivityIndicator: Send + Sync {
    /// Called once a request is about to go out.
    fn thinking_started(&self);
    /// Called once per started request, on every exit path.
    fn thinking_finished(&self);
}

/// Indicator that shows nothing.
pub struct NoopIndicator;

impl ActivityIndicator for NoopIndicator {
    fn thinking_started(&self) {}
    fn thinking_finished(&self) {}
}

/// Whether a completion request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Ready to send.
    Idle,
    /// A request is in flight.
    Sending,
}

/// Where an assistant reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    /// The completion endpoint answered.
    Remote,
    /// The endpoint failed and the local responder answered.
    Fallback(FailureKind),
}

/// What [`ChatController::send`] did with one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The input was blank.
    Ignored,
    /// Another request was already in flight.
    Rejected,
    /// The reply was appended to `session_id`.
    Replied {
        /// Session the request came from.
        session_id: SessionId,
        /// The appended assistant message.
        reply: Message,
        /// Remote answer or fallback.
        source: ReplySource,
    },
}

/// Clears the in-flight flag, and the indicator if it was shown, on every
/// exit path of a send, including a dropped future.
struct InFlightGuard<'a> {
    sending: &'a AtomicBool,
    indicator: &'a dyn ActivityIndicator,
    shown: bool,
}

impl<'a> InFlightGuard<'a> {
    /// Claims the in-flight slot, or returns `None` if it is taken.
    fn claim(sending: &'a AtomicBool, indicator: &'a dyn ActivityIndicator) -> Option<Self> {
        sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self {
            sending,
            indicator,
            shown: false,
        })
    }

    fn show(&mut self) {
        self.indicator.thinking_started();
        self.shown = true;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.shown {
            self.indicator.thinking_finished();
        }
        self.sending.store(false, Ordering::Release);
    }
}

/// Single owner of the chat state: the session repository, preferences, and
/// the one outstanding completion request.
///
/// State machine: `Idle -> Sending -> Idle`. A send while `Sending` is
/// rejected, never queued. Failures are always answered locally.
pub struct ChatController {
    repo: Mutex<SessionRepository>,
    prefs: Preferences,
    backend: Box<dyn CompletionBackend>,
    fallback: FallbackResponder,
    indicator: Arc<dyn ActivityIndicator>,
    sending: AtomicBool,
    user_name: String,
    history_window: usize,
}

impl ChatController {
    /// A controller talking to the HTTP endpoint in `config`.
    pub fn new(config: ChatConfig, repo: SessionRepository, prefs: Preferences) -> Self {
        let backend = Box::new(HttpCompletionBackend::new(&config));
        Self::with_backend(config, repo, prefs, backend)
    }

    /// Create with a pre-built backend (tests, alternative transports).
    pub fn with_backend(
        config: ChatConfig,
        repo: SessionRepository,
        prefs: Preferences,
        backend: Box<dyn CompletionBackend>,
    ) -> Self {
        Self {
            repo: Mutex::new(repo),
            prefs,
            backend,
            fallback: FallbackResponder::new(config.user_name.clone()),
            indicator: Arc::new(NoopIndicator),
            sending: AtomicBool::new(false),
            user_name: config.user_name,
            history_window: config.history_window,
        }
    }

    /// Replaces the default no-op indicator.
    pub fn with_indicator(mut self, indicator: Arc<dyn ActivityIndicator>) -> Self {
        self.indicator = indicator;
        self
    }

    /// `Sending` while a request is in flight.
    pub fn state(&self) -> RequestState {
        if self.sending.load(Ordering::Acquire) {
            RequestState::Sending
        } else {
            RequestState::Idle
        }
    }

    /// Exclusive access to the sessions for commands issued between sends.
    ///
    /// Never held across the remote call, so this does not block on it.
    pub async fn sessions(&self) -> MutexGuard<'_, SessionRepository> {
        self.repo.lock().await
    }

    /// Theme and profile storage.
    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// Name used when addressing the user.
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Sends `text` as the user and appends the reply.
    ///
    /// The user message is appended and persisted before the request goes
    /// out. The reply lands in the session the request came from, even if the
    /// current session changed in the meantime.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }
        let Some(mut guard) = InFlightGuard::claim(&self.sending, self.indicator.as_ref()) else {
            debug!("Send rejected, a request is already in flight");
            return SendOutcome::Rejected;
        };

        self.prefs.record_question(&self.user_name, text).await;

        let (session_id, request) = {
            let mut repo = self.repo.lock().await;
            repo.append_to_current(Message::user(text)).await;
            let history = repo.active().recent(self.history_window).to_vec();
            let request = CompletionRequest {
                message: text.to_string(),
                history,
            };
            (repo.current_id().clone(), request)
        };

        guard.show();
        let (content, source) = match self.backend.complete(&request).await {
            Ok(reply) => (reply, ReplySource::Remote),
            Err(e) => {
                let kind = FailureKind::classify(&e);
                warn!(error = %e, ?kind, "Completion request failed, answering locally");
                let fallback = self.fallback.respond(text);
                (
                    format!("{}\n\n{}", kind.prefix(), fallback),
                    ReplySource::Fallback(kind),
                )
            }
        };

        let reply = Message::assistant(content);
        let appended = self
            .repo
            .lock()
            .await
            .append_message(session_id.as_str(), reply.clone())
            .await;
        if appended {
            info!(session = %session_id, ?source, "Reply appended");
        }
        drop(guard);

        SendOutcome::Replied {
            session_id,
            reply,
            source,
        }
    }
}
