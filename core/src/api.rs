use crate::feed::Message;
use crate::session::SessionStore;
use crate::transport::{ApiRequest, ApiResponse, ChatTransport, Method, TransportError};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// Exact body text the server uses to signal a stale or invalid token.
/// This is the only place in the crate that knows about it; everything else
/// sees a structured [`Outcome`].
const AUTH_SENTINEL: &str = "Invalid or expired token";

/// Classified result of one call. Transport-level failures are not part of
/// this type; they propagate separately as [`TransportError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    AuthFailure,
    OtherFailure(String),
}

/// Session lifecycle changes, announced over an unbounded channel so the
/// orchestrator can start or stop the poller and swap the rendered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { identity: String },
    SignedOut,
    Expired,
}

/// Issues calls against the chat service, injecting the bearer token on
/// protected endpoints and tearing the session down when the server reports
/// an authentication failure.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn ChatTransport>,
    session: SessionStore,
    events_tx: UnboundedSender<SessionEvent>,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        session: SessionStore,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (events_tx, events_rx) = unbounded_channel();
        (
            Self {
                transport,
                session,
                events_tx,
            },
            events_rx,
        )
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn register(
        &self,
        identity: &str,
        secret: &str,
    ) -> Result<Outcome<()>, TransportError> {
        let outcome = self
            .call(
                Method::Post,
                "/register",
                false,
                Some(json!({ "nickname": identity, "password": secret })),
            )
            .await?;
        Ok(discard_body(outcome))
    }

    /// On success the returned token is persisted together with the identity
    /// it was issued for, and `SignedIn` is announced.
    pub async fn login(
        &self,
        identity: &str,
        secret: &str,
    ) -> Result<Outcome<String>, TransportError> {
        let outcome = self
            .call(
                Method::Post,
                "/login",
                false,
                Some(json!({ "nickname": identity, "password": secret })),
            )
            .await?;
        match outcome {
            Outcome::Success(response) => {
                let token = response.body;
                if let Err(err) = self.session.set(token.clone(), identity) {
                    warn!(%err, "failed to persist session after login");
                }
                self.events_tx
                    .send(SessionEvent::SignedIn {
                        identity: identity.to_owned(),
                    })
                    .ok();
                Ok(Outcome::Success(token))
            }
            Outcome::AuthFailure => Ok(Outcome::AuthFailure),
            Outcome::OtherFailure(message) => Ok(Outcome::OtherFailure(message)),
        }
    }

    pub async fn send_message(&self, content: &str) -> Result<Outcome<()>, TransportError> {
        let outcome = self
            .call(Method::Post, "/send", true, Some(json!({ "content": content })))
            .await?;
        Ok(discard_body(outcome))
    }

    pub async fn fetch_feed(&self) -> Result<Outcome<Vec<Message>>, TransportError> {
        let outcome = self.call(Method::Get, "/messages", true, None).await?;
        match outcome {
            Outcome::Success(response) => {
                let messages: Vec<Message> = serde_json::from_str(&response.body)?;
                Ok(Outcome::Success(messages))
            }
            Outcome::AuthFailure => Ok(Outcome::AuthFailure),
            Outcome::OtherFailure(message) => Ok(Outcome::OtherFailure(message)),
        }
    }

    /// Clears the session and announces `SignedOut`. Safe to call while
    /// already signed out.
    pub fn logout(&self) {
        if let Err(err) = self.session.clear() {
            warn!(%err, "failed to clear session on logout");
        }
        self.events_tx.send(SessionEvent::SignedOut).ok();
    }

    async fn call(
        &self,
        method: Method,
        path: &'static str,
        protected: bool,
        body: Option<serde_json::Value>,
    ) -> Result<Outcome<ApiResponse>, TransportError> {
        let bearer = protected.then(|| self.session.get().token).flatten();
        let response = self
            .transport
            .execute(ApiRequest {
                method,
                path,
                bearer,
                body,
            })
            .await?;
        let outcome = classify(response);
        if matches!(outcome, Outcome::AuthFailure) {
            debug!(path, "server rejected token, tearing session down");
            self.expire();
        }
        Ok(outcome)
    }

    fn expire(&self) {
        if let Err(err) = self.session.clear() {
            warn!(%err, "failed to clear session after auth failure");
        }
        self.events_tx.send(SessionEvent::Expired).ok();
    }
}

/// Sentinel-text adapter: the one place literal server text becomes a
/// structured outcome.
fn classify(response: ApiResponse) -> Outcome<ApiResponse> {
    if response.ok {
        return Outcome::Success(response);
    }
    if response.body == AUTH_SENTINEL {
        Outcome::AuthFailure
    } else {
        Outcome::OtherFailure(response.body)
    }
}

fn discard_body(outcome: Outcome<ApiResponse>) -> Outcome<()> {
    match outcome {
        Outcome::Success(_) => Outcome::Success(()),
        Outcome::AuthFailure => Outcome::AuthFailure,
        Outcome::OtherFailure(message) => Outcome::OtherFailure(message),
    }
}
