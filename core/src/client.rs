use crate::api::{ApiClient, Outcome, SessionEvent};
use crate::notify::Notifier;
use crate::poller::FeedPoller;
use crate::render::RenderSink;
use crate::session::SessionStore;
use crate::transport::ChatTransport;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::info;

/// Wires the session store, requester, poller, notifier and render sink
/// together and reacts to session-change events.
#[derive(Clone)]
pub struct ChatClient {
    api: ApiClient,
    poller: FeedPoller,
    render: Arc<dyn RenderSink>,
    session: SessionStore,
}

impl ChatClient {
    /// Builds the runtime and hands back the session-event receiver; feed it
    /// to [`ChatClient::spawn_event_loop`] or drain it by hand in tests.
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        session: SessionStore,
        render: Arc<dyn RenderSink>,
        notifier: Arc<dyn Notifier>,
        poll_interval: Duration,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (api, events_rx) = ApiClient::new(transport, session.clone());
        let poller = FeedPoller::new(api.clone(), render.clone(), notifier, poll_interval);
        (
            Self {
                api,
                poller,
                render,
                session,
            },
            events_rx,
        )
    }

    pub fn poller(&self) -> &FeedPoller {
        &self.poller
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Applies one session-change event: starts or stops polling and swaps
    /// the rendered view.
    pub fn apply_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::SignedIn { identity } => {
                info!(%identity, "signed in");
                self.render.show_authenticated(&identity);
                self.poller.start();
            }
            SessionEvent::SignedOut => {
                info!("signed out");
                self.poller.stop();
                self.poller.reset();
                self.render.show_anonymous();
            }
            SessionEvent::Expired => {
                info!("session expired, returning to anonymous view");
                self.poller.stop();
                self.poller.reset();
                self.render
                    .set_status("Session expired, please log in again.", true);
                self.render.show_anonymous();
            }
        }
    }

    pub fn spawn_event_loop(&self, mut events_rx: UnboundedReceiver<SessionEvent>) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                client.apply_event(event);
            }
        })
    }

    /// On process start: if a session survived, enter authenticated mode and
    /// start polling without re-validating the token; the first protected
    /// call decides whether it is still good.
    pub fn resume(&self) -> bool {
        let session = self.session.get();
        let Some(identity) = session.identity.filter(|_| session.token.is_some()) else {
            self.render.show_anonymous();
            return false;
        };
        info!(%identity, "resuming stored session");
        self.render.show_authenticated(&identity);
        self.poller.start();
        true
    }

    /// Returns whether registration succeeded; failures are surfaced through
    /// the render sink as transient status text.
    pub async fn register(&self, identity: &str, secret: &str) -> bool {
        match self.api.register(identity, secret).await {
            Ok(Outcome::Success(())) => {
                self.render.set_status("Successfully registered!", false);
                true
            }
            Ok(outcome) => self.surface_failure(outcome),
            Err(err) => self.surface_transport(&err),
        }
    }

    pub async fn login(&self, identity: &str, secret: &str) -> bool {
        match self.api.login(identity, secret).await {
            Ok(Outcome::Success(_token)) => {
                self.render.set_status("", false);
                true
            }
            Ok(outcome) => self.surface_failure(outcome),
            Err(err) => self.surface_transport(&err),
        }
    }

    pub async fn send_message(&self, content: &str) -> bool {
        match self.api.send_message(content).await {
            Ok(Outcome::Success(())) => {
                self.render.set_status("", false);
                true
            }
            Ok(outcome) => self.surface_failure(outcome),
            Err(err) => self.surface_transport(&err),
        }
    }

    pub fn logout(&self) {
        self.api.logout();
    }

    fn surface_failure<T>(&self, outcome: Outcome<T>) -> bool {
        if let Outcome::OtherFailure(message) = outcome {
            self.render.set_status(&format!("Error: {message}"), true);
        }
        // AuthFailure already cleared the session and announced `Expired`;
        // the view transition is the only user-visible signal.
        false
    }

    fn surface_transport(&self, err: &crate::transport::TransportError) -> bool {
        self.render.set_status(&format!("Error: {err}"), true);
        false
    }
}
