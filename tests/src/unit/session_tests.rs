use crate::support::{test_runtime, RecordingNotifier, RecordingSink, View};
use ripple_core::{ChatClient, Permission, ScriptedTransport, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn client_for(
    session: SessionStore,
) -> (ChatClient, Arc<RecordingSink>, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::new());
    let sink = Arc::new(RecordingSink::default());
    let notifier = Arc::new(RecordingNotifier::with_permission(Permission::Granted));
    let (client, _events) = ChatClient::new(
        transport.clone(),
        session,
        sink.clone(),
        notifier,
        Duration::from_millis(10),
    );
    (client, sink, transport)
}

#[test]
fn a_stored_session_resumes_into_authenticated_mode() {
    let runtime = test_runtime();
    let state_dir = TempDir::new().expect("state dir");

    // First process: sign-in state written to disk.
    SessionStore::new(state_dir.path().to_path_buf())
        .set("abc123", "alice")
        .expect("persist session");

    // Second process: a fresh store over the same directory picks it up.
    let session = SessionStore::new(state_dir.path().to_path_buf());
    let (client, sink, transport) = client_for(session);
    transport.push_success("[]");

    runtime.block_on(async {
        assert!(client.resume());
        assert!(client.poller().is_running());
        tokio::time::sleep(Duration::from_millis(30)).await;
        client.poller().stop();
    });

    assert_eq!(sink.last_view(), Some(View::Authenticated("alice".into())));
    // Resume never re-validates the token; the poll cycle is the first call.
    assert_eq!(transport.requests()[0].bearer.as_deref(), Some("abc123"));
}

#[test]
fn resume_without_a_session_stays_anonymous() {
    let runtime = test_runtime();
    let (client, sink, transport) = client_for(SessionStore::in_memory());

    runtime.block_on(async {
        assert!(!client.resume());
    });

    assert!(!client.poller().is_running());
    assert_eq!(sink.last_view(), Some(View::Anonymous));
    assert!(transport.requests().is_empty());
}

#[test]
fn logout_clears_the_store_even_when_repeated() {
    let runtime = test_runtime();
    let session = SessionStore::in_memory();
    session.set("abc123", "alice").expect("session");
    let (client, _sink, _transport) = client_for(session.clone());

    runtime.block_on(async {
        client.logout();
        assert!(!session.get().is_signed_in());
        client.logout();
        assert!(!session.get().is_signed_in());
    });
}
