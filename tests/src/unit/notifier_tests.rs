use crate::support::{test_runtime, RecordingNotifier};
use ripple_core::notify::{self, Permission};
use ripple_core::{FeedSnapshot, Message, Notifier};
use std::sync::atomic::Ordering;

fn snapshot(entries: &[(&str, &str)]) -> FeedSnapshot {
    FeedSnapshot::new(
        entries
            .iter()
            .map(|(sender, content)| {
                Message::new(
                    *sender,
                    *content,
                    "2026-08-28T14:05:00Z".parse().expect("timestamp"),
                )
            })
            .collect(),
    )
}

#[test]
fn unknown_permission_requests_once_and_dispatches_when_granted() {
    let runtime = test_runtime();
    let notifier = RecordingNotifier::with_permission(Permission::Unknown);
    let alerts = notify::evaluate(
        &FeedSnapshot::default(),
        &snapshot(&[("bob", "hey alice"), ("carol", "alice?")]),
        Some("alice"),
    );
    assert_eq!(alerts.len(), 2);

    let dispatched = runtime.block_on(notify::dispatch_alerts(&notifier, &alerts));
    assert_eq!(dispatched, 2);
    assert_eq!(notifier.permission_requests.load(Ordering::SeqCst), 1);
    assert_eq!(notifier.permission(), Permission::Granted);
}

#[test]
fn alerts_dropped_on_denial_are_not_retried_next_cycle() {
    let runtime = test_runtime();
    let notifier = RecordingNotifier::denying_requests();

    let first = snapshot(&[("bob", "hey alice")]);
    let alerts = notify::evaluate(&FeedSnapshot::default(), &first, Some("alice"));
    assert_eq!(alerts.len(), 1);
    assert_eq!(runtime.block_on(notify::dispatch_alerts(&notifier, &alerts)), 0);

    // The same message is no longer new next cycle, so the dropped alert is
    // gone for good.
    let alerts = notify::evaluate(&first, &snapshot(&[("bob", "hey alice")]), Some("alice"));
    assert!(alerts.is_empty());
    assert!(notifier.dispatched.lock().is_empty());
}

#[test]
fn denied_permission_never_even_requests() {
    let runtime = test_runtime();
    let notifier = RecordingNotifier::with_permission(Permission::Denied);
    let alerts = notify::evaluate(
        &FeedSnapshot::default(),
        &snapshot(&[("bob", "hey alice")]),
        Some("alice"),
    );

    let dispatched = runtime.block_on(notify::dispatch_alerts(&notifier, &alerts));
    assert_eq!(dispatched, 0);
    assert_eq!(notifier.permission_requests.load(Ordering::SeqCst), 0);
    assert!(notifier.dispatched.lock().is_empty());
}

#[test]
fn empty_alert_lists_skip_the_permission_machinery() {
    let runtime = test_runtime();
    let notifier = RecordingNotifier::with_permission(Permission::Unknown);
    assert_eq!(runtime.block_on(notify::dispatch_alerts(&notifier, &[])), 0);
    assert_eq!(notifier.permission_requests.load(Ordering::SeqCst), 0);
}

#[test]
fn a_mention_fires_once_then_stays_quiet_across_cycles() {
    let empty = FeedSnapshot::default();
    let first = snapshot(&[("bob", "hey alice")]);
    let second = snapshot(&[("bob", "hey alice")]);
    let third = snapshot(&[("bob", "hey alice"), ("carol", "unrelated")]);

    let alerts = notify::evaluate(&empty, &first, Some("alice"));
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].title, "New mention in Ripple");
    assert_eq!(alerts[0].body, "bob: hey alice");

    assert!(notify::evaluate(&first, &second, Some("alice")).is_empty());
    assert!(notify::evaluate(&second, &third, Some("alice")).is_empty());
}
