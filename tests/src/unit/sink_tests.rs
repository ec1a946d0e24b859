use crate::support::test_runtime;
use ripple::StdoutNotifier;
use ripple_core::{Notifier, Permission};

#[test]
fn unknown_permission_is_granted_on_first_request() {
    let runtime = test_runtime();
    let notifier = StdoutNotifier::new(Permission::Unknown);
    assert_eq!(notifier.permission(), Permission::Unknown);

    let resolved = runtime.block_on(notifier.request_permission());
    assert_eq!(resolved, Permission::Granted);
    assert_eq!(notifier.permission(), Permission::Granted);
}

#[test]
fn denied_permission_stays_denied() {
    let runtime = test_runtime();
    let notifier = StdoutNotifier::new(Permission::Denied);
    let resolved = runtime.block_on(notifier.request_permission());
    assert_eq!(resolved, Permission::Denied);
}
