mod notifier_tests;
mod session_tests;
mod sink_tests;
