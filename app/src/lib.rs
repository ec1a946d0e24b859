pub mod sink;

pub use sink::{StdoutNotifier, TerminalSink};
