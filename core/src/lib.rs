pub mod api;
pub mod client;
pub mod config;
pub mod feed;
pub mod notify;
pub mod poller;
pub mod render;
pub mod session;
pub mod telemetry;
pub mod transport;


pub use api::{ApiClient, Outcome, SessionEvent};
pub use client::ChatClient;
pub use config::{ClientSettings, ConfigError};
pub use feed::{FeedSnapshot, Message};
pub use notify::{MentionAlert, Notifier, Permission};
pub use poller::FeedPoller;
pub use render::RenderSink;
pub use session::{Session, SessionStore};
pub use transport::{ChatTransport, HttpTransport, ScriptedTransport};
