use crate::feed::Message;

/// Where reconciled feed state and transient status text end up. The actual
/// drawing (and the self-clearing status timeout) is the implementor's
/// concern; the runtime only pushes state through this seam.
pub trait RenderSink: Send + Sync {
    /// Redraws the visible feed from an ordered message sequence.
    fn show_feed(&self, messages: &[Message]);

    /// Displays transient status text. `is_error` selects the error styling.
    fn set_status(&self, message: &str, is_error: bool);

    /// Switches to the signed-in view for `identity`.
    fn show_authenticated(&self, identity: &str);

    /// Switches to the anonymous (login/register) view.
    fn show_anonymous(&self);
}
