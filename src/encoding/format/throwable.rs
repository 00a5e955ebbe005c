//! Pluggable strategies for rendering an event's error into stack text.

use std::fmt::Debug;

use dyn_clone::DynClone;

use crate::event::LogEvent;

/// Converts the error attached to a log event into rendered stack text.
///
/// The JSON serializer picks a strategy per event, in priority order: a
/// custom converter installed on the config, the built-in rendering of the
/// native error's cause chain, and finally [`DefaultThrowableConverter`]
/// over the proxy's pre-rendered stack text.
pub trait ThrowableConverter: DynClone + Debug + Send + Sync {
    /// Lifecycle hook invoked once when the serializer is built, before the
    /// first call to `convert`. Converters that keep no state can rely on
    /// the default no-op.
    fn start(&mut self) {}

    /// Renders the stack text for the event's error. Only invoked when the
    /// event carries one.
    fn convert(&self, event: &LogEvent) -> String;
}

dyn_clone::clone_trait_object!(ThrowableConverter);

/// A `Box` containing a `ThrowableConverter`.
pub type BoxedThrowableConverter = Box<dyn ThrowableConverter>;

/// The fallback converter: emits the proxy's pre-rendered stack text when
/// present, otherwise a single `type: message` line.
#[derive(Debug, Clone, Default)]
pub struct DefaultThrowableConverter;

impl ThrowableConverter for DefaultThrowableConverter {
    fn convert(&self, event: &LogEvent) -> String {
        let Some(proxy) = &event.throwable else {
            return String::new();
        };
        match proxy.stack_trace() {
            Some(stack_trace) => stack_trace.to_owned(),
            None => match proxy.message() {
                Some(message) => format!("{}: {}", proxy.error_type(), message),
                None => proxy.error_type().to_owned(),
            },
        }
    }
}

/// Renders a native error and its complete `source()` cause chain, one
/// `Caused by:` line per link.
pub(crate) fn render_native(error: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str("\nCaused by: ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
