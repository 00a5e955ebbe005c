//! The structured log event consumed by the serializers.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

/// Severity of a log event, rendered by its canonical upper-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Finest-grained diagnostic events.
    Trace,
    /// Diagnostic events useful during development.
    Debug,
    /// Routine operational events.
    Info,
    /// Potentially harmful situations.
    Warn,
    /// Failures that still allow the host to continue running.
    Error,
}

impl LogLevel {
    /// The canonical display name of the level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A serializable representation of an error, independent of any live error
/// value: type name, optional message, optional pre-rendered stack text, and
/// optionally a handle to the native error itself so the full `source()`
/// cause chain can be walked at serialization time.
#[derive(Debug, Clone)]
pub struct ThrowableProxy {
    error_type: String,
    message: Option<String>,
    stack_trace: Option<String>,
    native: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl ThrowableProxy {
    /// Creates a proxy from an error type name and an optional message.
    pub fn new(error_type: impl Into<String>, message: Option<String>) -> Self {
        Self {
            error_type: error_type.into(),
            message,
            stack_trace: None,
            native: None,
        }
    }

    /// Creates a proxy that keeps a handle to the native error, so the
    /// serializer can render its complete cause chain.
    pub fn from_error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            error_type: std::any::type_name::<E>().to_owned(),
            message: Some(error.to_string()),
            stack_trace: None,
            native: Some(Arc::new(error)),
        }
    }

    /// Attaches pre-rendered stack text to the proxy.
    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    /// The error type name.
    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    /// The error message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The pre-rendered stack text, if any.
    pub fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }

    /// The native error handle, if the proxy was built from a live error.
    pub fn native(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.native
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// A single structured log event.
///
/// The message is expected to be fully formatted already; the serializer does
/// no interpolation. Metadata is an insertion-ordered string map, so callers
/// that care about member ordering in the output control it by insertion
/// order here.
#[derive(Debug, Clone)]
pub struct LogEvent {
    /// Severity of the event.
    pub level: LogLevel,
    /// The fully formatted message.
    pub message: String,
    /// The error attached to the event, if any.
    pub throwable: Option<ThrowableProxy>,
    /// Contextual key/value metadata attached to the event.
    pub metadata: IndexMap<String, String>,
    /// Name of the thread that produced the event.
    pub thread_name: String,
    /// Event time as milliseconds since the Unix epoch.
    pub timestamp_millis: i64,
}

impl LogEvent {
    /// Creates an event with the given level and formatted message.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            throwable: None,
            metadata: IndexMap::new(),
            thread_name: std::thread::current().name().unwrap_or_default().to_owned(),
            timestamp_millis: 0,
        }
    }

    /// Attaches an error to the event.
    pub fn with_throwable(mut self, throwable: ThrowableProxy) -> Self {
        self.throwable = Some(throwable);
        self
    }

    /// Adds a contextual metadata entry, preserving insertion order.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Overrides the producing thread's name.
    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    /// Sets the event time, in milliseconds since the Unix epoch.
    pub fn with_timestamp_millis(mut self, timestamp_millis: i64) -> Self {
        self.timestamp_millis = timestamp_millis;
        self
    }
}
