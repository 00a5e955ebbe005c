use bytes::{BufMut, Bytes, BytesMut};
use chrono::format::strftime::StrftimeItems;
use chrono::offset::LocalResult;
use chrono::{Local, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tokio_util::codec::Encoder;
use tracing::{debug, warn};

use super::throwable::{
    render_native, BoxedThrowableConverter, DefaultThrowableConverter, ThrowableConverter,
};
use super::write_escaped;
use crate::event::LogEvent;

/// Default timestamp pattern: ISO-8601 with milliseconds and a zone offset.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Config used to build a `JsonLogSerializer`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JsonLogSerializerConfig {
    /// Pattern used to render the event timestamp, in strftime syntax.
    ///
    /// An invalid pattern is reported and replaced by the default at build
    /// time rather than failing the host.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// IANA identifier of the timezone used when rendering the timestamp.
    /// When unset, the local zone of the process is used.
    #[serde(default)]
    pub timestamp_timezone: Option<String>,

    /// Whether to add `threadName`, `threadId` and `threadPriority` members.
    ///
    /// The thread id is captured from the thread running `encode`, which is
    /// not necessarily the thread that produced the event when log dispatch
    /// is asynchronous. Preserved for output compatibility.
    #[serde(default)]
    pub include_thread_info: bool,

    /// Custom strategy for rendering the stack text of an event's error.
    /// Installed programmatically, not via deserialized configuration.
    #[serde(skip)]
    pub throwable_converter: Option<BoxedThrowableConverter>,
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_owned()
}

impl Default for JsonLogSerializerConfig {
    fn default() -> Self {
        Self {
            timestamp_format: default_timestamp_format(),
            timestamp_timezone: None,
            include_thread_info: false,
            throwable_converter: None,
        }
    }
}

impl JsonLogSerializerConfig {
    /// Creates a new `JsonLogSerializerConfig` with default settings.
    pub fn new() -> Self {
        Default::default()
    }

    /// Installs a custom throwable converter, taking precedence over the
    /// built-in rendering strategies.
    pub fn with_throwable_converter(mut self, converter: BoxedThrowableConverter) -> Self {
        debug!("Using a custom throwable converter for stack text rendering.");
        self.throwable_converter = Some(converter);
        self
    }

    /// Build the `JsonLogSerializer` from this configuration. The returned
    /// serializer is started: converter lifecycle hooks have already run and
    /// every `encode` call is valid.
    pub fn build(&self) -> JsonLogSerializer {
        let timezone = self.timestamp_timezone.as_deref().and_then(|id| {
            match id.parse::<Tz>() {
                Ok(timezone) => Some(timezone),
                Err(_) => {
                    warn!(
                        timezone = id,
                        "Unknown timezone identifier, falling back to the local zone."
                    );
                    None
                }
            }
        });
        let timestamp_format = if StrftimeItems::new(&self.timestamp_format).parse().is_ok() {
            self.timestamp_format.clone()
        } else {
            warn!(
                format = self.timestamp_format.as_str(),
                "Invalid timestamp format pattern, falling back to the default."
            );
            default_timestamp_format()
        };
        let throwable_converter = self.throwable_converter.clone().map(|mut converter| {
            converter.start();
            converter
        });
        JsonLogSerializer {
            timestamp_format,
            timezone,
            include_thread_info: self.include_thread_info,
            throwable_converter,
        }
    }
}

/// Serializer that converts a `LogEvent` to a single-line JSON document.
///
/// The record shape is fixed, so members are emitted by hand into the buffer
/// instead of going through a JSON library. Member order is stable: `level`,
/// `message`, the error block when present, metadata entries in insertion
/// order, thread info when enabled, and `timestamp` last. No trailing newline
/// is appended; that is the framer's job.
#[derive(Debug, Clone)]
pub struct JsonLogSerializer {
    timestamp_format: String,
    timezone: Option<Tz>,
    include_thread_info: bool,
    throwable_converter: Option<BoxedThrowableConverter>,
}

impl JsonLogSerializer {
    /// Serializes the event and returns the frozen buffer.
    pub fn to_bytes(&self, event: &LogEvent) -> Bytes {
        let mut buffer = BytesMut::with_capacity(256);
        self.serialize(event, &mut buffer);
        buffer.freeze()
    }

    fn serialize(&self, event: &LogEvent, buffer: &mut BytesMut) {
        buffer.put_u8(b'{');
        write_string_member(buffer, "level", event.level.as_str());
        write_string_member(buffer, "message", &event.message);
        if let Some(proxy) = &event.throwable {
            let stack_trace = if let Some(converter) = &self.throwable_converter {
                converter.convert(event)
            } else if let Some(native) = proxy.native() {
                render_native(native)
            } else {
                DefaultThrowableConverter.convert(event)
            };
            write_string_member(buffer, "errorType", proxy.error_type());
            write_string_member(buffer, "errorMessage", proxy.message().unwrap_or(""));
            write_string_member(buffer, "stackTrace", &stack_trace);
        }
        for (key, value) in &event.metadata {
            write_string_member(buffer, key, value);
        }
        if self.include_thread_info {
            write_string_member(buffer, "threadName", &event.thread_name);
            write_string_member(buffer, "threadId", &current_thread_id());
            write_string_member(buffer, "threadPriority", THREAD_PRIORITY);
        }
        write_string_member(buffer, "timestamp", &self.format_timestamp(event.timestamp_millis));
        buffer.put_u8(b'}');
    }

    fn format_timestamp(&self, millis: i64) -> String {
        match Utc.timestamp_millis_opt(millis) {
            LocalResult::Single(instant) => match self.timezone {
                Some(timezone) => instant
                    .with_timezone(&timezone)
                    .format(&self.timestamp_format)
                    .to_string(),
                None => instant
                    .with_timezone(&Local)
                    .format(&self.timestamp_format)
                    .to_string(),
            },
            // Out-of-range instants degrade to the raw millisecond count
            // rather than failing the encode.
            _ => millis.to_string(),
        }
    }
}

impl Encoder<LogEvent> for JsonLogSerializer {
    type Error = crate::Error;

    fn encode(&mut self, event: LogEvent, buffer: &mut BytesMut) -> Result<(), Self::Error> {
        self.serialize(&event, buffer);
        Ok(())
    }
}

// There is no cross-platform thread priority in std; the JVM default is
// rendered so the member set stays wire-compatible.
const THREAD_PRIORITY: &str = "5";

/// Writes one `"key":"value"` member, escaping both sides, preceded by a
/// comma unless it is the first member of the object.
fn write_string_member(buffer: &mut BytesMut, key: &str, value: &str) {
    if buffer.last() != Some(&b'{') {
        buffer.put_u8(b',');
    }
    buffer.put_u8(b'"');
    write_escaped(buffer, key);
    buffer.put_slice(b"\":\"");
    write_escaped(buffer, value);
    buffer.put_u8(b'"');
}

fn current_thread_id() -> String {
    // ThreadId exposes no stable numeric accessor; its Debug form is
    // "ThreadId(n)", so the digits are extracted from that.
    format!("{:?}", std::thread::current().id())
        .chars()
        .filter(char::is_ascii_digit)
        .collect()
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;
    use crate::event::{LogLevel, ThrowableProxy};

    fn utc_config() -> JsonLogSerializerConfig {
        JsonLogSerializerConfig {
            timestamp_timezone: Some("UTC".into()),
            ..Default::default()
        }
    }

    fn serialize(config: JsonLogSerializerConfig, event: LogEvent) -> String {
        let mut buffer = BytesMut::new();
        config.build().encode(event, &mut buffer).unwrap();
        String::from_utf8(buffer.to_vec()).unwrap()
    }

    #[test]
    fn minimal_event() {
        let event = LogEvent::new(LogLevel::Info, "hello").with_timestamp_millis(0);

        assert_eq!(
            serialize(utc_config(), event),
            r#"{"level":"INFO","message":"hello","timestamp":"1970-01-01T00:00:00.000+0000"}"#
        );
    }

    #[test]
    fn error_block_sits_between_message_and_metadata() {
        let event = LogEvent::new(LogLevel::Error, "boom")
            .with_throwable(
                ThrowableProxy::new("java.lang.RuntimeException", Some("boom".into()))
                    .with_stack_trace("java.lang.RuntimeException: boom\n\tat Handler.run"),
            )
            .with_metadata("requestId", "abc-123")
            .with_timestamp_millis(0);

        assert_eq!(
            serialize(utc_config(), event),
            concat!(
                r#"{"level":"ERROR","message":"boom","#,
                r#""errorType":"java.lang.RuntimeException","errorMessage":"boom","#,
                r#""stackTrace":"java.lang.RuntimeException: boom\n\tat Handler.run","#,
                r#""requestId":"abc-123","timestamp":"1970-01-01T00:00:00.000+0000"}"#
            )
        );
    }

    #[test]
    fn error_without_message_renders_empty_string() {
        let event = LogEvent::new(LogLevel::Error, "boom")
            .with_throwable(ThrowableProxy::new("RuntimeError", None))
            .with_timestamp_millis(0);

        assert_eq!(
            serialize(utc_config(), event),
            concat!(
                r#"{"level":"ERROR","message":"boom","#,
                r#""errorType":"RuntimeError","errorMessage":"","stackTrace":"RuntimeError","#,
                r#""timestamp":"1970-01-01T00:00:00.000+0000"}"#
            )
        );
    }

    #[test]
    fn native_error_renders_cause_chain() {
        let event = LogEvent::new(LogLevel::Error, "boom")
            .with_throwable(ThrowableProxy::from_error(std::io::Error::other("broken pipe")))
            .with_timestamp_millis(0);

        let output = serialize(utc_config(), event);
        assert!(output.contains(r#""errorMessage":"broken pipe""#), "{output}");
        assert!(output.contains(r#""stackTrace":"broken pipe""#), "{output}");
    }

    #[derive(Debug, Clone)]
    struct StaticConverter {
        started: bool,
    }

    impl ThrowableConverter for StaticConverter {
        fn start(&mut self) {
            self.started = true;
        }

        fn convert(&self, _: &LogEvent) -> String {
            assert!(self.started);
            "custom stack".to_owned()
        }
    }

    #[test]
    fn custom_converter_takes_precedence_over_native_rendering() {
        let config = utc_config()
            .with_throwable_converter(Box::new(StaticConverter { started: false }));
        let event = LogEvent::new(LogLevel::Error, "boom")
            .with_throwable(ThrowableProxy::from_error(std::io::Error::other("ignored")))
            .with_timestamp_millis(0);

        let output = serialize(config, event);
        assert!(output.contains(r#""stackTrace":"custom stack""#), "{output}");
    }

    #[test]
    fn thread_info_members_are_strings() {
        let event = LogEvent::new(LogLevel::Info, "hi")
            .with_thread_name("worker-1")
            .with_timestamp_millis(0);
        let config = JsonLogSerializerConfig {
            include_thread_info: true,
            ..utc_config()
        };

        let output = serialize(config, event);
        assert!(output.contains(r#""threadName":"worker-1""#), "{output}");
        assert!(output.contains(r#""threadPriority":"5""#), "{output}");

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        let thread_id = value["threadId"].as_str().expect("threadId must be a string");
        assert!(!thread_id.is_empty());
        assert!(thread_id.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn encoding_twice_is_byte_identical() {
        let event = LogEvent::new(LogLevel::Warn, "again")
            .with_metadata("coldStart", "true")
            .with_timestamp_millis(1_704_067_200_000);
        let config = JsonLogSerializerConfig {
            include_thread_info: true,
            ..utc_config()
        };

        assert_eq!(
            serialize(config.clone(), event.clone()),
            serialize(config, event)
        );
    }

    #[test]
    fn timezone_identifier_shifts_the_rendered_timestamp() {
        let config = JsonLogSerializerConfig {
            timestamp_timezone: Some("America/New_York".into()),
            ..Default::default()
        };
        let event = LogEvent::new(LogLevel::Info, "tz").with_timestamp_millis(0);

        assert_eq!(
            serialize(config, event),
            r#"{"level":"INFO","message":"tz","timestamp":"1969-12-31T19:00:00.000-0500"}"#
        );
    }

    #[test]
    fn invalid_timestamp_pattern_falls_back_to_the_default() {
        let config = JsonLogSerializerConfig {
            timestamp_format: "%Q not a pattern".into(),
            ..utc_config()
        };
        let event = LogEvent::new(LogLevel::Info, "hi").with_timestamp_millis(0);

        assert_eq!(
            serialize(config, event),
            r#"{"level":"INFO","message":"hi","timestamp":"1970-01-01T00:00:00.000+0000"}"#
        );
    }

    #[test]
    fn out_of_range_timestamp_degrades_to_raw_millis() {
        let event = LogEvent::new(LogLevel::Info, "hi").with_timestamp_millis(i64::MAX);

        assert_eq!(
            serialize(utc_config(), event),
            format!(r#"{{"level":"INFO","message":"hi","timestamp":"{}"}}"#, i64::MAX)
        );
    }

    #[test]
    fn to_bytes_matches_encoder_output() {
        let event = LogEvent::new(LogLevel::Info, "hello").with_timestamp_millis(42);
        let serializer = utc_config().build();

        let mut buffer = BytesMut::new();
        serializer.clone().encode(event.clone(), &mut buffer).unwrap();

        assert_eq!(serializer.to_bytes(&event), buffer.freeze());
    }

    #[test]
    fn every_output_is_valid_json() {
        let events = vec![
            LogEvent::new(LogLevel::Trace, "plain"),
            LogEvent::new(LogLevel::Debug, "quo\"te\\and\ncontrol\u{1}"),
            LogEvent::new(LogLevel::Error, "err").with_throwable(
                ThrowableProxy::new("E", Some("line1\nline2".into()))
                    .with_stack_trace("frame \"zero\"\n\tframe one"),
            ),
            LogEvent::new(LogLevel::Info, "meta")
                .with_metadata("key with \"quotes\"", "value with \\ backslash"),
        ];
        let config = JsonLogSerializerConfig {
            include_thread_info: true,
            ..utc_config()
        };

        for event in events {
            let output = serialize(config.clone(), event);
            serde_json::from_str::<serde_json::Value>(&output).expect(&output);
        }
    }
}
