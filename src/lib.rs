//! A codec for serializing structured log events into single-line JSON byte
//! frames without going through a general-purpose JSON library.
//!
//! The serializer hand-emits the fixed shape of a log record (level, message,
//! optional error block, contextual metadata, optional thread info, formatted
//! timestamp) into a growable buffer, escaping every string value along the
//! way. Framing (e.g. appending a newline between records) is a separate
//! concern handled by the encoders in [`encoding::framing`].

#![deny(missing_docs)]
#![deny(warnings)]

pub mod encoding;
pub mod event;

pub use encoding::{
    BoxedFramer, BoxedFramingError, BoxedThrowableConverter, CharacterDelimitedEncoder,
    CharacterDelimitedEncoderConfig, DefaultThrowableConverter, Framer, JsonLogSerializer,
    JsonLogSerializerConfig, NewlineDelimitedEncoder, NewlineDelimitedEncoderConfig,
    ThrowableConverter,
};
pub use event::{LogEvent, LogLevel, ThrowableProxy};

/// An error that can be returned from fallible codec plumbing.
pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A `Result` specialized on the crate-wide boxed [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
