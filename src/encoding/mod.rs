//! A collection of support structures that are used in the process of encoding
//! log events into bytes.

pub mod format;
pub mod framing;

pub use format::{
    BoxedThrowableConverter, DefaultThrowableConverter, JsonLogSerializer,
    JsonLogSerializerConfig, ThrowableConverter,
};
pub use framing::{
    BoxedFramer, BoxedFramingError, CharacterDelimitedEncoder, CharacterDelimitedEncoderConfig,
    Framer, NewlineDelimitedEncoder, NewlineDelimitedEncoderConfig,
};

/// An error that occurred while encoding log events into byte frames.
#[derive(Debug)]
pub enum Error {
    /// The error occurred while encoding the byte frame boundaries.
    FramingError(BoxedFramingError),
    /// The error occurred while serializing a log event into bytes.
    SerializingError(crate::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FramingError(error) => write!(formatter, "FramingError({error})"),
            Self::SerializingError(error) => write!(formatter, "SerializingError({error})"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::FramingError(Box::new(error))
    }
}
