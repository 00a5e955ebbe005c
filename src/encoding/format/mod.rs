//! Serializers that turn a structured log event into bytes.

mod common;
mod json;
mod throwable;

pub use json::{JsonLogSerializer, JsonLogSerializerConfig};
pub use throwable::{BoxedThrowableConverter, DefaultThrowableConverter, ThrowableConverter};

pub(crate) use common::write_escaped;
