//! The JSON string-escaping helper shared by every field emitter.

use bytes::{BufMut, BytesMut};

/// Writes `value` into `buffer` with JSON string escaping applied: quotes,
/// backslashes, and every control character below 0x20. The surrounding
/// quotes are the caller's responsibility.
pub(crate) fn write_escaped(buffer: &mut BytesMut, value: &str) {
    // Runs of unescaped bytes are copied in one put_slice call each.
    let bytes = value.as_bytes();
    let mut start = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        let escape: &[u8] = match byte {
            b'"' => b"\\\"",
            b'\\' => b"\\\\",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            0x08 => b"\\b",
            0x0c => b"\\f",
            byte if byte < 0x20 => {
                buffer.put_slice(&bytes[start..i]);
                buffer.put_slice(format!("\\u{byte:04x}").as_bytes());
                start = i + 1;
                continue;
            }
            _ => continue,
        };
        buffer.put_slice(&bytes[start..i]);
        buffer.put_slice(escape);
        start = i + 1;
    }
    buffer.put_slice(&bytes[start..]);
}
