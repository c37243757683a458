//! Opaque cursor codec.
//!
//! Cursors are Relay global ids: standard base64 of `"type:key"`. The type
//! tag never contains `:`, the key may.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::CursorError;
use crate::ports::Cursor;

/// Type tag and record key carried by a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCursor {
    pub type_name: String,
    pub key: String,
}

/// Encode a record key into an opaque cursor.
pub fn encode(type_name: &str, key: &str) -> Cursor {
    debug_assert!(!type_name.contains(':'), "type tag must not contain ':'");
    Cursor::new(STANDARD.encode(format!("{type_name}:{key}")))
}

/// Decode a cursor into its type tag and key.
pub fn decode(cursor: &str) -> Result<DecodedCursor, CursorError> {
    let bytes = STANDARD
        .decode(cursor)
        .map_err(|_| CursorError::InvalidEncoding)?;
    let text = String::from_utf8(bytes).map_err(|_| CursorError::InvalidUtf8)?;

    match text.split_once(':') {
        Some((type_name, key)) if !type_name.is_empty() => Ok(DecodedCursor {
            type_name: type_name.to_string(),
            key: key.to_string(),
        }),
        _ => Err(CursorError::MissingTypeTag),
    }
}

/// Decode a cursor and check it belongs to `expected_type`.
pub fn decode_key(cursor: &str, expected_type: &str) -> Result<String, CursorError> {
    let decoded = decode(cursor)?;
    if decoded.type_name != expected_type {
        return Err(CursorError::TypeMismatch {
            expected: expected_type.to_string(),
            found: decoded.type_name,
        });
    }
    Ok(decoded.key)
}
