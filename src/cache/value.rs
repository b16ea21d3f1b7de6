//! Stored Value Module
//!
//! Typed values held by the store and the converters that read them back.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

// == Stored Value ==
/// A value as held by the store. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum StoredValue {
    Text(String),
    Bytes(Vec<u8>),
    Integer(i64),
    Float(f64),
}

impl StoredValue {
    /// Byte representation read by converters.
    ///
    /// Text is UTF-8, integers use their decimal form, floats always keep a
    /// fractional or exponent part (`2.0`, `1e20`), bytes are returned as is.
    pub fn encode(&self) -> Cow<'_, [u8]> {
        match self {
            StoredValue::Text(s) => Cow::Borrowed(s.as_bytes()),
            StoredValue::Bytes(b) => Cow::Borrowed(b.as_slice()),
            StoredValue::Integer(i) => Cow::Owned(i.to_string().into_bytes()),
            StoredValue::Float(f) => Cow::Owned(format!("{:?}", f).into_bytes()),
        }
    }
}

impl From<String> for StoredValue {
    fn from(value: String) -> Self {
        StoredValue::Text(value)
    }
}

impl From<&str> for StoredValue {
    fn from(value: &str) -> Self {
        StoredValue::Text(value.to_string())
    }
}

impl From<Vec<u8>> for StoredValue {
    fn from(value: Vec<u8>) -> Self {
        StoredValue::Bytes(value)
    }
}

impl From<&[u8]> for StoredValue {
    fn from(value: &[u8]) -> Self {
        StoredValue::Bytes(value.to_vec())
    }
}

impl From<i64> for StoredValue {
    fn from(value: i64) -> Self {
        StoredValue::Integer(value)
    }
}

impl From<i32> for StoredValue {
    fn from(value: i32) -> Self {
        StoredValue::Integer(value.into())
    }
}

impl From<f64> for StoredValue {
    fn from(value: f64) -> Self {
        StoredValue::Float(value)
    }
}

// == Converters ==
// Each converter reads the encoded bytes and refuses to coerce anything it
// cannot parse exactly.

/// Decodes the value as UTF-8 text.
pub fn to_text(value: &StoredValue) -> Result<String> {
    match value {
        StoredValue::Text(s) => Ok(s.clone()),
        other => String::from_utf8(other.encode().into_owned())
            .map_err(|e| CacheError::ConversionFailure(format!("not valid UTF-8: {}", e))),
    }
}

/// Parses the value as a signed 64-bit integer.
pub fn to_int(value: &StoredValue) -> Result<i64> {
    if let StoredValue::Integer(i) = value {
        return Ok(*i);
    }
    let text = to_text(value)?;
    text.parse::<i64>().map_err(|_| {
        CacheError::ConversionFailure(format!("cannot interpret {:?} as an integer", text))
    })
}

/// Parses the value as a 64-bit float.
pub fn to_float(value: &StoredValue) -> Result<f64> {
    match value {
        StoredValue::Float(f) => Ok(*f),
        StoredValue::Integer(i) => Ok(*i as f64),
        other => {
            let text = to_text(other)?;
            text.parse::<f64>().map_err(|_| {
                CacheError::ConversionFailure(format!("cannot interpret {:?} as a float", text))
            })
        }
    }
}

/// Returns the raw encoded bytes. Never fails.
pub fn to_bytes(value: &StoredValue) -> Result<Vec<u8>> {
    Ok(value.encode().into_owned())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_variants() {
        assert_eq!(StoredValue::from("abc").encode().as_ref(), b"abc");
        assert_eq!(StoredValue::from(vec![0u8, 1, 2]).encode().as_ref(), &[0, 1, 2]);
        assert_eq!(StoredValue::from(-42i64).encode().as_ref(), b"-42");
        assert_eq!(StoredValue::from(1.5).encode().as_ref(), b"1.5");
    }

    #[test]
    fn test_to_int_from_text() {
        assert_eq!(to_int(&StoredValue::from("123")).unwrap(), 123);
        assert_eq!(to_int(&StoredValue::from(7)).unwrap(), 7);
    }

    #[test]
    fn test_to_int_rejects_text() {
        let result = to_int(&StoredValue::from("hello"));
        assert!(matches!(result, Err(CacheError::ConversionFailure(_))));
    }

    #[test]
    fn test_to_int_rejects_float() {
        let result = to_int(&StoredValue::from(2.5));
        assert!(matches!(result, Err(CacheError::ConversionFailure(_))));
    }

    #[test]
    fn test_to_int_rejects_integral_float() {
        let result = to_int(&StoredValue::from(2.0));
        assert!(matches!(result, Err(CacheError::ConversionFailure(_))));
        assert_eq!(to_text(&StoredValue::from(2.0)).unwrap(), "2.0");
    }

    #[test]
    fn test_to_text_rejects_invalid_utf8() {
        let result = to_text(&StoredValue::from(vec![0xff, 0xfe]));
        assert!(matches!(result, Err(CacheError::ConversionFailure(_))));
    }

    #[test]
    fn test_to_text_from_number() {
        assert_eq!(to_text(&StoredValue::from(99)).unwrap(), "99");
    }

    #[test]
    fn test_to_float() {
        assert_eq!(to_float(&StoredValue::from("3.25")).unwrap(), 3.25);
        assert_eq!(to_float(&StoredValue::from(2)).unwrap(), 2.0);
        assert!(to_float(&StoredValue::from("x")).is_err());
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&StoredValue::from(5)).unwrap();
        assert_eq!(json, r#"{"type":"integer","value":5}"#);

        let back: StoredValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StoredValue::Integer(5));
    }
}
