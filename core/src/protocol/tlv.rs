//! Tag-length-value fields of the EMV merchant-presented format
//!
//! Each field is written as:
//! - 2 characters: numeric tag
//! - 2 characters: zero-padded decimal length of the value
//! - N characters: the value
//!
//! Composite templates (26, 62) carry a run of inner fields as their value.

use serde::{Deserialize, Serialize};

use crate::protocol::constants::MAX_FIELD_LEN;
use crate::{Error, Result};

/// A single decoded or to-be-encoded TLV field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub tag: String,
    pub value: String,
}

impl Field {
    pub fn new(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
        }
    }

    /// Encode this field as `tag + length + value`.
    pub fn encode(&self) -> Result<String> {
        format_field(&self.tag, &self.value)
    }

    /// Decode the value of a composite field into its inner fields.
    pub fn children(&self) -> Result<Vec<Field>> {
        decode_fields(&self.value)
    }
}

/// Format one field.
///
/// Fails with `FieldLengthExceeded` when the value cannot be described by a
/// two-digit length. Values are never truncated here.
pub fn format_field(tag: &str, value: &str) -> Result<String> {
    debug_assert!(
        tag.len() == 2 && tag.bytes().all(|b| b.is_ascii_digit()),
        "TLV tags are two decimal digits"
    );

    let len = value.chars().count();
    if len > MAX_FIELD_LEN {
        return Err(Error::FieldLengthExceeded {
            tag: tag.to_string(),
            length: len,
        });
    }

    Ok(format!("{}{:02}{}", tag, len, value))
}

/// Concatenate encoded fields, the value of a composite template.
///
/// The outer length check happens when the template itself is formatted.
pub fn encode_fields(inner: &[Field]) -> Result<String> {
    let mut value = String::new();
    for field in inner {
        value.push_str(&field.encode()?);
    }
    Ok(value)
}

/// Format a composite field whose value is the concatenation of `inner`.
pub fn format_composite(tag: &str, inner: &[Field]) -> Result<String> {
    format_field(tag, &encode_fields(inner)?)
}

/// Split TLV text back into its top-level fields.
///
/// Nested templates are left packed in `value`; use [`Field::children`] to
/// open them.
pub fn decode_fields(text: &str) -> Result<Vec<Field>> {
    let chars: Vec<char> = text.chars().collect();
    let mut fields = Vec::new();
    let mut idx = 0;

    while idx < chars.len() {
        if idx + 4 > chars.len() {
            return Err(Error::InvalidPayload(format!(
                "truncated field header at offset {}",
                idx
            )));
        }

        let tag: String = chars[idx..idx + 2].iter().collect();
        if !tag.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidPayload(format!("invalid tag {:?} at offset {}", tag, idx)));
        }

        let len_str: String = chars[idx + 2..idx + 4].iter().collect();
        let len: usize = len_str
            .parse()
            .ok()
            .filter(|_| len_str.chars().all(|c| c.is_ascii_digit()))
            .ok_or_else(|| Error::InvalidPayload(format!("invalid length {:?} for tag {}", len_str, tag)))?;

        let start = idx + 4;
        let end = start + len;
        if end > chars.len() {
            return Err(Error::InvalidPayload(format!(
                "field {} declares {} characters but only {} remain",
                tag,
                len,
                chars.len() - start
            )));
        }

        fields.push(Field {
            tag,
            value: chars[start..end].iter().collect(),
        });
        idx = end;
    }

    Ok(fields)
}
