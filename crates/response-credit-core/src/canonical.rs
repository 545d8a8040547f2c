//! Canonical JSON encoding for credits.
//!
//! Several independent codebases read and write the same world state, so the
//! encoding is fixed down to the byte:
//! - Compact output, no insignificant whitespace
//! - Keys in declaration order: `ID`, `IssueDate`, `Owner`
//! - `<`, `>`, `&`, U+2028 and U+2029 inside strings are written as
//!   six-character `\u` escapes, matching the ledger's reference encoder
//! - Other escaping follows serde_json (`\"`, `\\`, `\n`, `\r`, `\t`,
//!   `\b`, `\f`, lowercase `\u00XX` for remaining control characters)
//!
//! Decoding is lenient in the same way the reference decoder is:
//! - Unknown keys are ignored
//! - A missing key or an explicit `null` decodes as an empty string
//! - Keys match exactly first, then ignoring ASCII case (`id`, `owner`)
//!
//! Anything that is not a JSON object, or a field holding a non-string
//! value, is rejected.

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};

use crate::credit::Credit;
use crate::error::CoreError;
use crate::types::CreditId;

/// Compact formatter with HTML-safe string escaping.
#[derive(Debug, Clone, Copy, Default)]
struct LedgerFormatter;

impl LedgerFormatter {
    /// Code points the reference encoder escapes even though JSON allows them raw.
    fn needs_escape(ch: char) -> bool {
        matches!(ch as u32, 0x3c | 0x3e | 0x26 | 0x2028 | 0x2029)
    }
}

impl Formatter for LedgerFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if Self::needs_escape(ch) {
                writer.write_all(fragment[start..i].as_bytes())?;
                write!(writer, "\\u{:04x}", ch as u32)?;
                start = i + ch.len_utf8();
            }
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Encode a credit to its canonical stored bytes.
pub fn encode_credit(credit: &Credit) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::with_capacity(64);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, LedgerFormatter);
    credit
        .serialize(&mut serializer)
        .map_err(|e| CoreError::EncodingError(e.to_string()))?;
    Ok(buf)
}

/// Decode a credit from stored bytes.
pub fn decode_credit(bytes: &[u8]) -> Result<Credit, CoreError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))?;

    let Value::Object(fields) = value else {
        return Err(CoreError::DecodingError("expected a JSON object".into()));
    };

    Ok(Credit {
        id: CreditId::from(string_field(&fields, "ID")?),
        issue_date: string_field(&fields, "IssueDate")?,
        owner: string_field(&fields, "Owner")?,
    })
}

/// Read one string field, preferring an exact key over a case-folded one.
fn string_field(fields: &Map<String, Value>, name: &str) -> Result<String, CoreError> {
    let value = fields.get(name).or_else(|| {
        fields
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    });

    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(CoreError::DecodingError(format!(
            "field {} must be a string, found {}",
            name,
            json_type(other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
