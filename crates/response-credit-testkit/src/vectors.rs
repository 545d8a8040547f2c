//! Golden test vectors for the stored credit encoding.
//!
//! Every writer sharing world state with this registry must produce these
//! bytes for these credits, or existing records stop comparing equal.

use response_credit_core::{encode_credit, Credit};
use serde::Serialize;

/// A golden test vector.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// The credit to encode.
    pub credit: Credit,
    /// Expected stored bytes, as UTF-8 text.
    pub expected: String,
}

/// Six-character JSON escape for the code unit `code` (four hex digits).
fn esc(code: &str) -> String {
    format!("{}u{}", '\\', code)
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    let separators: String = [0x2028u32, 0x2029]
        .iter()
        .filter_map(|&c| char::from_u32(c))
        .collect();

    vec![
        GoldenVector {
            name: "bootstrap credit",
            credit: Credit::new("000001", "2021-12-25", "BESS1"),
            expected: r#"{"ID":"000001","IssueDate":"2021-12-25","Owner":"BESS1"}"#.into(),
        },
        GoldenVector {
            name: "transferred bootstrap credit",
            credit: Credit::new("000003", "2021-12-25", "DER7"),
            expected: r#"{"ID":"000003","IssueDate":"2021-12-25","Owner":"DER7"}"#.into(),
        },
        GoldenVector {
            name: "empty date and owner",
            credit: Credit::new("E", "", ""),
            expected: r#"{"ID":"E","IssueDate":"","Owner":""}"#.into(),
        },
        GoldenVector {
            name: "html-significant characters",
            credit: Credit::new("R&D", "2024-01-01", "<BESS>"),
            expected: format!(
                r#"{{"ID":"R{}D","IssueDate":"2024-01-01","Owner":"{}BESS{}"}}"#,
                esc("0026"),
                esc("003c"),
                esc("003e"),
            ),
        },
        GoldenVector {
            name: "quotes, backslash and whitespace controls",
            credit: Credit::new("Q", "2024-01-01", "a\"b\\c\nd\te"),
            expected: r#"{"ID":"Q","IssueDate":"2024-01-01","Owner":"a\"b\\c\nd\te"}"#.into(),
        },
        GoldenVector {
            name: "other control characters",
            credit: Credit::new("C", "2024-01-01", "x\u{1}y\u{1f}"),
            expected: format!(
                r#"{{"ID":"C","IssueDate":"2024-01-01","Owner":"x{}y{}"}}"#,
                esc("0001"),
                esc("001f"),
            ),
        },
        GoldenVector {
            name: "non-ascii passes through",
            credit: Credit::new("Z", "2024-01-01", "Zürich Ω"),
            expected: r#"{"ID":"Z","IssueDate":"2024-01-01","Owner":"Zürich Ω"}"#.into(),
        },
        GoldenVector {
            name: "line and paragraph separators",
            credit: Credit::new("S", "2024-01-01", separators),
            expected: format!(
                r#"{{"ID":"S","IssueDate":"2024-01-01","Owner":"{}{}"}}"#,
                esc("2028"),
                esc("2029"),
            ),
        },
    ]
}

/// Encode every vector and compare against its expected bytes.
///
/// Returns `(name, matches, actual)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let actual = match encode_credit(&v.credit) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => format!("<{}>", e),
            };
            let matches = actual == v.expected;
            (v.name.to_string(), matches, actual)
        })
        .collect()
}

/// All vectors as pretty JSON, for handing to other implementations.
pub fn vectors_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&all_vectors())
}
