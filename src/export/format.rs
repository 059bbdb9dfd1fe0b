use std::collections::HashMap;
use std::fmt::Write as _;

use super::dialect::{BlobLiteral, DialectProfile, NulChar};

/// A single cell as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// Declared type of a column, in the vocabulary of the mapping layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    Unknown,
    String,
    Text,
    DateTime,
    Date,
    Time,
    Uuid,
    Array,
    Json,
    Boolean,
    Integer,
    Decimal,
    Float,
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStrategy {
    Quoted,
    Boolean,
    Raw,
}

impl SemanticType {
    /// Classify a declared column type such as `VARCHAR(255)` or `BOOLEAN`.
    ///
    /// Checks run from most to least specific so that `DATETIME` is not read
    /// as `DATE` and MySQL's `TINYINT(1)` stays a boolean.
    pub fn from_declared(declared: &str) -> Self {
        let upper = declared.trim().to_ascii_uppercase();
        if upper.is_empty() {
            return SemanticType::Unknown;
        }
        let has = |needle: &str| upper.contains(needle);

        if has("BOOL") || upper.replace(' ', "") == "TINYINT(1)" {
            SemanticType::Boolean
        } else if has("UUID") || has("GUID") {
            SemanticType::Uuid
        } else if has("DATETIME") || has("TIMESTAMP") {
            SemanticType::DateTime
        } else if has("DATE") {
            SemanticType::Date
        } else if has("TIME") {
            SemanticType::Time
        } else if has("JSON") {
            SemanticType::Json
        } else if has("ARRAY") {
            SemanticType::Array
        } else if has("INT") {
            SemanticType::Integer
        } else if has("CHAR") || has("STRING") {
            SemanticType::String
        } else if has("CLOB") || has("TEXT") {
            SemanticType::Text
        } else if has("BLOB") || has("BINARY") || has("BYTEA") {
            SemanticType::Binary
        } else if has("REAL") || has("FLOA") || has("DOUB") {
            SemanticType::Float
        } else if has("NUMERIC") || has("DECIMAL") {
            SemanticType::Decimal
        } else {
            SemanticType::Unknown
        }
    }

    pub fn strategy(self) -> CellStrategy {
        match self {
            SemanticType::Boolean => CellStrategy::Boolean,
            SemanticType::Integer
            | SemanticType::Decimal
            | SemanticType::Float
            | SemanticType::Binary => CellStrategy::Raw,
            SemanticType::Unknown
            | SemanticType::String
            | SemanticType::Text
            | SemanticType::DateTime
            | SemanticType::Date
            | SemanticType::Time
            | SemanticType::Uuid
            | SemanticType::Array
            | SemanticType::Json => CellStrategy::Quoted,
        }
    }
}

/// Per-column strategies for one result set, resolved before any row is
/// formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFormat {
    strategies: Vec<CellStrategy>,
}

impl TableFormat {
    pub fn resolve(columns: &[String], types: Option<&HashMap<String, SemanticType>>) -> Self {
        let strategies = columns
            .iter()
            .map(|column| match types {
                Some(types) => types
                    .get(column)
                    .copied()
                    .unwrap_or(SemanticType::Unknown)
                    .strategy(),
                None => CellStrategy::Quoted,
            })
            .collect();
        TableFormat { strategies }
    }

    pub fn strategies(&self) -> &[CellStrategy] {
        &self.strategies
    }

    /// Render a row as a parenthesised, comma separated tuple.
    pub fn format_row(&self, row: &[SqlValue], profile: &DialectProfile) -> String {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                let strategy = self
                    .strategies
                    .get(idx)
                    .copied()
                    .unwrap_or(CellStrategy::Quoted);
                format_cell(value, strategy, profile)
            })
            .collect();
        format!("({})", cells.join(","))
    }
}

pub fn format_cell(value: &SqlValue, strategy: CellStrategy, profile: &DialectProfile) -> String {
    if let SqlValue::Null = value {
        return "NULL".to_string();
    }
    match strategy {
        CellStrategy::Boolean => {
            if is_truthy(value) {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        CellStrategy::Quoted => match value {
            SqlValue::Blob(bytes) => blob_literal(bytes, profile),
            SqlValue::Integer(v) => quote_literal(&v.to_string(), profile),
            SqlValue::Real(v) => quote_literal(&v.to_string(), profile),
            SqlValue::Text(s) => quote_literal(s, profile),
            SqlValue::Null => "NULL".to_string(),
        },
        CellStrategy::Raw => match value {
            SqlValue::Integer(v) => v.to_string(),
            SqlValue::Real(v) if v.is_finite() => format!("{v:?}"),
            SqlValue::Real(_) => "NULL".to_string(),
            SqlValue::Text(s) if is_numeric_literal(s) => s.clone(),
            SqlValue::Text(s) => quote_literal(s, profile),
            SqlValue::Blob(bytes) => blob_literal(bytes, profile),
            SqlValue::Null => "NULL".to_string(),
        },
    }
}

/// Single-quote `raw`, escaping so the literal reads back as `raw` exactly.
pub fn quote_literal(raw: &str, profile: &DialectProfile) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('\'');
    for ch in raw.chars() {
        match ch {
            '\'' => out.push_str("''"),
            '\\' if profile.backslash_escapes => out.push_str("\\\\"),
            '\0' => match profile.nul_char {
                NulChar::Escape => out.push_str("\\0"),
                NulChar::Concat(expr) => {
                    out.push_str("' || ");
                    out.push_str(expr);
                    out.push_str(" || '");
                }
            },
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

fn blob_literal(bytes: &[u8], profile: &DialectProfile) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(hex, "{byte:02x}");
    }
    match profile.blob_literal {
        BlobLiteral::HexPrefix => format!("X'{hex}'"),
        BlobLiteral::ByteaEscape => format!("'\\x{hex}'"),
    }
}

fn is_truthy(value: &SqlValue) -> bool {
    match value {
        SqlValue::Null => false,
        SqlValue::Integer(v) => *v != 0,
        SqlValue::Real(v) => *v != 0.0,
        SqlValue::Text(s) => {
            let s = s.trim();
            !(s.is_empty()
                || s == "0"
                || s.eq_ignore_ascii_case("f")
                || s.eq_ignore_ascii_case("false"))
        }
        SqlValue::Blob(bytes) => !bytes.is_empty(),
    }
}

fn is_numeric_literal(s: &str) -> bool {
    s.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}
