use std::fmt;

/// Statement pair that turns referential-integrity checks off and back on
/// around a bulk reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FkSuppression {
    pub disable: &'static str,
    pub enable: &'static str,
}

/// What a target engine supports, independent of how it is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectProfile {
    pub fk_suppression: Option<FkSuppression>,
    /// Backslash starts an escape sequence inside a string literal.
    pub backslash_escapes: bool,
    pub blob_literal: BlobLiteral,
    pub nul_char: NulChar,
}

/// How a NUL character inside text is written. A raw NUL would end the
/// statement text for engines that read SQL as a C string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NulChar {
    /// `\0` inside the literal.
    Escape,
    /// The literal is split and rejoined around this expression with `||`.
    Concat(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobLiteral {
    /// `X'0a1b'`
    HexPrefix,
    /// `'\x0a1b'`
    ByteaEscape,
}

const POSTGRES: DialectProfile = DialectProfile {
    fk_suppression: Some(FkSuppression {
        disable: "SET session_replication_role = replica;",
        enable: "SET session_replication_role = DEFAULT;",
    }),
    backslash_escapes: false,
    blob_literal: BlobLiteral::ByteaEscape,
    nul_char: NulChar::Concat("chr(0)"),
};

const MYSQL: DialectProfile = DialectProfile {
    fk_suppression: Some(FkSuppression {
        disable: "SET FOREIGN_KEY_CHECKS=0;",
        enable: "SET FOREIGN_KEY_CHECKS=1;",
    }),
    backslash_escapes: true,
    blob_literal: BlobLiteral::HexPrefix,
    nul_char: NulChar::Escape,
};

const SQLITE: DialectProfile = DialectProfile {
    fk_suppression: Some(FkSuppression {
        disable: "PRAGMA foreign_keys = OFF;",
        enable: "PRAGMA foreign_keys = ON;",
    }),
    backslash_escapes: false,
    blob_literal: BlobLiteral::HexPrefix,
    nul_char: NulChar::Concat("char(0)"),
};

const GENERIC: DialectProfile = DialectProfile {
    fk_suppression: None,
    backslash_escapes: false,
    blob_literal: BlobLiteral::HexPrefix,
    nul_char: NulChar::Concat("char(0)"),
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
    Other(String),
}

impl Dialect {
    pub fn profile(&self) -> DialectProfile {
        match self {
            Dialect::Postgres => POSTGRES,
            Dialect::MySql => MYSQL,
            Dialect::Sqlite => SQLITE,
            Dialect::Other(_) => GENERIC,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Dialect::Postgres => "postgresql",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
            Dialect::Other(name) => name.as_str(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
