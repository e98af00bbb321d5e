//! SQL dialect differences.

use std::fmt;

use quarry::{PatternKind, PatternMatch};

use crate::error::{QueryError, Result};

/// The SQL flavour rendered for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
}

impl Dialect {
    /// Resolves the dialect from a driver name such as `pdo_pgsql`.
    pub fn from_driver(driver: &str) -> Option<Dialect> {
        match driver.to_ascii_lowercase().as_str() {
            "pgsql" | "pdo_pgsql" | "postgres" | "postgresql" => Some(Dialect::Postgres),
            "mysql" | "pdo_mysql" | "mysqli" | "mariadb" => Some(Dialect::MySql),
            "sqlite" | "sqlite3" | "pdo_sqlite" => Some(Dialect::Sqlite),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Quotes a string literal.
    pub fn quote(self, value: &str) -> String {
        let escaped = match self {
            Dialect::MySql => value.replace('\\', "\\\\").replace('\'', "''"),
            Dialect::Postgres | Dialect::Sqlite => value.replace('\'', "''"),
        };
        format!("'{escaped}'")
    }

    pub fn bool_literal(self, value: bool) -> &'static str {
        match (self, value) {
            (Dialect::Postgres, true) => "TRUE",
            (Dialect::Postgres, false) => "FALSE",
            (_, true) => "1",
            (_, false) => "0",
        }
    }

    /// Renders a pattern predicate for `column`.
    ///
    /// `value` is the already rendered pattern operand, see
    /// [`Dialect::pattern_operand`] for what it must contain.
    ///
    /// Case-sensitive kinds compare bytes on every dialect: SQLite uses
    /// `GLOB` as its `LIKE` folds ASCII case, MySQL adds `BINARY` as its
    /// default collations fold case.
    pub fn pattern_predicate(
        self,
        pattern: &PatternMatch,
        column: &str,
        value: &str,
    ) -> Result<String> {
        let not = if pattern.is_exclusive() { "NOT " } else { "" };
        let ci = pattern.is_case_insensitive();

        let sql = match pattern.kind() {
            PatternKind::Contains | PatternKind::StartsWith | PatternKind::EndsWith => {
                match (self, ci) {
                    (Dialect::Postgres, true) => format!("{column} {not}ILIKE {value}"),
                    (Dialect::Postgres, false) => format!("{column} {not}LIKE {value}"),
                    (Dialect::MySql, true) => format!("LOWER({column}) {not}LIKE LOWER({value})"),
                    (Dialect::MySql, false) => format!("{column} {not}LIKE BINARY {value}"),
                    (Dialect::Sqlite, true) => {
                        format!("LOWER({column}) {not}LIKE LOWER({value}) ESCAPE '\\'")
                    }
                    (Dialect::Sqlite, false) => format!("{column} {not}GLOB {value}"),
                }
            }
            PatternKind::Equals => {
                let op = if pattern.is_exclusive() { "<>" } else { "=" };
                match (self, ci) {
                    (_, true) => format!("LOWER({column}) {op} LOWER({value})"),
                    (Dialect::MySql, false) => format!("{column} {op} BINARY {value}"),
                    (Dialect::Postgres | Dialect::Sqlite, false) => {
                        format!("{column} {op} {value}")
                    }
                }
            }
            PatternKind::Regex => match self {
                Dialect::Postgres => {
                    let op = match (pattern.is_exclusive(), ci) {
                        (false, false) => "~",
                        (false, true) => "~*",
                        (true, false) => "!~",
                        (true, true) => "!~*",
                    };
                    format!("{column} {op} {value}")
                }
                Dialect::MySql => {
                    let binary = if ci { "" } else { "BINARY " };
                    format!("{column} {not}REGEXP {binary}{value}")
                }
                Dialect::Sqlite if ci => {
                    return Err(QueryError::UnsupportedPattern {
                        dialect: self.name(),
                        pattern: "case-insensitive regex",
                    })
                }
                Dialect::Sqlite => format!("{column} {not}REGEXP {value}"),
            },
        };

        Ok(sql)
    }

    /// The string a pattern is matched against, before quoting or binding.
    ///
    /// Wildcard kinds get their wildcards escaped and added on the open
    /// sides: `%` for `LIKE`, `*` for the SQLite `GLOB` used by
    /// case-sensitive patterns.
    pub fn pattern_operand(self, pattern: &PatternMatch) -> String {
        let value = pattern.value();
        let (escaped, any) = match (self, pattern.is_case_insensitive()) {
            (Dialect::Sqlite, false) => (escape_glob(value), '*'),
            _ => (escape_like(value), '%'),
        };

        match pattern.kind() {
            PatternKind::Contains => format!("{any}{escaped}{any}"),
            PatternKind::StartsWith => format!("{escaped}{any}"),
            PatternKind::EndsWith => format!("{any}{escaped}"),
            PatternKind::Equals | PatternKind::Regex => value.to_string(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `GLOB` has no escape character, a wildcard is matched literally inside a
/// one-character class.
fn escape_glob(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '*' | '?' | '[') {
            escaped.push('[');
            escaped.push(c);
            escaped.push(']');
        } else {
            escaped.push(c);
        }
    }
    escaped
}
