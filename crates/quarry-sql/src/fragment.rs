//! SQL text paired with the parameters its placeholders bind.

use quarry::Value;

/// A piece of SQL and its bound parameters, in placeholder order.
///
/// Fragments are values: combining them produces a new fragment whose
/// parameters are the operands' parameters concatenated left to right, so the
/// order of `?` placeholders in `sql` always matches `params`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<Value>,
}

impl SqlFragment {
    pub fn new(sql: impl Into<String>) -> Self {
        SqlFragment {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(sql: impl Into<String>, params: Vec<Value>) -> Self {
        SqlFragment {
            sql: sql.into(),
            params,
        }
    }

    pub fn push_str(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Appends another fragment, sql and params.
    pub fn push(&mut self, other: SqlFragment) {
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
    }

    pub fn wrapped(self) -> SqlFragment {
        SqlFragment {
            sql: format!("({})", self.sql),
            params: self.params,
        }
    }

    /// Joins fragments with `glue` between them.
    pub fn join(parts: impl IntoIterator<Item = SqlFragment>, glue: &str) -> SqlFragment {
        let mut joined = SqlFragment::default();
        for (idx, part) in parts.into_iter().enumerate() {
            if idx > 0 {
                joined.push_str(glue);
            }
            joined.push(part);
        }
        joined
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// The result of compiling a condition tree.
///
/// An empty condition means "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledCondition {
    sql: String,
    params: Vec<Value>,
}

impl CompiledCondition {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bound parameters, empty with inline binding.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

impl From<SqlFragment> for CompiledCondition {
    fn from(fragment: SqlFragment) -> Self {
        CompiledCondition {
            sql: fragment.sql,
            params: fragment.params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_keeps_params_in_placeholder_order() {
        let joined = SqlFragment::join(
            [
                SqlFragment::with_params("a = ?", vec![Value::from(1)]),
                SqlFragment::new("b IS NULL"),
                SqlFragment::with_params("c = ?", vec![Value::from("x")]),
            ],
            " AND ",
        );

        assert_eq!(joined.sql, "a = ? AND b IS NULL AND c = ?");
        assert_eq!(joined.params, vec![Value::from(1), Value::from("x")]);
    }

    #[test]
    fn join_of_nothing_is_empty() {
        assert!(SqlFragment::join(Vec::new(), " OR ").is_empty());
    }
}
