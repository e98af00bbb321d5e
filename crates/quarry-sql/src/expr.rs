//! Boolean expression tree built during compilation.
//!
//! Parentheses are decided when rendering: an operand of a combination is
//! wrapped unless it delimits itself, a lone operand is never combined and the
//! top-level expression is never wrapped.

use quarry::GroupLogical;

use crate::fragment::SqlFragment;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    /// A predicate that needs parentheses as an operand.
    Term(SqlFragment),
    /// A predicate that already carries its own parentheses.
    Grouped(SqlFragment),
    /// Two or more operands joined by one operator.
    Logical(GroupLogical, Vec<Expr>),
}

impl Expr {
    /// Combines expressions, dropping the operator when fewer than two remain.
    pub(crate) fn combine(logical: GroupLogical, mut items: Vec<Expr>) -> Option<Expr> {
        match items.len() {
            0 => None,
            1 => items.pop(),
            _ => Some(Expr::Logical(logical, items)),
        }
    }

    /// Renders a top-level expression.
    pub(crate) fn render(self) -> SqlFragment {
        match self {
            Expr::Term(fragment) | Expr::Grouped(fragment) => fragment,
            Expr::Logical(logical, items) => {
                let glue = format!(" {logical} ");
                SqlFragment::join(items.into_iter().map(Expr::render_operand), &glue)
            }
        }
    }

    fn render_operand(self) -> SqlFragment {
        match self {
            Expr::Grouped(fragment) => fragment,
            other => other.render().wrapped(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(sql: &str) -> Expr {
        Expr::Term(SqlFragment::new(sql))
    }

    #[test]
    fn lone_operand_is_not_wrapped() {
        let expr = Expr::combine(GroupLogical::And, vec![term("a = 1")]).unwrap();
        assert_eq!(expr.render().sql, "a = 1");
    }

    #[test]
    fn operands_are_wrapped_unless_grouped() {
        let expr = Expr::combine(
            GroupLogical::Or,
            vec![term("a = 1"), Expr::Grouped(SqlFragment::new("(b > 1 AND b < 3)"))],
        )
        .unwrap();
        assert_eq!(expr.render().sql, "(a = 1) OR (b > 1 AND b < 3)");
    }

    #[test]
    fn nested_logical_is_wrapped_once() {
        let inner = Expr::combine(GroupLogical::Or, vec![term("a = 1"), term("a = 2")]).unwrap();
        let expr = Expr::combine(GroupLogical::And, vec![inner, term("b = 1")]).unwrap();
        assert_eq!(expr.render().sql, "((a = 1) OR (a = 2)) AND (b = 1)");
    }

    #[test]
    fn nothing_to_combine() {
        assert_eq!(Expr::combine(GroupLogical::And, Vec::new()), None);
    }
}
