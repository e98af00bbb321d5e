//! Compiles condition trees into SQL boolean expressions.
//!
//! Per field, inclusive values are OR-ed (single values, ranges, comparisons
//! other than `<>`, non-exclusive patterns) and exclusive values are AND-ed
//! (excluded values and ranges, exclusive patterns, `<>` comparisons). The two
//! sides are AND-ed. Fields of a group are joined with the group's operator,
//! subgroups are OR-ed, and both parts are joined with the group's operator
//! again.

use quarry::{
    Compare, GroupLogical, PatternMatch, Range, SingleValue, Value, ValuesBag, ValuesGroup,
};
use tracing::debug;

use crate::conversion::Connection;
use crate::error::Result;
use crate::expr::Expr;
use crate::field::{QueryField, QueryFields};
use crate::fragment::{CompiledCondition, SqlFragment};
use crate::platform::QueryPlatform;

/// Walks a [`ValuesGroup`] and renders it through a [`QueryPlatform`].
///
/// The generator holds no state between calls: compiling the same tree twice
/// gives the same output.
///
/// # Example
///
/// ```
/// use quarry::{FieldConfig, ValuesBag, ValuesGroup};
/// use quarry_sql::{Connection, QueryField, QueryFields, QueryGenerator, SqlPlatform};
///
/// let fields = QueryFields::new().with(QueryField::new(FieldConfig::new("id"), "id"));
/// let connection = Connection::new("sqlite");
/// let platform = SqlPlatform::new(&fields, &connection).unwrap();
///
/// let group = ValuesGroup::new().with_field(
///     "id",
///     ValuesBag::new().with_single_value(1).with_single_value(2).with_excluded_value(5),
/// );
///
/// let compiled = QueryGenerator::new(&platform, &fields, &connection).compile(&group).unwrap();
/// assert_eq!(compiled.sql(), "(id IN (1, 2)) AND (id NOT IN (5))");
/// ```
#[derive(Debug)]
pub struct QueryGenerator<'a, P: QueryPlatform + ?Sized> {
    platform: &'a P,
    fields: &'a QueryFields,
    connection: &'a Connection,
}

impl<'a, P: QueryPlatform + ?Sized> QueryGenerator<'a, P> {
    pub fn new(platform: &'a P, fields: &'a QueryFields, connection: &'a Connection) -> Self {
        QueryGenerator {
            platform,
            fields,
            connection,
        }
    }

    /// Compiles a group, an empty result means "no constraint".
    pub fn compile(&self, group: &ValuesGroup) -> Result<CompiledCondition> {
        let fragment = self
            .group_expr(group)?
            .map(Expr::render)
            .unwrap_or_default();

        debug!(
            sql_len = fragment.sql.len(),
            params = fragment.params.len(),
            "compiled search condition"
        );
        Ok(CompiledCondition::from(fragment))
    }

    fn group_expr(&self, group: &ValuesGroup) -> Result<Option<Expr>> {
        let mut own = Vec::new();
        for (name, bag) in group.fields() {
            let Some(field) = self.fields.get(name) else {
                continue;
            };
            own.extend(self.field_expr(field, bag)?);
        }

        let mut subgroups = Vec::new();
        for subgroup in group.groups() {
            subgroups.extend(self.group_expr(subgroup)?);
        }

        let parts = Expr::combine(group.logical(), own)
            .into_iter()
            .chain(Expr::combine(GroupLogical::Or, subgroups))
            .collect();
        Ok(Expr::combine(group.logical(), parts))
    }

    fn field_expr(&self, field: &QueryField, bag: &ValuesBag) -> Result<Option<Expr>> {
        let mut inclusive = self.single_values(field, bag.single_values(), false)?;
        for range in bag.ranges() {
            inclusive.push(self.range(field, range, false)?);
        }
        inclusive.extend(self.inclusive_comparisons(field, bag.comparisons())?);
        for pattern in bag.pattern_matchers().iter().filter(|p| !p.is_exclusive()) {
            inclusive.push(self.pattern(field, pattern)?);
        }

        let mut exclusive = self.single_values(field, bag.excluded_values(), true)?;
        for range in bag.excluded_ranges() {
            exclusive.push(self.range(field, range, true)?);
        }
        for pattern in bag.pattern_matchers().iter().filter(|p| p.is_exclusive()) {
            exclusive.push(self.pattern(field, pattern)?);
        }
        for compare in bag.comparisons().iter().filter(|c| c.is_exclusive()) {
            exclusive.push(Expr::Term(self.comparison(field, compare)?));
        }

        let sides = Expr::combine(GroupLogical::Or, inclusive)
            .into_iter()
            .chain(Expr::combine(GroupLogical::And, exclusive))
            .collect();
        Ok(Expr::combine(GroupLogical::And, sides))
    }

    fn single_values(
        &self,
        field: &QueryField,
        values: &[SingleValue],
        excluded: bool,
    ) -> Result<Vec<Expr>> {
        if values.is_empty() {
            return Ok(Vec::new());
        }

        if field.allows_value_batching() {
            let (platform, name) = (self.platform, field.name());
            let column = platform.field_column(name, None)?;
            let rendered = values
                .iter()
                .map(|v| platform.value_as_sql(v.value(), name, &column, None))
                .collect::<Result<Vec<_>>>()?;

            let op = if excluded { "NOT IN" } else { "IN" };
            let mut term = SqlFragment::new(format!("{column} {op} ("));
            term.push(SqlFragment::join(rendered, ", "));
            term.push_str(")");
            return Ok(vec![Expr::Term(term)]);
        }

        let op = if excluded { "<>" } else { "=" };
        values
            .iter()
            .map(|v| self.predicate(field, v.value(), op).map(Expr::Term))
            .collect()
    }

    fn range(&self, field: &QueryField, range: &Range, excluded: bool) -> Result<Expr> {
        let platform = self.platform;
        let strategy = field.conversion_strategy(range.lower(), self.connection);
        let column = platform.field_column(field.name(), strategy)?;
        let lower = platform.value_as_sql(range.lower(), field.name(), &column, strategy)?;
        let upper = platform.value_as_sql(range.upper(), field.name(), &column, strategy)?;

        let lower_op = match (excluded, range.is_lower_inclusive()) {
            (false, true) => ">=",
            (false, false) => ">",
            (true, true) => "<=",
            (true, false) => "<",
        };
        let upper_op = match (excluded, range.is_upper_inclusive()) {
            (false, true) => "<=",
            (false, false) => "<",
            (true, true) => ">=",
            (true, false) => ">",
        };
        let glue = if excluded { "OR" } else { "AND" };

        let mut fragment = SqlFragment::new(format!("({column} {lower_op} "));
        fragment.push(lower);
        fragment.push_str(&format!(" {glue} {column} {upper_op} "));
        fragment.push(upper);
        fragment.push_str(")");
        Ok(Expr::Grouped(fragment))
    }

    /// Comparisons that must all hold, grouped when there are several.
    fn inclusive_comparisons(
        &self,
        field: &QueryField,
        comparisons: &[Compare],
    ) -> Result<Option<Expr>> {
        let mut rendered = comparisons
            .iter()
            .filter(|c| !c.is_exclusive())
            .map(|c| self.comparison(field, c))
            .collect::<Result<Vec<_>>>()?;

        if rendered.len() > 1 {
            let joined = SqlFragment::join(rendered, " AND ");
            return Ok(Some(Expr::Grouped(joined.wrapped())));
        }
        Ok(rendered.pop().map(Expr::Term))
    }

    fn comparison(&self, field: &QueryField, compare: &Compare) -> Result<SqlFragment> {
        self.predicate(field, compare.value(), compare.operator().as_str())
    }

    /// `column op value` with the strategy selected for `value`.
    fn predicate(&self, field: &QueryField, value: &Value, op: &str) -> Result<SqlFragment> {
        let platform = self.platform;
        let strategy = field.conversion_strategy(value, self.connection);
        let column = platform.field_column(field.name(), strategy)?;
        let literal = platform.value_as_sql(value, field.name(), &column, strategy)?;

        let mut fragment = SqlFragment::new(format!("{column} {op} "));
        fragment.push(literal);
        Ok(fragment)
    }

    fn pattern(&self, field: &QueryField, pattern: &PatternMatch) -> Result<Expr> {
        let strategy = field.conversion_strategy(&Value::from(pattern.value()), self.connection);
        let column = self.platform.field_column(field.name(), strategy)?;
        Ok(Expr::Term(self.platform.pattern_matcher(pattern, &column)?))
    }
}
