//! Golden SQL output of the query generator.

use insta::assert_snapshot;
use quarry::{
    CompareOp, FieldConfig, FieldOptions, GroupLogical, PatternKind, PatternMatch, Range, Value,
    ValuesBag, ValuesGroup,
};
use quarry_sql::{
    Binding, CompiledCondition, Connection, Conversion, ConversionHints, QueryError, QueryField,
    QueryFields, QueryGenerator, SqlFieldConversion, SqlPlatform, SqlValueConversion, StrategyId,
};

// ============================================================================
// Test helpers
// ============================================================================

fn fields() -> QueryFields {
    QueryFields::new()
        .with(QueryField::new(FieldConfig::new("id"), "id"))
        .with(QueryField::new(FieldConfig::new("name"), "name"))
        .with(QueryField::new(
            FieldConfig::new("price")
                .accept_ranges(true)
                .accept_compares(true),
            "price",
        ))
        .with(QueryField::new(
            FieldConfig::new("label").accept_pattern_match(true),
            "label",
        ))
}

fn compile_with(
    fields: &QueryFields,
    driver: &str,
    binding: Binding,
    group: &ValuesGroup,
) -> Result<CompiledCondition, QueryError> {
    let connection = Connection::new(driver);
    let platform = SqlPlatform::new(fields, &connection)?.with_binding(binding);
    QueryGenerator::new(&platform, fields, &connection).compile(group)
}

fn compile(group: &ValuesGroup) -> String {
    compile_with(&fields(), "pdo_pgsql", Binding::Inline, group)
        .unwrap()
        .sql()
        .to_string()
}

fn singles(values: &[i64]) -> ValuesBag {
    values
        .iter()
        .fold(ValuesBag::new(), |bag, v| bag.with_single_value(*v))
}

/// Conversion casting the column for numeric values only.
struct CastNumbers;

impl SqlFieldConversion for CastNumbers {
    fn convert_sql_field(
        &self,
        column: &str,
        _: &FieldOptions,
        hints: &ConversionHints<'_>,
    ) -> String {
        match hints.strategy {
            Some(StrategyId(1)) => format!("CAST({column} AS INTEGER)"),
            _ => column.to_string(),
        }
    }
}

fn numeric_strategy(
    value: &Value,
    _: &FieldOptions,
    _: &ConversionHints<'_>,
) -> Option<StrategyId> {
    value.is_number().then_some(StrategyId(1))
}

struct ToDate;

impl SqlValueConversion for ToDate {
    fn convert_sql_value(
        &self,
        _: &Value,
        rendered: &str,
        _: &FieldOptions,
        _: &ConversionHints<'_>,
    ) -> String {
        format!("DATE({rendered})")
    }
}

// ============================================================================
// Groups
// ============================================================================

#[test]
fn empty_tree_compiles_to_nothing() {
    assert_eq!(compile(&ValuesGroup::new()), "");

    let inner = ValuesGroup::new().with_group(ValuesGroup::new());
    let nested_empty = ValuesGroup::new().with_group(inner);
    assert_eq!(compile(&nested_empty), "");
}

#[test]
fn included_and_excluded_values() {
    let group = ValuesGroup::new().with_field("id", singles(&[1, 2]).with_excluded_value(5));
    assert_snapshot!(compile(&group), @"(id IN (1, 2)) AND (id NOT IN (5))");
}

#[test]
fn only_excluded_values() {
    let excluded = ValuesBag::new()
        .with_excluded_value(5)
        .with_excluded_value(6);
    let group = ValuesGroup::new().with_field("id", excluded);
    assert_snapshot!(compile(&group), @"id NOT IN (5, 6)");
}

#[test]
fn or_group_wraps_each_field() {
    let group = ValuesGroup::new()
        .with_logical(GroupLogical::Or)
        .with_field("id", singles(&[1]))
        .with_field("name", ValuesBag::new().with_single_value("x"));
    assert_snapshot!(compile(&group), @"(id IN (1)) OR (name IN ('x'))");
}

#[test]
fn and_group_wraps_each_field() {
    let group = ValuesGroup::new()
        .with_field("id", singles(&[1]))
        .with_field("name", ValuesBag::new().with_single_value("x"));
    assert_snapshot!(compile(&group), @"(id IN (1)) AND (name IN ('x'))");
}

fn named(name: &str) -> ValuesGroup {
    ValuesGroup::new().with_field("name", ValuesBag::new().with_single_value(name))
}

#[test]
fn subgroups_are_or_combined() {
    let group = ValuesGroup::new()
        .with_field("id", singles(&[1]))
        .with_group(named("a"))
        .with_group(named("b"));
    assert_snapshot!(
        compile(&group),
        @"(id IN (1)) AND ((name IN ('a')) OR (name IN ('b')))"
    );
}

#[test]
fn lone_subgroup_is_not_wrapped() {
    let group = ValuesGroup::new().with_group(named("a"));
    assert_snapshot!(compile(&group), @"name IN ('a')");
}

#[test]
fn nested_groups() {
    let group = ValuesGroup::new()
        .with_logical(GroupLogical::Or)
        .with_field("id", singles(&[1]))
        .with_group(
            ValuesGroup::new()
                .with_field("id", singles(&[2]))
                .with_field("name", ValuesBag::new().with_single_value("b")),
        );
    assert_snapshot!(
        compile(&group),
        @"(id IN (1)) OR ((id IN (2)) AND (name IN ('b')))"
    );
}

#[test]
fn unmapped_fields_are_skipped() {
    let group = ValuesGroup::new()
        .with_field("customer", singles(&[9]))
        .with_field("id", singles(&[1]));
    assert_snapshot!(compile(&group), @"id IN (1)");
}

// ============================================================================
// Value kinds
// ============================================================================

#[test]
fn inclusive_range() {
    let range = ValuesBag::new().with_range(Range::new(10, 20));
    let group = ValuesGroup::new().with_field("price", range);
    assert_snapshot!(compile(&group), @"(price >= 10 AND price <= 20)");
}

#[test]
fn inclusive_range_with_open_bounds() {
    let open = Range::new(10, 20)
        .with_lower_exclusive()
        .with_upper_exclusive();
    let group = ValuesGroup::new().with_field("price", ValuesBag::new().with_range(open));
    assert_snapshot!(compile(&group), @"(price > 10 AND price < 20)");
}

#[test]
fn excluded_range_uses_the_dual_form() {
    let excluded = ValuesBag::new().with_excluded_range(Range::new(10, 20));
    let group = ValuesGroup::new().with_field("price", excluded);
    assert_snapshot!(compile(&group), @"(price <= 10 OR price >= 20)");

    let group = ValuesGroup::new().with_field(
        "price",
        ValuesBag::new().with_excluded_range(Range::new(10, 20).with_upper_exclusive()),
    );
    assert_snapshot!(compile(&group), @"(price <= 10 OR price > 20)");
}

#[test]
fn two_inclusive_comparisons_narrow() {
    let group = ValuesGroup::new().with_field(
        "price",
        ValuesBag::new()
            .with_comparison(CompareOp::Gt, 5)
            .with_comparison(CompareOp::Lt, 10),
    );
    assert_snapshot!(compile(&group), @"(price > 5 AND price < 10)");
}

#[test]
fn single_comparison_is_a_plain_term() {
    let comparison = ValuesBag::new().with_comparison(CompareOp::Gte, 5);
    let group = ValuesGroup::new().with_field("price", comparison);
    assert_snapshot!(compile(&group), @"price >= 5");
}

#[test]
fn not_equal_comparisons_are_exclusive() {
    let group = ValuesGroup::new().with_field(
        "price",
        ValuesBag::new()
            .with_comparison(CompareOp::Ne, 3)
            .with_comparison(CompareOp::Ne, 4),
    );
    assert_snapshot!(compile(&group), @"(price <> 3) AND (price <> 4)");
}

#[test]
fn inclusive_side_is_or_combined() {
    let group = ValuesGroup::new().with_field(
        "price",
        ValuesBag::new()
            .with_single_value(1)
            .with_range(Range::new(10, 20))
            .with_comparison(CompareOp::Gt, 100),
    );
    assert_snapshot!(
        compile(&group),
        @"(price IN (1)) OR (price >= 10 AND price <= 20) OR (price > 100)"
    );
}

#[test]
fn both_sides_of_a_field() {
    let group = ValuesGroup::new().with_field(
        "price",
        ValuesBag::new()
            .with_range(Range::new(1, 100))
            .with_excluded_value(50)
            .with_comparison(CompareOp::Ne, 60),
    );
    assert_snapshot!(
        compile(&group),
        @"(price >= 1 AND price <= 100) AND ((price NOT IN (50)) AND (price <> 60))"
    );
}

#[test]
fn pattern_matchers_by_dialect() {
    let prefix = PatternMatch::new("INV-", PatternKind::StartsWith).case_insensitive();
    let void = PatternMatch::new("void", PatternKind::Contains).exclusive();
    let group = ValuesGroup::new().with_field(
        "label",
        ValuesBag::new()
            .with_pattern_match(prefix)
            .with_pattern_match(void),
    );

    let pg = compile_with(&fields(), "pgsql", Binding::Inline, &group).unwrap();
    assert_snapshot!(
        pg.sql(),
        @"(label ILIKE 'INV-%') AND (label NOT LIKE '%void%')"
    );

    let mysql = compile_with(&fields(), "mysql", Binding::Inline, &group).unwrap();
    assert_snapshot!(
        mysql.sql(),
        @"(LOWER(label) LIKE LOWER('INV-%')) AND (label NOT LIKE BINARY '%void%')"
    );

    let sqlite = compile_with(&fields(), "sqlite", Binding::Inline, &group).unwrap();
    assert_snapshot!(
        sqlite.sql(),
        @r"(LOWER(label) LIKE LOWER('INV-%') ESCAPE '') AND (label NOT GLOB '*void*')"
    );
}

#[test]
fn case_sensitive_equality_by_dialect() {
    let exact = PatternMatch::new("INV-1", PatternKind::Equals);
    let group = ValuesGroup::new().with_field("label", ValuesBag::new().with_pattern_match(exact));

    let mysql = compile_with(&fields(), "mysql", Binding::Inline, &group).unwrap();
    assert_snapshot!(mysql.sql(), @"label = BINARY 'INV-1'");

    let sqlite = compile_with(&fields(), "sqlite", Binding::Inline, &group).unwrap();
    assert_snapshot!(sqlite.sql(), @"label = 'INV-1'");
}

#[test]
fn regex_pattern() {
    let regex = PatternMatch::new("^INV-[0-9]+$", PatternKind::Regex);
    let group = ValuesGroup::new().with_field("label", ValuesBag::new().with_pattern_match(regex));
    let compiled = compile_with(&fields(), "sqlite", Binding::Inline, &group).unwrap();
    assert_snapshot!(compiled.sql(), @"label REGEXP '^INV-[0-9]+$'");
}

// ============================================================================
// Conversions
// ============================================================================

/// A `ref` field cast to an integer for numeric values.
fn cast_fields() -> QueryFields {
    let conversion = Conversion::field(CastNumbers).with_strategy(numeric_strategy);
    let field = QueryField::new(FieldConfig::new("ref"), "ref").with_field_conversion(conversion);
    QueryFields::new().with(field)
}

#[test]
fn strategy_conversion_renders_each_value() {
    let fields = cast_fields();

    let group = ValuesGroup::new().with_field(
        "ref",
        ValuesBag::new()
            .with_single_value(1)
            .with_single_value("a")
            .with_excluded_value(2),
    );
    let compiled = compile_with(&fields, "sqlite", Binding::Inline, &group).unwrap();
    assert_snapshot!(
        compiled.sql(),
        @"((CAST(ref AS INTEGER) = 1) OR (ref = 'a')) AND (CAST(ref AS INTEGER) <> 2)"
    );
}

#[test]
fn range_strategy_follows_lower_bound() {
    let fields = cast_fields();
    let range = ValuesBag::new().with_range(Range::new(1, 9));
    let group = ValuesGroup::new().with_field("ref", range);

    let compiled = compile_with(&fields, "sqlite", Binding::Inline, &group).unwrap();
    assert_snapshot!(
        compiled.sql(),
        @"(CAST(ref AS INTEGER) >= 1 AND CAST(ref AS INTEGER) <= 9)"
    );
}

#[test]
fn sql_value_conversion_disables_batching() {
    let fields = QueryFields::new().with(
        QueryField::new(FieldConfig::new("day"), "created")
            .with_alias("o")
            .with_value_conversion(Conversion::sql_value(ToDate)),
    );
    let group = ValuesGroup::new().with_field(
        "day",
        ValuesBag::new()
            .with_single_value("2024-01-01")
            .with_single_value("2024-02-01"),
    );

    let compiled = compile_with(&fields, "mysql", Binding::Inline, &group).unwrap();
    assert_snapshot!(
        compiled.sql(),
        @"(o.created = DATE('2024-01-01')) OR (o.created = DATE('2024-02-01'))"
    );
}

// ============================================================================
// Binding and failures
// ============================================================================

#[test]
fn positional_parameters_follow_placeholders() {
    let group = ValuesGroup::new()
        .with_field("id", singles(&[1, 2]).with_excluded_value(5))
        .with_field("price", ValuesBag::new().with_range(Range::new(10, 20)));

    let compiled = compile_with(&fields(), "pgsql", Binding::Positional, &group).unwrap();
    assert_snapshot!(
        compiled.sql(),
        @"((id IN (?, ?)) AND (id NOT IN (?))) AND (price >= ? AND price <= ?)"
    );
    assert_eq!(
        compiled.params(),
        &[Value::from(1), Value::from(2), Value::from(5), Value::from(10), Value::from(20)]
    );
}

#[test]
fn platform_errors_abort_compilation() {
    let group = ValuesGroup::new()
        .with_field("id", singles(&[1]))
        .with_field("price", ValuesBag::new().with_single_value(f64::INFINITY));
    let err = compile_with(&fields(), "sqlite", Binding::Inline, &group).unwrap_err();
    assert!(matches!(
        err,
        QueryError::UnsupportedValue { ref field, .. } if field == "price"
    ));

    let regex = PatternMatch::new("^a", PatternKind::Regex).case_insensitive();
    let group = ValuesGroup::new().with_field("label", ValuesBag::new().with_pattern_match(regex));
    let err = compile_with(&fields(), "sqlite", Binding::Inline, &group).unwrap_err();
    assert!(matches!(err, QueryError::UnsupportedPattern { .. }));
}
