//! JSON input format.
//!
//! ```text
//! {
//!   "logical-case": "AND" | "OR",
//!   "fields": {
//!     "<name>": {
//!       "single-values": [..],
//!       "excluded-values": [..],
//!       "ranges": [{"lower": .., "upper": .., "inclusive-lower": true, "inclusive-upper": true}],
//!       "excluded-ranges": [..],
//!       "comparisons": [{"operator": ">=", "value": ..}],
//!       "pattern-matchers": [{"type": "CONTAINS", "value": "..", "case-insensitive": false}]
//!     }
//!   },
//!   "groups": [ { ..same shape.. } ]
//! }
//! ```

use std::cell::Cell;
use std::fmt;

use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use tracing::debug;

use super::{InputContext, InputProcessor};
use crate::alias::{FieldAliasResolver, NoopAliasResolver};
use crate::bag::ValuesBag;
use crate::config::ProcessorConfig;
use crate::error::{Result, SearchError};
use crate::field::FieldConfig;
use crate::group::{GroupLogical, SearchCondition, ValuesGroup};
use crate::value::Value;
use crate::values::{Compare, CompareOp, PatternKind, PatternMatch, Range, ValueType};

/// Processes search conditions written as JSON.
///
/// # Example
///
/// ```
/// use quarry::{FieldConfig, FieldSet, InputProcessor, JsonInput, ProcessorConfig};
///
/// let fields = FieldSet::new("invoice")
///     .with_field(FieldConfig::new("id"))
///     .with_field(FieldConfig::new("total").accept_ranges(true));
/// let config = ProcessorConfig::new(fields);
///
/// let condition = JsonInput::new()
///     .process(
///         &config,
///         r#"{"fields": {"id": {"single-values": [1, 2]},
///                        "total": {"ranges": [{"lower": 10, "upper": 20}]}}}"#,
///     )
///     .unwrap();
///
/// let group = condition.values_group();
/// assert_eq!(group.field("id").unwrap().single_values().len(), 2);
/// assert_eq!(group.field("total").unwrap().ranges().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonInput<A = NoopAliasResolver> {
    aliases: A,
}

impl JsonInput {
    pub fn new() -> Self {
        JsonInput::default()
    }
}

impl<A: FieldAliasResolver> JsonInput<A> {
    pub fn with_aliases(aliases: A) -> Self {
        JsonInput { aliases }
    }
}

impl<A: FieldAliasResolver> InputProcessor for JsonInput<A> {
    type Input = str;

    fn process(&self, config: &ProcessorConfig, input: &str) -> Result<SearchCondition> {
        let field_set = config.field_set().clone();
        if input.trim().is_empty() {
            return Ok(SearchCondition::new(field_set, ValuesGroup::new()));
        }

        let ctx = InputContext::new(config, &self.aliases);
        let raw = parse(&ctx, input)?;
        let group = process_group(&ctx, raw, 0, 0)?;

        debug!(
            field_set = field_set.name(),
            depth = group.depth(),
            "accepted json search condition"
        );
        Ok(SearchCondition::new(field_set, group))
    }
}

/// Parses the raw tree, checking the nesting of every group before its
/// content is read.
///
/// The parser's own recursion limit is lifted: descent stops at the first
/// group past `max_nesting_level`, so parse depth follows that limit.
fn parse(ctx: &InputContext<'_>, input: &str) -> Result<RawGroup> {
    let failure = Cell::new(None);
    let seed = GroupSeed {
        ctx,
        failure: &failure,
        group_idx: 0,
        level: 0,
    };

    let mut de = serde_json::Deserializer::from_str(input);
    de.disable_recursion_limit();
    let parsed = seed.deserialize(&mut de).and_then(|raw| {
        de.end()?;
        Ok(raw)
    });

    parsed.map_err(|err| match failure.take() {
        Some(rejected) => rejected,
        None => SearchError::InvalidInput(err),
    })
}

fn process_group(
    ctx: &InputContext<'_>,
    raw: RawGroup,
    group_idx: usize,
    level: usize,
) -> Result<ValuesGroup> {
    let mut group = ValuesGroup::new().with_logical(raw.logical_case);

    for (raw_name, raw_values) in raw.fields.0 {
        let field = ctx.resolve_field_name(&raw_name)?;
        let bag = process_values(ctx, field, raw_values)?;

        let total = bag.count() + group.field(field.name()).map_or(0, ValuesBag::count);
        ctx.validate_values_count(field, total, group_idx, level)?;

        if !bag.is_empty() {
            group.add_field(field.name(), bag);
        }
    }

    ctx.validate_groups_count(group_idx, raw.groups.len(), level)?;
    for (idx, raw_group) in raw.groups.into_iter().enumerate() {
        group.add_group(process_group(ctx, raw_group, idx, level + 1)?);
    }

    Ok(group)
}

fn process_values(
    ctx: &InputContext<'_>,
    field: &FieldConfig,
    raw: RawValues,
) -> Result<ValuesBag> {
    let mut bag = ValuesBag::new();

    for value in raw.single_values {
        bag.add_single_value(value);
    }
    for value in raw.excluded_values {
        bag.add_excluded_value(value);
    }

    for (ranges, excluded) in [(raw.ranges, false), (raw.excluded_ranges, true)] {
        if !ranges.is_empty() {
            ctx.assert_accepts_type(field, ValueType::Range)?;
        }
        for raw_range in ranges {
            let range = Range::new(raw_range.lower, raw_range.upper)
                .with_inclusive(raw_range.inclusive_lower, raw_range.inclusive_upper);
            ctx.validate_range(field, &range)?;
            if excluded {
                bag.add_excluded_range(range);
            } else {
                bag.add_range(range);
            }
        }
    }

    if !raw.comparisons.is_empty() {
        ctx.assert_accepts_type(field, ValueType::Comparison)?;
    }
    for raw_compare in raw.comparisons {
        bag.add_comparison(Compare::new(raw_compare.operator, raw_compare.value));
    }

    if !raw.pattern_matchers.is_empty() {
        ctx.assert_accepts_type(field, ValueType::PatternMatch)?;
    }
    for raw_pattern in raw.pattern_matchers {
        let (kind, exclusive) = PatternKind::parse(&raw_pattern.kind)
            .ok_or_else(|| unknown_pattern_type(&raw_pattern.kind))?;

        let mut pattern = PatternMatch::new(raw_pattern.value, kind);
        if raw_pattern.case_insensitive {
            pattern = pattern.case_insensitive();
        }
        if exclusive {
            pattern = pattern.exclusive();
        }
        ctx.validate_pattern(field, &pattern)?;
        bag.add_pattern_match(pattern);
    }

    Ok(bag)
}

fn unknown_pattern_type(kind: &str) -> SearchError {
    SearchError::InvalidInput(serde::de::Error::custom(format!(
        "unknown pattern-match type \"{kind}\""
    )))
}

#[derive(Debug, Default)]
struct RawGroup {
    logical_case: GroupLogical,
    fields: RawFields,
    groups: Vec<RawGroup>,
}

#[derive(Deserialize)]
#[serde(field_identifier, rename_all = "kebab-case")]
enum GroupKey {
    LogicalCase,
    Fields,
    Groups,
}

/// Reads one group at a known position in the tree.
struct GroupSeed<'a, 'c> {
    ctx: &'a InputContext<'c>,
    failure: &'a Cell<Option<SearchError>>,
    group_idx: usize,
    level: usize,
}

impl<'de> DeserializeSeed<'de> for GroupSeed<'_, '_> {
    type Value = RawGroup;

    fn deserialize<D>(self, deserializer: D) -> Result<RawGroup, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        if let Err(err) = self.ctx.validate_group_nesting(self.group_idx, self.level) {
            let message = err.to_string();
            self.failure.set(Some(err));
            return Err(de::Error::custom(message));
        }
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for GroupSeed<'_, '_> {
    type Value = RawGroup;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a group object")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<RawGroup, M::Error> {
        let mut group = RawGroup::default();
        let mut seen = [false; 3];

        while let Some(key) = map.next_key::<GroupKey>()? {
            let (slot, name) = match key {
                GroupKey::LogicalCase => (0, "logical-case"),
                GroupKey::Fields => (1, "fields"),
                GroupKey::Groups => (2, "groups"),
            };
            if std::mem::replace(&mut seen[slot], true) {
                return Err(de::Error::duplicate_field(name));
            }

            match key {
                GroupKey::LogicalCase => group.logical_case = map.next_value()?,
                GroupKey::Fields => group.fields = map.next_value()?,
                GroupKey::Groups => {
                    group.groups = map.next_value_seed(GroupsSeed {
                        ctx: self.ctx,
                        failure: self.failure,
                        level: self.level + 1,
                    })?
                }
            }
        }

        Ok(group)
    }
}

/// Reads the subgroups of a group, one level down.
struct GroupsSeed<'a, 'c> {
    ctx: &'a InputContext<'c>,
    failure: &'a Cell<Option<SearchError>>,
    level: usize,
}

impl<'de> DeserializeSeed<'de> for GroupsSeed<'_, '_> {
    type Value = Vec<RawGroup>;

    fn deserialize<D>(self, deserializer: D) -> Result<Vec<RawGroup>, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for GroupsSeed<'_, '_> {
    type Value = Vec<RawGroup>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of groups")
    }

    fn visit_seq<S: SeqAccess<'de>>(self, mut seq: S) -> Result<Vec<RawGroup>, S::Error> {
        let mut groups = Vec::new();
        loop {
            let seed = GroupSeed {
                ctx: self.ctx,
                failure: self.failure,
                group_idx: groups.len(),
                level: self.level,
            };
            match seq.next_element_seed(seed)? {
                Some(group) => groups.push(group),
                None => return Ok(groups),
            }
        }
    }
}

/// Fields of one group in input order. A name given twice keeps both
/// entries so their values merge.
#[derive(Debug, Default)]
struct RawFields(Vec<(String, RawValues)>);

impl<'de> Deserialize<'de> for RawFields {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = RawFields;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to values")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<RawFields, M::Error> {
                let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    fields.push(entry);
                }
                Ok(RawFields(fields))
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct RawValues {
    single_values: Vec<Value>,
    excluded_values: Vec<Value>,
    ranges: Vec<RawRange>,
    excluded_ranges: Vec<RawRange>,
    comparisons: Vec<RawCompare>,
    pattern_matchers: Vec<RawPattern>,
}

fn inclusive() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawRange {
    lower: Value,
    upper: Value,
    #[serde(default = "inclusive")]
    inclusive_lower: bool,
    #[serde(default = "inclusive")]
    inclusive_upper: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCompare {
    operator: CompareOp,
    value: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawPattern {
    #[serde(rename = "type")]
    kind: String,
    value: String,
    #[serde(default)]
    case_insensitive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSet;

    fn config() -> ProcessorConfig {
        let set = FieldSet::new("invoice")
            .with_field(FieldConfig::new("id"))
            .with_field(FieldConfig::new("label").accept_pattern_match(true));
        ProcessorConfig::new(set)
    }

    #[test]
    fn empty_input_is_an_empty_condition() {
        let condition = JsonInput::new().process(&config(), "  \n").unwrap();
        assert!(condition.values_group().is_empty());
    }

    #[test]
    fn pattern_matchers_with_negation() {
        let condition = JsonInput::new()
            .process(
                &config(),
                r#"{"fields": {"label": {"pattern-matchers": [
                    {"type": "NOT_CONTAINS", "value": "foo", "case-insensitive": true}
                ]}}}"#,
            )
            .unwrap();

        let label = condition.values_group().field("label").unwrap();
        let pattern = &label.pattern_matchers()[0];
        assert_eq!(pattern.kind(), PatternKind::Contains);
        assert!(pattern.is_exclusive());
        assert!(pattern.is_case_insensitive());
    }

    #[test]
    fn unknown_pattern_type_is_invalid_input() {
        let err = JsonInput::new()
            .process(
                &config(),
                r#"{"fields": {"label": {"pattern-matchers": [{"type": "LIKE", "value": "x"}]}}}"#,
            )
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidInput(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = JsonInput::new()
            .process(&config(), r#"{"fields": {"id": {"values": [1]}}}"#)
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidInput(_)));
    }

    #[test]
    fn empty_bags_are_dropped() {
        let condition = JsonInput::new()
            .process(&config(), r#"{"fields": {"id": {}}}"#)
            .unwrap();
        assert!(!condition.values_group().has_field("id"));
    }
}
