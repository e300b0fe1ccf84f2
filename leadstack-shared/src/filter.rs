/// Filter specification → predicate compiler
///
/// This module translates the client-supplied lead filter specification (a
/// per-field `{operator, value}` map arriving as untyped JSON) into a
/// normalized set of store-agnostic predicates. The lead store renders the
/// predicates into parameterized SQL; this module performs no I/O.
///
/// # Grammar
///
/// | field                        | operators                  | value shape        |
/// |------------------------------|----------------------------|--------------------|
/// | email, company, city         | equals, contains           | string             |
/// | status, source               | equals, in                 | string / [string]  |
/// | score, lead_value            | equals, gt, lt, between    | number / [n, n]    |
/// | created_at, last_activity_at | on, before, after, between | date / [date, date]|
/// | is_qualified                 | (implicit equals)          | bare boolean       |
///
/// Compilation is total and lenient: unrecognized fields, unknown operators,
/// and values of the wrong shape are silently dropped. This tolerates client
/// drift — an outdated UI never turns into a 500. Fields combine with logical
/// AND; there is no OR.
///
/// # Determinism
///
/// The compiler walks a fixed field table, so the same specification always
/// compiles to the same predicate vector regardless of JSON key order.
///
/// # Example
///
/// ```
/// use leadstack_shared::filter::{compile, FilterSpec, Predicate, Scalar};
/// use serde_json::json;
///
/// let spec: FilterSpec = serde_json::from_value(json!({
///     "score": { "operator": "between", "value": [40, 60] },
///     "is_qualified": true
/// })).unwrap();
///
/// let predicates = compile(&spec);
/// assert_eq!(predicates.len(), 2);
/// assert_eq!(
///     predicates[1],
///     Predicate::Eq { column: "is_qualified", value: Scalar::Flag(true) }
/// );
/// ```
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Client-supplied filter specification: field name → raw JSON filter.
///
/// Deserialized from the URL-encoded `filters` query parameter. Values are
/// kept untyped here; shape checking happens during compilation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec(pub BTreeMap<String, Value>);

impl FilterSpec {
    /// True when no filters were supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A typed filter value bound into a store query.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Flag(bool),
    Time(DateTime<Utc>),
}

/// A single compiled field predicate.
///
/// Predicates are store-agnostic: the lead store decides how each variant
/// renders against its schema (e.g. `TextContains` becomes an escaped
/// `ILIKE`). All predicates in a compiled set combine with AND.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Exact match (case-sensitive for text).
    Eq {
        column: &'static str,
        value: Scalar,
    },

    /// Case-insensitive substring match.
    TextContains {
        column: &'static str,
        needle: String,
    },

    /// Set membership.
    AnyOf {
        column: &'static str,
        values: Vec<String>,
    },

    /// Strictly greater than.
    Gt {
        column: &'static str,
        value: Scalar,
    },

    /// Strictly less than.
    Lt {
        column: &'static str,
        value: Scalar,
    },

    /// Inclusive range: low <= column <= high.
    ///
    /// Bounds are emitted exactly as supplied — a reversed range simply
    /// matches nothing. The caller owns well-formedness.
    Within {
        column: &'static str,
        low: Scalar,
        high: Scalar,
    },

    /// Half-open day window: start <= column < end.
    DayWindow {
        column: &'static str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// How a filterable field compiles.
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    /// Free text: equals / contains
    Text,

    /// Fixed enumeration: equals / in
    Choice,

    /// Numeric: equals / gt / lt / between
    Number,

    /// Timestamp: on / before / after / between
    Timestamp,

    /// Boolean flag, bare value with implicit equals
    Flag,
}

/// The declarative field table. Compilation iterates this in order, so the
/// output is deterministic and fields outside the table are never consulted.
const FIELDS: &[(&str, FieldKind)] = &[
    ("email", FieldKind::Text),
    ("company", FieldKind::Text),
    ("city", FieldKind::Text),
    ("status", FieldKind::Choice),
    ("source", FieldKind::Choice),
    ("score", FieldKind::Number),
    ("lead_value", FieldKind::Number),
    ("created_at", FieldKind::Timestamp),
    ("last_activity_at", FieldKind::Timestamp),
    ("is_qualified", FieldKind::Flag),
];

/// Compiles a filter specification into a predicate set.
///
/// Pure and total: malformed input never errors, it just contributes no
/// predicate. An empty specification compiles to an empty vector (the caller
/// still conjoins its mandatory owner predicate).
pub fn compile(spec: &FilterSpec) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    for &(field, kind) in FIELDS {
        let Some(raw) = spec.0.get(field) else {
            continue;
        };

        let compiled = match kind {
            FieldKind::Text => compile_text(field, raw),
            FieldKind::Choice => compile_choice(field, raw),
            FieldKind::Number => compile_number(field, raw),
            FieldKind::Timestamp => compile_timestamp(field, raw),
            FieldKind::Flag => raw.as_bool().map(|b| Predicate::Eq {
                column: field,
                value: Scalar::Flag(b),
            }),
        };

        if let Some(predicate) = compiled {
            predicates.push(predicate);
        }
    }

    predicates
}

/// Extracts the `{operator, value}` pair from a raw field filter.
fn operator_and_value(raw: &Value) -> Option<(&str, &Value)> {
    let obj = raw.as_object()?;
    let operator = obj.get("operator")?.as_str()?;
    let value = obj.get("value")?;
    Some((operator, value))
}

fn compile_text(column: &'static str, raw: &Value) -> Option<Predicate> {
    let (operator, value) = operator_and_value(raw)?;
    let value = value.as_str()?;

    match operator {
        "equals" => Some(Predicate::Eq {
            column,
            value: Scalar::Text(value.to_string()),
        }),
        "contains" => Some(Predicate::TextContains {
            column,
            needle: value.to_string(),
        }),
        _ => None,
    }
}

fn compile_choice(column: &'static str, raw: &Value) -> Option<Predicate> {
    let (operator, value) = operator_and_value(raw)?;

    match operator {
        "equals" => Some(Predicate::Eq {
            column,
            value: Scalar::Text(value.as_str()?.to_string()),
        }),
        "in" => {
            let values: Option<Vec<String>> = value
                .as_array()?
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect();
            Some(Predicate::AnyOf {
                column,
                values: values?,
            })
        }
        _ => None,
    }
}

fn compile_number(column: &'static str, raw: &Value) -> Option<Predicate> {
    let (operator, value) = operator_and_value(raw)?;

    match operator {
        "equals" => Some(Predicate::Eq {
            column,
            value: Scalar::Number(value.as_f64()?),
        }),
        "gt" => Some(Predicate::Gt {
            column,
            value: Scalar::Number(value.as_f64()?),
        }),
        "lt" => Some(Predicate::Lt {
            column,
            value: Scalar::Number(value.as_f64()?),
        }),
        "between" => {
            let bounds = value.as_array()?;
            if bounds.len() != 2 {
                return None;
            }
            Some(Predicate::Within {
                column,
                low: Scalar::Number(bounds[0].as_f64()?),
                high: Scalar::Number(bounds[1].as_f64()?),
            })
        }
        _ => None,
    }
}

fn compile_timestamp(column: &'static str, raw: &Value) -> Option<Predicate> {
    let (operator, value) = operator_and_value(raw)?;

    match operator {
        "on" => {
            let start = parse_timestamp(value)?;
            Some(Predicate::DayWindow {
                column,
                start,
                end: start + Duration::days(1),
            })
        }
        "before" => Some(Predicate::Lt {
            column,
            value: Scalar::Time(parse_timestamp(value)?),
        }),
        "after" => Some(Predicate::Gt {
            column,
            value: Scalar::Time(parse_timestamp(value)?),
        }),
        "between" => {
            let bounds = value.as_array()?;
            if bounds.len() != 2 {
                return None;
            }
            Some(Predicate::Within {
                column,
                low: Scalar::Time(parse_timestamp(&bounds[0])?),
                high: Scalar::Time(parse_timestamp(&bounds[1])?),
            })
        }
        _ => None,
    }
}

/// Parses a timestamp filter value.
///
/// Accepts RFC 3339 datetimes and bare `YYYY-MM-DD` dates (interpreted as
/// midnight UTC, matching how a date-only picker filters).
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let s = value.as_str()?;

    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(DateTime::from_naive_utc_and_offset(midnight, Utc))
}
