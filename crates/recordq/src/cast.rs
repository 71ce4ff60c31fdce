//! Per-column value casting.
//!
//! A record type declares a static [`Casts`] table mapping column names to a
//! [`CastRule`]. Values read from the database go through `cast`, values
//! assigned by the caller go through `decast` before they are stored.

use crate::value::{DATETIME_FORMAT, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt;

/// Built-in cast kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    Int,
    Float,
    Boolean,
    DateTime,
}

impl CastKind {
    /// Resolve a cast name, case-insensitively, following the aliases
    /// `integer → int`, `number → float` and `bool → boolean`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "int" | "integer" => Some(CastKind::Int),
            "float" | "number" => Some(CastKind::Float),
            "boolean" | "bool" => Some(CastKind::Boolean),
            "datetime" => Some(CastKind::DateTime),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CastKind::Int => "int",
            CastKind::Float => "float",
            CastKind::Boolean => "boolean",
            CastKind::DateTime => "datetime",
        }
    }

    /// Database representation → domain representation.
    pub fn cast(self, value: Value) -> Value {
        if value.is_null() {
            return value;
        }
        match self {
            CastKind::Int => Value::Int(value.to_i64_lossy()),
            CastKind::Float => Value::Float(value.to_f64_lossy()),
            CastKind::Boolean => Value::Bool(value.is_truthy()),
            CastKind::DateTime => match to_datetime(&value) {
                Some(dt) => Value::DateTime(dt),
                None => {
                    tracing::warn!(
                        target: "recordq.cast",
                        value = %value,
                        "unparsable datetime value left unchanged"
                    );
                    value
                }
            },
        }
    }

    /// Domain representation → database representation.
    pub fn decast(self, value: Value) -> Value {
        if value.is_null() {
            return value;
        }
        match self {
            CastKind::Int | CastKind::Float => value,
            CastKind::Boolean => Value::Int(i64::from(value.is_truthy())),
            CastKind::DateTime => match to_datetime(&value) {
                Some(dt) => Value::Text(dt.format(DATETIME_FORMAT).to_string()),
                None => value,
            },
        }
    }
}

impl fmt::Display for CastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn to_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::DateTime(dt) => Some(*dt),
        Value::Int(ts) => DateTime::from_timestamp(*ts, 0).map(|dt| dt.naive_utc()),
        Value::Text(s) => parse_datetime(s.trim()),
        _ => None,
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    s.parse::<i64>()
        .ok()
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.naive_utc())
}

/// Transform applied in one direction by a custom rule.
pub type CastFn = fn(Value) -> Value;

/// How one column is cast.
#[derive(Debug, Clone, Copy)]
pub enum CastRule {
    /// A built-in kind by name; unknown names leave values unchanged.
    Named(&'static str),
    /// Caller-provided transforms; a missing direction is the identity.
    Custom {
        cast: Option<CastFn>,
        decast: Option<CastFn>,
    },
}

impl CastRule {
    pub fn cast(&self, value: Value) -> Value {
        match self {
            CastRule::Named(name) => match CastKind::parse(name) {
                Some(kind) => kind.cast(value),
                None => value,
            },
            CastRule::Custom { cast, .. } => match cast {
                Some(f) => f(value),
                None => value,
            },
        }
    }

    pub fn decast(&self, value: Value) -> Value {
        match self {
            CastRule::Named(name) => match CastKind::parse(name) {
                Some(kind) => kind.decast(value),
                None => value,
            },
            CastRule::Custom { decast, .. } => match decast {
                Some(f) => f(value),
                None => value,
            },
        }
    }
}

/// Static column → rule table of a record type.
///
/// ```
/// use recordq::{CastRule, Casts, Value};
///
/// static CASTS: Casts = Casts::new(&[
///     ("id", CastRule::Named("int")),
///     ("active", CastRule::Named("bool")),
/// ]);
///
/// assert_eq!(CASTS.cast("id", Value::from("7")), Value::Int(7));
/// assert_eq!(CASTS.decast("active", Value::Bool(true)), Value::Int(1));
/// assert_eq!(CASTS.cast("name", Value::from("x")), Value::from("x"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Casts {
    rules: &'static [(&'static str, CastRule)],
}

impl Casts {
    /// `{ id: int }`.
    pub const DEFAULT: Casts = Casts::new(&[("id", CastRule::Named("int"))]);

    /// No casting at all.
    pub const NONE: Casts = Casts::new(&[]);

    pub const fn new(rules: &'static [(&'static str, CastRule)]) -> Self {
        Self { rules }
    }

    pub fn rule(&self, column: &str) -> Option<&CastRule> {
        self.rules
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, rule)| rule)
    }

    pub fn rules(&self) -> &'static [(&'static str, CastRule)] {
        self.rules
    }

    pub fn cast(&self, column: &str, value: Value) -> Value {
        match self.rule(column) {
            Some(rule) => rule.cast(value),
            None => value,
        }
    }

    pub fn decast(&self, column: &str, value: Value) -> Value {
        match self.rule(column) {
            Some(rule) => rule.decast(value),
            None => value,
        }
    }
}

impl Default for Casts {
    fn default() -> Self {
        Casts::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).unwrap()
    }

    #[test]
    fn names_resolve_aliases_case_insensitively() {
        assert_eq!(CastKind::parse("INTEGER"), Some(CastKind::Int));
        assert_eq!(CastKind::parse("Number"), Some(CastKind::Float));
        assert_eq!(CastKind::parse("bool"), Some(CastKind::Boolean));
        assert_eq!(CastKind::parse("DateTime"), Some(CastKind::DateTime));
        assert_eq!(CastKind::parse("json"), None);
    }

    #[test]
    fn int_and_float_casts() {
        assert_eq!(CastKind::Int.cast(Value::from("12abc")), Value::Int(12));
        assert_eq!(CastKind::Int.cast(Value::Float(3.9)), Value::Int(3));
        assert_eq!(CastKind::Int.cast(Value::Bool(true)), Value::Int(1));
        assert_eq!(CastKind::Float.cast(Value::from("2.5")), Value::Float(2.5));
        assert_eq!(CastKind::Int.decast(Value::Int(4)), Value::Int(4));
    }

    #[test]
    fn boolean_cast_and_decast() {
        assert_eq!(CastKind::Boolean.cast(Value::from("0")), Value::Bool(false));
        assert_eq!(CastKind::Boolean.cast(Value::from("1")), Value::Bool(true));
        assert_eq!(CastKind::Boolean.decast(Value::Bool(true)), Value::Int(1));
        assert_eq!(CastKind::Boolean.decast(Value::Bool(false)), Value::Int(0));
    }

    #[test]
    fn datetime_accepts_several_formats() {
        let expected = Value::DateTime(dt("2018-06-18 08:12:00"));
        for input in [
            Value::from("2018-06-18 08:12:00"),
            Value::from("2018-06-18T08:12:00"),
            Value::from("2018-06-18T08:12:00+00:00"),
            Value::Int(1_529_309_520),
        ] {
            assert_eq!(CastKind::DateTime.cast(input), expected);
        }
        assert_eq!(
            CastKind::DateTime.cast(Value::from("2018-06-18")),
            Value::DateTime(dt("2018-06-18 00:00:00"))
        );
    }

    #[test]
    fn unparsable_datetime_is_unchanged() {
        assert_eq!(
            CastKind::DateTime.cast(Value::from("not a date")),
            Value::from("not a date")
        );
    }

    #[test]
    fn datetime_decast_formats() {
        assert_eq!(
            CastKind::DateTime.decast(Value::DateTime(dt("2018-06-18 08:12:00"))),
            Value::from("2018-06-18 08:12:00")
        );
    }

    #[test]
    fn null_passes_through() {
        for kind in [
            CastKind::Int,
            CastKind::Float,
            CastKind::Boolean,
            CastKind::DateTime,
        ] {
            assert_eq!(kind.cast(Value::Null), Value::Null);
            assert_eq!(kind.decast(Value::Null), Value::Null);
        }
    }

    #[test]
    fn cast_of_decast_is_idempotent_for_domain_values() {
        let cases = [
            (CastKind::Int, Value::Int(42)),
            (CastKind::Float, Value::Float(1.25)),
            (CastKind::Boolean, Value::Bool(true)),
            (CastKind::Boolean, Value::Bool(false)),
            (CastKind::DateTime, Value::DateTime(dt("2020-01-02 03:04:05"))),
        ];
        for (kind, value) in cases {
            assert_eq!(kind.cast(kind.decast(value.clone())), value, "{kind}");
        }
    }

    #[test]
    fn custom_rules_apply_present_directions() {
        fn upper(v: Value) -> Value {
            Value::Text(v.to_string().to_uppercase())
        }
        let rule = CastRule::Custom {
            cast: Some(upper),
            decast: None,
        };
        assert_eq!(rule.cast(Value::from("ab")), Value::from("AB"));
        assert_eq!(rule.decast(Value::from("ab")), Value::from("ab"));
    }

    #[test]
    fn unknown_named_rule_is_identity() {
        let casts = Casts::new(&[("meta", CastRule::Named("json"))]);
        assert_eq!(casts.cast("meta", Value::from("{}")), Value::from("{}"));
        assert_eq!(Casts::DEFAULT.cast("id", Value::from("9")), Value::Int(9));
    }
}
