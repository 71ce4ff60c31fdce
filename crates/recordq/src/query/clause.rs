//! Clause-level building blocks of a [`Query`](super::Query).

use crate::condition::quote_ident;
use crate::value::{Raw, Value};
use std::fmt;

/// The statement a query compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clauses tracked for statement-kind compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Clause {
    Select,
    Set,
    Values,
    Join,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    Offset,
}

impl Clause {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Clause::Select => "SELECT list",
            Clause::Set => "SET",
            Clause::Values => "VALUES",
            Clause::Join => "JOIN",
            Clause::Where => "WHERE",
            Clause::GroupBy => "GROUP BY",
            Clause::Having => "HAVING",
            Clause::OrderBy => "ORDER BY",
            Clause::Limit => "LIMIT",
            Clause::Offset => "OFFSET",
        }
    }

    /// The kind a clause fixes the statement to, if any.
    pub(crate) fn implied_kind(self) -> Option<StatementKind> {
        match self {
            Clause::Select | Clause::Join | Clause::GroupBy | Clause::Having => {
                Some(StatementKind::Select)
            }
            Clause::Set => Some(StatementKind::Update),
            Clause::Values => Some(StatementKind::Insert),
            Clause::Where | Clause::OrderBy | Clause::Limit | Clause::Offset => None,
        }
    }

    pub(crate) fn allows(self, kind: StatementKind) -> bool {
        match self.implied_kind() {
            Some(implied) => implied == kind,
            None => kind != StatementKind::Insert,
        }
    }
}

/// Sort direction for GROUP BY / ORDER BY items.
///
/// Anything but a case-insensitive `"ASC"` (or `true`) means descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<bool> for Direction {
    fn from(ascending: bool) -> Self {
        if ascending {
            Direction::Asc
        } else {
            Direction::Desc
        }
    }
}

impl From<&str> for Direction {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("ASC") {
            Direction::Asc
        } else {
            Direction::Desc
        }
    }
}

impl From<String> for Direction {
    fn from(s: String) -> Self {
        Direction::from(s.as_str())
    }
}

/// One GROUP BY / ORDER BY entry.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderItem {
    Column { name: String, direction: Direction },
    Raw(Raw),
}

impl OrderItem {
    pub(crate) fn render(&self, args: &mut Vec<Value>) -> String {
        match self {
            OrderItem::Column { name, direction } => {
                format!("{} {}", quote_ident(name), direction)
            }
            OrderItem::Raw(raw) => {
                args.extend_from_slice(raw.args());
                raw.sql().to_string()
            }
        }
    }
}

/// LIMIT / OFFSET value.
#[derive(Debug, Clone, PartialEq)]
pub enum LimitSlot {
    /// Bound through `%d`.
    Count(u64),
    /// Verbatim, with its own arguments.
    Raw(Raw),
}

impl LimitSlot {
    pub(crate) fn render(&self, keyword: &str, args: &mut Vec<Value>) -> String {
        match self {
            LimitSlot::Count(n) => {
                args.push(Value::from(*n));
                format!("{keyword} %d")
            }
            LimitSlot::Raw(raw) => {
                args.extend_from_slice(raw.args());
                format!("{keyword} {}", raw.sql())
            }
        }
    }
}

impl From<u64> for LimitSlot {
    fn from(n: u64) -> Self {
        LimitSlot::Count(n)
    }
}

impl From<u32> for LimitSlot {
    fn from(n: u32) -> Self {
        LimitSlot::Count(u64::from(n))
    }
}

impl From<usize> for LimitSlot {
    fn from(n: usize) -> Self {
        LimitSlot::Count(n as u64)
    }
}

impl From<Raw> for LimitSlot {
    fn from(raw: Raw) -> Self {
        LimitSlot::Raw(raw)
    }
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
        }
    }
}

/// `<KIND> JOIN table ON base.local_column = table.foreign_column`.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    pub table: String,
    pub local_column: String,
    pub foreign_column: String,
    pub kind: JoinKind,
}

impl JoinSpec {
    pub(crate) fn render(&self, base_table: &str) -> String {
        format!(
            "{} JOIN {} ON {}.{} = {}.{}",
            self.kind.as_str(),
            quote_ident(&self.table),
            quote_ident(base_table),
            quote_ident(&self.local_column),
            quote_ident(&self.table),
            quote_ident(&self.foreign_column),
        )
    }
}
