//! The composable query builder.
//!
//! A [`Query`] accumulates clauses through a consuming fluent API and compiles
//! them into a `%s`-placeholder template plus an ordered argument list:
//!
//! ```
//! use recordq::Query;
//!
//! let prep = Query::table("users")
//!     .filter(("name", "john"))
//!     .and_where(("age", "<", 18))
//!     .prepare()
//!     .unwrap();
//!
//! assert_eq!(
//!     prep.sql,
//!     "SELECT * \nFROM `users` \nWHERE ( `name` = %s AND `age` < %s )"
//! );
//! assert_eq!(prep.args.len(), 2);
//! ```
//!
//! Builder misuse (mixing statement kinds, malformed conditions, inconsistent
//! insert rows) does not panic: the first error is recorded and returned by
//! [`Query::prepare`], [`Query::sql`] and every terminal operation.

mod assemble;
mod clause;
mod exec;


pub use assemble::Preparation;
pub use clause::{Direction, JoinKind, JoinSpec, LimitSlot, OrderItem, StatementKind};

use crate::cast::Casts;
use crate::condition::{ConditionTree, Filter, ValueSlot};
use crate::error::{OrmError, OrmResult};
use crate::record::Record;
use crate::value::Raw;
use clause::Clause;

/// What the query runs against.
#[derive(Debug, Clone, Default)]
pub(crate) enum Target {
    /// No table: `SELECT` without `FROM`.
    #[default]
    None,
    Table(String),
    /// A record type: its table plus its cast table for results.
    Record { table: String, casts: Casts },
}

/// SELECT/INSERT/UPDATE/DELETE builder.
#[derive(Debug, Clone, Default)]
pub struct Query {
    kind: Option<StatementKind>,
    target: Target,
    select_list: Vec<String>,
    set_list: Vec<(String, ValueSlot)>,
    insert_rows: Vec<Vec<(String, ValueSlot)>>,
    where_tree: ConditionTree,
    having_tree: ConditionTree,
    group_by: Vec<OrderItem>,
    order_by: Vec<OrderItem>,
    limit: Option<LimitSlot>,
    offset: Option<LimitSlot>,
    joins: Vec<JoinSpec>,
    /// Clauses used so far, for kind compatibility checks.
    used: Vec<Clause>,
    /// First error raised while building.
    build_error: Option<OrmError>,
}

impl Query {
    /// A query without a table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A query against a plain table.
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            target: Target::Table(name.into()),
            ..Self::default()
        }
    }

    /// A query bound to a record type: its table name and its casts.
    pub fn for_record<R: Record>() -> Self {
        Self {
            target: Target::Record {
                table: R::table_name().to_string(),
                casts: R::casts(),
            },
            ..Self::default()
        }
    }

    // ==================== State ====================

    /// The statement kind fixed so far, if any.
    pub fn kind(&self) -> Option<StatementKind> {
        self.kind
    }

    /// The table this query targets, if any.
    pub fn table_name(&self) -> Option<&str> {
        match &self.target {
            Target::None => None,
            Target::Table(name) | Target::Record { table: name, .. } => Some(name),
        }
    }

    /// The cast table results go through (none for plain tables).
    pub(crate) fn casts(&self) -> Option<&Casts> {
        match &self.target {
            Target::Record { casts, .. } => Some(casts),
            _ => None,
        }
    }

    pub fn select_list(&self) -> &[String] {
        &self.select_list
    }

    /// The first error recorded while building, if any.
    pub fn error(&self) -> Option<&OrmError> {
        self.build_error.as_ref()
    }

    /// Fail with the recorded build error, if any.
    pub fn validate(&self) -> OrmResult<()> {
        match &self.build_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn fail(&mut self, err: OrmError) {
        if self.build_error.is_none() {
            self.build_error = Some(err);
        }
    }

    /// Fix the statement kind, checking clauses already used.
    fn assert_kind(&mut self, kind: StatementKind) -> bool {
        if let Some(current) = self.kind {
            if current != kind {
                self.fail(OrmError::ConflictingStatementKind {
                    current,
                    requested: kind,
                });
                return false;
            }
            return true;
        }
        if let Some(clause) = self.used.iter().find(|c| !c.allows(kind)) {
            let clause = clause.name();
            self.fail(OrmError::ClauseNotAllowed { clause, kind });
            return false;
        }
        self.kind = Some(kind);
        true
    }

    /// Record the use of a clause, fixing or checking the statement kind.
    fn touch(&mut self, clause: Clause) -> bool {
        let ok = match (clause.implied_kind(), self.kind) {
            (Some(kind), _) => self.assert_kind(kind),
            (None, Some(kind)) if !clause.allows(kind) => {
                self.fail(OrmError::ClauseNotAllowed {
                    clause: clause.name(),
                    kind,
                });
                false
            }
            (None, _) => true,
        };
        if ok && !self.used.contains(&clause) {
            self.used.push(clause);
        }
        ok
    }

    // ==================== SELECT / UPDATE / INSERT / DELETE ====================

    /// Append columns (or expressions) to the select list.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.touch(Clause::Select) {
            self.select_list.extend(columns.into_iter().map(Into::into));
        }
        self
    }

    /// Make this a SELECT without naming columns (`SELECT *`).
    pub fn select_all(mut self) -> Self {
        self.touch(Clause::Select);
        self
    }

    /// Make this an UPDATE.
    pub fn update(mut self) -> Self {
        self.assert_kind(StatementKind::Update);
        self
    }

    /// Assign a column; re-setting a column replaces its value in place.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<ValueSlot>) -> Self {
        if self.touch(Clause::Set) {
            let column = column.into();
            let value = value.into().normalize();
            match self.set_list.iter_mut().find(|(c, _)| *c == column) {
                Some((_, slot)) => *slot = value,
                None => self.set_list.push((column, value)),
            }
        }
        self
    }

    /// Assign every pair of a mapping, in order.
    pub fn set_all<I, K, V>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ValueSlot>,
    {
        pairs
            .into_iter()
            .fold(self.update(), |query, (column, value)| query.set(column, value))
    }

    /// Add one INSERT row.
    pub fn insert<I, K, V>(self, row: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ValueSlot>,
    {
        self.insert_rows([row])
    }

    /// Add several INSERT rows. The first row's columns define the column
    /// list; every later row must provide all of them. An empty first row
    /// inserts column defaults (`() VALUES ()`).
    pub fn insert_rows<R, I, K, V>(mut self, rows: R) -> Self
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ValueSlot>,
    {
        if !self.touch(Clause::Values) {
            return self;
        }
        for row in rows {
            let mut merged: Vec<(String, ValueSlot)> = Vec::new();
            for (column, value) in row {
                let column: String = column.into();
                let value = value.into().normalize();
                // a repeated column keeps its first position and its last value
                match merged.iter_mut().find(|(c, _)| *c == column) {
                    Some((_, slot)) => *slot = value,
                    None => merged.push((column, value)),
                }
            }
            let row = merged;
            if let Err(err) = self.check_insert_row(&row) {
                self.fail(err);
                return self;
            }
            self.insert_rows.push(row);
        }
        self
    }

    fn check_insert_row(&self, row: &[(String, ValueSlot)]) -> OrmResult<()> {
        let Some(first) = self.insert_rows.first() else {
            return Ok(());
        };
        match first
            .iter()
            .find(|(column, _)| !row.iter().any(|(c, _)| c == column))
        {
            Some((missing, _)) => Err(OrmError::malformed_row(format!(
                "row {} is missing column '{missing}'",
                self.insert_rows.len()
            ))),
            None => Ok(()),
        }
    }

    /// Make this a DELETE.
    pub fn delete(mut self) -> Self {
        self.assert_kind(StatementKind::Delete);
        self
    }

    // ==================== JOIN ====================

    /// `INNER JOIN table ON base.local_column = table.foreign_column`.
    pub fn join(
        self,
        table: impl Into<String>,
        local_column: impl Into<String>,
        foreign_column: impl Into<String>,
    ) -> Self {
        self.join_with(JoinKind::Inner, table, local_column, foreign_column)
    }

    pub fn left_join(
        self,
        table: impl Into<String>,
        local_column: impl Into<String>,
        foreign_column: impl Into<String>,
    ) -> Self {
        self.join_with(JoinKind::Left, table, local_column, foreign_column)
    }

    pub fn right_join(
        self,
        table: impl Into<String>,
        local_column: impl Into<String>,
        foreign_column: impl Into<String>,
    ) -> Self {
        self.join_with(JoinKind::Right, table, local_column, foreign_column)
    }

    pub fn join_with(
        mut self,
        kind: JoinKind,
        table: impl Into<String>,
        local_column: impl Into<String>,
        foreign_column: impl Into<String>,
    ) -> Self {
        if self.touch(Clause::Join) {
            self.joins.push(JoinSpec {
                table: table.into(),
                local_column: local_column.into(),
                foreign_column: foreign_column.into(),
                kind,
            });
        }
        self
    }

    // ==================== WHERE / HAVING ====================

    fn add_condition(mut self, clause: Clause, filter: Filter, new_group: bool) -> Self {
        if !self.touch(clause) {
            return self;
        }
        let items = match filter.into_items() {
            Ok(items) => items,
            Err(err) => {
                self.fail(err);
                return self;
            }
        };
        let tree = match clause {
            Clause::Having => &mut self.having_tree,
            _ => &mut self.where_tree,
        };
        if new_group {
            tree.open_group();
        }
        for item in items {
            tree.push(item);
        }
        self
    }

    /// Add a WHERE condition to the current group.
    ///
    /// Accepts a raw string, a [`Raw`] fragment, `(column, value)`,
    /// `(column, operator, value)` or a list of `(column, value)` pairs.
    pub fn filter(self, filter: impl Into<Filter>) -> Self {
        self.add_condition(Clause::Where, filter.into(), false)
    }

    /// Same as [`Query::filter`].
    pub fn and_where(self, filter: impl Into<Filter>) -> Self {
        self.filter(filter)
    }

    /// Start a new OR-ed group with this condition.
    pub fn or_where(self, filter: impl Into<Filter>) -> Self {
        self.add_condition(Clause::Where, filter.into(), true)
    }

    /// Add a HAVING condition to the current group.
    pub fn having(self, filter: impl Into<Filter>) -> Self {
        self.add_condition(Clause::Having, filter.into(), false)
    }

    /// Same as [`Query::having`].
    pub fn and_having(self, filter: impl Into<Filter>) -> Self {
        self.having(filter)
    }

    pub fn or_having(self, filter: impl Into<Filter>) -> Self {
        self.add_condition(Clause::Having, filter.into(), true)
    }

    // ==================== GROUP BY / ORDER BY ====================

    fn add_order(mut self, clause: Clause, item: OrderItem) -> Self {
        if self.touch(clause) {
            match clause {
                Clause::GroupBy => self.group_by.push(item),
                _ => self.order_by.push(item),
            }
        }
        self
    }

    pub fn group_by(self, column: impl Into<String>, direction: impl Into<Direction>) -> Self {
        let item = OrderItem::Column {
            name: column.into(),
            direction: direction.into(),
        };
        self.add_order(Clause::GroupBy, item)
    }

    pub fn group_by_raw(self, raw: impl Into<Raw>) -> Self {
        self.add_order(Clause::GroupBy, OrderItem::Raw(raw.into()))
    }

    pub fn group_by_all<I, K, D>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<Direction>,
    {
        columns
            .into_iter()
            .fold(self, |query, (column, direction)| query.group_by(column, direction))
    }

    pub fn order_by(self, column: impl Into<String>, direction: impl Into<Direction>) -> Self {
        let item = OrderItem::Column {
            name: column.into(),
            direction: direction.into(),
        };
        self.add_order(Clause::OrderBy, item)
    }

    pub fn order_by_raw(self, raw: impl Into<Raw>) -> Self {
        self.add_order(Clause::OrderBy, OrderItem::Raw(raw.into()))
    }

    pub fn order_by_all<I, K, D>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<Direction>,
    {
        columns
            .into_iter()
            .fold(self, |query, (column, direction)| query.order_by(column, direction))
    }

    // ==================== LIMIT / OFFSET ====================

    pub fn limit(self, limit: u64) -> Self {
        self.set_limit(Clause::Limit, LimitSlot::Count(limit))
    }

    pub fn limit_raw(self, raw: impl Into<Raw>) -> Self {
        self.set_limit(Clause::Limit, LimitSlot::Raw(raw.into()))
    }

    pub fn offset(self, offset: u64) -> Self {
        self.set_limit(Clause::Offset, LimitSlot::Count(offset))
    }

    pub fn offset_raw(self, raw: impl Into<Raw>) -> Self {
        self.set_limit(Clause::Offset, LimitSlot::Raw(raw.into()))
    }

    fn set_limit(mut self, clause: Clause, slot: LimitSlot) -> Self {
        if self.touch(clause) {
            match clause {
                Clause::Offset => self.offset = Some(slot),
                _ => self.limit = Some(slot),
            }
        }
        self
    }
}
