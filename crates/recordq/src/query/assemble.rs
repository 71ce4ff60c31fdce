//! SQL assembly.

use super::{Query, StatementKind};
use crate::adapter::Database;
use crate::condition::quote_ident;
use crate::error::{OrmError, OrmResult};
use crate::value::Value;

/// LIMIT emitted when only an OFFSET was requested (the largest unsigned
/// 64-bit value).
const NO_LIMIT: &str = "LIMIT 18446744073709551615";

/// Separator between clauses.
const CLAUSE_SEPARATOR: &str = " \n";

/// A compiled statement: `%s`/`%d` template plus its arguments in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Preparation {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Query {
    /// Compile the accumulated clauses.
    ///
    /// Clause order is fixed: head, SET, VALUES, JOIN, WHERE, GROUP BY,
    /// HAVING, ORDER BY, LIMIT, OFFSET.
    pub fn prepare(&self) -> OrmResult<Preparation> {
        self.validate()?;

        let kind = self.kind.unwrap_or(StatementKind::Select);
        let table = self.table_name();
        let mut sql: Vec<String> = Vec::new();
        let mut args: Vec<Value> = Vec::new();

        let require_table = || table.ok_or(OrmError::MissingTable { kind });
        let missing_clause = |clause: &'static str| OrmError::MissingClause { clause, kind };
        match kind {
            StatementKind::Update if self.set_list.is_empty() => {
                return Err(missing_clause("SET"));
            }
            StatementKind::Insert if self.insert_rows.is_empty() => {
                return Err(missing_clause("VALUES"));
            }
            _ => {}
        }

        match kind {
            StatementKind::Delete => {
                sql.push(format!("DELETE FROM {}", quote_ident(require_table()?)));
            }
            StatementKind::Update => {
                sql.push(format!("UPDATE {}", quote_ident(require_table()?)));
            }
            StatementKind::Insert => {
                sql.push(format!("INSERT INTO {}", quote_ident(require_table()?)));
            }
            StatementKind::Select => {
                if self.select_list.is_empty() {
                    sql.push("SELECT *".to_string());
                } else {
                    sql.push(format!("SELECT {}", self.select_list.join(", ")));
                }
                if let Some(table) = table {
                    sql.push(format!("FROM {}", quote_ident(table)));
                }
            }
        }

        if !self.set_list.is_empty() {
            let assignments: Vec<String> = self
                .set_list
                .iter()
                .map(|(column, value)| {
                    format!("{} = {}", quote_ident(column), value.render(&mut args))
                })
                .collect();
            sql.push(format!("SET {}", assignments.join(", ")));
        }

        if let Some(first) = self.insert_rows.first() {
            // an empty first row renders `() VALUES ()`
            let columns: Vec<&str> = first.iter().map(|(c, _)| c.as_str()).collect();
            let quoted: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
            let mut rows = Vec::with_capacity(self.insert_rows.len());
            for row in &self.insert_rows {
                let mut values = Vec::with_capacity(columns.len());
                for column in &columns {
                    let slot = row
                        .iter()
                        .find(|(c, _)| c == column)
                        .map(|(_, v)| v)
                        .ok_or_else(|| {
                            OrmError::malformed_row(format!("missing column '{column}'"))
                        })?;
                    values.push(slot.render(&mut args));
                }
                rows.push(format!("({})", values.join(", ")));
            }
            sql.push(format!("({}) VALUES {}", quoted.join(", "), rows.join(", ")));
        }

        if !self.joins.is_empty() {
            let base = require_table()?;
            for join in &self.joins {
                sql.push(join.render(base));
            }
        }

        if !self.where_tree.is_empty() {
            sql.push(format!("WHERE {}", self.where_tree.render(&mut args)));
        }

        if !self.group_by.is_empty() {
            let items: Vec<String> = self.group_by.iter().map(|i| i.render(&mut args)).collect();
            sql.push(format!("GROUP BY {}", items.join(", ")));
        }

        if !self.having_tree.is_empty() {
            sql.push(format!("HAVING {}", self.having_tree.render(&mut args)));
        }

        if !self.order_by.is_empty() {
            let items: Vec<String> = self.order_by.iter().map(|i| i.render(&mut args)).collect();
            sql.push(format!("ORDER BY {}", items.join(", ")));
        }

        match (&self.limit, &self.offset) {
            (Some(limit), _) => sql.push(limit.render("LIMIT", &mut args)),
            (None, Some(_)) => sql.push(NO_LIMIT.to_string()),
            (None, None) => {}
        }

        if let Some(offset) = &self.offset {
            sql.push(offset.render("OFFSET", &mut args));
        }

        let sql = sql.join(CLAUSE_SEPARATOR);
        tracing::trace!(
            target: "recordq.query",
            kind = %kind,
            param_count = args.len(),
            sql = %sql,
            "prepared query"
        );
        Ok(Preparation { sql, args })
    }

    /// Final SQL: the template bound through the adapter, or the template
    /// itself when there is nothing to bind.
    pub fn sql(&self, db: &impl Database) -> OrmResult<String> {
        let Preparation { sql, args } = self.prepare()?;
        if args.is_empty() {
            return Ok(sql);
        }
        db.prepare(&sql, &args)
    }
}
