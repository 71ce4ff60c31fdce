//! The database adapter contract.
//!
//! The builder never talks to a driver directly. Terminal operations take a
//! `&impl Database`, which binds the assembled template and runs the final
//! SQL. Implementors only need [`Database::execute`],
//! [`Database::last_insert_id`] and [`Database::query_rows`]; everything else
//! has a default.
//!
//! ```ignore
//! struct Conn { /* driver handle */ }
//!
//! impl Database for Conn {
//!     fn execute(&self, sql: &str) -> OrmResult<u64> { /* ... */ }
//!     fn last_insert_id(&self) -> Option<i64> { /* ... */ }
//!     fn query_rows(&self, sql: &str) -> OrmResult<Vec<Row>> { /* ... */ }
//! }
//!
//! let names = Query::table("users").select(["name"]).get_col(&conn)?;
//! ```

mod config;
mod logged;
pub mod placeholder;


pub use config::LogConfig;
pub use logged::LoggedDatabase;

use crate::error::OrmResult;
use crate::row::Row;
use crate::value::Value;

/// A synchronous database connection.
pub trait Database {
    /// Bind `args` into a `%s`/`%d`/`%f` template.
    ///
    /// The default uses [`placeholder::bind`].
    fn prepare(&self, template: &str, args: &[Value]) -> OrmResult<String> {
        placeholder::bind(template, args)
    }

    /// Run a statement and return the number of affected rows.
    fn execute(&self, sql: &str) -> OrmResult<u64>;

    /// Id generated by the last INSERT, if any.
    fn last_insert_id(&self) -> Option<i64>;

    /// Run a query and return every row.
    fn query_rows(&self, sql: &str) -> OrmResult<Vec<Row>>;

    /// Run a query and return the first row.
    fn query_row(&self, sql: &str) -> OrmResult<Option<Row>> {
        Ok(self.query_rows(sql)?.into_iter().next())
    }

    /// Run a query and return the first column of every row.
    fn query_column(&self, sql: &str) -> OrmResult<Vec<Value>> {
        Ok(self
            .query_rows(sql)?
            .into_iter()
            .map(|row| row.into_first_value().unwrap_or_default())
            .collect())
    }

    /// Run a query and return the first column of the first row.
    fn query_scalar(&self, sql: &str) -> OrmResult<Option<Value>> {
        Ok(self.query_row(sql)?.and_then(Row::into_first_value))
    }
}

impl<D: Database + ?Sized> Database for &D {
    fn prepare(&self, template: &str, args: &[Value]) -> OrmResult<String> {
        (**self).prepare(template, args)
    }

    fn execute(&self, sql: &str) -> OrmResult<u64> {
        (**self).execute(sql)
    }

    fn last_insert_id(&self) -> Option<i64> {
        (**self).last_insert_id()
    }

    fn query_rows(&self, sql: &str) -> OrmResult<Vec<Row>> {
        (**self).query_rows(sql)
    }

    fn query_row(&self, sql: &str) -> OrmResult<Option<Row>> {
        (**self).query_row(sql)
    }

    fn query_column(&self, sql: &str) -> OrmResult<Vec<Value>> {
        (**self).query_column(sql)
    }

    fn query_scalar(&self, sql: &str) -> OrmResult<Option<Value>> {
        (**self).query_scalar(sql)
    }
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
