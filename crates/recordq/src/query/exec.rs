//! Terminal operations: run the query through a [`Database`].

use super::Query;
use crate::adapter::Database;
use crate::error::{OrmError, OrmResult};
use crate::row::{FromRow, Row};
use crate::value::Value;

impl Query {
    fn final_sql(&self, db: &impl Database) -> OrmResult<String> {
        let sql = self.sql(db)?;
        tracing::debug!(target: "recordq.sql", sql = %sql, "running query");
        Ok(sql)
    }

    fn single_select_column(&self, operation: &'static str) -> OrmResult<&str> {
        self.validate()?;
        match self.select_list.as_slice() {
            [column] => Ok(column),
            other => Err(OrmError::InvalidSelectArity {
                operation,
                found: other.len(),
            }),
        }
    }

    fn cast_value(&self, column: &str, value: Value) -> Value {
        match self.casts() {
            Some(casts) => casts.cast(column, value),
            None => value,
        }
    }

    fn cast_row(&self, row: Row) -> Row {
        if self.casts().is_none() {
            return row;
        }
        row.into_iter()
            .map(|(column, value)| {
                let value = self.cast_value(&column, value);
                (column, value)
            })
            .collect()
    }

    /// Run the statement; returns the affected row count.
    pub fn execute(&self, db: &impl Database) -> OrmResult<u64> {
        let sql = self.final_sql(db)?;
        db.execute(&sql)
    }

    /// All rows, with record casts applied.
    pub fn get_results(&self, db: &impl Database) -> OrmResult<Vec<Row>> {
        let sql = self.final_sql(db)?;
        let rows = db.query_rows(&sql)?;
        Ok(rows.into_iter().map(|row| self.cast_row(row)).collect())
    }

    /// The first row, with record casts applied.
    pub fn get_row(&self, db: &impl Database) -> OrmResult<Option<Row>> {
        let sql = self.final_sql(db)?;
        Ok(db.query_row(&sql)?.map(|row| self.cast_row(row)))
    }

    /// The single selected column of every row, cast by that column's rule.
    pub fn get_col(&self, db: &impl Database) -> OrmResult<Vec<Value>> {
        let column = self.single_select_column("get_col")?;
        let sql = self.final_sql(db)?;
        let values = db.query_column(&sql)?;
        Ok(values
            .into_iter()
            .map(|value| self.cast_value(column, value))
            .collect())
    }

    /// The single selected value, cast by that column's rule.
    pub fn get_var(&self, db: &impl Database) -> OrmResult<Option<Value>> {
        let column = self.single_select_column("get_var")?;
        let sql = self.final_sql(db)?;
        Ok(db
            .query_scalar(&sql)?
            .map(|value| self.cast_value(column, value)))
    }

    /// All rows mapped through `T::from_row`.
    ///
    /// Rows are handed over uncast; records cast lazily on attribute access.
    pub fn get<T: FromRow>(&self, db: &impl Database) -> OrmResult<Vec<T>> {
        let sql = self.final_sql(db)?;
        db.query_rows(&sql)?.into_iter().map(T::from_row).collect()
    }

    /// The first row mapped through `T::from_row`.
    pub fn get_one<T: FromRow>(&self, db: &impl Database) -> OrmResult<Option<T>> {
        let sql = self.final_sql(db)?;
        db.query_row(&sql)?.map(T::from_row).transpose()
    }
}
