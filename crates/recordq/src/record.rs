//! ActiveRecord-style façade over [`Query`].
//!
//! A record type holds its column values in an [`Attributes`] store and
//! declares its table and casts, usually through `#[derive(Record)]`:
//!
//! ```ignore
//! use recordq::{Attributes, Record};
//!
//! #[derive(Debug, Record)]
//! #[record(table = "posts", casts(id = "int", published = "bool", created_at = "datetime"))]
//! struct Post {
//!     attrs: Attributes,
//! }
//!
//! let mut post = Post::new();
//! post.set_attr("title", "Hello");
//! post.set_attr("published", true); // stored as 1
//! post.save(&db)?;                  // INSERT, then id is set
//!
//! let drafts: Vec<Post> = Post::query().filter(("published", 0)).get(&db)?;
//! ```

use crate::adapter::Database;
use crate::cast::Casts;
use crate::error::{OrmError, OrmResult};
use crate::finder::{Finder, FinderOutput};
use crate::query::Query;
use crate::row::{FromRow, Row};
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;

/// Raw column values of a record plus a memo of their cast values.
///
/// Values are stored in database representation. Cast values are computed on
/// first read and dropped when the column is reassigned.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    values: Row,
    casted: RefCell<HashMap<String, Value>>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored (uncast) value of a column.
    pub fn raw(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Store a value as-is, dropping its memoized cast.
    pub fn set_raw(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        self.casted.get_mut().remove(&column);
        self.values.insert(column, value);
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.casted.get_mut().remove(column);
        self.values.remove(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains(column)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn row(&self) -> &Row {
        &self.values
    }

    pub fn into_row(self) -> Row {
        self.values
    }

    /// Cast value of `column`, computed once through `cast`.
    pub(crate) fn casted(&self, column: &str, cast: impl FnOnce(Value) -> Value) -> Option<Value> {
        if let Some(value) = self.casted.borrow().get(column) {
            return Some(value.clone());
        }
        let value = cast(self.values.get(column)?.clone());
        self.casted
            .borrow_mut()
            .insert(column.to_string(), value.clone());
        Some(value)
    }

    #[cfg(test)]
    pub(crate) fn is_memoized(&self, column: &str) -> bool {
        self.casted.borrow().contains_key(column)
    }
}

impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl From<Row> for Attributes {
    fn from(values: Row) -> Self {
        Self {
            values,
            casted: RefCell::default(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Attributes::from(iter.into_iter().collect::<Row>())
    }
}

/// A table-backed record.
pub trait Record: FromRow {
    /// Table name.
    const TABLE: &'static str;

    /// Column casts; `{ id: int }` unless overridden.
    const CASTS: Casts = Casts::DEFAULT;

    fn table_name() -> &'static str {
        Self::TABLE
    }

    fn casts() -> Casts {
        Self::CASTS
    }

    /// Build a record around stored attributes.
    fn from_attributes(attributes: Attributes) -> Self;

    fn attributes(&self) -> &Attributes;

    fn attributes_mut(&mut self) -> &mut Attributes;

    /// An empty (new) record.
    fn new() -> Self {
        Self::from_attributes(Attributes::new())
    }

    /// A record around values already in database representation.
    fn with_attributes<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::from_attributes(values.into_iter().collect())
    }

    /// A fresh query bound to this record type.
    fn query() -> Query {
        Query::for_record::<Self>()
    }

    /// Database representation → domain representation for `column`.
    fn get_casted_value(column: &str, value: Value) -> Value {
        Self::casts().cast(column, value)
    }

    /// Domain representation → database representation for `column`.
    fn get_decasted_value(column: &str, value: Value) -> Value {
        Self::casts().decast(column, value)
    }

    /// Cast value of an attribute; `None` if it was never set.
    fn get_attr(&self, column: &str) -> Option<Value> {
        self.attributes()
            .casted(column, |value| Self::get_casted_value(column, value))
    }

    /// Decast and store an attribute value.
    fn set_attr(&mut self, column: &str, value: impl Into<Value>) {
        let value = Self::get_decasted_value(column, value.into());
        self.attributes_mut().set_raw(column, value);
    }

    fn id(&self) -> Option<Value> {
        self.get_attr("id").filter(|id| !id.is_null())
    }

    /// Whether this record has not been stored yet (no `id`).
    fn is_new(&self) -> bool {
        self.attributes().raw("id").is_none_or(Value::is_null)
    }

    // ==================== Static helpers ====================

    /// Insert one row; returns the generated id.
    fn insert<I, K, V>(db: &impl Database, values: I) -> OrmResult<Option<i64>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let row: Row = values.into_iter().collect();
        Self::query().insert(row).execute(db)?;
        Ok(db.last_insert_id())
    }

    /// An UPDATE query assigning every pair; add conditions and execute it.
    fn update_all<I, K, V>(pairs: I) -> Query
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let row: Row = pairs.into_iter().collect();
        Self::query().set_all(row)
    }

    fn delete_by_id(db: &impl Database, id: impl Into<Value>) -> OrmResult<u64> {
        Self::query()
            .delete()
            .filter(("id", id.into()))
            .execute(db)
    }

    fn find(db: &impl Database, id: impl Into<Value>) -> OrmResult<Option<Self>> {
        Self::query().filter(("id", id.into())).get_one(db)
    }

    /// Like [`Record::find`], but a missing row is an error.
    fn find_or_fail(db: &impl Database, id: impl Into<Value>) -> OrmResult<Self> {
        let id = id.into();
        Self::find(db, id.clone())?
            .ok_or_else(|| OrmError::not_found(format!("{} with id {id}", Self::table_name())))
    }

    fn all(db: &impl Database) -> OrmResult<Vec<Self>> {
        Self::query().get(db)
    }

    /// Build a record from domain values and save it.
    fn create<I, K, V>(db: &impl Database, values: I) -> OrmResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut record = Self::new();
        for (column, value) in values {
            record.set_attr(column.as_ref(), value);
        }
        record.save(db)?;
        Ok(record)
    }

    /// INSERT a new record (and take the generated id), or UPDATE every
    /// attribute of a stored one by id.
    fn save(&mut self, db: &impl Database) -> OrmResult<()> {
        if self.is_new() {
            let row: Row = self
                .attributes()
                .row()
                .iter()
                .filter(|(column, _)| *column != "id")
                .map(|(column, value)| (column.to_string(), value.clone()))
                .collect();
            let id = Self::insert(db, row)?;
            if let Some(id) = id {
                self.attributes_mut().set_raw("id", id);
            }
        } else {
            let id = self.get_attr("id").unwrap_or_default();
            Self::update_all(self.attributes().row().clone())
                .filter(("id", id))
                .execute(db)?;
        }
        Ok(())
    }

    /// Delete a stored record by id and forget the id; no-op for new records.
    fn delete(&mut self, db: &impl Database) -> OrmResult<()> {
        let Some(id) = self.id() else {
            return Ok(());
        };
        Self::delete_by_id(db, id)?;
        self.attributes_mut().remove("id");
        Ok(())
    }

    /// Run a finder against this record type.
    fn find_by<I, V>(db: &impl Database, finder: &Finder, args: I) -> OrmResult<FinderOutput<Self>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        finder.run::<Self>(db, args)
    }
}
