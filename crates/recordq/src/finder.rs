//! Convention-named finders such as `get_one_by_name_and_category_id`.
//!
//! A finder name is parsed once into a [`Finder`], which can then be applied
//! to any query with positional arguments:
//!
//! | prefix                         | result                    |
//! |--------------------------------|---------------------------|
//! | `get_by_…`                     | records                   |
//! | `get_one_by_…`                 | first record              |
//! | `get_results_by_…`             | cast rows                 |
//! | `get_row_by_…`                 | first cast row            |
//! | `get_var_<col>_by_…`           | one value of `<col>`      |
//! | `get_col_<col>[_by_…]`         | every value of `<col>`    |
//!
//! Columns are split on `_and_` first, then on `_or_`. Within each `_and_`
//! part the first column is a plain where call and the rest are `or_where`
//! calls, so `name_or_title_and_status` renders as
//! `( name = %s ) OR ( title = %s AND status = %s )`.

use crate::adapter::Database;
use crate::error::{OrmError, OrmResult};
use crate::query::Query;
use crate::record::Record;
use crate::row::Row;
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// Which terminal operation a finder runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinderTerminal {
    Get,
    GetOne,
    GetRow,
    GetResults,
    GetVar,
    GetCol,
}

/// A parsed finder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finder {
    pub terminal: FinderTerminal,
    /// Selected column for `get_var_…` / `get_col_…`.
    pub select: Option<String>,
    /// AND-groups of OR-ed column names.
    pub groups: Vec<Vec<String>>,
}

/// Result of running a finder.
#[derive(Debug)]
pub enum FinderOutput<R> {
    Records(Vec<R>),
    Record(Option<R>),
    Rows(Vec<Row>),
    Row(Option<Row>),
    Values(Vec<Value>),
    Value(Option<Value>),
}

impl<R> FinderOutput<R> {
    pub fn into_records(self) -> Option<Vec<R>> {
        match self {
            FinderOutput::Records(records) => Some(records),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<R> {
        match self {
            FinderOutput::Record(record) => record,
            _ => None,
        }
    }

    pub fn into_rows(self) -> Option<Vec<Row>> {
        match self {
            FinderOutput::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn into_row(self) -> Option<Row> {
        match self {
            FinderOutput::Row(row) => row,
            _ => None,
        }
    }

    pub fn into_values(self) -> Option<Vec<Value>> {
        match self {
            FinderOutput::Values(values) => Some(values),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            FinderOutput::Value(value) => value,
            _ => None,
        }
    }
}

const BY: &str = "_by_";

impl Finder {
    /// Parse a finder name.
    ///
    /// ```
    /// use recordq::{Finder, FinderTerminal};
    ///
    /// let finder = Finder::parse("get_var_name_by_id").unwrap();
    /// assert_eq!(finder.terminal, FinderTerminal::GetVar);
    /// assert_eq!(finder.select.as_deref(), Some("name"));
    /// assert_eq!(finder.groups, vec![vec!["id".to_string()]]);
    /// ```
    pub fn parse(name: &str) -> OrmResult<Self> {
        let unknown = || OrmError::UnknownFinderMethod(name.to_string());

        let (terminal, select, conditions) = if let Some(rest) = name.strip_prefix("get_by_") {
            (FinderTerminal::Get, None, rest)
        } else if let Some(rest) = name.strip_prefix("get_one_by_") {
            (FinderTerminal::GetOne, None, rest)
        } else if let Some(rest) = name.strip_prefix("get_row_by_") {
            (FinderTerminal::GetRow, None, rest)
        } else if let Some(rest) = name.strip_prefix("get_results_by_") {
            (FinderTerminal::GetResults, None, rest)
        } else if let Some(rest) = name.strip_prefix("get_var_") {
            // get_var always needs a WHERE clause
            let (column, conditions) = rest.split_once(BY).ok_or_else(unknown)?;
            (FinderTerminal::GetVar, Some(column), conditions)
        } else if let Some(rest) = name.strip_prefix("get_col_") {
            let (column, conditions) = rest.split_once(BY).unwrap_or((rest, ""));
            (FinderTerminal::GetCol, Some(column), conditions)
        } else {
            return Err(unknown());
        };

        if select.is_some_and(str::is_empty) {
            return Err(unknown());
        }

        let mut groups = Vec::new();
        if !conditions.is_empty() {
            for group in conditions.split("_and_") {
                let columns: Vec<String> = group.split("_or_").map(str::to_string).collect();
                if columns.iter().any(String::is_empty) {
                    return Err(unknown());
                }
                groups.push(columns);
            }
        }

        Ok(Self {
            terminal,
            select: select.map(str::to_string),
            groups,
        })
    }

    /// Number of positional arguments the finder consumes.
    pub fn column_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Add the finder's select column and conditions to `query`.
    ///
    /// In each AND group the first column goes through the plain where call
    /// and every further one through `or_where`.
    pub fn apply<I, V>(&self, query: Query, args: I) -> OrmResult<Query>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let args: Vec<Value> = args.into_iter().map(Into::into).collect();
        if args.len() != self.column_count() {
            return Err(OrmError::malformed_condition(format!(
                "finder {self} expects {} argument(s), {} given",
                self.column_count(),
                args.len()
            )));
        }

        let mut query = query.select_all();
        if let Some(column) = &self.select {
            query = query.select([column.as_str()]);
        }
        let mut args = args.into_iter();
        for group in &self.groups {
            for (index, column) in group.iter().enumerate() {
                let value = args.next().unwrap_or_default();
                query = if index == 0 {
                    query.filter((column.as_str(), value))
                } else {
                    query.or_where((column.as_str(), value))
                };
            }
        }
        Ok(query)
    }

    /// Apply to a fresh query of `R` and run the terminal operation.
    pub fn run<R: Record>(
        &self,
        db: &impl Database,
        args: impl IntoIterator<Item = impl Into<Value>>,
    ) -> OrmResult<FinderOutput<R>> {
        let query = self.apply(R::query(), args)?;
        Ok(match self.terminal {
            FinderTerminal::Get => FinderOutput::Records(query.get(db)?),
            FinderTerminal::GetOne => FinderOutput::Record(query.get_one(db)?),
            FinderTerminal::GetRow => FinderOutput::Row(query.get_row(db)?),
            FinderTerminal::GetResults => FinderOutput::Rows(query.get_results(db)?),
            FinderTerminal::GetVar => FinderOutput::Value(query.get_var(db)?),
            FinderTerminal::GetCol => FinderOutput::Values(query.get_col(db)?),
        })
    }
}

impl FromStr for Finder {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Finder::parse(s)
    }
}

impl fmt::Display for Finder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.terminal {
            FinderTerminal::Get => "get",
            FinderTerminal::GetOne => "get_one",
            FinderTerminal::GetRow => "get_row",
            FinderTerminal::GetResults => "get_results",
            FinderTerminal::GetVar => "get_var",
            FinderTerminal::GetCol => "get_col",
        };
        f.write_str(prefix)?;
        if let Some(column) = &self.select {
            write!(f, "_{column}")?;
        }
        if !self.groups.is_empty() {
            let groups: Vec<String> = self.groups.iter().map(|g| g.join("_or_")).collect();
            write!(f, "_by_{}", groups.join("_and_"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(groups: &[&[&str]]) -> Vec<Vec<String>> {
        groups
            .iter()
            .map(|g| g.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn parses_every_prefix() {
        let cases = [
            ("get_by_id", FinderTerminal::Get),
            ("get_one_by_id", FinderTerminal::GetOne),
            ("get_row_by_id", FinderTerminal::GetRow),
            ("get_results_by_id", FinderTerminal::GetResults),
            ("get_var_name_by_id", FinderTerminal::GetVar),
            ("get_col_name_by_id", FinderTerminal::GetCol),
        ];
        for (name, terminal) in cases {
            let finder = Finder::parse(name).unwrap();
            assert_eq!(finder.terminal, terminal, "{name}");
            assert_eq!(finder.groups, cols(&[&["id"]]), "{name}");
            assert_eq!(finder.to_string(), name);
        }
    }

    #[test]
    fn splits_and_before_or() {
        let finder: Finder = "get_by_name_or_title_and_category_id".parse().unwrap();
        assert_eq!(
            finder.groups,
            cols(&[&["name", "title"], &["category_id"]])
        );
        assert_eq!(finder.column_count(), 3);
    }

    #[test]
    fn get_col_without_conditions() {
        let finder = Finder::parse("get_col_name").unwrap();
        assert_eq!(finder.select.as_deref(), Some("name"));
        assert!(finder.groups.is_empty());
    }

    #[test]
    fn rejects_unknown_names() {
        for name in ["find_by_id", "get_var_name", "get_var__by_id", "get_by_name_and_"] {
            let err = Finder::parse(name).unwrap_err();
            assert_eq!(err, OrmError::UnknownFinderMethod(name.to_string()));
        }
    }

    #[test]
    fn apply_builds_conditions() {
        let finder = Finder::parse("get_one_by_name_or_title_and_category_id").unwrap();
        let prep = finder
            .apply(Query::table("t"), [Value::from("a"), Value::from("b"), Value::from(3)])
            .unwrap()
            .prepare()
            .unwrap();
        assert_eq!(
            prep.sql,
            "SELECT * \nFROM `t` \nWHERE ( `name` = %s ) OR ( `title` = %s AND `category_id` = %s )"
        );
        assert_eq!(prep.args.len(), 3);
    }

    #[test]
    fn apply_checks_argument_count() {
        let finder = Finder::parse("get_by_name_and_age").unwrap();
        let err = finder.apply(Query::table("t"), ["x"]).unwrap_err();
        assert!(matches!(err, OrmError::MalformedConditionArgument(_)));
    }
}
