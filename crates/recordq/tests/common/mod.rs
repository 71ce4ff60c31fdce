#![allow(dead_code)]

use recordq::{Database, OrmResult, Row, Value};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

/// In-memory adapter: quotes every argument, records every statement and
/// answers queries from a queue of canned result sets.
#[derive(Default)]
pub struct MockDb {
    pub statements: RefCell<Vec<String>>,
    pub results: RefCell<VecDeque<Vec<Row>>>,
    pub next_insert_id: Cell<i64>,
    pub insert_id: Cell<Option<i64>>,
}

impl MockDb {
    pub fn new() -> Self {
        let db = Self::default();
        db.next_insert_id.set(12);
        db
    }

    /// Queue the rows returned by the next query.
    pub fn returning(self, rows: Vec<Row>) -> Self {
        self.results.borrow_mut().push_back(rows);
        self
    }

    pub fn last_sql(&self) -> Option<String> {
        self.statements.borrow().last().cloned()
    }

    pub fn statement_count(&self) -> usize {
        self.statements.borrow().len()
    }
}

impl Database for MockDb {
    fn prepare(&self, template: &str, args: &[Value]) -> OrmResult<String> {
        let mut args = args.iter();
        let mut out = String::with_capacity(template.len());
        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            match (c, chars.peek()) {
                ('%', Some('s' | 'd')) => {
                    chars.next();
                    let arg = args.next().map(Value::to_string).unwrap_or_default();
                    out.push_str(&format!("'{arg}'"));
                }
                _ => out.push(c),
            }
        }
        Ok(out)
    }

    fn execute(&self, sql: &str) -> OrmResult<u64> {
        self.statements.borrow_mut().push(sql.to_string());
        self.insert_id.set(Some(self.next_insert_id.get()));
        Ok(1)
    }

    fn last_insert_id(&self) -> Option<i64> {
        self.insert_id.get()
    }

    fn query_rows(&self, sql: &str) -> OrmResult<Vec<Row>> {
        self.statements.borrow_mut().push(sql.to_string());
        Ok(self.results.borrow_mut().pop_front().unwrap_or_default())
    }
}
