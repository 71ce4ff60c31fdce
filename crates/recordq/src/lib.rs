//! # recordq
//!
//! A composable SQL query builder with an ActiveRecord-style façade.
//!
//! ## Features
//!
//! - **Composable builder**: one [`Query`] type for SELECT/INSERT/UPDATE/DELETE,
//!   built through a consuming fluent API
//! - **Parameterized output**: queries compile to a `%s`/`%d` template plus an
//!   ordered argument list; binding happens in the adapter
//! - **Predicate trees**: WHERE/HAVING as OR-ed groups of AND-ed conditions
//! - **Records**: attribute storage with per-column casting and convention-named
//!   finders, declared with `#[derive(Record)]`
//! - **Pluggable driver**: anything implementing [`Database`] can run queries;
//!   wrap it in [`LoggedDatabase`] to trace every statement
//!
//! ## Query builder
//!
//! ```
//! use recordq::{Query, Value};
//!
//! let prep = Query::table("wp_posts")
//!     .select(["ID", "post_title"])
//!     .filter(("post_status", "publish"))
//!     .or_where(("post_author", "in", vec![1, 2]))
//!     .order_by("post_date", "desc")
//!     .limit(10)
//!     .prepare()
//!     .unwrap();
//!
//! assert_eq!(
//!     prep.sql,
//!     "SELECT ID, post_title \n\
//!      FROM `wp_posts` \n\
//!      WHERE ( `post_status` = %s ) OR ( `post_author` IN (%s, %s) ) \n\
//!      ORDER BY `post_date` DESC \n\
//!      LIMIT %d"
//! );
//! assert_eq!(prep.args[0], Value::from("publish"));
//! ```
//!
//! ## Records
//!
//! ```ignore
//! use recordq::prelude::*;
//!
//! #[derive(Debug, Record)]
//! #[record(table = "products", casts(id = "int", price = "float", active = "bool"))]
//! struct Product {
//!     attrs: Attributes,
//! }
//!
//! let product = Product::create(&db, [("name", Value::from("Chair")), ("price", 49.5.into())])?;
//! let cheap: Vec<Product> = Product::query().filter(("price", "<", 50)).get(&db)?;
//!
//! let finder = Finder::parse("get_one_by_name_and_active")?;
//! let chair = Product::find_by(&db, &finder, [Value::from("Chair"), Value::from(1)])?
//!     .into_record();
//! ```

pub mod adapter;
pub mod cast;
pub mod condition;
pub mod error;
pub mod finder;
pub mod prelude;
pub mod query;
pub mod record;
pub mod row;
pub mod value;

pub use adapter::{Database, LogConfig, LoggedDatabase};
pub use cast::{CastFn, CastKind, CastRule, Casts};
pub use condition::{ColumnRef, ConditionTree, Filter, ValueSlot};
pub use error::{OrmError, OrmResult};
pub use finder::{Finder, FinderOutput, FinderTerminal};
pub use query::{
    Direction, JoinKind, JoinSpec, LimitSlot, OrderItem, Preparation, Query, StatementKind,
};
pub use record::{Attributes, Record};
pub use row::{FromRow, Row};
pub use value::{DATETIME_FORMAT, Raw, Value};

#[cfg(feature = "derive")]
pub use recordq_derive::Record;
