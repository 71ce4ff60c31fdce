//! Convenient imports for typical `recordq` usage.
//!
//! ```ignore
//! use recordq::prelude::*;
//! ```

pub use crate::{
    Attributes, ColumnRef, Database, Filter, Finder, FromRow, OrmError, OrmResult, Query, Raw,
    Record, Row, Value, ValueSlot,
};
