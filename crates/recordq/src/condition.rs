//! Condition model for WHERE and HAVING clauses.
//!
//! A [`ConditionTree`] is an ordered list of OR-ed groups; each group is an
//! ordered list of AND-ed items. Plain calls append to the last group, "or"
//! calls open a new group first, which is what gives `or_where` its
//! precedence:
//!
//! ```ignore
//! Query::table("t").filter(("a", 1)).or_where(("b", 2))
//! // WHERE ( `a` = %s ) OR ( `b` = %s )
//! ```
//!
//! Callers describe a condition with a [`Filter`], which is built from the
//! supported call shapes:
//!
//! - `"age = 38"` → raw fragment
//! - `Raw::new("age = %s").bind(38)` → raw fragment with arguments
//! - `("name", "john")` → `` `name` = %s `` (`IS` when the value is NULL)
//! - `("age", ">", 23)` → `` `age` > %s ``
//! - `[("age", Value::Null), ("name", "john".into())]` → one item per entry

use crate::error::{OrmError, OrmResult};
use crate::value::{Raw, Value};

/// Quote an identifier with backticks.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Column side of a structured condition.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnRef {
    /// A column name, rendered backtick-quoted.
    Ident(String),
    /// A verbatim expression such as `SUM(price)`.
    Raw(String),
}

impl ColumnRef {
    pub fn ident(name: impl Into<String>) -> Self {
        ColumnRef::Ident(name.into())
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        ColumnRef::Raw(sql.into())
    }

    pub(crate) fn render(&self) -> String {
        match self {
            ColumnRef::Ident(name) => quote_ident(name),
            ColumnRef::Raw(sql) => sql.clone(),
        }
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::Ident(name.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(name: String) -> Self {
        ColumnRef::Ident(name)
    }
}

impl From<&String> for ColumnRef {
    fn from(name: &String) -> Self {
        ColumnRef::Ident(name.clone())
    }
}

/// A value position in SET, VALUES or a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSlot {
    /// Bound through a `%s` placeholder.
    Bound(Value),
    /// Inserted verbatim, e.g. `RAND()`.
    Raw(String),
}

impl ValueSlot {
    pub fn raw(sql: impl Into<String>) -> Self {
        ValueSlot::Raw(sql.into())
    }

    /// The `NULL` literal.
    pub fn null() -> Self {
        ValueSlot::Raw("NULL".to_string())
    }

    /// Whether this slot holds a NULL, bound or literal.
    pub fn is_null(&self) -> bool {
        match self {
            ValueSlot::Bound(v) => v.is_null(),
            ValueSlot::Raw(sql) => sql.eq_ignore_ascii_case("NULL"),
        }
    }

    /// NULL is never bound as a parameter; it becomes the `NULL` literal.
    pub(crate) fn normalize(self) -> Self {
        match self {
            ValueSlot::Bound(Value::Null) => ValueSlot::null(),
            other => other,
        }
    }

    /// Render the slot, pushing bound values onto `args`.
    pub(crate) fn render(&self, args: &mut Vec<Value>) -> String {
        match self {
            ValueSlot::Raw(sql) => sql.clone(),
            ValueSlot::Bound(value) => {
                args.push(value.clone());
                "%s".to_string()
            }
        }
    }
}

impl From<Value> for ValueSlot {
    fn from(v: Value) -> Self {
        ValueSlot::Bound(v)
    }
}

macro_rules! impl_slot_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ValueSlot {
                fn from(v: $ty) -> Self {
                    ValueSlot::Bound(Value::from(v))
                }
            }
        )*
    };
}

impl_slot_from!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    &str,
    String,
    &String,
    chrono::NaiveDateTime,
);

impl<T: Into<Value>> From<Option<T>> for ValueSlot {
    fn from(v: Option<T>) -> Self {
        ValueSlot::Bound(Value::from(v))
    }
}

impl<T: Into<Value>> From<Vec<T>> for ValueSlot {
    fn from(v: Vec<T>) -> Self {
        ValueSlot::Bound(Value::from(v))
    }
}

/// One AND-ed member of a condition group.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ConditionItem {
    Structured {
        column: ColumnRef,
        operator: String,
        value: ValueSlot,
    },
    Raw(Raw),
}

impl ConditionItem {
    fn render(&self, args: &mut Vec<Value>) -> String {
        match self {
            ConditionItem::Raw(raw) => {
                args.extend_from_slice(raw.args());
                raw.sql().to_string()
            }
            ConditionItem::Structured {
                column,
                operator,
                value,
            } => {
                let value = match value {
                    ValueSlot::Bound(Value::List(items)) => {
                        let placeholders: Vec<&str> = items.iter().map(|_| "%s").collect();
                        args.extend(items.iter().cloned());
                        format!("({})", placeholders.join(", "))
                    }
                    other => other.render(args),
                };
                format!("{} {} {}", column.render(), operator, value)
            }
        }
    }
}

/// OR-ed groups of AND-ed condition items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionTree {
    groups: Vec<Vec<ConditionItem>>,
}

impl ConditionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no group holds an item.
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Vec::is_empty)
    }

    /// Number of groups that hold at least one item.
    pub fn group_count(&self) -> usize {
        self.groups.iter().filter(|g| !g.is_empty()).count()
    }

    /// Start a new OR-ed group.
    pub(crate) fn open_group(&mut self) {
        self.groups.push(Vec::new());
    }

    /// Append an item to the last group.
    pub(crate) fn push(&mut self, item: ConditionItem) {
        match self.groups.last_mut() {
            Some(group) => group.push(item),
            None => self.groups.push(vec![item]),
        }
    }

    /// Render `( a AND b ) OR ( c )`, pushing bound values onto `args`.
    pub(crate) fn render(&self, args: &mut Vec<Value>) -> String {
        let groups: Vec<String> = self
            .groups
            .iter()
            .filter(|g| !g.is_empty())
            .map(|group| {
                let items: Vec<String> = group.iter().map(|item| item.render(args)).collect();
                format!("( {} )", items.join(" AND "))
            })
            .collect();
        groups.join(" OR ")
    }
}

/// A where/having argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `(column, value)` or `(column, operator, value)`; `operator: None`
    /// picks `IS` for NULL and `=` otherwise.
    Compare {
        column: ColumnRef,
        operator: Option<String>,
        value: ValueSlot,
    },
    /// A verbatim fragment with its own arguments.
    Raw(Raw),
    /// Several filters applied one after another into the same group.
    Each(Vec<Filter>),
}

impl Filter {
    /// `column = value`, or `column IS NULL` for a NULL value.
    pub fn new(column: impl Into<ColumnRef>, value: impl Into<ValueSlot>) -> Self {
        Filter::Compare {
            column: column.into(),
            operator: None,
            value: value.into(),
        }
    }

    /// `column <operator> value`.
    pub fn op(
        column: impl Into<ColumnRef>,
        operator: impl Into<String>,
        value: impl Into<ValueSlot>,
    ) -> Self {
        Filter::Compare {
            column: column.into(),
            operator: Some(operator.into()),
            value: value.into(),
        }
    }

    pub fn raw(raw: impl Into<Raw>) -> Self {
        Filter::Raw(raw.into())
    }

    /// Combine filters; each one lands AND-ed in the same group.
    pub fn each<I, F>(filters: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Filter>,
    {
        Filter::Each(filters.into_iter().map(Into::into).collect())
    }

    /// Flatten into validated condition items.
    pub(crate) fn into_items(self) -> OrmResult<Vec<ConditionItem>> {
        let mut items = Vec::new();
        self.collect_items(&mut items)?;
        Ok(items)
    }

    fn collect_items(self, items: &mut Vec<ConditionItem>) -> OrmResult<()> {
        match self {
            Filter::Raw(raw) => {
                if raw.sql().trim().is_empty() {
                    return Err(OrmError::malformed_condition("empty raw condition"));
                }
                items.push(ConditionItem::Raw(raw));
            }
            Filter::Each(filters) => {
                for filter in filters {
                    filter.collect_items(items)?;
                }
            }
            Filter::Compare {
                column,
                operator,
                value,
            } => {
                let (ColumnRef::Ident(name) | ColumnRef::Raw(name)) = &column;
                if name.trim().is_empty() {
                    return Err(OrmError::malformed_condition("empty column name"));
                }
                let operator = match operator {
                    Some(op) if op.trim().is_empty() => {
                        return Err(OrmError::malformed_condition(format!(
                            "empty operator for column {}",
                            column.render()
                        )));
                    }
                    Some(op) => op.trim().to_uppercase(),
                    None if value.is_null() => "IS".to_string(),
                    None => "=".to_string(),
                };
                if matches!(&value, ValueSlot::Bound(Value::List(list)) if list.is_empty()) {
                    return Err(OrmError::malformed_condition(format!(
                        "empty value list for column {}",
                        column.render()
                    )));
                }
                items.push(ConditionItem::Structured {
                    column,
                    operator,
                    value: value.normalize(),
                });
            }
        }
        Ok(())
    }
}

impl From<&str> for Filter {
    fn from(sql: &str) -> Self {
        Filter::Raw(Raw::new(sql))
    }
}

impl From<String> for Filter {
    fn from(sql: String) -> Self {
        Filter::Raw(Raw::new(sql))
    }
}

impl From<Raw> for Filter {
    fn from(raw: Raw) -> Self {
        Filter::Raw(raw)
    }
}

impl<C, V> From<(C, V)> for Filter
where
    C: Into<ColumnRef>,
    V: Into<ValueSlot>,
{
    fn from((column, value): (C, V)) -> Self {
        Filter::new(column, value)
    }
}

impl<C, O, V> From<(C, O, V)> for Filter
where
    C: Into<ColumnRef>,
    O: Into<String>,
    V: Into<ValueSlot>,
{
    fn from((column, operator, value): (C, O, V)) -> Self {
        Filter::op(column, operator, value)
    }
}

impl<C, V> From<Vec<(C, V)>> for Filter
where
    C: Into<ColumnRef>,
    V: Into<ValueSlot>,
{
    fn from(entries: Vec<(C, V)>) -> Self {
        Filter::each(entries)
    }
}

impl<C, V, const N: usize> From<[(C, V); N]> for Filter
where
    C: Into<ColumnRef>,
    V: Into<ValueSlot>,
{
    fn from(entries: [(C, V); N]) -> Self {
        Filter::each(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(tree: &ConditionTree) -> (String, Vec<Value>) {
        let mut args = Vec::new();
        let sql = tree.render(&mut args);
        (sql, args)
    }

    fn push(tree: &mut ConditionTree, filter: impl Into<Filter>) {
        for item in filter.into().into_items().unwrap() {
            tree.push(item);
        }
    }

    #[test]
    fn default_operator_follows_nullness() {
        let mut tree = ConditionTree::new();
        push(&mut tree, ("a", Value::Null));
        push(&mut tree, ("b", 1));
        let (sql, args) = render(&tree);
        assert_eq!(sql, "( `a` IS NULL AND `b` = %s )");
        assert_eq!(args, vec![Value::Int(1)]);
    }

    #[test]
    fn operator_is_uppercased() {
        let mut tree = ConditionTree::new();
        push(&mut tree, ("parent_id", "is not", Value::Null));
        push(&mut tree, ("name", "like", "j%"));
        let (sql, _) = render(&tree);
        assert_eq!(sql, "( `parent_id` IS NOT NULL AND `name` LIKE %s )");
    }

    #[test]
    fn open_group_separates_with_or() {
        let mut tree = ConditionTree::new();
        push(&mut tree, ("a", 1));
        tree.open_group();
        push(&mut tree, ("b", 2));
        push(&mut tree, ("c", 3));
        let (sql, args) = render(&tree);
        assert_eq!(sql, "( `a` = %s ) OR ( `b` = %s AND `c` = %s )");
        assert_eq!(args, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn empty_groups_are_skipped() {
        let mut tree = ConditionTree::new();
        tree.open_group();
        assert!(tree.is_empty());
        push(&mut tree, ("a", 1));
        tree.open_group();
        assert_eq!(tree.group_count(), 1);
        assert_eq!(render(&tree).0, "( `a` = %s )");
    }

    #[test]
    fn list_values_bind_each_element() {
        let mut tree = ConditionTree::new();
        push(&mut tree, ("id", "in", vec![1, 2, 3]));
        let (sql, args) = render(&tree);
        assert_eq!(sql, "( `id` IN (%s, %s, %s) )");
        assert_eq!(args, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn raw_fragment_carries_args() {
        let mut tree = ConditionTree::new();
        push(&mut tree, Raw::new("age BETWEEN %s AND %s").bind(18).bind(65));
        let (sql, args) = render(&tree);
        assert_eq!(sql, "( age BETWEEN %s AND %s )");
        assert_eq!(args, vec![Value::Int(18), Value::Int(65)]);
    }

    #[test]
    fn raw_column_and_raw_value_are_verbatim() {
        let mut tree = ConditionTree::new();
        push(
            &mut tree,
            (ColumnRef::raw("SUM(price)"), ">", ValueSlot::raw("AVG(price)")),
        );
        assert_eq!(render(&tree).0, "( SUM(price) > AVG(price) )");
    }

    #[test]
    fn malformed_arguments_are_rejected() {
        assert!(Filter::from("  ").into_items().is_err());
        assert!(Filter::new("", 1).into_items().is_err());
        assert!(Filter::op("a", " ", 1).into_items().is_err());
        let err = Filter::op("a", "in", Vec::<i64>::new())
            .into_items()
            .unwrap_err();
        assert!(matches!(err, OrmError::MalformedConditionArgument(_)));
    }
}
