mod common;

use common::MockDb;
use recordq::prelude::*;
use recordq::{FinderOutput, DATETIME_FORMAT};

#[derive(Debug, Record)]
#[record(table = "prefix_table")]
struct Table {
    attrs: Attributes,
}

fn shout(value: Value) -> Value {
    Value::Text(value.to_string().to_uppercase())
}

#[derive(Debug, Record)]
#[record(casts(
    id = "integer",
    price = "number",
    active = "bool",
    created_at = "datetime",
    code(cast = shout)
))]
struct ProductItem {
    #[record(attributes)]
    store: Attributes,
    loaded: bool,
}

fn dt(s: &str) -> chrono::NaiveDateTime {
    chrono::NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).unwrap()
}

// ==================== save / delete ====================

#[test]
fn save_new_record_inserts_and_takes_id() {
    let db = MockDb::new();
    let mut record = Table::new();
    record.set_attr("property", "value");
    record.save(&db).unwrap();

    assert_eq!(
        db.last_sql().unwrap(),
        "INSERT INTO `prefix_table` \n(`property`) VALUES ('value')"
    );
    assert_eq!(record.get_attr("id"), Some(Value::Int(12)));
    assert!(!record.is_new());
}

#[test]
fn save_record_without_attributes_inserts_defaults() {
    let db = MockDb::new();
    let mut record = Table::new();
    record.save(&db).unwrap();

    assert_eq!(db.last_sql().unwrap(), "INSERT INTO `prefix_table` \n() VALUES ()");
    assert_eq!(record.get_attr("id"), Some(Value::Int(12)));
}

#[test]
fn save_existing_record_updates_by_id() {
    let db = MockDb::new();
    let mut record = Table::new();
    record.set_attr("id", 9);
    record.set_attr("property", "value");
    record.save(&db).unwrap();

    assert_eq!(
        db.last_sql().unwrap(),
        "UPDATE `prefix_table` \nSET `id` = '9', `property` = 'value' \nWHERE ( `id` = '9' )"
    );
}

#[test]
fn delete_new_record_is_a_no_op() {
    let db = MockDb::new();
    let mut record = Table::new();
    record.delete(&db).unwrap();
    assert_eq!(db.last_sql(), None);
}

#[test]
fn delete_existing_record_deletes_by_id() {
    let db = MockDb::new();
    let mut record = Table::new();
    record.set_attr("id", 9);
    record.delete(&db).unwrap();

    assert_eq!(
        db.last_sql().unwrap(),
        "DELETE FROM `prefix_table` \nWHERE ( `id` = '9' )"
    );
    assert!(record.is_new());
    assert_eq!(record.get_attr("id"), None);
}

#[test]
fn create_decasts_and_saves() {
    let db = MockDb::new();
    let product = ProductItem::create(
        &db,
        [
            ("active", Value::Bool(true)),
            ("created_at", Value::DateTime(dt("2018-06-18 08:12:00"))),
        ],
    )
    .unwrap();

    assert_eq!(
        db.last_sql().unwrap(),
        "INSERT INTO `product_item` \n(`active`, `created_at`) VALUES ('1', '2018-06-18 08:12:00')"
    );
    assert_eq!(product.id(), Some(Value::Int(12)));
}

// ==================== static helpers ====================

#[test]
fn table_name_defaults_to_snake_case() {
    assert_eq!(Table::table_name(), "prefix_table");
    assert_eq!(ProductItem::table_name(), "product_item");
}

#[test]
fn insert_returns_generated_id() {
    let db = MockDb::new();
    let id = Table::insert(&db, [("name", "john")]).unwrap();
    assert_eq!(id, Some(12));
}

#[test]
fn delete_by_id_and_update_all() {
    let db = MockDb::new();
    Table::delete_by_id(&db, 4).unwrap();
    assert_eq!(
        db.last_sql().unwrap(),
        "DELETE FROM `prefix_table` \nWHERE ( `id` = '4' )"
    );

    Table::update_all([("status", "draft")])
        .filter(("author", 2))
        .execute(&db)
        .unwrap();
    assert_eq!(
        db.last_sql().unwrap(),
        "UPDATE `prefix_table` \nSET `status` = 'draft' \nWHERE ( `author` = '2' )"
    );
}

#[test]
fn find_and_all_build_records() {
    let db = MockDb::new()
        .returning(vec![Row::new().with("id", "3").with("name", "john")])
        .returning(vec![
            Row::new().with("id", "1"),
            Row::new().with("id", "2"),
        ]);

    let found = Table::find(&db, 3).unwrap().unwrap();
    assert_eq!(
        db.last_sql().unwrap(),
        "SELECT * \nFROM `prefix_table` \nWHERE ( `id` = '3' )"
    );
    assert_eq!(found.get_attr("id"), Some(Value::Int(3)));
    assert_eq!(found.get_attr("name"), Some(Value::from("john")));

    let all = Table::all(&db).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(db.last_sql().unwrap(), "SELECT * \nFROM `prefix_table`");

    assert!(Table::find(&db, 99).unwrap().is_none());
}

#[test]
fn find_or_fail_reports_missing_row() {
    let db = MockDb::new();
    let err = Table::find_or_fail(&db, 5).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Not found: prefix_table with id 5");
}

// ==================== casting ====================

#[test]
fn derived_casts_apply_on_read() {
    let product = ProductItem::with_attributes([
        ("id", Value::from("5")),
        ("price", Value::from("9.5")),
        ("active", Value::from("0")),
        ("created_at", Value::from("2018-06-18 08:12:00")),
        ("code", Value::from("ab")),
        ("name", Value::from("chair")),
    ]);
    assert!(!product.loaded);
    assert_eq!(product.get_attr("id"), Some(Value::Int(5)));
    assert_eq!(product.get_attr("price"), Some(Value::Float(9.5)));
    assert_eq!(product.get_attr("active"), Some(Value::Bool(false)));
    assert_eq!(
        product.get_attr("created_at"),
        Some(Value::DateTime(dt("2018-06-18 08:12:00")))
    );
    assert_eq!(product.get_attr("code"), Some(Value::from("AB")));
    assert_eq!(product.get_attr("name"), Some(Value::from("chair")));
}

#[test]
fn query_results_use_record_casts() {
    let db = MockDb::new().returning(vec![Row::new().with("id", "7").with("active", "1")]);
    let rows = ProductItem::query().get_results(&db).unwrap();
    assert_eq!(rows[0].get("id"), Some(&Value::Int(7)));
    assert_eq!(rows[0].get("active"), Some(&Value::Bool(true)));
}

// ==================== finders ====================

#[test]
fn finder_get_one_by_id() {
    let db = MockDb::new();
    let finder = Finder::parse("get_one_by_id").unwrap();
    let output = Table::find_by(&db, &finder, [1]).unwrap();
    assert!(output.into_record().is_none());
    assert_eq!(
        db.last_sql().unwrap(),
        "SELECT * \nFROM `prefix_table` \nWHERE ( `id` = '1' )"
    );
}

#[test]
fn finder_with_multiple_columns() {
    let db = MockDb::new();
    let finder = Finder::parse("get_one_by_name_and_category_id").unwrap();
    Table::find_by(&db, &finder, [Value::from("technic"), Value::from(12)]).unwrap();
    assert_eq!(
        db.last_sql().unwrap(),
        "SELECT * \nFROM `prefix_table` \nWHERE ( `name` = 'technic' AND `category_id` = '12' )"
    );
}

#[test]
fn finder_get_var() {
    let db = MockDb::new().returning(vec![Row::new().with("name", "var")]);
    let finder = Finder::parse("get_var_name_by_id").unwrap();
    let output = Table::find_by(&db, &finder, [2]).unwrap();
    assert_eq!(
        db.last_sql().unwrap(),
        "SELECT name \nFROM `prefix_table` \nWHERE ( `id` = '2' )"
    );
    assert_eq!(output.into_value(), Some(Value::from("var")));
}

#[test]
fn finder_get_col_casts_values() {
    let db = MockDb::new().returning(vec![Row::new().with("id", "1"), Row::new().with("id", "2")]);
    let finder = Finder::parse("get_col_id").unwrap();
    let output = ProductItem::find_by(&db, &finder, Vec::<Value>::new()).unwrap();
    assert!(matches!(
        output,
        FinderOutput::Values(ref values) if values == &[Value::Int(1), Value::Int(2)]
    ));
    assert_eq!(db.last_sql().unwrap(), "SELECT id \nFROM `product_item`");
}

#[test]
fn finder_argument_mismatch_does_not_query() {
    let db = MockDb::new();
    let finder = Finder::parse("get_by_name_or_title").unwrap();
    let err = Table::find_by(&db, &finder, ["only one"]).unwrap_err();
    assert!(matches!(err, OrmError::MalformedConditionArgument(_)));
    assert_eq!(db.statement_count(), 0);
}

#[test]
fn unknown_finder_is_rejected() {
    let err = Finder::parse("fetch_by_id").unwrap_err();
    assert!(matches!(err, OrmError::UnknownFinderMethod(_)));
}
