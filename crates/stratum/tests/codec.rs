mod support;

use stratum::{
    flush,
    mapping::{ClassBuilder, ColumnConfig, FieldBuilder, NullValue},
    strategy::codec::{EnumStorage, EnumValueHandler, ValueHandler},
    ClassMapping, FieldMapping, Repository,
};
use stratum_core::{
    driver::{ResultRow, RowAction, RowManager},
    stmt::{Type, TypeEnum, Value, ValueEnum},
    Dictionary, StateManager,
};

use pretty_assertions::assert_eq;
use support::{Instance, MemoryStore};

fn status() -> TypeEnum {
    TypeEnum::new("Status", ["Draft", "Published", "Archived"]).unwrap()
}

fn post(status: &FieldBuilder) -> ClassBuilder {
    let mut cls = ClassMapping::builder("Post");
    cls.field(FieldMapping::builder("id", Type::I64).primary_key())
        .field(status);
    cls
}

fn published() -> Value {
    Value::Enum(ValueEnum::new("Status", 1))
}

#[test]
fn enum_stored_by_ordinal_by_default() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![status()]);
    let cls = support::map(
        &mut repo,
        &post(&FieldMapping::builder("status", Type::enumeration("Status"))),
    );

    let field = cls.field(1).unwrap();
    let columns = field.columns().unwrap();
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].name, "status");
    assert_eq!(columns[0].ty, Type::I16);

    let handler = field.value().handler().unwrap();
    assert_eq!(handler.alias(), "enum");
    assert_eq!(
        handler.to_storage(field.value(), published()).unwrap(),
        Value::I16(1)
    );
    assert_eq!(
        handler.to_object(field.value(), Value::I16(1)).unwrap(),
        published()
    );
    assert_eq!(
        handler.to_storage(field.value(), Value::Null).unwrap(),
        Value::Null
    );
}

#[test]
fn enum_stored_by_name() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![status()]);
    let cls = support::map(
        &mut repo,
        &post(
            FieldMapping::builder("status", Type::enumeration("Status")).handler(
                ValueHandler::Enum(EnumValueHandler::with_storage(EnumStorage::Name)),
            ),
        ),
    );

    let field = cls.field(1).unwrap();
    let column = &field.columns().unwrap()[0];
    assert_eq!(column.ty, Type::String);
    // Short names leave room for constants added later
    assert_eq!(column.size, Some(20));

    let handler = field.value().handler().unwrap();
    assert_eq!(
        handler.to_storage(field.value(), published()).unwrap(),
        Value::from("Published")
    );
    assert_eq!(
        handler.to_object(field.value(), Value::from("Archived")).unwrap(),
        Value::Enum(ValueEnum::new("Status", 2))
    );

    let err = handler
        .to_object(field.value(), Value::from("Deleted"))
        .unwrap_err();
    assert!(err.is_invalid_value());
}

#[test]
fn name_column_fits_the_longest_constant() {
    let region = TypeEnum::new("Region", ["NorthAmericaAndCaribbean", "Europe"]).unwrap();

    let mut builder = Repository::builder();
    builder.enums([region]).enum_storage(EnumStorage::Name);
    let mut repo = builder.build().unwrap();

    let mut cls = ClassMapping::builder("Office");
    cls.field(&FieldMapping::builder("region", Type::enumeration("Region")));
    let cls = support::map(&mut repo, &cls);

    let column = &cls.field(0).unwrap().columns().unwrap()[0];
    assert_eq!(column.size, Some(24));
}

#[test]
fn unregistered_enum_fails_the_mapping() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);
    let cls = repo
        .add_class(&post(&FieldMapping::builder(
            "status",
            Type::enumeration("Status"),
        )))
        .unwrap();

    let err = repo.map_all().unwrap_err();
    assert!(err.is_invalid_mapping());
    assert!(err.to_string().contains("enum type `Status`"));

    // Nothing of a class that failed is committed
    assert!(!cls.is_mapped());
    assert!(!cls.field(0).unwrap().value().is_mapped());
}

#[test]
fn out_of_range_ordinal() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![status()]);
    let cls = support::map(
        &mut repo,
        &post(&FieldMapping::builder("status", Type::enumeration("Status"))),
    );

    let field = cls.field(1).unwrap();
    let handler = field.value().handler().unwrap();

    assert!(handler
        .to_object(field.value(), Value::I16(3))
        .unwrap_err()
        .is_invalid_value());
    assert!(handler
        .to_object(field.value(), Value::I16(-1))
        .unwrap_err()
        .is_invalid_value());
}

#[test]
fn out_of_range_constant_is_not_stored() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![status()]);
    let cls = support::map(
        &mut repo,
        &post(&FieldMapping::builder("status", Type::enumeration("Status"))),
    );

    let field = cls.field(1).unwrap();
    let handler = field.value().handler().unwrap();
    let unknown = Value::Enum(ValueEnum::new("Status", 3));

    let err = handler.to_storage(field.value(), unknown).unwrap_err();
    assert!(err.is_invalid_value());
    assert!(err.to_string().contains("ordinal 3 is out of range for `Status`"));
}

#[test]
fn every_field_owns_its_enum_handler() {
    let priority = TypeEnum::new("Priority", ["Low", "High"]).unwrap();
    let mut repo = support::repository(Dictionary::GENERIC, vec![status(), priority]);

    let mut cls = ClassMapping::builder("Ticket");
    cls.field(&FieldMapping::builder("status", Type::enumeration("Status")))
        .field(&FieldMapping::builder("priority", Type::enumeration("Priority")));
    let cls = support::map(&mut repo, &cls);

    let status = cls.field(0).unwrap();
    let priority = cls.field(1).unwrap();

    assert_eq!(
        status
            .value()
            .handler()
            .unwrap()
            .to_object(status.value(), Value::I16(1))
            .unwrap(),
        published()
    );
    assert_eq!(
        priority
            .value()
            .handler()
            .unwrap()
            .to_object(priority.value(), Value::I16(1))
            .unwrap(),
        Value::Enum(ValueEnum::new("Priority", 1))
    );
}

#[test]
fn enum_flushes_into_its_column() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![status()]);
    let cls = support::map(
        &mut repo,
        &post(&FieldMapping::builder("status", Type::enumeration("Status"))),
    );

    let mut sm = Instance::new("Post")
        .with_id(7i64)
        .with(0, 7i64)
        .with(1, published());
    let mut rows = RowManager::new();
    let pending = flush::insert(&cls, &mut sm, &mut rows).unwrap();
    assert!(pending.is_empty());

    let row = rows.get(cls.table().unwrap(), RowAction::Insert).unwrap();
    assert_eq!(row.get("id"), Some(&Value::I64(7)));
    assert_eq!(row.get("status"), Some(&Value::I16(1)));
}

#[test]
fn byte_arrays() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);

    let mut cls = ClassMapping::builder("Attachment");
    cls.field(&FieldMapping::builder("data", Type::list(Type::U8)))
        .field(&FieldMapping::builder("digest", Type::Bytes));
    let cls = support::map(&mut repo, &cls);

    let data = cls.field(0).unwrap();
    assert_eq!(data.value().handler().unwrap().alias(), "bytes");
    assert_eq!(data.columns().unwrap()[0].ty, Type::Bytes);

    let mut sm = Instance::new("Attachment")
        .with_id(1i64)
        .with(0, Value::List(vec![Value::U8(1), Value::U8(2)]))
        .with(1, vec![0xde_u8, 0xad]);
    let mut rows = RowManager::new();
    let _ = flush::insert(&cls, &mut sm, &mut rows).unwrap();

    let row = rows.get(cls.table().unwrap(), RowAction::Insert).unwrap();
    assert_eq!(row.get("data"), Some(&Value::Bytes(vec![1, 2])));
    assert_eq!(row.get("digest"), Some(&Value::Bytes(vec![0xde, 0xad])));
}

#[tokio::test]
async fn char_arrays_load_back_unboxed() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);

    let mut cls = ClassMapping::builder("Secret");
    cls.field(&FieldMapping::builder("pin", Type::Chars));
    let cls = support::map(&mut repo, &cls);

    let field = cls.field(0).unwrap();
    assert_eq!(field.value().handler().unwrap().alias(), "chars");
    assert_eq!(field.columns().unwrap()[0].ty, Type::String);

    let store = MemoryStore::new(Dictionary::GENERIC);
    let mut sm = Instance::new("Secret");
    let result = ResultRow::new().with("pin", "0451");

    stratum::load::load(&cls, &mut sm, &store, &result)
        .await
        .unwrap();
    assert_eq!(sm.fetch(0), Value::Chars(vec!['0', '4', '5', '1']));
}

#[test]
fn handler_that_cannot_represent_the_type() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);

    let mut cls = ClassMapping::builder("Blobby");
    cls.field(FieldMapping::builder("name", Type::String).handler(ValueHandler::Bytes));
    repo.add_class(&cls).unwrap();

    let err = repo.map_all().unwrap_err();
    assert!(err.is_invalid_mapping());
    assert!(err.to_string().contains("field `name`"));
}

#[test]
fn null_replaced_by_the_empty_value() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);

    let mut cls = ClassMapping::builder("Counter");
    cls.field(FieldMapping::builder("hits", Type::I32).null_value(NullValue::Default))
        .field(FieldMapping::builder("label", Type::String).null_value(NullValue::Default))
        .field(
            FieldMapping::builder("scale", Type::I32)
                .null_value(NullValue::Default)
                .column(ColumnConfig::new().default_literal("1")),
        );
    let cls = support::map(&mut repo, &cls);

    let to_storage = |index: usize| {
        let field = cls.field(index).unwrap();
        field
            .value()
            .handler()
            .unwrap()
            .to_storage(field.value(), Value::Null)
            .unwrap()
    };

    assert_eq!(to_storage(0), Value::I32(0));
    assert_eq!(to_storage(1), Value::from(""));
    // The column's own default takes over
    assert_eq!(to_storage(2), Value::Null);
}

#[test]
fn null_kept_or_rejected() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);

    let mut cls = ClassMapping::builder("Counter");
    cls.field(&FieldMapping::builder("hits", Type::I32))
        .field(FieldMapping::builder("total", Type::I64).null_value(NullValue::Exception));
    let cls = support::map(&mut repo, &cls);

    let hits = cls.field(0).unwrap();
    assert_eq!(hits.value().null_value(), NullValue::None);
    assert_eq!(
        hits.value()
            .handler()
            .unwrap()
            .to_storage(hits.value(), Value::Null)
            .unwrap(),
        Value::Null
    );

    let total = cls.field(1).unwrap();
    let handler = total.value().handler().unwrap();
    assert!(handler
        .to_storage(total.value(), Value::Null)
        .unwrap_err()
        .is_invalid_value());
    assert_eq!(
        handler.to_storage(total.value(), Value::I64(3)).unwrap(),
        Value::I64(3)
    );
}

#[test]
fn versionable_values() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![status()]);

    let mut cls = ClassMapping::builder("Revision");
    cls.field(&FieldMapping::builder("status", Type::enumeration("Status")))
        .field(&FieldMapping::builder("number", Type::I64))
        .field(&FieldMapping::builder("saved_at", Type::Timestamp))
        .field(&FieldMapping::builder("digest", Type::Bytes))
        .field(&FieldMapping::builder("pin", Type::list(Type::Char)))
        .field(FieldMapping::builder("body", Type::String).handler(ValueHandler::Clob));
    let cls = support::map(&mut repo, &cls);

    let versionable: Vec<_> = cls
        .fields()
        .iter()
        .map(|field| {
            let value = field.value();
            (field.name(), value.handler().unwrap().is_versionable(value))
        })
        .collect();

    assert_eq!(
        versionable,
        [
            ("status", true),
            ("number", true),
            ("saved_at", true),
            ("digest", false),
            ("pin", false),
            ("body", false),
        ]
    );
}
