mod support;

use stratum::{
    flush, load,
    mapping::{ClassBuilder, ColumnConfig, Identity, ObjectIdType},
    strategy::class::ClassStrategy,
    ClassMapping, FieldMapping, Repository,
};
use stratum_core::{
    driver::{EagerMode, JoinKind, ResultRow, RowAction, RowManager, Select},
    stmt::{Type, Value},
    Dictionary, StateManager,
};

use pretty_assertions::assert_eq;
use std::sync::Arc;
use support::{Instance, MemoryStore};

fn employee() -> ClassBuilder {
    let mut cls = ClassMapping::builder("Employee");
    cls.field(FieldMapping::builder("id", Type::I64).primary_key())
        .field(&FieldMapping::builder("name", Type::String));
    cls
}

fn manager(superclass: &Arc<ClassMapping>) -> ClassBuilder {
    let mut cls = ClassMapping::builder("Manager");
    cls.superclass(superclass)
        .field(&FieldMapping::builder("budget", Type::I64));
    cls
}

#[test]
fn full_class_with_datastore_identity() {
    let mut builder = Repository::builder();
    builder.table_name_prefix("app_");
    let mut repo = builder.build().unwrap();

    let mut cls = ClassMapping::builder("Note");
    cls.field(&FieldMapping::builder("body", Type::String));
    let cls = support::map(&mut repo, &cls);

    let layout = cls.layout().unwrap();
    assert_eq!(cls.strategy().alias(), "full");
    assert_eq!(layout.identity, Identity::Datastore);
    assert_eq!(cls.table().unwrap().name, "app_Note");

    let primary_key = cls.primary_key().unwrap();
    assert_eq!(primary_key.len(), 1);
    assert_eq!(primary_key[0].name, "id");
    assert_eq!(primary_key[0].ty, Type::I64);
    assert!(primary_key[0].is_not_null());
}

#[test]
fn full_class_with_application_identity() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);
    let cls = support::map(&mut repo, &employee());

    let layout = cls.layout().unwrap();
    assert_eq!(layout.identity, Identity::Application);
    assert_eq!(layout.primary_key[0].name, "id");
    assert!(cls.strategy().is_primary_key_object_id(&cls, true));
}

#[test]
fn application_identity_needs_key_fields() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);

    let mut cls = ClassMapping::builder("Keyless");
    cls.identity(Identity::Application)
        .field(&FieldMapping::builder("name", Type::String));
    repo.add_class(&cls).unwrap();

    assert!(repo.map_all().unwrap_err().is_invalid_mapping());
}

#[test]
fn flat_subclass_shares_the_superclass_layout() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);
    let emp = support::map(&mut repo, &employee());
    let mgr = support::map(&mut repo, &manager(&emp));

    assert_eq!(mgr.strategy().alias(), "flat");
    assert!(Arc::ptr_eq(emp.table().unwrap(), mgr.table().unwrap()));
    assert!(Arc::ptr_eq(
        emp.primary_key().unwrap(),
        mgr.primary_key().unwrap()
    ));
    assert!(Arc::ptr_eq(
        &emp.layout().unwrap().io,
        &mgr.layout().unwrap().io
    ));

    // Field indices run across the hierarchy
    let budget = &mgr.fields()[0];
    assert_eq!(budget.index(), 2);
    assert_eq!(mgr.field(1).unwrap().name(), "name");
    assert_eq!(mgr.field_count(), 3);
    assert!(mgr.is_assignable_to(&emp));
    assert!(!emp.is_assignable_to(&mgr));
}

#[test]
fn flat_subclass_naming_the_same_table() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);
    let emp = support::map(&mut repo, &employee());

    let mut mgr = manager(&emp);
    mgr.table("employee");
    let mgr = support::map(&mut repo, &mgr);

    assert!(Arc::ptr_eq(emp.table().unwrap(), mgr.table().unwrap()));
}

#[test]
fn flat_subclass_table_conflict() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);
    let emp = support::map(&mut repo, &employee());

    let mut mgr = manager(&emp);
    mgr.table("managers");
    let mgr = repo.add_class(&mgr).unwrap();

    let err = repo.map_all().unwrap_err();
    assert!(err.is_invalid_mapping());
    assert!(err.to_string().contains("table conflict"));
    assert!(!mgr.is_mapped());
    assert!(emp.is_mapped());
}

#[test]
fn flat_subclass_writes_into_the_superclass_row() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);
    let emp = support::map(&mut repo, &employee());
    let mgr = support::map(&mut repo, &manager(&emp));

    let mut sm = Instance::new("Manager")
        .with_id(3i64)
        .with(0, 3i64)
        .with(1, "Grace")
        .with(2, 1_000i64);
    let mut rows = RowManager::new();
    let _ = flush::insert(&mgr, &mut sm, &mut rows).unwrap();

    assert_eq!(rows.len(), 1);
    let row = rows.get(emp.table().unwrap(), RowAction::Insert).unwrap();
    assert_eq!(row.get("id"), Some(&Value::I64(3)));
    assert_eq!(row.get("name"), Some(&Value::from("Grace")));
    assert_eq!(row.get("budget"), Some(&Value::I64(1_000)));
}

#[test]
fn vertical_subclass_gets_a_joined_table() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);
    let emp = support::map(&mut repo, &employee());

    let mut mgr = manager(&emp);
    mgr.strategy(ClassStrategy::Vertical);
    let mgr = support::map(&mut repo, &mgr);

    let table = mgr.table().unwrap();
    assert_eq!(table.name, "Manager");
    assert!(!Arc::ptr_eq(table, emp.table().unwrap()));
    assert_eq!(mgr.primary_key().unwrap()[0].name, "id");
    assert_eq!(mgr.layout().unwrap().identity, Identity::Application);

    let mut select = Select::new();
    assert!(load::select(&mgr, &mut select, EagerMode::None).unwrap());

    let joins: Vec<_> = select.joins().iter().collect();
    assert_eq!(joins.len(), 1);
    assert_eq!(joins[0].kind, JoinKind::Inner);
    assert_eq!(joins[0].from.name, "Manager");
    assert_eq!(joins[0].to.name, "Employee");
    assert_eq!(joins[0].on, vec![("id".to_string(), "id".to_string())]);

    let names: Vec<_> = select.columns().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["id", "name", "budget"]);
}

#[test]
fn vertical_subclass_writes_one_row_per_table() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);
    let emp = support::map(&mut repo, &employee());

    let mut mgr = manager(&emp);
    mgr.strategy(ClassStrategy::Vertical);
    let mgr = support::map(&mut repo, &mgr);

    let mut sm = Instance::new("Manager")
        .with_id(3i64)
        .with(0, 3i64)
        .with(1, "Grace")
        .with(2, 1_000i64);
    let mut rows = RowManager::new();
    let _ = flush::insert(&mgr, &mut sm, &mut rows).unwrap();
    assert_eq!(rows.len(), 2);

    let sub = rows.get(mgr.table().unwrap(), RowAction::Insert).unwrap();
    assert_eq!(sub.get("id"), Some(&Value::I64(3)));
    assert_eq!(sub.get("budget"), Some(&Value::I64(1_000)));
    assert_eq!(sub.get("name"), None);

    let mut rows = RowManager::new();
    let _ = flush::delete(&mgr, &mut sm, &mut rows).unwrap();
    for row in rows.rows() {
        assert_eq!(row.condition("id"), Some(&Value::I64(3)));
        assert_eq!(row.values().len(), 0);
    }
}

#[test]
fn vertical_subclass_must_not_share_the_table() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);
    let emp = support::map(&mut repo, &employee());

    let mut mgr = manager(&emp);
    mgr.strategy(ClassStrategy::Vertical).table("Employee");
    repo.add_class(&mgr).unwrap();

    assert!(repo.map_all().unwrap_err().is_invalid_mapping());
}

#[test]
fn missing_table_without_schema_adaptation() {
    let mut builder = Repository::builder();
    builder.adapt_schema(false).tables(["Employee"]);
    let mut repo = builder.build().unwrap();

    let emp = support::map(&mut repo, &employee());
    assert_eq!(emp.table().unwrap().name, "Employee");

    let mut mgr = manager(&emp);
    mgr.strategy(ClassStrategy::Vertical);
    repo.add_class(&mgr).unwrap();

    let err = repo.map_all().unwrap_err();
    assert!(err.is_invalid_mapping());
    assert!(err.to_string().contains("table `Manager` does not exist"));
}

fn person_with_address(indicator: ColumnConfig) -> (Arc<ClassMapping>, Arc<ClassMapping>) {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);

    let mut person = ClassMapping::builder("Person");
    person
        .field(FieldMapping::builder("id", Type::I64).primary_key())
        .field(FieldMapping::builder("address", Type::model("Address")).column(indicator));
    let person = support::map(&mut repo, &person);

    let mut address = ClassMapping::builder("Address");
    address
        .embedded_in(&person, 1)
        .field(&FieldMapping::builder("street", Type::String));
    let address = support::map(&mut repo, &address);

    (person, address)
}

#[test]
fn embedded_class_borrows_the_owner_layout() {
    let (person, address) =
        person_with_address(ColumnConfig::named("has_address").ty(Type::Bool));

    assert_eq!(address.strategy().alias(), "embed");
    assert_eq!(person.fields()[1].strategy().alias(), "embed");
    assert!(Arc::ptr_eq(person.table().unwrap(), address.table().unwrap()));
    assert!(Arc::ptr_eq(
        person.primary_key().unwrap(),
        address.primary_key().unwrap()
    ));
    assert_eq!(
        address.layout().unwrap().identity,
        person.layout().unwrap().identity
    );
}

#[test]
fn null_indicator_is_written_with_the_owner() {
    let (person, _) = person_with_address(ColumnConfig::named("has_address").ty(Type::Bool));
    let table = person.table().unwrap();

    let mut present = Instance::new("Person")
        .with_id(1i64)
        .with(0, 1i64)
        .with(1, Value::record_from_vec(vec![Value::from("Main St")]));
    let mut rows = RowManager::new();
    let _ = flush::insert(&person, &mut present, &mut rows).unwrap();
    assert_eq!(
        rows.get(table, RowAction::Insert).unwrap().get("has_address"),
        Some(&Value::Bool(true))
    );

    let mut absent = Instance::new("Person").with_id(2i64).with(0, 2i64);
    let mut rows = RowManager::new();
    let _ = flush::insert(&person, &mut absent, &mut rows).unwrap();
    assert_eq!(
        rows.get(table, RowAction::Insert).unwrap().get("has_address"),
        Some(&Value::Null)
    );
}

#[tokio::test]
async fn not_null_indicator_reads_empty_as_absent() {
    let (person, _) =
        person_with_address(ColumnConfig::named("has_address").ty(Type::Bool).not_null());
    let table = person.table().unwrap();

    let mut absent = Instance::new("Person").with_id(2i64).with(0, 2i64);
    let mut rows = RowManager::new();
    let _ = flush::insert(&person, &mut absent, &mut rows).unwrap();
    assert_eq!(
        rows.get(table, RowAction::Insert).unwrap().get("has_address"),
        Some(&Value::Bool(false))
    );

    let store = MemoryStore::new(Dictionary::GENERIC);
    let mut sm = Instance::new("Person").with(1, Value::record_from_vec(vec![]));
    let result = ResultRow::new().with("id", 2i64).with("has_address", false);
    load::load(&person, &mut sm, &store, &result).await.unwrap();

    assert_eq!(sm.fetch(0), Value::I64(2));
    assert_eq!(sm.fetch(1), Value::Null);
}

#[test]
fn indicator_column_must_declare_a_type() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);

    let mut person = ClassMapping::builder("Person");
    person.field(
        FieldMapping::builder("address", Type::model("Address"))
            .column(ColumnConfig::named("has_address")),
    );
    repo.add_class(&person).unwrap();

    assert!(repo.map_all().unwrap_err().is_invalid_mapping());
}

#[test]
fn embedded_class_must_match_the_field_type() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);

    let mut person = ClassMapping::builder("Person");
    person.field(&FieldMapping::builder("home", Type::model("Address")));
    let person = support::map(&mut repo, &person);

    let mut office = ClassMapping::builder("Office");
    office.embedded_in(&person, 0);
    repo.add_class(&office).unwrap();

    assert!(repo.map_all().unwrap_err().is_invalid_mapping());
}

#[test]
fn embedding_field_must_exist() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);
    let person = support::map(&mut repo, &ClassMapping::builder("Person"));

    let mut address = ClassMapping::builder("Address");
    address.embedded_in(&person, 4);

    let err = repo.add_class(&address).unwrap_err();
    assert!(err.is_invalid_mapping());
    assert!(err.to_string().starts_with("failed to build class `Address`"));
}

fn object_id_type(name: &str, shared: bool) -> Option<ObjectIdType> {
    Some(ObjectIdType {
        name: name.into(),
        shared,
    })
}

#[test]
fn embedded_class_follows_its_mapped_by_class() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);

    let mut invoice = ClassMapping::builder("Invoice");
    invoice
        .object_id_type("InvoiceKey", true)
        .field(FieldMapping::builder("number", Type::I64).primary_key());
    let invoice = support::map(&mut repo, &invoice);

    let mut order = ClassMapping::builder("Order");
    order
        .object_id_type("OrderKey", false)
        .field(FieldMapping::builder("id", Type::I64).primary_key())
        .field(&FieldMapping::builder("billing", Type::model("Billing")));
    let order = support::map(&mut repo, &order);

    let mut billing = ClassMapping::builder("Billing");
    billing
        .embedded_in(&order, 1)
        .mapped_by(&invoice)
        .field(&FieldMapping::builder("amount", Type::I64));
    let billing = support::map(&mut repo, &billing);

    let embedding = billing.embedding().unwrap();
    assert!(Arc::ptr_eq(embedding.owner(), &order));
    assert_eq!(embedding.field().name(), "billing");
    assert!(Arc::ptr_eq(embedding.resolved_owner(), &invoice));

    // Identity, table and key all come from the mapped-by class
    assert!(Arc::ptr_eq(billing.table().unwrap(), invoice.table().unwrap()));
    assert!(Arc::ptr_eq(
        billing.primary_key().unwrap(),
        invoice.primary_key().unwrap()
    ));
    let layout = billing.layout().unwrap();
    assert_eq!(layout.identity, Identity::Application);
    assert_eq!(layout.oid_ty, object_id_type("InvoiceKey", true));
    assert_eq!(billing.oid_ty(), None);
}

#[test]
fn embedded_class_without_mapped_by_follows_its_owner() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);

    let mut order = ClassMapping::builder("Order");
    order
        .object_id_type("OrderKey", false)
        .field(FieldMapping::builder("id", Type::I64).primary_key())
        .field(&FieldMapping::builder("shipping", Type::model("Shipping")));
    let order = support::map(&mut repo, &order);

    let mut shipping = ClassMapping::builder("Shipping");
    shipping
        .embedded_in(&order, 1)
        .field(&FieldMapping::builder("carrier", Type::String));
    let shipping = support::map(&mut repo, &shipping);

    let embedding = shipping.embedding().unwrap();
    assert!(embedding.mapped_by().is_none());
    assert!(Arc::ptr_eq(embedding.resolved_owner(), &order));
    assert!(Arc::ptr_eq(shipping.table().unwrap(), order.table().unwrap()));
    assert_eq!(
        shipping.layout().unwrap().oid_ty,
        object_id_type("OrderKey", false)
    );
}

#[test]
fn subclasses_inherit_the_object_id_type() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);

    let mut emp = employee();
    emp.object_id_type("EmployeeKey", true);
    let emp = support::map(&mut repo, &emp);

    let mut mgr = manager(&emp);
    mgr.strategy(ClassStrategy::Vertical);
    let mgr = support::map(&mut repo, &mgr);

    let mut contractor = ClassMapping::builder("Contractor");
    contractor
        .superclass(&emp)
        .field(&FieldMapping::builder("agency", Type::String));
    let contractor = support::map(&mut repo, &contractor);

    assert_eq!(emp.layout().unwrap().oid_ty, object_id_type("EmployeeKey", true));
    assert_eq!(mgr.layout().unwrap().oid_ty, object_id_type("EmployeeKey", true));
    assert_eq!(
        contractor.layout().unwrap().oid_ty,
        object_id_type("EmployeeKey", true)
    );
}

#[test]
fn object_id_class_takes_the_owner_table() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);

    let mut order = ClassMapping::builder("Order");
    order.field(FieldMapping::builder("key", Type::model("OrderKey")).object_id());
    let order = support::map(&mut repo, &order);

    let mut key = ClassMapping::builder("OrderKey");
    key.embedded_in(&order, 0)
        .field(&FieldMapping::builder("region", Type::String))
        .field(&FieldMapping::builder("number", Type::I64));
    let key = support::map(&mut repo, &key);

    assert_eq!(key.strategy().alias(), "object-id");
    assert!(Arc::ptr_eq(order.table().unwrap(), key.table().unwrap()));
    assert!(key.primary_key().unwrap().is_empty());
    assert!(!key.strategy().is_primary_key_object_id(&key, true));
}

#[test]
fn unmapped_class_refuses_to_flush() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);

    let mut draft = ClassMapping::builder("Draft");
    draft
        .strategy(ClassStrategy::None)
        .field(&FieldMapping::builder("title", Type::String));
    let draft = support::map(&mut repo, &draft);

    assert!(draft.table().is_err());

    let mut sm = Instance::new("Draft").with_id(7i64).with(0, "x");
    let mut rows = RowManager::new();
    let err = flush::insert(&draft, &mut sm, &mut rows).unwrap_err();

    assert!(err.is_unmapped_instance());
    assert_eq!(
        err.to_string(),
        "cannot flush unmapped instance Draft@memory (identity: Draft-7)"
    );
    assert!(rows.is_empty());

    let mut rows = RowManager::new();
    assert!(flush::delete(&draft, &mut sm, &mut rows)
        .unwrap_err()
        .is_unmapped_instance());
    assert!(rows.is_empty());
}

#[test]
fn eager_select_support() {
    let mut repo = support::repository(Dictionary::GENERIC, vec![]);
    let emp = support::map(&mut repo, &employee());

    let mut mgr = manager(&emp);
    mgr.strategy(ClassStrategy::Vertical);
    let mgr = support::map(&mut repo, &mgr);

    let mut select = Select::new();
    assert!(emp
        .strategy()
        .supports_eager_select(&emp, &select, EagerMode::Parallel));
    assert!(mgr
        .strategy()
        .supports_eager_select(&mgr, &select, EagerMode::Parallel));

    select.for_update();
    assert!(!mgr
        .strategy()
        .supports_eager_select(&mgr, &select, EagerMode::Parallel));
    assert!(mgr
        .strategy()
        .supports_eager_select(&mgr, &select, EagerMode::Join));
}
