use pretty_assertions::assert_eq;
use strata_core::{
    schema::app::{Attr, ClassDef, ClassId, ColumnDef, MapperArgs},
    stmt::Value,
    Dataset, Metadata,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn column_names(metadata: &Metadata, table: &str) -> Vec<String> {
    metadata
        .table_by_name(table)
        .unwrap()
        .columns
        .iter()
        .map(|id| metadata.column(*id).name.clone())
        .collect()
}

fn person(metadata: &mut Metadata) -> ClassId {
    metadata
        .declare(
            ClassDef::new("Person")
                .table("people")
                .column("id", ColumnDef::integer().primary_key()),
        )
        .unwrap()
}

#[test]
fn added_to_single_table_subclass() {
    init();
    let mut metadata = Metadata::new();
    let person = person(&mut metadata);
    let engineer = metadata
        .declare(ClassDef::new("Engineer").base(person))
        .unwrap();
    let senior = metadata
        .declare(ClassDef::new("SeniorEngineer").base(engineer))
        .unwrap();
    let manager = metadata
        .declare(ClassDef::new("Manager").base(person))
        .unwrap();

    metadata
        .add_attribute(engineer, "status", ColumnDef::varchar(20))
        .unwrap();

    assert_eq!(column_names(&metadata, "people"), ["id", "status"]);

    let status = metadata.attribute_columns(engineer, "status").unwrap();
    assert_eq!(metadata.attribute_columns(senior, "status").unwrap(), status);
    assert!(metadata.class_attribute(person, "status").is_err());
    assert!(metadata.class_attribute(manager, "status").is_err());
}

#[test]
fn added_to_joined_base() {
    init();
    let mut metadata = Metadata::new();
    let person = person(&mut metadata);
    let engineer = metadata
        .declare(
            ClassDef::new("Engineer")
                .base(person)
                .table("engineers")
                .column(
                    "id",
                    ColumnDef::integer().primary_key().foreign_key("people.id"),
                ),
        )
        .unwrap();

    metadata
        .add_attribute(person, "age", ColumnDef::integer())
        .unwrap();

    assert_eq!(column_names(&metadata, "people"), ["id", "age"]);
    assert_eq!(
        metadata.attribute_columns(engineer, "age").unwrap(),
        metadata.attribute_columns(person, "age").unwrap()
    );
}

/// Person -> Engineer -> Admin, all joined. `name` lives on `people` and,
/// when `engineer_name` is set, is redeclared on `engineers`.
fn joined_chain(metadata: &mut Metadata, engineer_name: bool) -> (ClassId, ClassId) {
    let person = metadata
        .declare(
            ClassDef::new("Person")
                .table("people")
                .column("id", ColumnDef::integer().primary_key())
                .column("name", ColumnDef::varchar(50)),
        )
        .unwrap();

    let mut engineer = ClassDef::new("Engineer")
        .base(person)
        .table("engineers")
        .column(
            "id",
            ColumnDef::integer().primary_key().foreign_key("people.id"),
        );
    if engineer_name {
        engineer = engineer.column("name", ColumnDef::varchar(50));
    }
    let engineer = metadata.declare(engineer).unwrap();

    let admin = metadata
        .declare(
            ClassDef::new("Admin")
                .base(engineer)
                .table("admins")
                .column(
                    "id",
                    ColumnDef::integer().primary_key().foreign_key("engineers.id"),
                )
                .column("workstation", ColumnDef::varchar(20)),
        )
        .unwrap();

    (engineer, admin)
}

fn qualified_names(metadata: &Metadata, class: ClassId, key: &str) -> Vec<String> {
    metadata
        .attribute_columns(class, key)
        .unwrap()
        .iter()
        .map(|id| metadata.schema().qualified_name(*id))
        .collect()
}

#[test]
fn added_to_middle_of_joined_chain() {
    init();

    let mut declared = Metadata::new();
    let (_, declared_admin) = joined_chain(&mut declared, true);

    let mut added = Metadata::new();
    let (engineer, admin) = joined_chain(&mut added, false);
    added
        .add_attribute(engineer, "name", ColumnDef::varchar(50))
        .unwrap();

    assert_eq!(
        qualified_names(&declared, declared_admin, "name"),
        ["engineers.name", "people.name"]
    );
    assert_eq!(
        qualified_names(&added, admin, "name"),
        qualified_names(&declared, declared_admin, "name")
    );
    assert_eq!(
        qualified_names(&added, engineer, "name"),
        ["engineers.name", "people.name"]
    );

    // The engineers column wins when loading an admin
    let mut dataset = Dataset::new();
    dataset
        .insert(
            &added,
            "people",
            [("id", Value::from(1)), ("name", "person name".into())],
        )
        .unwrap();
    dataset
        .insert(
            &added,
            "engineers",
            [("id", Value::from(1)), ("name", "engineer name".into())],
        )
        .unwrap();
    dataset
        .insert(
            &added,
            "admins",
            [("id", Value::from(1)), ("workstation", "ws-1".into())],
        )
        .unwrap();

    let instances = added.query(admin).unwrap().all(&dataset).unwrap();
    assert_eq!(instances.len(), 1);
    assert_eq!(
        instances[0].get("name").unwrap(),
        Value::from("engineer name")
    );
    assert_eq!(instances[0].get("workstation").unwrap(), Value::from("ws-1"));
}

#[test]
fn parent_column_added_to_joined_chain() {
    init();
    let mut metadata = Metadata::new();
    let (engineer, admin) = joined_chain(&mut metadata, false);
    let person = metadata.class_by_name("Person").unwrap();

    metadata
        .add_attribute(person, "age", ColumnDef::integer())
        .unwrap();

    assert_eq!(qualified_names(&metadata, engineer, "age"), ["people.age"]);
    assert_eq!(qualified_names(&metadata, admin, "age"), ["people.age"]);

    let mut dataset = Dataset::new();
    dataset
        .insert(
            &metadata,
            "people",
            [("id", Value::from(1)), ("age", Value::from(41))],
        )
        .unwrap();
    dataset
        .insert(&metadata, "engineers", [("id", Value::from(1))])
        .unwrap();
    dataset
        .insert(&metadata, "admins", [("id", Value::from(1))])
        .unwrap();

    let instances = metadata.query(admin).unwrap().all(&dataset).unwrap();
    assert_eq!(instances[0].get("age").unwrap(), Value::from(41));
}

#[test]
fn added_to_concrete_parent() {
    init();
    let mut metadata = Metadata::new();
    let person = person(&mut metadata);
    let contractor = metadata
        .declare(
            ClassDef::new("Contractor")
                .base(person)
                .table("contractors")
                .column("id", ColumnDef::integer().primary_key())
                .mapper_args(MapperArgs::new().concrete()),
        )
        .unwrap();

    metadata
        .add_attribute(person, "age", ColumnDef::integer())
        .unwrap();

    assert_eq!(column_names(&metadata, "contractors"), ["id"]);

    let err = metadata.class_attribute(contractor, "age").unwrap_err();
    assert!(err.to_string().contains("does not implement"), "{err}");
}

#[test]
fn added_column_conflicts() {
    init();
    let mut metadata = Metadata::new();
    let person = person(&mut metadata);
    let engineer = metadata
        .declare(
            ClassDef::new("Engineer")
                .base(person)
                .column("status", ColumnDef::varchar(20)),
        )
        .unwrap();
    let manager = metadata
        .declare(ClassDef::new("Manager").base(person))
        .unwrap();

    let err = metadata
        .add_attribute(manager, "status", ColumnDef::varchar(20))
        .unwrap_err();
    assert!(err.is_column_conflict());

    // Sharing the existing column is fine
    let status = metadata.attribute_columns(engineer, "status").unwrap()[0];
    metadata
        .add_attribute(manager, "status", Attr::Existing(status))
        .unwrap();
    assert_eq!(
        metadata.attribute_columns(manager, "status").unwrap(),
        [status]
    );
}

#[test]
fn added_to_mixin_reaches_later_classes_only() {
    init();
    let mut metadata = Metadata::new();

    let audited = metadata.declare(ClassDef::mixin("Audited")).unwrap();
    metadata
        .declare(
            ClassDef::new("Person")
                .base(audited)
                .table("people")
                .column("id", ColumnDef::integer().primary_key()),
        )
        .unwrap();

    metadata
        .add_attribute(audited, "audited_by", ColumnDef::string())
        .unwrap();

    let company = metadata
        .declare(
            ClassDef::new("Company")
                .base(audited)
                .table("companies")
                .column("id", ColumnDef::integer().primary_key()),
        )
        .unwrap();

    assert_eq!(column_names(&metadata, "people"), ["id"]);
    assert_eq!(column_names(&metadata, "companies"), ["audited_by", "id"]);
    assert!(metadata.class_attribute(company, "audited_by").is_ok());
}

#[test]
fn deferred_attribute() {
    init();
    let mut metadata = Metadata::new();
    let person = person(&mut metadata);

    metadata
        .add_attribute(person, "bio", ColumnDef::string().deferred())
        .unwrap();

    let bio = metadata.attribute_columns(person, "bio").unwrap()[0];
    let query = metadata.query(person).unwrap();
    assert!(!query.statement().columns.contains(&bio));
}
