use pretty_assertions::assert_eq;
use strata_core::{
    schema::{
        app::{ClassDef, ClassId, ColumnDef, MapperArgs},
        mapping::Selectable,
    },
    stmt::Value,
    Dataset, Metadata,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn employee(metadata: &mut Metadata) -> ClassId {
    metadata
        .declare(
            ClassDef::abstract_concrete_base("Employee")
                .column("id", ColumnDef::integer().primary_key())
                .column("name", ColumnDef::varchar(50)),
        )
        .unwrap()
}

fn subclass(metadata: &mut Metadata, employee: ClassId, name: &str, column: &str) -> ClassId {
    let table = name.to_lowercase();

    metadata
        .declare(
            ClassDef::new(name)
                .base(employee)
                .table(table.clone())
                .column(column, ColumnDef::varchar(40))
                .mapper_args(
                    MapperArgs::new()
                        .polymorphic_identity(table)
                        .concrete(),
                ),
        )
        .unwrap()
}

fn union_columns(metadata: &Metadata, class: ClassId) -> Vec<String> {
    let Selectable::Union(union) = metadata.mapping(class).unwrap().selectable else {
        panic!("{} is not mapped onto a union", metadata.class_name(class));
    };

    metadata
        .union(union)
        .columns
        .iter()
        .map(|id| metadata.column(*id).name.clone())
        .collect()
}

fn dataset(metadata: &Metadata) -> Dataset {
    let mut dataset = Dataset::new();

    dataset
        .insert(
            metadata,
            "engineer",
            [
                ("id", Value::from(1)),
                ("name", "dilbert".into()),
                ("primary_language", "java".into()),
            ],
        )
        .unwrap();

    if metadata.table_by_name("manager").is_some() {
        dataset
            .insert(
                metadata,
                "manager",
                [
                    ("id", Value::from(2)),
                    ("name", "pointy".into()),
                    ("golf_swing", "fore".into()),
                ],
            )
            .unwrap();
    }

    dataset
}

#[test]
fn pending_until_configured() {
    init();
    let mut metadata = Metadata::new();
    let employee = employee(&mut metadata);

    let err = metadata.query(employee).unwrap_err();
    assert!(err.is_mapping_pending());

    let engineer = subclass(&mut metadata, employee, "Engineer", "primary_language");

    let err = metadata.class_attribute(employee, "name").unwrap_err();
    assert!(err.is_mapping_pending());
    assert!(err.to_string().contains("['Engineer']"), "{err}");

    // Subclasses are usable right away
    let instances = metadata
        .query(engineer)
        .unwrap()
        .all(&dataset(&metadata))
        .unwrap();
    assert_eq!(instances[0].get("name").unwrap(), Value::from("dilbert"));
}

#[test]
fn configure_without_subclasses_stays_pending() {
    init();
    let mut metadata = Metadata::new();
    let employee = employee(&mut metadata);

    metadata.configure().unwrap();
    assert!(metadata.mapping(employee).unwrap_err().is_mapping_pending());
}

#[test]
fn subclass_materializes_base_columns() {
    init();
    let mut metadata = Metadata::new();
    let employee = employee(&mut metadata);
    let engineer = subclass(&mut metadata, employee, "Engineer", "primary_language");
    let manager = subclass(&mut metadata, employee, "Manager", "golf_swing");

    let engineer_table = metadata.table_by_name("engineer").unwrap();
    let manager_table = metadata.table_by_name("manager").unwrap();

    let names = |table: &strata_core::schema::db::Table| -> Vec<String> {
        table
            .columns
            .iter()
            .map(|id| metadata.column(*id).name.clone())
            .collect()
    };

    assert_eq!(names(engineer_table), ["id", "name", "primary_language"]);
    assert_eq!(names(manager_table), ["id", "name", "golf_swing"]);

    // Each subclass gets columns of its own
    assert_ne!(
        metadata.attribute_columns(engineer, "id").unwrap(),
        metadata.attribute_columns(manager, "id").unwrap()
    );
}

#[test]
fn union_over_subclasses() {
    init();
    let mut metadata = Metadata::new();
    let employee = employee(&mut metadata);
    let engineer = subclass(&mut metadata, employee, "Engineer", "primary_language");
    let manager = subclass(&mut metadata, employee, "Manager", "golf_swing");

    metadata.configure().unwrap();

    assert_eq!(
        union_columns(&metadata, employee),
        ["id", "name", "golf_swing", "primary_language", "type"]
    );

    let mapping = metadata.mapping(employee).unwrap();
    assert_eq!(
        mapping.attributes,
        ["id", "name", "golf_swing", "primary_language", "type"]
    );
    assert_eq!(
        mapping.identity_values(),
        [Value::from("engineer"), Value::from("manager")]
    );

    let dataset = dataset(&metadata);
    let instances = metadata.query(employee).unwrap().all(&dataset).unwrap();
    let classes: Vec<_> = instances.iter().map(|i| i.class()).collect();
    assert_eq!(classes, [manager, engineer]);
    assert_eq!(instances[0].get("golf_swing").unwrap(), Value::from("fore"));

    let managers = metadata
        .query(employee)
        .unwrap()
        .filter_identity("manager")
        .unwrap()
        .all(&dataset)
        .unwrap();
    assert_eq!(managers.len(), 1);
    assert_eq!(managers[0].class(), manager);
    assert_eq!(managers[0].get("name").unwrap(), Value::from("pointy"));

    // The discriminator is a union column only
    let err = metadata.class_attribute(manager, "type").unwrap_err();
    assert!(err.is_attribute_access());
}

#[test]
fn configure_is_idempotent() {
    init();
    let mut metadata = Metadata::new();
    let employee = employee(&mut metadata);
    subclass(&mut metadata, employee, "Engineer", "primary_language");

    metadata.configure().unwrap();
    let first = metadata.mapping(employee).unwrap();
    let columns = metadata.schema().columns.len();

    metadata.configure().unwrap();
    assert_eq!(metadata.mapping(employee).unwrap(), first);
    assert_eq!(metadata.schema().columns.len(), columns);
}

#[test]
fn subclass_added_after_configure() {
    init();
    let mut metadata = Metadata::new();
    let employee = employee(&mut metadata);
    let engineer = subclass(&mut metadata, employee, "Engineer", "primary_language");

    metadata.configure().unwrap();
    assert_eq!(
        union_columns(&metadata, employee),
        ["id", "name", "primary_language", "type"]
    );
    let id = metadata.attribute_columns(employee, "id").unwrap().to_vec();

    let manager = subclass(&mut metadata, employee, "Manager", "golf_swing");
    let dataset = dataset(&metadata);

    // The stale union does not see the new subclass yet
    let instances = metadata.query(employee).unwrap().all(&dataset).unwrap();
    let classes: Vec<_> = instances.iter().map(|i| i.class()).collect();
    assert_eq!(classes, [engineer]);

    metadata.configure().unwrap();
    assert_eq!(
        union_columns(&metadata, employee),
        ["id", "name", "golf_swing", "primary_language", "type"]
    );

    // Re-synthesis keeps column identities
    assert_eq!(metadata.attribute_columns(employee, "id").unwrap(), id);

    let instances = metadata.query(employee).unwrap().all(&dataset).unwrap();
    let classes: Vec<_> = instances.iter().map(|i| i.class()).collect();
    assert_eq!(classes, [manager, engineer]);
}

#[test]
fn attribute_key_differs_from_column_name() {
    init();
    let mut metadata = Metadata::new();

    let document = metadata
        .declare(
            ClassDef::abstract_concrete_base("Document")
                .column("id", ColumnDef::integer().primary_key())
                .column("documentType", ColumnDef::varchar(20).name("documenttype")),
        )
        .unwrap();
    let contract = metadata
        .declare(
            ClassDef::new("Contract")
                .base(document)
                .table("contracts")
                .mapper_args(MapperArgs::new().polymorphic_identity("contract").concrete()),
        )
        .unwrap();

    metadata.configure().unwrap();

    assert!(metadata.class_attribute(contract, "documentType").is_ok());
    assert_eq!(
        union_columns(&metadata, document),
        ["id", "documenttype", "type"]
    );

    let union_column = metadata.attribute_columns(document, "documentType").unwrap()[0];
    assert_eq!(metadata.column(union_column).name, "documenttype");
    assert!(metadata.class_attribute(document, "documenttype").is_err());
}

#[test]
fn subclass_must_define_table() {
    init();
    let mut metadata = Metadata::new();
    let employee = employee(&mut metadata);

    let err = metadata
        .declare(ClassDef::new("Engineer").base(employee))
        .unwrap_err();

    assert!(err.is_configuration());
    assert!(err.to_string().contains("must define its own table"), "{err}");
}

#[test]
fn attribute_added_to_base_after_configure() {
    init();
    let mut metadata = Metadata::new();
    let employee = employee(&mut metadata);
    let engineer = subclass(&mut metadata, employee, "Engineer", "primary_language");
    metadata.configure().unwrap();

    metadata
        .add_attribute(employee, "hired", ColumnDef::varchar(10))
        .unwrap();

    assert!(metadata.class_attribute(engineer, "hired").is_ok());
    assert!(metadata.class_attribute(employee, "hired").is_err());

    metadata.configure().unwrap();
    assert!(metadata.class_attribute(employee, "hired").is_ok());
    assert_eq!(
        union_columns(&metadata, employee),
        ["id", "name", "primary_language", "hired", "type"]
    );
}

#[test]
fn custom_discriminator_name() {
    init();
    let mut metadata = Metadata::builder()
        .concrete_discriminator_name("kind")
        .union_alias("employees_union")
        .build();
    let employee = employee(&mut metadata);
    subclass(&mut metadata, employee, "Engineer", "primary_language");
    metadata.configure().unwrap();

    assert_eq!(
        union_columns(&metadata, employee),
        ["id", "name", "primary_language", "kind"]
    );

    let Selectable::Union(union) = metadata.mapping(employee).unwrap().selectable else {
        unreachable!()
    };
    assert_eq!(metadata.union(union).alias, "employees_union");
}
