use pretty_assertions::assert_eq;
use strata_core::{
    schema::{
        app::{ClassDef, ClassId, ColumnDef, ColumnRef, InheritCondition, MapperArgs},
        db::{ColumnId, FkTarget},
        mapping::{Inheritance, Selectable},
    },
    stmt::Value,
    Dataset, Metadata,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn person(metadata: &mut Metadata) -> ClassId {
    metadata
        .declare(
            ClassDef::new("Person")
                .table("people")
                .column("id", ColumnDef::integer().primary_key())
                .column("name", ColumnDef::varchar(50))
                .column("type", ColumnDef::varchar(50))
                .mapper_args(
                    MapperArgs::new()
                        .polymorphic_on("type")
                        .polymorphic_identity("person"),
                ),
        )
        .unwrap()
}

fn engineer(metadata: &mut Metadata, person: ClassId) -> ClassId {
    metadata
        .declare(
            ClassDef::new("Engineer")
                .base(person)
                .table("engineers")
                .column(
                    "id",
                    ColumnDef::integer().primary_key().foreign_key("people.id"),
                )
                .column("primary_language", ColumnDef::varchar(50))
                .mapper_args(MapperArgs::new().polymorphic_identity("engineer")),
        )
        .unwrap()
}

fn column(metadata: &Metadata, table: &str, name: &str) -> ColumnId {
    let table = metadata.table_by_name(table).unwrap();
    metadata.schema().column_named(table.id, name).unwrap()
}

fn dataset(metadata: &Metadata) -> Dataset {
    let mut dataset = Dataset::new();

    dataset
        .insert(
            metadata,
            "people",
            [
                ("id", Value::from(1)),
                ("name", "dilbert".into()),
                ("type", "engineer".into()),
            ],
        )
        .unwrap();
    dataset
        .insert(
            metadata,
            "people",
            [
                ("id", Value::from(2)),
                ("name", "wally".into()),
                ("type", "person".into()),
            ],
        )
        .unwrap();
    dataset
        .insert(
            metadata,
            "engineers",
            [("id", Value::from(1)), ("primary_language", "java".into())],
        )
        .unwrap();

    dataset
}

// ---- join condition ----

#[test]
fn join_condition_from_foreign_key() {
    init();
    let mut metadata = Metadata::new();
    let person = person(&mut metadata);
    let engineer = engineer(&mut metadata, person);

    let mapper = metadata.mapper(engineer).unwrap();
    assert_eq!(
        mapper.inheritance,
        Inheritance::Joined {
            on: vec![(
                column(&metadata, "people", "id"),
                column(&metadata, "engineers", "id")
            )]
        }
    );
}

#[test]
fn missing_join_condition() {
    init();
    let mut metadata = Metadata::new();
    let person = person(&mut metadata);

    let err = metadata
        .declare(
            ClassDef::new("Engineer")
                .base(person)
                .table("engineers")
                .column("id", ColumnDef::integer().primary_key()),
        )
        .unwrap_err();

    assert!(err.is_ambiguous_join());
    assert_eq!(
        err.to_string(),
        "can't find any foreign key relationships between 'people' and 'engineers'; \
         specify an explicit inherit condition"
    );
    assert_eq!(metadata.table_by_name("engineers").map(|t| t.id), None);
}

#[test]
fn ambiguous_join_condition() {
    init();
    let mut metadata = Metadata::new();
    let person = person(&mut metadata);

    let err = metadata
        .declare(
            ClassDef::new("Engineer")
                .base(person)
                .table("engineers")
                .column(
                    "id",
                    ColumnDef::integer().primary_key().foreign_key("people.id"),
                )
                .column(
                    "mentor_id",
                    ColumnDef::integer().primary_key().foreign_key("people.id"),
                ),
        )
        .unwrap_err();

    assert!(err.is_ambiguous_join());
    assert!(err.to_string().contains("found 2 foreign key relationships"), "{err}");
}

#[test]
fn explicit_inherit_condition() {
    init();
    let mut metadata = Metadata::new();
    let person = person(&mut metadata);

    let engineer = metadata
        .declare(
            ClassDef::new("Engineer")
                .base(person)
                .table("engineers")
                .column("engineer_id", ColumnDef::integer().primary_key())
                .mapper_args(MapperArgs::new().inherit_condition(
                    InheritCondition::new().eq(
                        ColumnRef::Name("engineer_id".to_string()),
                        ColumnRef::Attr("id".to_string()),
                    ),
                )),
        )
        .unwrap();

    let mapper = metadata.mapper(engineer).unwrap();
    assert_eq!(
        mapper.inheritance,
        Inheritance::Joined {
            on: vec![(
                column(&metadata, "people", "id"),
                column(&metadata, "engineers", "engineer_id")
            )]
        }
    );
}

#[test]
fn unresolved_foreign_keys_are_skipped() {
    init();
    let mut metadata = Metadata::new();
    let person = person(&mut metadata);

    // `companies` is declared later; only `people.id` can link the tables
    let engineer = metadata
        .declare(
            ClassDef::new("Engineer")
                .base(person)
                .table("engineers")
                .column(
                    "id",
                    ColumnDef::integer()
                        .primary_key()
                        .foreign_key("companies.id")
                        .foreign_key("people.id"),
                ),
        )
        .unwrap();

    assert!(metadata.mapper(engineer).unwrap().inheritance.is_joined());

    let err = metadata.configure().unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("could not find table 'companies'"), "{err}");

    metadata
        .declare(
            ClassDef::new("Company")
                .table("companies")
                .column("id", ColumnDef::integer().primary_key()),
        )
        .unwrap();
    metadata.configure().unwrap();

    let id = metadata.column(column(&metadata, "engineers", "id"));
    let targets: Vec<_> = id.foreign_keys.iter().map(|fk| fk.target.clone()).collect();
    assert_eq!(
        targets,
        [
            FkTarget::Column(column(&metadata, "companies", "id")),
            FkTarget::Column(column(&metadata, "people", "id")),
        ]
    );
}

// ---- bindings ----

#[test]
fn subclass_column_takes_precedence() {
    init();
    let mut metadata = Metadata::new();
    let person = person(&mut metadata);
    let engineer = engineer(&mut metadata, person);

    assert_eq!(
        metadata.attribute_columns(engineer, "id").unwrap(),
        [
            column(&metadata, "engineers", "id"),
            column(&metadata, "people", "id")
        ]
    );
    assert_eq!(
        metadata.attribute_columns(person, "id").unwrap(),
        [column(&metadata, "people", "id")]
    );

    // Inherited attributes stay bound to the parent table
    assert_eq!(
        metadata.attribute_columns(engineer, "name").unwrap(),
        [column(&metadata, "people", "name")]
    );
}

#[test]
fn same_named_column_combined() {
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
                )
                .column("name", ColumnDef::varchar(50)),
        )
        .unwrap();

    assert_eq!(
        metadata.attribute_columns(engineer, "name").unwrap(),
        [
            column(&metadata, "engineers", "name"),
            column(&metadata, "people", "name")
        ]
    );
}

#[test]
fn single_table_subclass_of_joined_subclass() {
    init();
    let mut metadata = Metadata::new();
    let person = person(&mut metadata);
    let engineer = engineer(&mut metadata, person);

    let senior = metadata
        .declare(
            ClassDef::new("SeniorEngineer")
                .base(engineer)
                .column("level", ColumnDef::integer())
                .mapper_args(MapperArgs::new().polymorphic_identity("senior")),
        )
        .unwrap();

    assert_eq!(
        metadata.attribute_columns(senior, "level").unwrap(),
        [column(&metadata, "engineers", "level")]
    );
    assert_eq!(
        metadata.attribute_columns(senior, "id").unwrap(),
        metadata.attribute_columns(engineer, "id").unwrap()
    );
}

// ---- loading ----

#[test]
fn query_subclass_reads_join() {
    init();
    let mut metadata = Metadata::new();
    let person = person(&mut metadata);
    let engineer = engineer(&mut metadata, person);
    let dataset = dataset(&metadata);

    let query = metadata.query(engineer).unwrap();
    assert_eq!(
        query.selectable().tables(),
        [
            metadata.table_by_name("people").unwrap().id,
            metadata.table_by_name("engineers").unwrap().id
        ]
    );

    let instances = query.all(&dataset).unwrap();
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].class(), engineer);
    assert_eq!(instances[0].get("id").unwrap(), Value::from(1));
    assert_eq!(instances[0].get("name").unwrap(), Value::from("dilbert"));
    assert_eq!(
        instances[0].get("primary_language").unwrap(),
        Value::from("java")
    );
}

#[test]
fn query_base_loads_partial_subclass_rows() {
    init();
    let mut metadata = Metadata::new();
    let person = person(&mut metadata);
    let engineer = engineer(&mut metadata, person);
    let dataset = dataset(&metadata);

    let query = metadata.query(person).unwrap();
    assert!(matches!(query.selectable(), Selectable::Table(_)));

    let instances = query.all(&dataset).unwrap();
    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].class(), engineer);

    // The engineers column is absent, so the people column supplies the key
    assert_eq!(instances[0].get("id").unwrap(), Value::from(1));
    assert_eq!(instances[0].loaded_keys().collect::<Vec<_>>(), ["id", "name", "type"]);

    let err = instances[0].get("primary_language").unwrap_err();
    assert!(err.is_attribute_access());
    assert!(err.to_string().contains("is not loaded"), "{err}");

    assert_eq!(instances[1].class(), person);
}

#[test]
fn joined_subclass_beside_single_table_sibling() {
    init();
    let mut metadata = Metadata::new();
    let person = person(&mut metadata);

    let manager = metadata
        .declare(
            ClassDef::new("Manager")
                .base(person)
                .column("golf_swing", ColumnDef::varchar(50))
                .mapper_args(MapperArgs::new().polymorphic_identity("manager")),
        )
        .unwrap();
    let engineer = engineer(&mut metadata, person);

    assert!(metadata.mapper(manager).unwrap().inheritance.is_single());
    assert!(metadata.mapper(engineer).unwrap().inheritance.is_joined());

    // Neither sibling sees the other's attributes, nor does the base
    assert!(metadata.class_attribute(person, "golf_swing").is_err());
    assert!(metadata.class_attribute(person, "primary_language").is_err());
    assert!(metadata.class_attribute(engineer, "golf_swing").is_err());
    assert!(metadata.class_attribute(manager, "primary_language").is_err());

    let mut dataset = Dataset::new();
    for (id, name, ty) in [(1, "dilbert", "engineer"), (2, "vlad", "engineer")] {
        dataset
            .insert(
                &metadata,
                "people",
                [("id", Value::from(id)), ("name", name.into()), ("type", ty.into())],
            )
            .unwrap();
    }
    dataset
        .insert(
            &metadata,
            "people",
            [
                ("id", Value::from(3)),
                ("name", "pointy".into()),
                ("type", "manager".into()),
                ("golf_swing", "fore".into()),
            ],
        )
        .unwrap();
    for (id, language) in [(1, "java"), (2, "cobol")] {
        dataset
            .insert(
                &metadata,
                "engineers",
                [("id", Value::from(id)), ("primary_language", language.into())],
            )
            .unwrap();
    }

    let instances = metadata.query(person).unwrap().all(&dataset).unwrap();
    let classes: Vec<_> = instances.iter().map(|i| i.class()).collect();
    assert_eq!(classes, [engineer, engineer, manager]);

    let cobol = metadata
        .query(engineer)
        .unwrap()
        .filter_by("primary_language", "cobol")
        .unwrap()
        .all(&dataset)
        .unwrap();
    assert_eq!(cobol.len(), 1);
    assert_eq!(cobol[0].get("name").unwrap(), Value::from("vlad"));

    let managers = metadata.query(manager).unwrap().all(&dataset).unwrap();
    assert_eq!(managers.len(), 1);
    assert_eq!(managers[0].get("golf_swing").unwrap(), Value::from("fore"));
}
