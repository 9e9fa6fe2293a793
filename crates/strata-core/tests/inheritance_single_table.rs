use pretty_assertions::assert_eq;
use strata_core::{
    schema::{
        app::{Attr, ClassDef, ClassId, ColumnDef, ConstraintDef, MapperArgs},
        db::{Constraint, TableArgs},
    },
    stmt::Value,
    Dataset, Metadata,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct People {
    metadata: Metadata,
    person: ClassId,
    engineer: ClassId,
    manager: ClassId,
}

fn people() -> People {
    init();
    let mut metadata = Metadata::new();

    let person = metadata
        .declare(
            ClassDef::new("Person")
                .table("people")
                .column("id", ColumnDef::integer().primary_key())
                .column("name", ColumnDef::varchar(50))
                .column("discriminator", ColumnDef::varchar(50))
                .mapper_args(
                    MapperArgs::new()
                        .polymorphic_on("discriminator")
                        .polymorphic_identity("person"),
                ),
        )
        .unwrap();

    let engineer = metadata
        .declare(
            ClassDef::new("Engineer")
                .base(person)
                .column("primary_language", ColumnDef::varchar(50))
                .mapper_args(MapperArgs::new().polymorphic_identity("engineer")),
        )
        .unwrap();

    let manager = metadata
        .declare(
            ClassDef::new("Manager")
                .base(person)
                .column("golf_swing", ColumnDef::varchar(50))
                .mapper_args(MapperArgs::new().polymorphic_identity("manager")),
        )
        .unwrap();

    People {
        metadata,
        person,
        engineer,
        manager,
    }
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

fn dataset(metadata: &Metadata) -> Dataset {
    let mut dataset = Dataset::new();

    for row in [
        [
            ("id", Value::from(1)),
            ("name", "dilbert".into()),
            ("discriminator", "engineer".into()),
            ("primary_language", "java".into()),
        ],
        [
            ("id", Value::from(2)),
            ("name", "pointy".into()),
            ("discriminator", "manager".into()),
            ("golf_swing", "slice".into()),
        ],
        [
            ("id", Value::from(3)),
            ("name", "wally".into()),
            ("discriminator", "person".into()),
            ("golf_swing", Value::Null),
        ],
    ] {
        dataset.insert(metadata, "people", row).unwrap();
    }

    dataset
}

// ---- schema ----

#[test]
fn subclass_columns_land_on_shared_table() {
    let People { metadata, .. } = people();

    assert_eq!(
        column_names(&metadata, "people"),
        ["id", "name", "discriminator", "primary_language", "golf_swing"]
    );
    assert_eq!(metadata.schema().tables.len(), 1);
}

#[test]
fn subclass_attribute_hidden_from_root_and_siblings() {
    let People {
        metadata,
        person,
        engineer,
        manager,
    } = people();

    assert!(metadata.class_attribute(engineer, "primary_language").is_ok());
    assert!(metadata.class_attribute(engineer, "name").is_ok());

    let err = metadata
        .class_attribute(manager, "primary_language")
        .unwrap_err();
    assert!(err.is_attribute_access());
    assert_eq!(err.to_string(), "'Manager' has no attribute 'primary_language'");

    let err = metadata.class_attribute(person, "golf_swing").unwrap_err();
    assert!(err.is_attribute_access());
}

#[test]
fn subclass_inherits_parent_bindings() {
    let People {
        metadata,
        person,
        engineer,
        ..
    } = people();

    for key in ["id", "name", "discriminator"] {
        assert_eq!(
            metadata.attribute_columns(person, key).unwrap(),
            metadata.attribute_columns(engineer, key).unwrap(),
        );
    }

    assert_eq!(
        metadata.mapper(engineer).unwrap().discriminator,
        metadata.mapper(person).unwrap().discriminator,
    );
    assert!(metadata.has_inherited_table(engineer));
    assert!(!metadata.has_inherited_table(person));
}

#[test]
fn sibling_column_name_conflict() {
    let People { mut metadata, person, .. } = people();
    let columns = metadata.schema().columns.len();

    let err = metadata
        .declare(
            ClassDef::new("Intern")
                .base(person)
                .column("primary_language", ColumnDef::varchar(50)),
        )
        .unwrap_err();

    assert!(err.is_column_conflict());
    assert_eq!(
        err.to_string(),
        "column 'primary_language' on class 'Intern' conflicts with existing column \
         'people.primary_language'"
    );

    // The failed declaration left nothing behind
    assert_eq!(metadata.class_by_name("Intern"), None);
    assert_eq!(metadata.schema().columns.len(), columns);
}

#[test]
fn redeclaring_shared_column_is_idempotent() {
    init();
    let mut metadata = Metadata::new();

    let person = metadata
        .declare(
            ClassDef::new("Person")
                .table("people")
                .column("id", ColumnDef::integer().primary_key()),
        )
        .unwrap();

    // Reuses the column when a sibling already created it
    let target_id = Attr::declared(|cx| {
        Ok(match cx.table_column("target_id") {
            Some(column) => Attr::Existing(column),
            None => ColumnDef::integer().into(),
        })
    });

    let engineer = metadata
        .declare(
            ClassDef::new("Engineer")
                .base(person)
                .attr("target_id", target_id.clone()),
        )
        .unwrap();
    let manager = metadata
        .declare(ClassDef::new("Manager").base(person).attr("target_id", target_id))
        .unwrap();

    let column = metadata.attribute_columns(engineer, "target_id").unwrap()[0];
    assert_eq!(
        metadata.attribute_columns(manager, "target_id").unwrap(),
        [column]
    );
    assert_eq!(column_names(&metadata, "people"), ["id", "target_id"]);

    // Binding it again further down changes nothing
    let senior = metadata
        .declare(
            ClassDef::new("SeniorEngineer")
                .base(engineer)
                .attr("target_id", column),
        )
        .unwrap();

    assert_eq!(
        metadata.attribute_columns(senior, "target_id").unwrap(),
        [column]
    );
    assert_eq!(column_names(&metadata, "people"), ["id", "target_id"]);
}

#[test]
fn shared_column_created_up_front() {
    init();
    let mut metadata = Metadata::new();

    let person = metadata
        .declare(
            ClassDef::new("Person")
                .table("people")
                .column("id", ColumnDef::integer().primary_key()),
        )
        .unwrap();

    let start_date = metadata.new_column("start_date", ColumnDef::string());

    let engineer = metadata
        .declare(ClassDef::new("Engineer").base(person).attr("start_date", start_date))
        .unwrap();
    let manager = metadata
        .declare(ClassDef::new("Manager").base(person).attr("start_date", start_date))
        .unwrap();

    assert_eq!(
        metadata.attribute_columns(engineer, "start_date").unwrap(),
        [start_date]
    );
    assert_eq!(
        metadata.attribute_columns(manager, "start_date").unwrap(),
        [start_date]
    );
    assert_eq!(column_names(&metadata, "people"), ["id", "start_date"]);
}

#[test]
fn primary_key_on_subclass_rejected() {
    let People { mut metadata, person, .. } = people();

    let err = metadata
        .declare(
            ClassDef::new("Intern")
                .base(person)
                .column("intern_id", ColumnDef::integer().primary_key()),
        )
        .unwrap_err();

    assert!(err.is_configuration());
    assert!(
        err.to_string()
            .contains("place primary key columns on the base class"),
        "{err}"
    );
}

#[test]
fn table_args_on_subclass_rejected() {
    let People { mut metadata, person, .. } = people();

    let err = metadata
        .declare(
            ClassDef::new("Intern")
                .base(person)
                .table_args(TableArgs::new().option("mysql_engine", "InnoDB")),
        )
        .unwrap_err();

    assert!(err.is_configuration());
    assert!(
        err.to_string().contains("place table args on the base class"),
        "{err}"
    );
}

#[test]
fn subclass_constraints_attach_to_shared_table() {
    let People {
        mut metadata,
        person,
        ..
    } = people();

    metadata
        .declare(
            ClassDef::new("Intern")
                .base(person)
                .column("school", ColumnDef::varchar(50))
                .constraint(ConstraintDef::unique(["school"]).named("uq_school")),
        )
        .unwrap();

    let people = metadata.table_by_name("people").unwrap();
    let school = metadata.schema().column_named(people.id, "school").unwrap();

    assert_eq!(
        people.constraints,
        [Constraint::Unique {
            name: Some("uq_school".to_string()),
            columns: vec![school],
        }]
    );
}

#[test]
fn nested_subclass_shares_root_table() {
    let People {
        mut metadata,
        engineer,
        ..
    } = people();

    let senior = metadata
        .declare(
            ClassDef::new("SeniorEngineer")
                .base(engineer)
                .column("seniority", ColumnDef::integer())
                .mapper_args(MapperArgs::new().polymorphic_identity("senior")),
        )
        .unwrap();

    assert!(metadata.class_attribute(senior, "primary_language").is_ok());
    assert!(metadata.class_attribute(engineer, "seniority").is_err());
    assert_eq!(
        column_names(&metadata, "people").last().map(String::as_str),
        Some("seniority")
    );
}

// ---- loading ----

#[test]
fn query_root_loads_each_row_as_its_class() {
    let People {
        metadata,
        person,
        engineer,
        manager,
    } = people();
    let dataset = dataset(&metadata);

    let instances = metadata.query(person).unwrap().all(&dataset).unwrap();
    let classes: Vec<_> = instances.iter().map(|i| i.class()).collect();
    assert_eq!(classes, [engineer, manager, person]);

    assert_eq!(instances[0].get("primary_language").unwrap(), Value::from("java"));
    assert_eq!(instances[1].get("golf_swing").unwrap(), Value::from("slice"));

    // Not an attribute of a manager, even though the row has the column
    let err = instances[1].get("primary_language").unwrap_err();
    assert!(err.is_attribute_access());
}

#[test]
fn query_subclass_filters_by_identity() {
    let People {
        metadata, engineer, ..
    } = people();
    let dataset = dataset(&metadata);

    let query = metadata.query(engineer).unwrap();
    assert!(query.statement().filter.is_some());

    let instances = query.all(&dataset).unwrap();
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].class_name(), "Engineer");
    assert_eq!(instances[0].get("name").unwrap(), Value::from("dilbert"));
}

#[test]
fn query_nested_subclass_includes_descendants() {
    let People {
        mut metadata,
        engineer,
        ..
    } = people();

    metadata
        .declare(
            ClassDef::new("SeniorEngineer")
                .base(engineer)
                .mapper_args(MapperArgs::new().polymorphic_identity("senior")),
        )
        .unwrap();

    let mut dataset = dataset(&metadata);
    dataset
        .insert(
            &metadata,
            "people",
            [
                ("id", Value::from(4)),
                ("discriminator", "senior".into()),
            ],
        )
        .unwrap();

    let instances = metadata.query(engineer).unwrap().all(&dataset).unwrap();
    let names: Vec<_> = instances.iter().map(|i| i.class_name()).collect();
    assert_eq!(names, ["Engineer", "SeniorEngineer"]);
}

#[test]
fn filter_by_attribute() {
    let People { metadata, person, .. } = people();
    let dataset = dataset(&metadata);

    let instances = metadata
        .query(person)
        .unwrap()
        .filter_by("name", "wally")
        .unwrap()
        .all(&dataset)
        .unwrap();

    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].get("id").unwrap(), Value::from(3));

    let err = metadata
        .query(person)
        .unwrap()
        .filter_by("golf_swing", "slice")
        .unwrap_err();
    assert!(err.is_attribute_access());
}
