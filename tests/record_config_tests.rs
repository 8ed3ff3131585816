use memolock::{
    Column, DataType, DbError, InMemoryBackend, LockingConfig, LockingStrategy, PersistenceBackend,
    Record, RecordSchema, RecordType, SaveOutcome, Value, validate_strategy,
};
use serde_json::json;

fn notes_schema() -> RecordSchema {
    RecordSchema::new(
        "notes",
        vec![
            Column::new("id", DataType::Integer).primary_key(),
            Column::new("title", DataType::Text).not_null(),
            Column::new("score", DataType::Float),
            Column::new("pinned", DataType::Boolean),
            Column::new("revision", DataType::Integer),
        ],
    )
}

#[test]
fn strategy_validation_happens_at_configuration_time() {
    assert_eq!(validate_strategy("all").unwrap(), LockingStrategy::All);
    assert!(matches!(
        validate_strategy("row"),
        Err(DbError::Configuration(_))
    ));

    let err = LockingConfig::from_json(r#"{"strategy": "row", "version_column": "revision"}"#)
        .unwrap_err();
    assert!(matches!(err, DbError::Configuration(_)));
}

#[test]
fn json_configuration_drives_the_policy() {
    let config = LockingConfig::from_json(
        r#"{"strategy": "version", "version_column": "revision", "ignored_columns": ["pinned"]}"#,
    )
    .unwrap();
    let notes = RecordType::new(notes_schema(), config).unwrap();

    assert_eq!(notes.policy().strategy(), LockingStrategy::Version);
    assert_eq!(notes.policy().version_column(), "revision");
    assert!(notes.policy().is_ignored("pinned"));
}

#[test]
fn unknown_fields_are_rejected() {
    let err = LockingConfig::from_json(r#"{"strategy": "dirty", "ignore": ["pinned"]}"#)
        .unwrap_err();
    assert!(matches!(err, DbError::Configuration(_)));
}

#[test]
fn default_version_column_must_exist_for_version_strategy() {
    let err = RecordType::new(notes_schema(), LockingConfig::new(LockingStrategy::Version))
        .unwrap_err();
    assert!(matches!(err, DbError::Configuration(_)));
}

#[test]
fn insert_initializes_version_counter() {
    let mut backend = InMemoryBackend::new();
    backend.create_table(notes_schema()).unwrap();
    let notes = RecordType::new(
        notes_schema(),
        LockingConfig::new(LockingStrategy::Version).version_column("revision"),
    )
    .unwrap();

    let mut note = Record::new(notes);
    assert!(!note.is_persisted());
    note.set("id", 1).unwrap();
    note.set("title", "groceries").unwrap();

    assert_eq!(note.save(&backend).unwrap(), SaveOutcome::Inserted);
    assert!(note.is_persisted());
    assert!(!note.is_changed());
    assert_eq!(note.get("revision"), Some(&Value::Integer(1)));
    assert_eq!(backend.row_count("notes").unwrap(), 1);

    note.set("score", 4.5).unwrap();
    assert_eq!(note.save(&backend).unwrap(), SaveOutcome::Updated);
    assert_eq!(note.get("revision"), Some(&Value::Integer(2)));
}

#[test]
fn insert_rejects_missing_required_columns() {
    let mut backend = InMemoryBackend::new();
    backend.create_table(notes_schema()).unwrap();
    let notes = RecordType::new(notes_schema(), LockingConfig::default()).unwrap();

    let mut note = Record::new(notes);
    note.set("id", 1).unwrap();
    let err = note.save(&backend).unwrap_err();
    assert!(matches!(err, DbError::TypeMismatch(_)));
    assert!(!note.is_persisted());
    assert_eq!(backend.row_count("notes").unwrap(), 0);
}

#[test]
fn duplicate_insert_is_a_backend_error() {
    let mut backend = InMemoryBackend::new();
    backend.create_table(notes_schema()).unwrap();
    let notes = RecordType::new(notes_schema(), LockingConfig::default()).unwrap();

    for expected_ok in [true, false] {
        let mut note = Record::new(notes.clone());
        note.set("id", 1).unwrap();
        note.set("title", "dup").unwrap();
        assert_eq!(note.save(&backend).is_ok(), expected_ok);
    }
}

#[test]
fn set_rejects_undeclared_and_mistyped_columns() {
    let notes = RecordType::new(notes_schema(), LockingConfig::default()).unwrap();
    let mut note = Record::new(notes);

    assert!(matches!(
        note.set("colour", "red"),
        Err(DbError::ColumnNotFound { .. })
    ));
    assert!(matches!(
        note.set("pinned", "yes"),
        Err(DbError::TypeMismatch(_))
    ));
    assert!(!note.is_changed());
}

#[test]
fn load_rejects_rows_missing_key_or_required_columns() {
    let notes = RecordType::new(notes_schema(), LockingConfig::default()).unwrap();

    assert!(matches!(
        Record::load(notes.clone(), [("title", Value::from("orphan"))]),
        Err(DbError::TypeMismatch(_))
    ));
    assert!(matches!(
        Record::load(notes.clone(), [("id", Value::Integer(9))]),
        Err(DbError::TypeMismatch(_))
    ));
    assert!(matches!(
        Record::from_json(notes.clone(), &json!({"title": "orphan"})),
        Err(DbError::TypeMismatch(_))
    ));

    let note = Record::load(notes, [("id", Value::Integer(9)), ("title", Value::from("kept"))])
        .unwrap();
    assert_eq!(note.get("score"), Some(&Value::Null));
}

#[test]
fn non_finite_floats_never_reach_the_backend() {
    let notes = RecordType::new(notes_schema(), LockingConfig::default()).unwrap();
    let mut note = Record::new(notes.clone());

    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(matches!(
            note.set("score", bad),
            Err(DbError::TypeMismatch(_))
        ));
    }
    assert!(!note.is_changed());
    assert!(
        Record::load(
            notes,
            [
                ("id", Value::Integer(1)),
                ("title", Value::from("t")),
                ("score", Value::Float(f64::NAN)),
            ],
        )
        .is_err()
    );
}

#[test]
fn records_load_from_and_render_to_json() {
    let mut backend = InMemoryBackend::new();
    backend.create_table(notes_schema()).unwrap();
    let notes = RecordType::new(notes_schema(), LockingConfig::new(LockingStrategy::All)).unwrap();

    let document = json!({"id": 3, "title": "trip", "score": 2.5, "pinned": true});
    let mut seed = Record::new(notes.clone());
    for (column, value) in document.as_object().unwrap() {
        let data_type = notes.schema().require_column(column).unwrap().data_type;
        seed.set(column, Value::from_json(value, &data_type).unwrap())
            .unwrap();
    }
    seed.save(&backend).unwrap();

    let mut note = Record::from_json(notes.clone(), &document).unwrap();
    assert!(note.is_persisted());
    assert!(!note.is_changed());
    assert_eq!(note.get("revision"), Some(&Value::Null));
    assert_eq!(
        note.to_json(),
        json!({"id": 3, "title": "trip", "score": 2.5, "pinned": true, "revision": null})
    );

    note.set("pinned", false).unwrap();
    assert_eq!(note.save(&backend).unwrap(), SaveOutcome::Updated);

    let row = backend
        .fetch_row("notes", &[("id".to_string(), Value::Integer(3))])
        .unwrap()
        .unwrap();
    assert!(row.contains(&("pinned".to_string(), Value::Boolean(false))));

    assert!(Record::from_json(notes.clone(), &json!([1, 2])).is_err());
    assert!(matches!(
        Record::from_json(notes, &json!({"id": 1, "extra": 1})),
        Err(DbError::ColumnNotFound { .. })
    ));
}

#[test]
fn policy_is_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RecordType>();
    assert_send_sync::<InMemoryBackend>();
    assert_send_sync::<Record>();
}
