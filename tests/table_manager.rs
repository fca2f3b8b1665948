use tabula::{
    ColumnSpec, ManagerState, Predicate, Record, SchemaDraft, StorageType, TableError,
    TableManager, Value,
};

fn stage_students(manager: &mut TableManager) {
    manager.add_column(ColumnSpec::new("student_id").primary_key());
    manager.add_column(ColumnSpec::new("name").not_null());
    manager.add_column(ColumnSpec::new("mark").storage_type(StorageType::Int));
}

#[test]
fn test_create_database_refuses_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");

    let mut manager = TableManager::new();
    manager.create_database(&path, false).unwrap();
    assert_eq!(manager.state(), ManagerState::Open);
    stage_students(&mut manager);
    manager.create_table("STUDENTS").unwrap();
    manager.close().unwrap();
    assert!(path.exists());

    let err = manager.create_database(&path, false).unwrap_err();
    assert!(matches!(err, TableError::AlreadyExists(p) if p == path));
    assert_eq!(manager.state(), ManagerState::Closed);
}

#[test]
fn test_create_database_replace_discards_prior_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");

    let mut manager = TableManager::new();
    manager.create_database(&path, true).unwrap();
    stage_students(&mut manager);
    manager.create_table("STUDENTS").unwrap();
    assert!(manager.is_table("STUDENTS").unwrap());

    // Replacing the database that is currently open
    manager.create_database(&path, true).unwrap();
    assert!(!manager.is_table("STUDENTS").unwrap());
    assert!(manager.all_tables().unwrap().is_empty());
}

#[test]
fn test_open_invalid_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("test.db");

    let mut manager = TableManager::new();
    assert!(matches!(
        manager.open(&path),
        Err(TableError::StorageOpen { .. })
    ));
    assert_eq!(manager.state(), ManagerState::Unopened);
}

#[test]
fn test_end_to_end_students() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");

    let mut manager = TableManager::new();
    manager.create_database(&path, false).unwrap();
    stage_students(&mut manager);
    manager.create_table("STUDENTS").unwrap();

    assert_eq!(manager.get_primary_key("STUDENTS").unwrap(), "student_id");

    let record = Record::new()
        .with("student_id", "1010".to_string())
        .with("name", "ABC".to_string())
        .with("mark", 10i64);
    manager.add_record("STUDENTS", &record).unwrap();

    let found = manager
        .get_record("STUDENTS", "1010".to_string())
        .unwrap();
    assert_eq!(found, Some(record));

    assert_eq!(
        manager
            .delete_record("STUDENTS", "1010".to_string())
            .unwrap(),
        1
    );
    assert_eq!(
        manager
            .get_record("STUDENTS", "1010".to_string())
            .unwrap(),
        None
    );
    manager.close().unwrap();
}

#[test]
fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");

    let mut manager = TableManager::new();
    manager.create_database(&path, false).unwrap();
    stage_students(&mut manager);
    manager.create_table("STUDENTS").unwrap();
    manager
        .add_record(
            "STUDENTS",
            &Record::new()
                .with("student_id", "1".to_string())
                .with("name", "A".to_string()),
        )
        .unwrap();
    manager.close().unwrap();

    let records = manager
        .use_database(&path)
        .unwrap()
        .get_all_records("STUDENTS")
        .unwrap();
    assert_eq!(records.len(), 1);
    // Omitted fields come back as the engine's NULL, not as absent keys
    assert_eq!(records[0].get("mark"), Some(&Value::Null));
}

#[test]
fn test_use_database_switches_connection() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.db");
    let second = dir.path().join("second.db");

    let mut manager = TableManager::new();
    manager.create_database(&first, false).unwrap();
    stage_students(&mut manager);
    manager.create_table("STUDENTS").unwrap();

    assert!(manager
        .use_database(&second)
        .unwrap()
        .all_tables()
        .unwrap()
        .is_empty());
    assert_eq!(
        manager.use_database(&first).unwrap().all_tables().unwrap(),
        vec!["STUDENTS"]
    );
}

#[test]
fn test_closed_manager_rejects_operations() {
    let mut manager = TableManager::new();
    manager.open_in_memory().unwrap();
    manager.close().unwrap();

    assert!(matches!(manager.all_tables(), Err(TableError::NotConnected)));
    assert!(matches!(
        manager.create_table_from("T", &SchemaDraft::new().column(ColumnSpec::new("a"))),
        Err(TableError::NotConnected)
    ));
    assert!(matches!(manager.close(), Err(TableError::NotConnected)));
}

#[test]
fn test_round_trip_all_storage_types() {
    let mut manager = TableManager::new();
    manager.open_in_memory().unwrap();
    let draft = SchemaDraft::new()
        .column(ColumnSpec::new("id").storage_type(StorageType::Integer).primary_key())
        .column(ColumnSpec::new("label"))
        .column(ColumnSpec::new("score").storage_type(StorageType::Real))
        .column(ColumnSpec::new("payload").storage_type(StorageType::Blob));
    manager.create_table_from("samples", &draft).unwrap();

    let record = Record::new()
        .with("id", 7i64)
        .with("label", "seven".to_string())
        .with("score", 7.5f64)
        .with("payload", vec![0u8, 1, 2, 255]);
    manager.add_record("samples", &record).unwrap();

    assert_eq!(manager.get_record("samples", 7i64).unwrap(), Some(record));

    let by_blob = manager
        .filter_records(
            "samples",
            &Predicate::new().field("payload", vec![0u8, 1, 2, 255]),
        )
        .unwrap();
    assert_eq!(by_blob.len(), 1);
}

#[test]
fn test_type_mismatch_leaves_table_empty() {
    let mut manager = TableManager::new();
    manager.open_in_memory().unwrap();
    stage_students(&mut manager);
    manager.create_table("STUDENTS").unwrap();

    let err = manager
        .add_record(
            "STUDENTS",
            &Record::new()
                .with("student_id", 10i64)
                .with("name", "ABC".to_string())
                .with("mark", 10i64),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        TableError::TypeMismatch { ref column, expected: StorageType::Text, .. } if column == "student_id"
    ));
    assert!(manager.get_all_records("STUDENTS").unwrap().is_empty());
}

#[test]
fn test_unknown_column_in_record_and_predicate() {
    let mut manager = TableManager::new();
    manager.open_in_memory().unwrap();
    stage_students(&mut manager);
    manager.create_table("STUDENTS").unwrap();

    assert!(matches!(
        manager.add_record("STUDENTS", &Record::new().with("grade", 1i64)),
        Err(TableError::UnknownColumn { .. })
    ));
    assert!(matches!(
        manager.filter_records("STUDENTS", &Predicate::new().field("grade", 1i64)),
        Err(TableError::UnknownColumn { .. })
    ));
}

#[test]
fn test_legacy_predicate_from_pairs() {
    let mut manager = TableManager::new();
    manager.open_in_memory().unwrap();
    stage_students(&mut manager);
    manager.create_table("STUDENTS").unwrap();

    for (id, mark) in [("1", 90i64), ("2", 100), ("3", 110)] {
        manager
            .add_record(
                "STUDENTS",
                &Record::new()
                    .with("student_id", id.to_string())
                    .with("name", format!("student {}", id))
                    .with("mark", mark),
            )
            .unwrap();
    }

    let predicate: Predicate = vec![("mark", "!= 100".to_string())].into_iter().collect();
    let records = manager.filter_records("STUDENTS", &predicate).unwrap();
    assert_eq!(records.len(), 2);
}
