use rusqlite::Connection;
use users_core::db::migrations::{current_user_version, latest_version};
use users_core::db::open_db_in_memory;
use users_core::{
    AppConfig, CreateUserArgs, DeleteUserArgs, GetUserArgs, RepoError, SqliteUserClient,
    UpdateUserArgs, User, UserCreateInput, UserUpdateInput, UserWhereUniqueInput, UsersModule,
    UsersRepository,
};
use uuid::Uuid;

fn create(repo: &UsersRepository<SqliteUserClient<'_>>, email: &str, name: Option<&str>) -> User {
    let mut data = UserCreateInput::new(email);
    data.name = name.map(str::to_string);
    repo.create_user(CreateUserArgs { data }).unwrap()
}

#[test]
fn create_assigns_id_and_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let repo = UsersRepository::new(SqliteUserClient::try_new(&conn).unwrap());

    let created = create(&repo, "a@x.com", Some("Alice"));

    assert!(!created.id.is_nil());
    assert_eq!(created.email, "a@x.com");
    assert_eq!(created.name.as_deref(), Some("Alice"));
    assert!(created.created_at > 0);
    assert_eq!(created.updated_at, created.created_at);
}

#[test]
fn create_then_get_by_id_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = UsersRepository::new(SqliteUserClient::try_new(&conn).unwrap());

    let created = create(&repo, "round@x.com", None);
    let loaded = repo
        .get_user(GetUserArgs {
            filter: UserWhereUniqueInput::Id(created.id),
        })
        .unwrap()
        .unwrap();

    assert_eq!(loaded, created);
}

#[test]
fn get_by_email_finds_the_same_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = UsersRepository::new(SqliteUserClient::try_new(&conn).unwrap());

    let created = create(&repo, "mail@x.com", Some("Mail"));
    let loaded = repo
        .get_user(GetUserArgs {
            filter: UserWhereUniqueInput::Email("mail@x.com".to_string()),
        })
        .unwrap();

    assert_eq!(loaded, Some(created));
}

#[test]
fn get_missing_user_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = UsersRepository::new(SqliteUserClient::try_new(&conn).unwrap());

    let by_id = repo
        .get_user(GetUserArgs {
            filter: UserWhereUniqueInput::Id(Uuid::new_v4()),
        })
        .unwrap();
    let by_email = repo
        .get_user(GetUserArgs {
            filter: UserWhereUniqueInput::Email("nobody@x.com".to_string()),
        })
        .unwrap();

    assert!(by_id.is_none());
    assert!(by_email.is_none());
}

#[test]
fn duplicate_email_is_a_unique_constraint_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = UsersRepository::new(SqliteUserClient::try_new(&conn).unwrap());

    create(&repo, "dup@x.com", None);
    let err = repo
        .create_user(CreateUserArgs {
            data: UserCreateInput::new("dup@x.com").with_name("Second"),
        })
        .unwrap_err();

    assert!(matches!(err, RepoError::UniqueConstraint { ref field } if field == "email"));
}

#[test]
fn update_changes_only_given_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = UsersRepository::new(SqliteUserClient::try_new(&conn).unwrap());

    let created = create(&repo, "before@x.com", Some("Before"));
    let updated = repo
        .update_user(UpdateUserArgs {
            filter: UserWhereUniqueInput::Id(created.id),
            data: UserUpdateInput {
                email: Some("after@x.com".to_string()),
                ..UserUpdateInput::default()
            },
        })
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.email, "after@x.com");
    assert_eq!(updated.name.as_deref(), Some("Before"));
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    let reloaded = repo
        .get_user(GetUserArgs {
            filter: UserWhereUniqueInput::Id(created.id),
        })
        .unwrap();
    assert_eq!(reloaded, Some(updated));
}

#[test]
fn update_can_clear_name_by_email_filter() {
    let conn = open_db_in_memory().unwrap();
    let repo = UsersRepository::new(SqliteUserClient::try_new(&conn).unwrap());

    create(&repo, "named@x.com", Some("Named"));
    let updated = repo
        .update_user(UpdateUserArgs {
            filter: UserWhereUniqueInput::Email("named@x.com".to_string()),
            data: UserUpdateInput {
                name: Some(None),
                ..UserUpdateInput::default()
            },
        })
        .unwrap();

    assert_eq!(updated.name, None);
}

#[test]
fn empty_update_returns_unchanged_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = UsersRepository::new(SqliteUserClient::try_new(&conn).unwrap());

    let created = create(&repo, "same@x.com", Some("Same"));
    let data = UserUpdateInput::default();
    assert!(data.is_empty());

    let updated = repo
        .update_user(UpdateUserArgs {
            filter: UserWhereUniqueInput::Id(created.id),
            data,
        })
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.email, created.email);
    assert_eq!(updated.name, created.name);
    assert!(updated.updated_at >= created.updated_at);
}

#[test]
fn update_to_taken_email_is_a_unique_constraint_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = UsersRepository::new(SqliteUserClient::try_new(&conn).unwrap());

    create(&repo, "one@x.com", None);
    let second = create(&repo, "two@x.com", None);

    let err = repo
        .update_user(UpdateUserArgs {
            filter: UserWhereUniqueInput::Id(second.id),
            data: UserUpdateInput {
                email: Some("one@x.com".to_string()),
                ..UserUpdateInput::default()
            },
        })
        .unwrap_err();

    assert!(matches!(err, RepoError::UniqueConstraint { .. }));
}

#[test]
fn update_missing_user_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = UsersRepository::new(SqliteUserClient::try_new(&conn).unwrap());

    let missing = Uuid::new_v4();
    let err = repo
        .update_user(UpdateUserArgs {
            filter: UserWhereUniqueInput::Id(missing),
            data: UserUpdateInput {
                name: Some(Some("Ghost".to_string())),
                ..UserUpdateInput::default()
            },
        })
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains(&missing.to_string()));
}

#[test]
fn delete_missing_user_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = UsersRepository::new(SqliteUserClient::try_new(&conn).unwrap());

    let err = repo
        .delete_user(DeleteUserArgs {
            filter: UserWhereUniqueInput::Email("ghost@x.com".to_string()),
        })
        .unwrap_err();

    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn create_delete_get_scenario() {
    let conn = open_db_in_memory().unwrap();
    let repo = UsersRepository::new(SqliteUserClient::try_new(&conn).unwrap());

    let created = repo
        .create_user(CreateUserArgs {
            data: UserCreateInput::new("a@x.com").with_name("Alice"),
        })
        .unwrap();
    assert_eq!(created.name.as_deref(), Some("Alice"));
    assert_eq!(created.email, "a@x.com");

    let deleted = repo
        .delete_user(DeleteUserArgs {
            filter: UserWhereUniqueInput::Id(created.id),
        })
        .unwrap();
    assert_eq!(deleted, created);

    let after = repo
        .get_user(GetUserArgs {
            filter: UserWhereUniqueInput::Id(created.id),
        })
        .unwrap();
    assert!(after.is_none());

    let err = repo
        .delete_user(DeleteUserArgs {
            filter: UserWhereUniqueInput::Id(created.id),
        })
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn client_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteUserClient::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn client_rejects_connection_without_users_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteUserClient::try_new(&conn);
    assert!(matches!(result, Err(RepoError::MissingRequiredTable("users"))));
}

#[test]
fn client_rejects_users_table_missing_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE users (
            id TEXT PRIMARY KEY NOT NULL,
            email TEXT NOT NULL UNIQUE,
            name TEXT
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteUserClient::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "users",
            column: "created_at"
        })
    ));
}

#[test]
fn corrupt_id_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO users (id, email) VALUES ('not-a-uuid', 'bad@x.com');",
        [],
    )
    .unwrap();
    let repo = UsersRepository::new(SqliteUserClient::try_new(&conn).unwrap());

    let err = repo
        .get_user(GetUserArgs {
            filter: UserWhereUniqueInput::Email("bad@x.com".to_string()),
        })
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn module_composes_file_backed_repository() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::default().with_db_path(dir.path().join("users.sqlite3"));

    let created = {
        let module = UsersModule::open(&config).unwrap();
        let repo = module.users_repository().unwrap();
        create(&repo, "persist@x.com", Some("Persist"))
    };

    let module = UsersModule::open(&config).unwrap();
    let stored: i64 = module
        .connection()
        .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, 1);
    assert_eq!(
        current_user_version(module.connection()).unwrap(),
        latest_version()
    );

    let repo = module.users_repository().unwrap();
    let loaded = repo
        .get_user(GetUserArgs {
            filter: UserWhereUniqueInput::Id(created.id),
        })
        .unwrap();
    assert_eq!(loaded, Some(created));
}

#[test]
fn module_from_raw_connection_checks_readiness_lazily() {
    let module = UsersModule::from_connection(Connection::open_in_memory().unwrap());
    let result = module.users_repository();
    assert!(matches!(
        result,
        Err(RepoError::UninitializedConnection { .. })
    ));
}
