//! Contract tests for `DieselUserRepository` against embedded PostgreSQL.
//!
//! Each test runs in its own database cloned from the migrated template. The
//! cluster is bootstrapped synchronously, so tests drive the async repository
//! through a runtime they own rather than `#[tokio::test]`.

use std::future::Future;

use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use users_api::domain::ports::{UserPersistenceError, UserRepository};
use users_api::domain::{ExtraColumn, NewUser, UserChanges, UserFields, UserId};
use users_api::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};

mod support;

use support::{handle_cluster_setup_failure, provision_template_database, shared_cluster};

struct TestDb {
    runtime: Runtime,
    repo: DieselUserRepository,
    _database: TemporaryDatabase,
}

impl TestDb {
    fn run<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

fn setup_test_db() -> Result<TestDb, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = provision_template_database(cluster)?;
    let pool = runtime
        .block_on(DbPool::new(PoolConfig::new(database.url())))
        .map_err(|err| err.to_string())?;

    Ok(TestDb {
        runtime,
        repo: DieselUserRepository::new(pool),
        _database: database,
    })
}

#[fixture]
fn db() -> Option<TestDb> {
    match setup_test_db() {
        Ok(db) => Some(db),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn new_user(email: &str) -> NewUser {
    NewUser::try_from_fields(&UserFields {
        email: Some(email.to_owned()),
        password: Some("longenough".to_owned()),
        name: Some("Al".to_owned()),
        extra: Vec::new(),
    })
    .expect("valid user")
}

fn changes(fields: UserFields) -> UserChanges {
    UserChanges::try_from_fields(&fields).expect("valid changes")
}

#[rstest]
fn insert_then_find_returns_the_public_view(db: Option<TestDb>) {
    let Some(db) = db else {
        return;
    };

    let id = db.run(db.repo.insert(&new_user("a@b.com"))).expect("insert");
    let user = db
        .run(db.repo.find_by_id(id))
        .expect("find")
        .expect("row exists");

    assert_eq!(user.id, id);
    assert_eq!(user.email, "a@b.com");
    assert_eq!(user.name, "Al");
}

#[rstest]
fn list_returns_every_row_with_its_password_in_id_order(db: Option<TestDb>) {
    let Some(db) = db else {
        return;
    };
    let first = db.run(db.repo.insert(&new_user("a@b.com"))).expect("insert");
    let second = db.run(db.repo.insert(&new_user("c@d.com"))).expect("insert");

    let rows = db.run(db.repo.list()).expect("list");

    let ids: Vec<UserId> = rows.iter().map(|row| row.id).collect();
    assert_eq!(ids, vec![first, second]);
    assert!(rows.iter().all(|row| row.password == "longenough"));
}

#[rstest]
fn duplicate_insert_reports_the_statement(db: Option<TestDb>) {
    let Some(db) = db else {
        return;
    };
    db.run(db.repo.insert(&new_user("a@b.com")))
        .expect("first insert");

    let err = db
        .run(db.repo.insert(&new_user("a@b.com")))
        .expect_err("duplicate email");

    let UserPersistenceError::DuplicateEmail { message, sql } = err else {
        panic!("expected duplicate email, got {err:?}");
    };
    assert!(message.contains("users_email_key"), "message: {message}");
    assert!(sql.starts_with(r#"INSERT INTO "users""#), "sql: {sql}");
    assert!(!sql.contains("longenough"), "password leaked: {sql}");
}

#[rstest]
fn unknown_extra_columns_fail_the_insert(db: Option<TestDb>) {
    let Some(db) = db else {
        return;
    };
    let mut user = new_user("a@b.com");
    user.extra = vec![ExtraColumn::new("role", "admin")];

    let err = db.run(db.repo.insert(&user)).expect_err("unknown column");

    let UserPersistenceError::Query { message, sql } = err else {
        panic!("expected query error, got {err:?}");
    };
    assert!(message.contains(r#"column "role""#), "message: {message}");
    assert!(sql.contains(r#""role""#), "sql: {sql}");
    assert!(!sql.contains("longenough"), "password leaked: {sql}");
    assert!(db.run(db.repo.list()).expect("list").is_empty());
}

#[rstest]
fn update_sets_only_present_fields(db: Option<TestDb>) {
    let Some(db) = db else {
        return;
    };
    let id = db.run(db.repo.insert(&new_user("a@b.com"))).expect("insert");

    let touched = db
        .run(db.repo.update(
            id,
            &changes(UserFields {
                name: Some("Ale".to_owned()),
                ..UserFields::default()
            }),
        ))
        .expect("update");
    let rows = db.run(db.repo.list()).expect("list");

    assert_eq!(touched, 1);
    let row = rows.first().expect("stored row");
    assert_eq!(row.name, "Ale");
    assert_eq!(row.email, "a@b.com");
    assert_eq!(row.password, "longenough");
}

#[rstest]
fn update_to_a_taken_email_is_a_duplicate(db: Option<TestDb>) {
    let Some(db) = db else {
        return;
    };
    db.run(db.repo.insert(&new_user("taken@b.com")))
        .expect("insert");
    let id = db.run(db.repo.insert(&new_user("a@b.com"))).expect("insert");

    let err = db
        .run(db.repo.update(
            id,
            &changes(UserFields {
                email: Some("taken@b.com".to_owned()),
                ..UserFields::default()
            }),
        ))
        .expect_err("email collision");

    assert!(matches!(err, UserPersistenceError::DuplicateEmail { .. }));
    assert!(err.sql().starts_with(r#"UPDATE "users""#), "sql: {}", err.sql());
}

#[rstest]
fn missing_rows_are_absent_not_errors(db: Option<TestDb>) {
    let Some(db) = db else {
        return;
    };
    let missing = UserId::new(i64::MAX);

    let touched = db
        .run(db.repo.update(
            missing,
            &changes(UserFields {
                name: Some("Ghost".to_owned()),
                ..UserFields::default()
            }),
        ))
        .expect("update");

    assert_eq!(touched, 0);
    assert_eq!(db.run(db.repo.find_by_id(missing)).expect("find"), None);
}
