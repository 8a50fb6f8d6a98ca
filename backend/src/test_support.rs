//! Test utilities for the users API crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`). Only
//! compiled for tests or with the `test-support` feature.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{NewUser, User, UserChanges, UserId, UserRecord};

/// Statement text reported for the list query.
pub const LIST_SQL: &str = r#"SELECT "users"."id", "users"."email", "users"."name", "users"."password" FROM "users" ORDER BY "users"."id" ASC"#;
const INSERT_SQL: &str = r#"INSERT INTO "users" ("email", "name", "password") VALUES ($1, $2, $3) RETURNING "users"."id""#;
const UPDATE_SQL: &str = r#"UPDATE "users" SET ... WHERE ("users"."id" = $1)"#;
/// Statement text reported for the read-back lookup.
pub const FIND_SQL: &str = r#"SELECT "users"."id", "users"."email", "users"."name" FROM "users" WHERE ("users"."id" = $1) LIMIT $2"#;
const DUPLICATE_MESSAGE: &str =
    r#"duplicate key value violates unique constraint "users_email_key""#;

#[derive(Default)]
struct Store {
    rows: Vec<UserRecord>,
    last_id: i64,
    next_failure: Option<UserPersistenceError>,
}

impl Store {
    fn take_failure(&mut self) -> Result<(), UserPersistenceError> {
        match self.next_failure.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.rows
            .iter()
            .any(|row| row.email == email && Some(row.id) != except)
    }
}

/// In-memory `UserRepository` behaving like the `users` table.
///
/// Ids are assigned sequentially from 1 and emails are unique, so duplicate
/// writes fail with [`UserPersistenceError::DuplicateEmail`] just as the
/// PostgreSQL constraint would.
///
/// # Examples
/// ```
/// use users_api::domain::ports::UserRepository;
/// use users_api::test_support::InMemoryUserRepository;
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let repo = InMemoryUserRepository::default();
/// assert!(repo.list().await.expect("list succeeds").is_empty());
/// # });
/// ```
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: Mutex<Store>,
}

impl InMemoryUserRepository {
    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next repository call fail with `error`.
    pub fn fail_next(&self, error: UserPersistenceError) {
        self.lock().next_failure = Some(error);
    }

    /// Every stored row, in id order.
    pub fn rows(&self) -> Vec<UserRecord> {
        self.lock().rows.clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> Result<Vec<UserRecord>, UserPersistenceError> {
        let mut store = self.lock();
        store.take_failure()?;
        Ok(store.rows.clone())
    }

    async fn insert(&self, user: &NewUser) -> Result<UserId, UserPersistenceError> {
        let mut store = self.lock();
        store.take_failure()?;
        // The table has no columns beyond the three known ones.
        if let Some(column) = user.extra.first() {
            let extra: Vec<String> = user
                .extra
                .iter()
                .map(|column| format!(r#", "{}""#, column.name))
                .collect();
            return Err(UserPersistenceError::query(
                format!(r#"column "{}" of relation "users" does not exist"#, column.name),
                format!(
                    r#"INSERT INTO "users" ("email", "name", "password"{}) VALUES (...) RETURNING "users"."id""#,
                    extra.concat()
                ),
            ));
        }
        if store.email_taken(user.email.as_ref(), None) {
            return Err(UserPersistenceError::duplicate_email(
                DUPLICATE_MESSAGE,
                INSERT_SQL,
            ));
        }
        store.last_id += 1;
        let id = UserId::new(store.last_id);
        store.rows.push(UserRecord {
            id,
            email: user.email.as_ref().to_owned(),
            name: user.name.as_ref().to_owned(),
            password: user.password.expose().to_owned(),
        });
        Ok(id)
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<u64, UserPersistenceError> {
        let mut store = self.lock();
        store.take_failure()?;
        if changes.is_empty() {
            return Err(UserPersistenceError::query(
                "update sets no columns",
                UPDATE_SQL,
            ));
        }
        let collides = changes
            .email
            .as_ref()
            .is_some_and(|email| store.email_taken(email.as_ref(), Some(id)));
        if collides {
            return Err(UserPersistenceError::duplicate_email(
                DUPLICATE_MESSAGE,
                UPDATE_SQL,
            ));
        }
        let Some(row) = store.rows.iter_mut().find(|row| row.id == id) else {
            return Ok(0);
        };
        if let Some(email) = &changes.email {
            row.email = email.as_ref().to_owned();
        }
        if let Some(name) = &changes.name {
            row.name = name.as_ref().to_owned();
        }
        if let Some(password) = &changes.password {
            row.password = password.expose().to_owned();
        }
        Ok(1)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut store = self.lock();
        store.take_failure()?;
        Ok(store
            .rows
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .map(User::from))
    }
}
