//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Every method renders its statement before running it so that a failure can
//! be reported together with the SQL that caused it.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use diesel_async::RunQueryDsl;
use tracing::{debug, warn};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{ExtraColumn, NewUser, User, UserChanges, UserId, UserRecord};

use super::models::{NewUserRow, UserChangeset, UserRecordRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;
use super::statement::statement_text;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError, sql: String) -> UserPersistenceError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    warn!(%message, "no user store connection available");
    UserPersistenceError::connection(message, sql)
}

/// Map Diesel errors to user persistence errors, keeping the store's message.
fn map_diesel_error(error: diesel::result::Error, sql: String) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %sql, "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            %sql,
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            UserPersistenceError::duplicate_email(info.message(), sql)
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            UserPersistenceError::connection(info.message(), sql)
        }
        DieselError::DatabaseError(_, info) => UserPersistenceError::query(info.message(), sql),
        other => UserPersistenceError::query(other.to_string(), sql),
    }
}

/// Row returned by the hand-built insert.
#[derive(QueryableByName)]
struct InsertedId {
    #[diesel(sql_type = BigInt)]
    id: i64,
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `INSERT` naming the submitted extra columns after the known ones.
///
/// Column names are quoted identifiers; values are bound as text, so the
/// store rejects columns that do not exist or do not accept text.
fn insert_with_extra_columns_sql(extra: &[ExtraColumn]) -> String {
    let mut columns = vec![
        quote_identifier("email"),
        quote_identifier("name"),
        quote_identifier("password"),
    ];
    columns.extend(extra.iter().map(|column| quote_identifier(&column.name)));
    let placeholders: Vec<String> = (1..=columns.len()).map(|n| format!("${n}")).collect();
    format!(
        r#"INSERT INTO "users" ({}) VALUES ({}) RETURNING "users"."id""#,
        columns.join(", "),
        placeholders.join(", ")
    )
}

impl DieselUserRepository {
    async fn insert_with_extra_columns(
        &self,
        user: &NewUser,
    ) -> Result<UserId, UserPersistenceError> {
        let sql = insert_with_extra_columns_sql(&user.extra);

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, sql.clone()))?;

        let mut query = diesel::sql_query(sql.clone())
            .into_boxed::<Pg>()
            .bind::<Text, _>(user.email.as_ref().to_owned())
            .bind::<Text, _>(user.name.as_ref().to_owned())
            .bind::<Text, _>(user.password.expose().to_owned());
        for column in &user.extra {
            query = query.bind::<Text, _>(column.value.clone());
        }

        let inserted: InsertedId = query
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, sql))?;

        Ok(UserId::new(inserted.id))
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list(&self) -> Result<Vec<UserRecord>, UserPersistenceError> {
        let statement = users::table
            .select(UserRecordRow::as_select())
            .order(users::id.asc());
        let sql = statement_text(&statement);

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, sql.clone()))?;

        let rows: Vec<UserRecordRow> = statement
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, sql))?;

        Ok(rows.into_iter().map(UserRecord::from).collect())
    }

    async fn insert(&self, user: &NewUser) -> Result<UserId, UserPersistenceError> {
        if !user.extra.is_empty() {
            return self.insert_with_extra_columns(user).await;
        }

        let statement = diesel::insert_into(users::table)
            .values(NewUserRow::from(user))
            .returning(users::id);
        let sql = statement_text(&statement);

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, sql.clone()))?;

        let id: i64 = statement
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, sql))?;

        Ok(UserId::new(id))
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<u64, UserPersistenceError> {
        if changes.is_empty() {
            return Err(UserPersistenceError::query(
                "update sets no columns",
                String::new(),
            ));
        }

        let statement =
            diesel::update(users::table.find(id.get())).set(UserChangeset::from(changes));
        let sql = statement_text(&statement);

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, sql.clone()))?;

        let touched = statement
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, sql))?;

        Ok(u64::try_from(touched).unwrap_or(u64::MAX))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let statement = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .limit(1);
        let sql = statement_text(&statement);

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, sql.clone()))?;

        let row: Option<UserRow> = statement
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, sql))?;

        Ok(row.map(User::from))
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for error mapping; store round trips live in `tests/`.
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    const SQL: &str = r#"INSERT INTO "users" ("email", "name", "password") VALUES ($1, $2, $3)"#;

    fn database_error(kind: DatabaseErrorKind, message: &str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(message.to_owned()))
    }

    #[rstest]
    fn unique_violation_maps_to_duplicate_email() {
        let err = map_diesel_error(
            database_error(
                DatabaseErrorKind::UniqueViolation,
                r#"duplicate key value violates unique constraint "users_email_key""#,
            ),
            SQL.to_owned(),
        );

        assert!(matches!(err, UserPersistenceError::DuplicateEmail { .. }));
        assert!(err.message().contains("users_email_key"));
        assert_eq!(err.sql(), SQL);
    }

    #[rstest]
    fn closed_connection_maps_to_connection_error() {
        let err = map_diesel_error(
            database_error(DatabaseErrorKind::ClosedConnection, "server closed the connection"),
            SQL.to_owned(),
        );

        assert!(matches!(err, UserPersistenceError::Connection { .. }));
        assert_eq!(err.message(), "server closed the connection");
    }

    #[rstest]
    #[case(DatabaseErrorKind::NotNullViolation, "null value in column \"name\"")]
    #[case(DatabaseErrorKind::Unknown, "relation \"users\" does not exist")]
    fn other_database_errors_keep_the_store_message(
        #[case] kind: DatabaseErrorKind,
        #[case] message: &str,
    ) {
        let err = map_diesel_error(database_error(kind, message), SQL.to_owned());

        assert!(matches!(err, UserPersistenceError::Query { .. }));
        assert_eq!(err.message(), message);
        assert_eq!(err.sql(), SQL);
    }

    #[rstest]
    fn non_database_errors_use_their_display_text() {
        let err = map_diesel_error(DieselError::NotFound, SQL.to_owned());

        assert!(matches!(err, UserPersistenceError::Query { .. }));
        assert_eq!(err.message(), DieselError::NotFound.to_string());
    }

    #[rstest]
    fn extra_columns_follow_the_known_ones() {
        let extra = [ExtraColumn::new("role", "admin"), ExtraColumn::new("team", "x")];

        assert_eq!(
            insert_with_extra_columns_sql(&extra),
            r#"INSERT INTO "users" ("email", "name", "password", "role", "team") VALUES ($1, $2, $3, $4, $5) RETURNING "users"."id""#
        );
    }

    #[rstest]
    fn extra_column_names_are_quoted_identifiers() {
        let extra = [ExtraColumn::new(r#"x") VALUES ('1'); --"#, "v")];

        let sql = insert_with_extra_columns_sql(&extra);

        assert!(
            sql.contains(r#", "x"") VALUES ('1'); --") VALUES"#),
            "unexpected sql: {sql}"
        );
    }

    #[rstest]
    fn pool_errors_become_connection_errors_with_the_statement() {
        let err = map_pool_error(PoolError::checkout("timed out"), SQL.to_owned());

        assert_eq!(err, UserPersistenceError::connection("timed out", SQL));
    }
}
