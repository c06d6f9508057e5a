//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserCredentials, UserPersistenceError, UserRepository};
use crate::domain::{DisplayName, EmailAddress, User, UserId};

use super::diesel_basic_error_mapping::{
    log_diesel_error, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewUserRow, UserCredentialsRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
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

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: DieselError) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn map_insert_error(error: DieselError, email: &str) -> UserPersistenceError {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            log_diesel_error(&error);
            UserPersistenceError::duplicate_email(email)
        }
        other => map_diesel_error(other),
    }
}

/// Convert a database row into a validated domain user.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let UserRow {
        id,
        display_name,
        email,
        avatar_url,
    } = row;
    let invalid = |err: &dyn std::fmt::Display| {
        UserPersistenceError::query(format!("invalid user row {id}: {err}"))
    };
    let display_name = DisplayName::new(display_name).map_err(|err| invalid(&err))?;
    let email = EmailAddress::parse(email).map_err(|err| invalid(&err))?;
    let user = User::new(UserId::from_uuid(id), display_name, email);
    match avatar_url {
        Some(url) => user.with_avatar_url(&url).map_err(|err| invalid(&err)),
        None => Ok(user),
    }
}

fn row_to_credentials(row: UserCredentialsRow) -> Result<UserCredentials, UserPersistenceError> {
    Ok(UserCredentials {
        user: row_to_user(row.user)?,
        password_hash: row.password_hash,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, record: &UserCredentials) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = &record.user;
        let new_row = NewUserRow {
            id: *user.id().as_uuid(),
            display_name: user.display_name().as_ref(),
            email: user.email().as_ref(),
            avatar_url: user.avatar_url(),
            password_hash: record.password_hash.as_deref(),
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_insert_error(err, user.email().as_ref()))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_emails(
        &self,
        emails: &[EmailAddress],
    ) -> Result<Vec<User>, UserPersistenceError> {
        if emails.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let wanted: Vec<&str> = emails.iter().map(AsRef::as_ref).collect();
        let rows = users::table
            .filter(users::email.eq_any(wanted))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserCredentialsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_credentials).transpose()
    }

    async fn find_credentials_by_id(
        &self,
        id: &UserId,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(*id.as_uuid())
            .select(UserCredentialsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_credentials).transpose()
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(*id.as_uuid()))
            .set((
                users::password_hash.eq(Some(password_hash)),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion and error mapping.
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    fn row(display_name: &str, email: &str, avatar_url: Option<&str>) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            display_name: display_name.to_owned(),
            email: email.to_owned(),
            avatar_url: avatar_url.map(str::to_owned),
        }
    }

    #[rstest]
    fn row_converts_to_domain_user() {
        let user = row_to_user(row("Ada Lovelace", "ada@gmail.com", Some("https://x.test/a.png")))
            .expect("valid row");
        assert_eq!(user.display_name().as_ref(), "Ada Lovelace");
        assert_eq!(user.avatar_url(), Some("https://x.test/a.png"));
    }

    #[rstest]
    #[case(row("", "ada@gmail.com", None))]
    #[case(row("Ada", "not-an-email", None))]
    #[case(row("Ada", "ada@gmail.com", Some("javascript:alert(1)")))]
    fn corrupt_rows_map_to_query_errors(#[case] bad: UserRow) {
        let err = row_to_user(bad).expect_err("invalid row");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    fn unique_violation_maps_to_duplicate_email() {
        let err = map_insert_error(
            DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                Box::new("duplicate key value violates unique constraint".to_owned()),
            ),
            "ada@gmail.com",
        );
        assert_eq!(err, UserPersistenceError::duplicate_email("ada@gmail.com"));
    }

    #[rstest]
    fn pool_error_maps_to_connection() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, UserPersistenceError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }
}
