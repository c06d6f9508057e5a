//! PostgreSQL-backed `PasswordResetRepository` using Diesel ORM.
//!
//! Each account holds at most one token row. Redeeming deletes the row and
//! installs the new credential hash in one transaction, so a token can never
//! be spent twice.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::UserId;
use crate::domain::ports::{
    PasswordResetPersistenceError, PasswordResetRepository, ResetTokenRecord,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NewResetTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::{password_reset_tokens, users};

/// Diesel-backed implementation of the password reset repository port.
#[derive(Clone)]
pub struct DieselPasswordResetRepository {
    pool: DbPool,
}

impl DieselPasswordResetRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PasswordResetPersistenceError {
    map_basic_pool_error(error, PasswordResetPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PasswordResetPersistenceError {
    map_basic_diesel_error(
        error,
        PasswordResetPersistenceError::query,
        PasswordResetPersistenceError::connection,
    )
}

#[async_trait]
impl PasswordResetRepository for DieselPasswordResetRepository {
    async fn replace(&self, record: &ResetTokenRecord) -> Result<(), PasswordResetPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewResetTokenRow {
            user_id: *record.user_id.as_uuid(),
            token_hash: &record.token_hash,
            expires_at: record.expires_at,
        };
        diesel::insert_into(password_reset_tokens::table)
            .values(&row)
            .on_conflict(password_reset_tokens::user_id)
            .do_update()
            .set((
                password_reset_tokens::token_hash.eq(excluded(password_reset_tokens::token_hash)),
                password_reset_tokens::expires_at.eq(excluded(password_reset_tokens::expires_at)),
                password_reset_tokens::created_at.eq(excluded(password_reset_tokens::created_at)),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn redeem(
        &self,
        user_id: &UserId,
        token_hash: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<bool, PasswordResetPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_id = *user_id.as_uuid();
        let token_hash = token_hash.to_owned();
        let password_hash = password_hash.to_owned();

        conn.transaction(|conn| {
            async move {
                let consumed = diesel::delete(
                    password_reset_tokens::table
                        .filter(password_reset_tokens::user_id.eq(user_id))
                        .filter(password_reset_tokens::token_hash.eq(token_hash))
                        .filter(password_reset_tokens::expires_at.gt(now)),
                )
                .execute(conn)
                .await?;
                if consumed == 0 {
                    return Ok(false);
                }

                let updated = diesel::update(users::table.find(user_id))
                    .set((
                        users::password_hash.eq(Some(password_hash)),
                        users::updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(conn)
                    .await?;
                if updated == 0 {
                    // Rolls the token deletion back.
                    return Err(diesel::result::Error::RollbackTransaction);
                }
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
