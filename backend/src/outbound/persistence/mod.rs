//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories here translate between Diesel rows and domain types and map
//! database failures onto the port error enums. Row structs and the schema
//! stay private to this module.
//!
//! # Example
//!
//! ```no_run
//! use courier::outbound::persistence::{
//!     DbPool, DieselMessageRepository, DieselUserRepository, PoolConfig,
//! };
//!
//! # async fn wire() -> Result<(), courier::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/courier")).await?;
//! let users = DieselUserRepository::new(pool.clone());
//! let messages = DieselMessageRepository::new(pool);
//! # let _ = (users, messages);
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_message_repository;
mod diesel_password_reset_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_message_repository::DieselMessageRepository;
pub use diesel_password_reset_repository::DieselPasswordResetRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
