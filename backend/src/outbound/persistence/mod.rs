//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! The adapter implements the domain's `UserRepository` port over the
//! `users` table, with async support through `diesel-async` and `bb8`
//! connection pooling.
//!
//! - Diesel row structs (`models.rs`) and schema definitions (`schema.rs`)
//!   stay internal to this module.
//! - Store failures surface as `UserPersistenceError`, carrying both the
//!   store's message and the statement text.
//! - Schema migrations are embedded and applied at startup.
//!
//! # Example
//!
//! ```ignore
//! use users_api::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/users")).await?;
//! let repo = DieselUserRepository::new(pool);
//! ```

mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;
mod statement;

pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
