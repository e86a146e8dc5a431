//! User-record persistence.
//!
//! The auth flow only needs two operations, lookup by username and insert,
//! expressed by [`UserStore`]. `DbOperations` backs it with Postgres and
//! `MemoryUserStore` keeps records in process.

pub mod memory;
pub mod models;
pub mod operations;

use async_trait::async_trait;

use crate::error::AppError;

pub use memory::MemoryUserStore;
pub use models::User;
pub use operations::DbOperations;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Persists a new record. Uniqueness of username and email is enforced here.
    async fn save(&self, user: &User) -> Result<(), AppError>;
}
