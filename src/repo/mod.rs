//! Generic repository layer.
//!
//! Every entity implements [`Entity`], which ties it to its [`Schema`] and its
//! insert/patch payload types. Storage backends implement [`Repository`] for
//! each entity they hold; [`Repo`] wraps a backend with the write pipeline so
//! that validation and [`WriteHook`]s run on every create and update.

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::password::CredentialError;
use crate::schema::{Schema, ValidationError};

#[cfg(test)]
pub mod memory;
mod pipeline;

pub use pipeline::{Repo, WriteHook};

pub type Id = i32;

pub trait Entity: Clone + Send + Sync + 'static {
    /// Payload for an insert.
    type New: Send + 'static;
    /// Payload for a partial update; absent fields stay unchanged.
    type Patch: Send + 'static;

    const SCHEMA: &'static Schema;

    fn validate_new(new: &Self::New) -> Result<(), ValidationError>;
    fn validate_patch(patch: &Self::Patch) -> Result<(), ValidationError>;
}

#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn find_all(&self) -> Result<Vec<E>, RepoError>;

    async fn find_by_id(&self, id: Id) -> Result<Option<E>, RepoError>;

    async fn create(&self, new: E::New) -> Result<E, RepoError>;

    /// Returns `None` when no row has this id.
    async fn update(&self, id: Id, patch: E::Patch) -> Result<Option<E>, RepoError>;

    /// Returns the number of rows removed.
    async fn destroy(&self, id: Id) -> Result<u64, RepoError>;
}

#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{column} must be unique")]
    UniqueViolation { table: String, column: String },

    #[error("{column} does not reference an existing row")]
    ForeignKeyViolation { table: String, column: String },

    #[error("refusing to store an unhashed password")]
    UnhashedPassword,

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let table = db_err
                .try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
                .and_then(|pg| pg.table())
                .unwrap_or_default()
                .to_string();
            let column = db_err
                .constraint()
                .map(|c| constraint_column(c, &table))
                .unwrap_or_default();

            if db_err.is_unique_violation() {
                return RepoError::UniqueViolation { table, column };
            }
            if db_err.is_foreign_key_violation() {
                return RepoError::ForeignKeyViolation { table, column };
            }
        }
        RepoError::Database(err)
    }
}

/// Recovers the column from a Postgres default constraint name such as
/// `user_email_key` or `post_user_id_fkey`.
fn constraint_column(constraint: &str, table: &str) -> String {
    let name = constraint
        .strip_prefix(table)
        .and_then(|rest| rest.strip_prefix('_'))
        .unwrap_or(constraint);
    let name = name
        .strip_suffix("_fkey")
        .or_else(|| name.strip_suffix("_key"))
        .unwrap_or(name);
    name.to_string()
}
