//! Storage context for `Person` rows.
//!
//! A [`PeopleStore`] is created once at startup and shared. Each request opens
//! its own [`PeopleContext`], stages rows with `add`, and commits them with
//! `save_changes`. Dropping the context discards anything still staged.

use std::sync::Arc;

use people_core::{Person, ValidPerson};
use thiserror::Error;

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryPeopleContext, InMemoryPeopleStore};
pub use postgres::{PgPeopleContext, PgPeopleStore};

/// Failure while reading or committing rows.
///
/// The `Display` text is what callers see, so it carries the driver message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The store could not be reached (connectivity loss, closed pool).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The database rejected the row.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(String),
}

/// Shared factory for per-request storage contexts.
pub trait PeopleStore: Send + Sync {
    /// Open a fresh, empty unit of work.
    fn context(&self) -> Box<dyn PeopleContext>;
}

impl<S> PeopleStore for Arc<S>
where
    S: PeopleStore + ?Sized,
{
    fn context(&self) -> Box<dyn PeopleContext> {
        (**self).context()
    }
}

/// A per-request unit of work over the `people` table.
#[async_trait::async_trait]
pub trait PeopleContext: Send + Sync {
    /// Stage a row for insertion. No IO happens until `save_changes`.
    fn add(&mut self, person: ValidPerson);

    /// Number of rows staged and not yet committed.
    fn pending(&self) -> usize;

    /// Commit every staged row atomically.
    ///
    /// Returns the stored rows, with generated ids, in staging order. The
    /// staging area is empty afterwards whether or not the commit succeeded.
    async fn save_changes(&mut self) -> Result<Vec<Person>, PersistenceError>;

    /// All committed rows, ordered by id.
    async fn find_all(&self) -> Result<Vec<Person>, PersistenceError>;

    /// Committed rows matching `predicate`, ordered by id.
    async fn find_by(
        &self,
        predicate: &(dyn for<'p> Fn(&'p Person) -> bool + Sync),
    ) -> Result<Vec<Person>, PersistenceError> {
        let all = self.find_all().await?;
        Ok(all.into_iter().filter(|p| predicate(p)).collect())
    }
}
