//! Postgres-backed people store.
//!
//! ## Connection scoping
//!
//! A [`PgPeopleContext`] owns no connection between calls. Each call borrows
//! one from the pool (or opens a transaction) and the guard returns it on every
//! exit path, including errors. A transaction dropped without `commit` rolls
//! back.
//!
//! ## Error mapping
//!
//! | SQLx error | SQLSTATE | `PersistenceError` |
//! |------------|----------|--------------------|
//! | Database | class `23` (integrity) or `22001` (string too long) | `Constraint` |
//! | Database | anything else | `Database` |
//! | PoolClosed, PoolTimedOut, Io, Tls | n/a | `Unavailable` |
//! | Other | n/a | `Database` |

use people_core::{Person, PersonId, ValidPerson};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{Span, instrument};

use super::{PeopleContext, PeopleStore, PersistenceError};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS people (
    id         SERIAL PRIMARY KEY,
    first_name VARCHAR(30) NOT NULL,
    last_name  VARCHAR(30) NOT NULL
)
"#;

/// Postgres people store. Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct PgPeopleStore {
    pool: PgPool,
}

impl PgPeopleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a pool for `database_url`.
    ///
    /// Uses the driver's default pool size and timeouts.
    #[instrument(skip_all, err)]
    pub async fn connect(database_url: &str) -> Result<Self, PersistenceError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `people` table if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), PersistenceError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl PeopleStore for PgPeopleStore {
    fn context(&self) -> Box<dyn PeopleContext> {
        Box::new(PgPeopleContext {
            pool: self.pool.clone(),
            staged: Vec::new(),
        })
    }
}

/// Unit of work over the `people` table.
#[derive(Debug)]
pub struct PgPeopleContext {
    pool: PgPool,
    staged: Vec<ValidPerson>,
}

#[async_trait::async_trait]
impl PeopleContext for PgPeopleContext {
    fn add(&mut self, person: ValidPerson) {
        self.staged.push(person);
    }

    fn pending(&self) -> usize {
        self.staged.len()
    }

    #[instrument(skip(self), fields(rows), err)]
    async fn save_changes(&mut self) -> Result<Vec<Person>, PersistenceError> {
        let staged = std::mem::take(&mut self.staged);
        if staged.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("save_changes", e))?;

        let mut saved = Vec::with_capacity(staged.len());
        for person in staged {
            let row = sqlx::query(
                r#"
                INSERT INTO people (first_name, last_name)
                VALUES ($1, $2)
                RETURNING id
                "#,
            )
            .bind(person.first_name())
            .bind(person.last_name())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("save_changes", e))?;

            let id: i32 = row
                .try_get("id")
                .map_err(|e| map_sqlx_error("save_changes", e))?;
            saved.push(person.into_person(PersonId::new(id)));
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("save_changes", e))?;

        Span::current().record("rows", saved.len());
        Ok(saved)
    }

    #[instrument(skip(self), err)]
    async fn find_all(&self) -> Result<Vec<Person>, PersistenceError> {
        let rows = sqlx::query(
            r#"
            SELECT id, first_name, last_name
            FROM people
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_all", e))?;

        rows.iter().map(row_to_person).collect()
    }
}

fn row_to_person(row: &PgRow) -> Result<Person, PersistenceError> {
    let id: i32 = row
        .try_get("id")
        .map_err(|e| map_sqlx_error("decode_person", e))?;
    let first_name: String = row
        .try_get("first_name")
        .map_err(|e| map_sqlx_error("decode_person", e))?;
    let last_name: String = row
        .try_get("last_name")
        .map_err(|e| map_sqlx_error("decode_person", e))?;
    Ok(Person::restore(PersonId::new(id), first_name, last_name))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> PersistenceError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("{} failed: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.starts_with("23") || &*code == "22001" => {
                    PersistenceError::Constraint(msg)
                }
                _ => PersistenceError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            PersistenceError::Unavailable(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            PersistenceError::Unavailable(format!("timed out acquiring a connection in {}", operation))
        }
        sqlx::Error::Io(e) => PersistenceError::Unavailable(format!("{} failed: {}", operation, e)),
        sqlx::Error::Tls(e) => PersistenceError::Unavailable(format!("{} failed: {}", operation, e)),
        other => PersistenceError::Database(format!("{} failed: {}", operation, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_closed_maps_to_unavailable() {
        let err = map_sqlx_error("save_changes", sqlx::Error::PoolClosed);
        assert_eq!(
            err,
            PersistenceError::Unavailable("connection pool closed in save_changes".to_string())
        );
    }

    #[test]
    fn decode_failures_map_to_database_error() {
        let err = map_sqlx_error("find_all", sqlx::Error::RowNotFound);
        assert!(matches!(err, PersistenceError::Database(msg) if msg.starts_with("find_all failed")));
    }

    #[tokio::test]
    async fn add_stages_without_touching_the_database() {
        // `connect_lazy` opens nothing until a query runs.
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        let store = PgPeopleStore::new(pool);

        let mut ctx = store.context();
        assert_eq!(ctx.pending(), 0);
        ctx.add(people_core::NewPerson::new("John", "Doe").validate().unwrap());
        ctx.add(people_core::NewPerson::new("Jane", "Smith").validate().unwrap());
        assert_eq!(ctx.pending(), 2);
    }
}
