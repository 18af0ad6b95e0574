//! In-memory people store for tests/dev.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use people_core::{Person, PersonId, ValidPerson};
use tracing::instrument;

use super::{PeopleContext, PeopleStore, PersistenceError};

#[derive(Debug)]
struct Table {
    rows: Vec<Person>,
    next_id: i32,
}

#[derive(Debug)]
struct Shared {
    table: RwLock<Table>,
    available: AtomicBool,
}

/// Process-local people table.
///
/// Ids start at 1 and increase by one per committed row. Clones share the
/// same table.
#[derive(Debug, Clone)]
pub struct InMemoryPeopleStore {
    shared: Arc<Shared>,
}

impl InMemoryPeopleStore {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                table: RwLock::new(Table {
                    rows: Vec::new(),
                    next_id: 1,
                }),
                available: AtomicBool::new(true),
            }),
        }
    }

    /// Toggle availability. While unavailable, every read and commit fails
    /// with [`PersistenceError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.shared.available.store(available, Ordering::SeqCst);
    }
}

impl Default for InMemoryPeopleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PeopleStore for InMemoryPeopleStore {
    fn context(&self) -> Box<dyn PeopleContext> {
        Box::new(InMemoryPeopleContext {
            shared: self.shared.clone(),
            staged: Vec::new(),
        })
    }
}

/// Unit of work over an [`InMemoryPeopleStore`].
#[derive(Debug)]
pub struct InMemoryPeopleContext {
    shared: Arc<Shared>,
    staged: Vec<ValidPerson>,
}

impl InMemoryPeopleContext {
    fn ensure_available(&self) -> Result<(), PersistenceError> {
        if self.shared.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PersistenceError::Unavailable(
                "in-memory store is offline".to_string(),
            ))
        }
    }
}

fn poisoned() -> PersistenceError {
    PersistenceError::Unavailable("in-memory store lock poisoned".to_string())
}

#[async_trait::async_trait]
impl PeopleContext for InMemoryPeopleContext {
    fn add(&mut self, person: ValidPerson) {
        self.staged.push(person);
    }

    fn pending(&self) -> usize {
        self.staged.len()
    }

    #[instrument(skip(self), err)]
    async fn save_changes(&mut self) -> Result<Vec<Person>, PersistenceError> {
        let staged = std::mem::take(&mut self.staged);
        if staged.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure_available()?;

        let mut table = self.shared.table.write().map_err(|_| poisoned())?;
        let mut saved = Vec::with_capacity(staged.len());
        for person in staged {
            let person = person.into_person(PersonId::new(table.next_id));
            table.next_id += 1;
            table.rows.push(person.clone());
            saved.push(person);
        }
        Ok(saved)
    }

    async fn find_all(&self) -> Result<Vec<Person>, PersistenceError> {
        self.ensure_available()?;
        let table = self.shared.table.read().map_err(|_| poisoned())?;
        Ok(table.rows.clone())
    }
}
