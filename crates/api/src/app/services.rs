use std::sync::Arc;

use people_infra::{InMemoryPeopleStore, PeopleStore, PersistenceError, PgPeopleStore};

/// Shared, immutable services handed to every request.
///
/// Handlers open their own storage context from `people`; nothing here is
/// mutated after startup.
#[derive(Clone)]
pub struct AppServices {
    people: Arc<dyn PeopleStore>,
}

impl AppServices {
    pub fn new(people: Arc<dyn PeopleStore>) -> Self {
        Self { people }
    }

    /// In-memory wiring. The caller keeps its own handle to `store` (it is
    /// cheap to clone and shares the same table), e.g. to inspect rows or
    /// take the store offline.
    pub fn in_memory(store: InMemoryPeopleStore) -> Self {
        Self::new(Arc::new(store))
    }

    pub fn people(&self) -> &dyn PeopleStore {
        self.people.as_ref()
    }
}

/// Postgres wiring: connect the pool and make sure the table exists.
pub async fn connect(connection_string: &str) -> Result<AppServices, PersistenceError> {
    let store = PgPeopleStore::connect(connection_string).await?;
    store.ensure_schema().await?;
    tracing::info!("connected to postgres");
    Ok(AppServices::new(Arc::new(store)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use people_core::NewPerson;

    #[tokio::test]
    async fn in_memory_shares_the_callers_table() {
        let store = InMemoryPeopleStore::new();
        let services = AppServices::in_memory(store.clone());

        let mut ctx = services.people().context();
        ctx.add(NewPerson::new("Ada", "Lovelace").validate().unwrap());
        ctx.save_changes().await.unwrap();

        let rows = store.context().find_all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].first_name(), "Ada");
    }
}
