//! Infrastructure layer: database access and configuration.

pub mod config;
pub mod storage;

pub use config::{ConfigError, Settings};
pub use storage::{
    InMemoryPeopleStore, PeopleContext, PeopleStore, PersistenceError, PgPeopleStore,
};
