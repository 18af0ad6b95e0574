//! `people-core` — domain building blocks for the people service.
//!
//! This crate contains **pure domain** types (no infrastructure concerns):
//! the `Person` entity, its unvalidated input shape, and field validation.

pub mod entity;
pub mod error;
pub mod person;
pub mod validation;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use person::{
    FIRST_NAME_FIELD, LAST_NAME_FIELD, MAX_NAME_LENGTH, NewPerson, Person, PersonId, ValidPerson,
};
pub use validation::FieldErrors;
