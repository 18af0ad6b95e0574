use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::validation::{self, FieldErrors};

/// Maximum length (in characters) of either name field.
pub const MAX_NAME_LENGTH: usize = 30;

pub const FIRST_NAME_FIELD: &str = "firstName";
pub const LAST_NAME_FIELD: &str = "lastName";

/// Person identifier, generated by storage on insert.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(i32);

impl PersonId {
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn get(&self) -> i32 {
        self.0
    }
}

impl core::fmt::Display for PersonId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Person request payload, as received from the client.
///
/// Both names are optional at this stage so that a missing field surfaces as a
/// required-field error rather than a body-parse failure. Unknown fields
/// (including a client-supplied `id`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerson {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl NewPerson {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
        }
    }

    /// Check every field and collect all failures.
    ///
    /// This is the only way to obtain a [`ValidPerson`], which is the only
    /// shape storage accepts.
    pub fn validate(self) -> DomainResult<ValidPerson> {
        let mut errors = FieldErrors::new();
        check_name(&mut errors, FIRST_NAME_FIELD, self.first_name.as_deref());
        check_name(&mut errors, LAST_NAME_FIELD, self.last_name.as_deref());
        errors.into_result().map_err(DomainError::Validation)?;

        Ok(ValidPerson {
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
        })
    }
}

fn check_name(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    if validation::required(errors, field, value) {
        if let Some(v) = value {
            validation::max_length(errors, field, v, MAX_NAME_LENGTH);
        }
    }
}

/// A person whose names passed validation but which has no id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPerson {
    first_name: String,
    last_name: String,
}

impl ValidPerson {
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Attach the id generated by storage.
    pub fn into_person(self, id: PersonId) -> Person {
        Person {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }
}

/// Stored person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    id: PersonId,
    first_name: String,
    last_name: String,
}

impl Person {
    /// Rehydrate a row that storage already holds.
    pub fn restore(id: PersonId, first_name: String, last_name: String) -> Self {
        Self {
            id,
            first_name,
            last_name,
        }
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }
}

impl Entity for Person {
    type Id = PersonId;

    fn id(&self) -> PersonId {
        self.id
    }
}
