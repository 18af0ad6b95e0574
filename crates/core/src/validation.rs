//! Field-level validation errors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field name -> validation messages, ordered by field name.
///
/// Serializes as a plain JSON object, e.g.
/// `{"firstName": ["The firstName field is required."]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against `field`. A field may collect several messages.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl core::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// `Required`: rejects missing, empty and whitespace-only text.
pub fn required(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> bool {
    match value {
        Some(v) if !v.trim().is_empty() => true,
        _ => {
            errors.add(field, format!("The {field} field is required."));
            false
        }
    }
}

/// `MaxLength`: length is counted in characters, not bytes.
pub fn max_length(errors: &mut FieldErrors, field: &str, value: &str, max: usize) -> bool {
    if value.chars().count() > max {
        errors.add(
            field,
            format!("The field {field} must be a string with a maximum length of '{max}'."),
        );
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_groups_messages_by_field() {
        let mut errors = FieldErrors::new();
        errors.add("firstName", "a");
        errors.add("firstName", "b");
        errors.add("lastName", "c");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("firstName").unwrap(), ["a", "b"]);
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["firstName", "lastName"]);
    }

    #[test]
    fn serializes_as_plain_object() {
        let mut errors = FieldErrors::new();
        errors.add("lastName", "The lastName field is required.");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "lastName": ["The lastName field is required."] })
        );
    }

    #[test]
    fn required_rejects_whitespace_only() {
        let mut errors = FieldErrors::new();
        assert!(!required(&mut errors, "firstName", Some("   ")));
        assert!(!required(&mut errors, "lastName", None));
        assert!(required(&mut errors, "other", Some("x")));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn max_length_counts_characters() {
        let mut errors = FieldErrors::new();
        // 30 two-byte characters: 60 bytes but within the limit.
        let name: String = std::iter::repeat('é').take(30).collect();
        assert!(max_length(&mut errors, "firstName", &name, 30));
        assert!(errors.into_result().is_ok());
    }

    #[test]
    fn display_joins_messages() {
        let mut errors = FieldErrors::new();
        errors.add("b", "two");
        errors.add("a", "one");
        assert_eq!(errors.to_string(), "a: one; b: two");
    }
}
