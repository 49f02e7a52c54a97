//! Identifier and type-name validation.
//!
//! Runs before any caller-supplied value reaches the graph store. Type names
//! are interpolated into Cypher labels, so they get the stricter character set.

use crate::error::{BrainError, Result};

/// Maximum identifier length, in characters.
pub const MAX_ID_LENGTH: usize = 255;

/// Maximum node/relationship type length, in characters.
pub const MAX_TYPE_NAME_LENGTH: usize = 64;

/// Validate a node identifier: non-empty, at most 255 characters,
/// alphanumeric plus `-` and `_`.
pub fn validate_id(id: &str) -> Result<&str> {
    if id.is_empty() {
        return Err(BrainError::invalid_identifier(id, "identifier cannot be empty"));
    }

    let len = id.chars().count();
    if len > MAX_ID_LENGTH {
        return Err(BrainError::invalid_identifier(
            id,
            format!("identifier too long: {len} chars (max: {MAX_ID_LENGTH})"),
        ));
    }

    if let Some(bad) = id
        .chars()
        .find(|c| !(c.is_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(BrainError::invalid_identifier(
            id,
            format!("invalid character {bad:?} (allowed: alphanumeric, -, _)"),
        ));
    }

    Ok(id)
}

/// Validate a node type or relationship type name: non-empty, at most 64
/// characters, ASCII alphanumeric plus `_`, not starting with a digit.
///
/// These are exactly the names Cypher accepts as unquoted labels.
pub fn validate_type_name(name: &str) -> Result<&str> {
    if name.is_empty() {
        return Err(BrainError::invalid_identifier(name, "type name cannot be empty"));
    }

    if name.len() > MAX_TYPE_NAME_LENGTH {
        return Err(BrainError::invalid_identifier(
            name,
            format!(
                "type name too long: {} chars (max: {MAX_TYPE_NAME_LENGTH})",
                name.len()
            ),
        ));
    }

    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
    {
        return Err(BrainError::invalid_identifier(
            name,
            format!("invalid character {bad:?} in type name (allowed: A-Z, a-z, 0-9, _)"),
        ));
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(BrainError::invalid_identifier(
            name,
            "type name cannot start with a digit",
        ));
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn accepts_well_formed_ids() {
        assert_eq!(validate_id("task-1").unwrap(), "task-1");
        assert!(validate_id("person_42").is_ok());
        assert!(validate_id("ABCdef123").is_ok());
        assert!(validate_id("décision-1").is_ok());
    }

    #[test]
    fn rejects_empty_id() {
        let err = validate_id("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIdentifier);
    }

    #[test]
    fn rejects_space_and_semicolon() {
        assert!(validate_id("task 1").is_err());
        assert!(validate_id("task-1;DROP").is_err());
        assert!(validate_id("a}b").is_err());
        assert!(validate_id("a.b").is_err());
    }

    #[test]
    fn length_boundary() {
        let max = "a".repeat(MAX_ID_LENGTH);
        assert!(validate_id(&max).is_ok());

        let too_long = "a".repeat(MAX_ID_LENGTH + 1);
        let err = validate_id(&too_long).unwrap_err();
        assert!(err.to_string().contains("too long"));
    }

    #[test]
    fn type_names_reject_hyphens_and_cypher() {
        assert!(validate_type_name("Task").is_ok());
        assert!(validate_type_name("depends_on").is_ok());
        assert!(validate_type_name("depends-on").is_err());
        assert!(validate_type_name("Task {id: 1})-[r]-(").is_err());
        assert!(validate_type_name("Tâche").is_err());
        assert!(validate_type_name("").is_err());
        assert!(validate_type_name(&"T".repeat(MAX_TYPE_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn type_names_cannot_start_with_digit() {
        for bad in ["9lives", "2024", "0_Task"] {
            let err = validate_type_name(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidIdentifier, "{bad:?}");
            assert!(err.to_string().contains("digit"));
        }
        assert!(validate_type_name("Task2024").is_ok());
        assert!(validate_type_name("_internal").is_ok());
    }
}
