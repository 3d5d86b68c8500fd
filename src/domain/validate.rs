//! Transaction input validation
//!
//! Collects every violated field into one error so callers can surface all
//! violations at once instead of the first one encountered.

use std::collections::BTreeMap;

use serde::Serialize;

use super::model::TransactionDraft;

/// Field → reason mapping for malformed input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, reason: &str) {
        self.errors.insert(field.to_string(), reason.to_string());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation error")?;
        for (field, reason) in &self.errors {
            write!(f, "; {}: {}", field, reason)?;
        }
        Ok(())
    }
}

/// Validate a proposed transaction before it reaches the store.
pub fn validate_draft(draft: &TransactionDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if draft.category.is_empty() {
        errors.add("category", "cannot be empty");
    }

    if draft.value < 0 {
        errors.add("value", "must be greater than or equal to zero (0)");
    }

    if errors.has_errors() {
        return Err(errors);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_draft() {
        let draft = TransactionDraft {
            category: "Streaming Z".to_string(),
            value: 200,
        };
        assert!(validate_draft(&draft).is_ok());
    }

    #[test]
    fn test_zero_value_is_valid() {
        let draft = TransactionDraft {
            category: "Adjustment".to_string(),
            value: 0,
        };
        assert!(validate_draft(&draft).is_ok());
    }

    #[test]
    fn test_empty_category() {
        let draft = TransactionDraft {
            category: "".to_string(),
            value: 100,
        };
        let errors = validate_draft(&draft).unwrap_err();
        assert_eq!(errors.errors.len(), 1);
        assert!(errors.errors.contains_key("category"));
    }

    #[test]
    fn test_negative_value() {
        let draft = TransactionDraft {
            category: "Groceries".to_string(),
            value: -1,
        };
        let errors = validate_draft(&draft).unwrap_err();
        assert_eq!(errors.errors.len(), 1);
        assert!(errors.errors.contains_key("value"));
    }

    #[test]
    fn test_all_violations_reported_together() {
        let draft = TransactionDraft {
            category: "".to_string(),
            value: -5,
        };
        let errors = validate_draft(&draft).unwrap_err();
        assert_eq!(errors.errors.len(), 2);
        assert!(errors.errors.contains_key("category"));
        assert!(errors.errors.contains_key("value"));
    }

    #[test]
    fn test_display_lists_fields() {
        let draft = TransactionDraft {
            category: "".to_string(),
            value: -5,
        };
        let errors = validate_draft(&draft).unwrap_err();
        let rendered = errors.to_string();
        assert!(rendered.contains("category"));
        assert!(rendered.contains("value"));
    }
}
