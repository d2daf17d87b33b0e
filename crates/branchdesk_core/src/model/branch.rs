//! Branch record and write-side draft.
//!
//! # Responsibility
//! - Define the persisted [`Branch`] shape and its AJAX JSON encoding.
//! - Define [`BranchDraft`], the input accepted by save paths.
//! - Check required fields before anything reaches storage.
//!
//! # Invariants
//! - `name` and `location` are required; whitespace-only counts as empty.
//! - `BranchDraft::id == None` means insert, `Some(id)` means update.

use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Database row id of a branch.
pub type BranchId = i64;

/// Database row id of a service category.
pub type CategoryId = i64;

/// Persisted branch location record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    pub location: String,
    /// Serialized under the storage column name used by the admin page.
    #[serde(rename = "id_service_categories")]
    pub category_id: Option<CategoryId>,
}

/// Write input for creating or updating a branch.
///
/// Deserializes the payload posted by the admin form, where ids arrive as
/// either numbers or numeric strings and the category key may be sent as
/// `id_branch_categories`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchDraft {
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<BranchId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(
        rename = "id_service_categories",
        alias = "id_branch_categories",
        default,
        deserialize_with = "deserialize_optional_id"
    )]
    pub category_id: Option<CategoryId>,
}

impl BranchDraft {
    /// Creates an insert draft without category.
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            location: location.into(),
            category_id: None,
        }
    }

    /// Turns this draft into an update of `id`.
    pub fn with_id(mut self, id: BranchId) -> Self {
        self.id = Some(id);
        self
    }

    /// Attaches a service category.
    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Category id with the "empty means none" rule applied.
    pub fn effective_category(&self) -> Option<CategoryId> {
        self.category_id.filter(|id| *id != 0)
    }

    /// Returns a copy with surrounding whitespace removed from text fields.
    pub fn trimmed(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.trim().to_string(),
            location: self.location.trim().to_string(),
            category_id: self.effective_category(),
        }
    }

    /// Checks required fields in declaration order (name, then location).
    pub fn validate_fields(&self) -> Result<(), BranchValidationError> {
        if self.name.trim().is_empty() {
            return Err(BranchValidationError::MissingName);
        }
        if self.location.trim().is_empty() {
            return Err(BranchValidationError::MissingLocation);
        }
        Ok(())
    }
}

impl From<Branch> for BranchDraft {
    fn from(value: Branch) -> Self {
        Self {
            id: Some(value.id),
            name: value.name,
            location: value.location,
            category_id: value.category_id,
        }
    }
}

/// Field-level rejection of a branch write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchValidationError {
    MissingName,
    MissingLocation,
    UnknownCategory(CategoryId),
}

impl Display for BranchValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "branch name is required"),
            Self::MissingLocation => write!(f, "branch location is required"),
            Self::UnknownCategory(id) => {
                write!(f, "service category {id} does not exist")
            }
        }
    }
}

impl Error for BranchValidationError {}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Number(value)) => Ok(Some(value)),
        Some(RawId::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed == "null" {
                return Ok(None);
            }
            trimmed
                .parse::<i64>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid id `{trimmed}`")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BranchDraft, BranchValidationError};

    #[test]
    fn whitespace_only_name_is_missing() {
        let draft = BranchDraft::new("   ", "Main street 1");
        assert_eq!(
            draft.validate_fields(),
            Err(BranchValidationError::MissingName)
        );
    }

    #[test]
    fn name_is_checked_before_location() {
        let draft = BranchDraft::new("", "");
        assert_eq!(
            draft.validate_fields(),
            Err(BranchValidationError::MissingName)
        );
        let draft = BranchDraft::new("Downtown", "");
        assert_eq!(
            draft.validate_fields(),
            Err(BranchValidationError::MissingLocation)
        );
    }

    #[test]
    fn zero_category_means_none() {
        let draft = BranchDraft::new("a", "b").with_category(0);
        assert_eq!(draft.effective_category(), None);
        assert_eq!(draft.trimmed().category_id, None);
    }
}
