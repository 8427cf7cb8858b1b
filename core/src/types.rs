//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates. Ids and
//! timestamps are always assigned by the service; nothing here fabricates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{normalize_description, validate_description, validate_title, ValidationError};

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Case-insensitive substring match over title and description.
    /// `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl CreateTodo {
    /// Build a validated request: title trimmed and non-empty, blank
    /// description dropped, both within the service's length limits.
    pub fn new(title: &str, description: Option<&str>) -> Result<Self, ValidationError> {
        let title = validate_title(title)?;
        let description = description.and_then(normalize_description);
        if let Some(d) = &description {
            validate_description(d)?;
        }
        Ok(Self {
            title,
            description,
            completed: false,
        })
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodo {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: &str) -> Result<Self, ValidationError> {
        self.title = Some(validate_title(title)?);
        Ok(self)
    }

    /// Set the description. A blank value is sent as an empty string, which
    /// the service treats as "clear the description".
    pub fn with_description(mut self, description: &str) -> Result<Self, ValidationError> {
        let description = normalize_description(description).unwrap_or_default();
        validate_description(&description)?;
        self.description = Some(description);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

/// Aggregate counts over a set of todos.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoStatistics {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_uses_camel_case_timestamps() {
        let json = r#"{"id":1,"title":"Buy milk","completed":false,
            "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-02T00:00:00Z"}"#;
        let todo: Todo = serde_json::from_str(json).unwrap();
        assert_eq!(todo.id, 1);
        assert!(todo.description.is_none());
        assert!(todo.updated_at > todo.created_at);

        let back = serde_json::to_value(&todo).unwrap();
        assert!(back.get("createdAt").is_some());
        assert!(back.get("description").is_none());
    }

    #[test]
    fn create_todo_trims_and_drops_blank_description() {
        let input = CreateTodo::new("  Buy milk ", Some("   ")).unwrap();
        assert_eq!(input.title, "Buy milk");
        assert!(input.description.is_none());
        assert!(!input.completed);

        let body = serde_json::to_value(&input).unwrap();
        assert!(body.get("description").is_none());
    }

    #[test]
    fn create_todo_rejects_blank_title() {
        assert_eq!(CreateTodo::new("   ", None), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn create_todo_defaults_completed_to_false() {
        let input: CreateTodo = serde_json::from_str(r#"{"title":"No completed field"}"#).unwrap();
        assert!(!input.completed);
    }

    #[test]
    fn update_todo_serializes_only_present_fields() {
        let patch = UpdateTodo::completed(true);
        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(body, serde_json::json!({"completed": true}));
        assert!(!patch.is_empty());
        assert!(UpdateTodo::default().is_empty());
    }

    #[test]
    fn update_todo_blank_description_clears() {
        let patch = UpdateTodo::default().with_description("  ").unwrap();
        assert_eq!(patch.description.as_deref(), Some(""));
    }

    #[test]
    fn matches_title_or_description() {
        let todo = Todo {
            id: 1,
            title: "Buy Milk".to_string(),
            description: Some("From the Corner shop".to_string()),
            completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(todo.matches_lowercase("milk"));
        assert!(todo.matches_lowercase("corner"));
        assert!(!todo.matches_lowercase("bread"));
    }
}
