//! Domain records for the board: todos, tags, and the inputs used to create
//! and edit them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a todo
///
/// Ids are handed out in increasing order by the todo list and never reused,
/// even after the todo holding one is deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(u64);

impl TodoId {
    /// Creates a `TodoId` from its raw value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(u64);

impl TagId {
    /// Creates a `TagId` from its raw value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TagId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single to-do record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// Short title shown on the card
    pub name: String,
    /// Free-form details, empty when not given
    #[serde(default)]
    pub description: String,
    /// When the todo was created
    pub created_datetime: DateTime<Utc>,
    /// When any field was last changed
    pub updated_datetime: DateTime<Utc>,
    /// Deadline, if one was set
    #[serde(default)]
    pub finish_datetime: Option<DateTime<Utc>>,
    /// When the todo was last marked complete
    #[serde(default)]
    pub completed_datetime: Option<DateTime<Utc>>,
    /// Whether the todo is done
    #[serde(default)]
    pub is_complete: bool,
    /// Position in the display sequence, starting at zero
    pub order: usize,
}

impl Todo {
    /// Creates a fresh, incomplete todo
    #[must_use]
    pub fn new(id: TodoId, name: String, order: usize, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            description: String::new(),
            created_datetime: created_at,
            updated_datetime: created_at,
            finish_datetime: None,
            completed_datetime: None,
            is_complete: false,
            order,
        }
    }

    /// Flips completion, stamping or clearing `completed_datetime`
    pub fn toggle_complete(&mut self, at: DateTime<Utc>) {
        self.is_complete = !self.is_complete;
        self.completed_datetime = self.is_complete.then_some(at);
        self.updated_datetime = at;
    }

    /// Refreshes `updated_datetime`
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_datetime = at;
    }
}

/// A tag that can be attached to any number of todos
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier
    pub id: TagId,
    /// Display label
    pub label: String,
}

/// One row of the todo↔tag association relation
pub type Association = (TodoId, TagId);

/// Input for creating a todo
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    /// Required title
    pub name: String,
    /// Optional details
    pub description: Option<String>,
    /// Optional deadline
    pub finish_datetime: Option<DateTime<Utc>>,
}

impl NewTodo {
    /// A todo with just a name
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attach a description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a deadline
    #[must_use]
    pub fn with_finish(mut self, finish: DateTime<Utc>) -> Self {
        self.finish_datetime = Some(finish);
        self
    }
}

/// Partial update for an existing todo
///
/// `None` leaves a field untouched. `finish_datetime` is doubly optional so a
/// deadline can be cleared (`Some(None)`) as well as set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    /// Replacement title
    pub name: Option<String>,
    /// Replacement description
    pub description: Option<String>,
    /// Replacement deadline
    pub finish_datetime: Option<Option<DateTime<Utc>>>,
}

impl TodoPatch {
    /// Replace the name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replace the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set a new deadline
    #[must_use]
    pub fn finish(mut self, finish: DateTime<Utc>) -> Self {
        self.finish_datetime = Some(Some(finish));
        self
    }

    /// Remove the deadline
    #[must_use]
    pub fn clear_finish(mut self) -> Self {
        self.finish_datetime = Some(None);
        self
    }

    /// True when the patch changes nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.finish_datetime.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tidyboard_testing::test_time;

    #[test]
    fn todo_new_is_incomplete() {
        let todo = Todo::new(TodoId::new(1), "Buy milk".to_string(), 0, test_time());

        assert_eq!(todo.name, "Buy milk");
        assert!(!todo.is_complete);
        assert_eq!(todo.created_datetime, todo.updated_datetime);
        assert_eq!(todo.completed_datetime, None);
        assert!(todo.description.is_empty());
    }

    #[test]
    fn toggle_complete_stamps_and_clears() {
        let mut todo = Todo::new(TodoId::new(1), "Walk dog".to_string(), 0, test_time());
        let later = test_time() + Duration::minutes(3);

        todo.toggle_complete(later);
        assert!(todo.is_complete);
        assert_eq!(todo.completed_datetime, Some(later));
        assert_eq!(todo.updated_datetime, later);

        todo.toggle_complete(later);
        assert!(!todo.is_complete);
        assert_eq!(todo.completed_datetime, None);
    }

    #[test]
    fn todo_serializes_with_camel_case_fields() {
        let todo = Todo::new(TodoId::new(7), "Read".to_string(), 2, test_time());
        let json = serde_json::to_value(&todo).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["isComplete"], false);
        assert!(json.get("createdDatetime").is_some());
        assert!(json.get("finishDatetime").is_some());
    }

    #[test]
    fn patch_builders() {
        assert!(TodoPatch::default().is_empty());

        let patch = TodoPatch::default().name("New").clear_finish();
        assert_eq!(patch.name.as_deref(), Some("New"));
        assert_eq!(patch.finish_datetime, Some(None));
        assert!(!patch.is_empty());
    }

    #[test]
    fn ids_display_raw_value() {
        assert_eq!(TodoId::new(42).to_string(), "42");
        assert_eq!(TagId::new(3).get(), 3);
    }
}
