//! Intents and feedback events for the board reducer.

use crate::board::BoardSnapshot;
use crate::types::{NewTodo, TagId, TodoId, TodoPatch};
use serde::{Deserialize, Serialize};
use tidyboard_macros::Action;

/// Everything the board reducer understands
///
/// Commands are intents dispatched by callers. Events are produced by
/// persistence effects and fed back into the store.
#[derive(Action, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardAction {
    // ========== Commands ==========
    /// Add a todo at the end of the list
    #[command]
    CreateTodo {
        /// Fields of the new todo
        todo: NewTodo,
    },

    /// Edit name, description, or deadline
    #[command]
    UpdateTodo {
        /// Todo to edit
        id: TodoId,
        /// Fields to change
        patch: TodoPatch,
    },

    /// Flip completion
    #[command]
    ToggleComplete {
        /// Todo to toggle
        id: TodoId,
    },

    /// Remove a todo and its tag associations
    #[command]
    DeleteTodo {
        /// Todo to delete
        id: TodoId,
    },

    /// Swap with the previous todo
    #[command]
    MoveUp {
        /// Todo to move
        id: TodoId,
    },

    /// Swap with the next todo
    #[command]
    MoveDown {
        /// Todo to move
        id: TodoId,
    },

    /// Make sure a tag with this label exists
    #[command]
    EnsureTag {
        /// Tag label
        label: String,
    },

    /// Attach an existing tag to a todo
    #[command]
    AttachTag {
        /// Todo to tag
        todo_id: TodoId,
        /// Tag to attach
        tag_id: TagId,
    },

    /// Detach a tag from a todo
    #[command]
    DetachTag {
        /// Tagged todo
        todo_id: TodoId,
        /// Tag to detach
        tag_id: TagId,
    },

    /// Replace the tags of a todo, creating labels as needed
    #[command]
    SetTodoTags {
        /// Todo to retag
        todo_id: TodoId,
        /// Complete new set of labels
        labels: Vec<String>,
    },

    /// Load the last saved snapshot from storage
    #[command]
    Hydrate,

    // ========== Events ==========
    /// Storage returned a snapshot (or nothing)
    #[event]
    SnapshotLoaded {
        /// Stored snapshot, `None` if nothing was saved yet
        snapshot: Option<BoardSnapshot>,
    },

    /// Storage could not be read
    #[event]
    SnapshotLoadFailed {
        /// Error message
        reason: String,
    },

    /// A snapshot save finished
    #[event]
    SnapshotSaved {
        /// Revision that was saved
        revision: u64,
        /// False when storage already had a newer revision
        written: bool,
    },

    /// A snapshot save failed
    #[event]
    SnapshotSaveFailed {
        /// Revision that failed to save
        revision: u64,
        /// Error message
        reason: String,
    },
}
