//! Derived views over a board snapshot.
//!
//! The free functions are plain derivations. [`BoardSelectors`] memoizes them
//! per `Arc<Board>` snapshot: asking twice against the same snapshot returns
//! the same `Arc`, and the first call against a new snapshot recomputes.

use crate::board::Board;
use crate::types::{Tag, TagId, Todo, TodoId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tidyboard_core::selector::{Selector, SelectorStats};

/// Tags attached to a todo, ordered by tag id; empty for unknown ids
#[must_use]
pub fn tags_for_todo(board: &Board, todo_id: TodoId) -> Vec<Tag> {
    board
        .tags()
        .tag_ids_for(todo_id)
        .filter_map(|tag_id| board.tags().get(tag_id).cloned())
        .collect()
}

/// All todos in display order
#[must_use]
pub fn ordered_todos(board: &Board) -> Vec<Todo> {
    board.todos().as_slice().to_vec()
}

/// Todos carrying a tag, in display order
#[must_use]
pub fn todos_with_tag(board: &Board, tag_id: TagId) -> Vec<Todo> {
    board
        .todos()
        .iter()
        .filter(|todo| board.tags().is_attached(todo.id, tag_id))
        .cloned()
        .collect()
}

/// Completed vs. remaining counts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionSummary {
    /// Number of todos
    pub total: usize,
    /// Number marked complete
    pub completed: usize,
    /// Number still open
    pub remaining: usize,
}

/// Completion counts for the whole board
#[must_use]
pub fn completion_summary(board: &Board) -> CompletionSummary {
    let total = board.todos().len();
    let completed = board.todos().completed_count();
    CompletionSummary {
        total,
        completed,
        remaining: total - completed,
    }
}

/// Memoized board selectors
///
/// Share one instance between the views that read the same store.
#[derive(Debug)]
pub struct BoardSelectors {
    tags_for_todo: Selector<Board, TodoId, Vec<Tag>>,
    todos_with_tag: Selector<Board, TagId, Vec<Todo>>,
    ordered_todos: Selector<Board, (), Vec<Todo>>,
    completion: Selector<Board, (), CompletionSummary>,
}

impl Default for BoardSelectors {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardSelectors {
    /// Creates selectors with empty caches
    #[must_use]
    pub fn new() -> Self {
        Self {
            tags_for_todo: Selector::new(|board: &Board, id: &TodoId| tags_for_todo(board, *id)),
            todos_with_tag: Selector::new(|board: &Board, id: &TagId| todos_with_tag(board, *id)),
            ordered_todos: Selector::new(|board: &Board, _: &()| ordered_todos(board)),
            completion: Selector::new(|board: &Board, _: &()| completion_summary(board)),
        }
    }

    /// Memoized [`tags_for_todo`]
    pub fn tags_for_todo(&self, board: &Arc<Board>, todo_id: TodoId) -> Arc<Vec<Tag>> {
        self.tags_for_todo.select(board, &todo_id)
    }

    /// Memoized [`todos_with_tag`]
    pub fn todos_with_tag(&self, board: &Arc<Board>, tag_id: TagId) -> Arc<Vec<Todo>> {
        self.todos_with_tag.select(board, &tag_id)
    }

    /// Memoized [`ordered_todos`]
    pub fn ordered_todos(&self, board: &Arc<Board>) -> Arc<Vec<Todo>> {
        self.ordered_todos.select(board, &())
    }

    /// Memoized [`completion_summary`]
    pub fn completion_summary(&self, board: &Arc<Board>) -> Arc<CompletionSummary> {
        self.completion.select(board, &())
    }

    /// Cache counters of the `tags_for_todo` selector
    #[must_use]
    pub fn tags_for_todo_stats(&self) -> SelectorStats {
        self.tags_for_todo.stats()
    }
}
