//! Render-ready view models.

use crate::board::Board;
use crate::deadline::{deadline_notice, DeadlineNotice, OverduePolicy};
use crate::selectors::BoardSelectors;
use crate::types::{Tag, Todo, TodoId};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Timestamp format used on cards
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything needed to draw one todo
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoCard {
    /// Todo being shown
    pub id: TodoId,
    /// Title
    pub title: String,
    /// Description, or `"No description"`
    pub description: String,
    /// `"Created date: …"`
    pub created_line: String,
    /// `"Updated date: …"`
    pub updated_line: String,
    /// Countdown, when the todo has a deadline
    pub deadline: Option<DeadlineNotice>,
    /// Attached tags, shared with the selector cache
    pub tags: Arc<Vec<Tag>>,
    /// Whether the completion checkbox is ticked
    pub is_complete: bool,
    /// `"todo"` or `"todo todo_is_completed"`
    pub css_class: &'static str,
    /// False for the first card
    pub can_move_up: bool,
    /// False for the last card
    pub can_move_down: bool,
}

impl TodoCard {
    /// Builds the card for `todo` as it sits on `board`
    #[must_use]
    pub fn new(
        todo: &Todo,
        board: &Arc<Board>,
        selectors: &BoardSelectors,
        now: DateTime<Utc>,
        policy: OverduePolicy,
    ) -> Self {
        let description = if todo.description.is_empty() {
            "No description".to_string()
        } else {
            todo.description.clone()
        };

        Self {
            id: todo.id,
            title: todo.name.clone(),
            description,
            created_line: format!(
                "Created date: {}",
                todo.created_datetime.format(DATETIME_FORMAT)
            ),
            updated_line: format!(
                "Updated date: {}",
                todo.updated_datetime.format(DATETIME_FORMAT)
            ),
            deadline: deadline_notice(todo.finish_datetime, now, policy),
            tags: selectors.tags_for_todo(board, todo.id),
            is_complete: todo.is_complete,
            css_class: if todo.is_complete {
                "todo todo_is_completed"
            } else {
                "todo"
            },
            can_move_up: todo.order > 0,
            can_move_down: todo.order + 1 < board.todos().len(),
        }
    }
}

/// Cards for every todo on the board, in display order
#[must_use]
pub fn todo_cards(
    board: &Arc<Board>,
    selectors: &BoardSelectors,
    now: DateTime<Utc>,
    policy: OverduePolicy,
) -> Vec<TodoCard> {
    selectors
        .ordered_todos(board)
        .iter()
        .map(|todo| TodoCard::new(todo, board, selectors, now, policy))
        .collect()
}
