//! To-do board state management.
//!
//! Ordered todos, tags with a many-to-many association to todos, memoized
//! selectors, and humanized deadline countdowns, driven by a reducer on the
//! Tidyboard store.
//!
//! - [`Board`]: the snapshot. Every mutation validates first and bumps the
//!   revision only when something changed.
//! - [`BoardReducer`]: applies [`BoardAction`] intents copy-on-write, so each
//!   success yields a fresh `Arc<Board>` and each failure leaves the old one
//!   in place with [`BoardState::last_error`] set.
//! - [`BoardSelectors`]: derived views cached per snapshot.
//! - [`DeadlineNotice`]: "Time left: 3 hours" / "2 days overdue" plus urgency.
//! - [`SnapshotStore`]: optional JSON persistence, run as effects.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tidyboard::{BoardAction, BoardEnvironment, BoardReducer, BoardState, NewTodo};
//! use tidyboard_core::environment::SystemClock;
//! use tidyboard_runtime::Store;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = BoardEnvironment::new(Arc::new(SystemClock));
//! let store = Store::new(BoardState::new(), BoardReducer::new(), env);
//!
//! store
//!     .send(BoardAction::CreateTodo {
//!         todo: NewTodo::named("Buy milk"),
//!     })
//!     .await?;
//!
//! let count = store.state(|s| s.board.todos().len()).await;
//! assert_eq!(count, 1);
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod board;
pub mod config;
pub mod deadline;
pub mod error;
pub mod humanize;
pub mod metrics;
pub mod reducer;
pub mod selectors;
pub mod state;
pub mod storage;
pub mod tags;
pub mod todos;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use action::BoardAction;
pub use board::{Board, BoardSnapshot};
pub use config::{BoardConfig, ConfigError};
pub use deadline::{deadline_notice, DeadlineNotice, OverduePolicy, Urgency};
pub use error::BoardError;
pub use humanize::{humanize, HumanDuration, TimeUnit};
pub use reducer::{BoardEnvironment, BoardReducer};
pub use selectors::{BoardSelectors, CompletionSummary};
pub use state::BoardState;
pub use storage::{InMemorySnapshotStore, JsonFileStore, SnapshotStore, StorageError};
pub use tags::{TagBook, TagMatching};
pub use todos::TodoList;
pub use types::{Association, NewTodo, Tag, TagId, Todo, TodoId, TodoPatch};
pub use view::{todo_cards, TodoCard};
