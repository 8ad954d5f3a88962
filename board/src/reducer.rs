//! Reducer for the board.
//!
//! Every command runs against a copy of the current snapshot. A success swaps
//! in the copy as a new `Arc<Board>`; a failure records the error and leaves
//! the snapshot as it was. When storage is configured, each new snapshot is
//! saved by an effect that reports back with `SnapshotSaved` or
//! `SnapshotSaveFailed`.

use crate::action::BoardAction;
use crate::board::Board;
use crate::config::BoardConfig;
use crate::error::BoardError;
use crate::metrics;
use crate::state::BoardState;
use crate::storage::SnapshotStore;
use std::sync::Arc;
use tidyboard_core::{effect::Effect, environment::Clock, reducer::Reducer, smallvec, SmallVec};

type Effects = SmallVec<[Effect<BoardAction>; 4]>;

/// Environment dependencies for the board reducer
#[derive(Clone)]
pub struct BoardEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
    /// Snapshot storage; `None` keeps the board in memory only
    pub storage: Option<Arc<dyn SnapshotStore>>,
    /// Validation and matching rules
    pub config: BoardConfig,
}

impl BoardEnvironment {
    /// Environment with default config and no storage
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            storage: None,
            config: BoardConfig::default(),
        }
    }

    /// Persist snapshots to `storage`
    #[must_use]
    pub fn with_storage(mut self, storage: Arc<dyn SnapshotStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Replace the config
    #[must_use]
    pub fn with_config(mut self, config: BoardConfig) -> Self {
        self.config = config;
        self
    }
}

impl std::fmt::Debug for BoardEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardEnvironment")
            .field("storage", &self.storage.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Reducer for the board
#[derive(Clone, Debug, Default)]
pub struct BoardReducer;

impl BoardReducer {
    /// Creates a new `BoardReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Runs `apply` against a copy of the board and commits it on success
    fn mutate<F>(state: &mut BoardState, env: &BoardEnvironment, intent: &'static str, apply: F) -> Effects
    where
        F: FnOnce(&mut Board) -> Result<(), BoardError>,
    {
        let mut next = Board::clone(&state.board);

        if let Err(error) = apply(&mut next) {
            tracing::warn!(intent, kind = error.kind(), %error, "Intent rejected");
            metrics::record_rejected(error.kind());
            state.last_error = Some(error);
            return SmallVec::new();
        }

        state.last_error = None;
        if next.revision() == state.board.revision() {
            tracing::debug!(intent, "Intent changed nothing");
            return SmallVec::new();
        }

        tracing::debug!(intent, revision = next.revision(), "Intent applied");
        state.board = Arc::new(next);
        Self::persist(state, env)
    }

    /// Effect that saves the current snapshot, if storage is configured
    fn persist(state: &BoardState, env: &BoardEnvironment) -> Effects {
        let Some(storage) = env.storage.as_ref().map(Arc::clone) else {
            return SmallVec::new();
        };
        let snapshot = state.board.to_snapshot();
        let revision = snapshot.revision;

        smallvec![Effect::Future(Box::pin(async move {
            match storage.save(snapshot).await {
                Ok(written) => Some(BoardAction::SnapshotSaved { revision, written }),
                Err(error) => Some(BoardAction::SnapshotSaveFailed {
                    revision,
                    reason: error.to_string(),
                }),
            }
        }))]
    }

    /// Effect that loads the stored snapshot
    fn hydrate(env: &BoardEnvironment) -> Effects {
        let Some(storage) = env.storage.as_ref().map(Arc::clone) else {
            tracing::debug!("Hydrate without storage, nothing to load");
            return SmallVec::new();
        };

        smallvec![Effect::Future(Box::pin(async move {
            match storage.load().await {
                Ok(snapshot) => Some(BoardAction::SnapshotLoaded { snapshot }),
                Err(error) => Some(BoardAction::SnapshotLoadFailed {
                    reason: error.to_string(),
                }),
            }
        }))]
    }

    fn apply_event(state: &mut BoardState, action: BoardAction) {
        match action {
            BoardAction::SnapshotLoaded { snapshot: None } => {
                tracing::debug!("No stored snapshot");
            },
            BoardAction::SnapshotLoaded {
                snapshot: Some(snapshot),
            } => {
                let revision = snapshot.revision;
                match Board::from_snapshot(snapshot) {
                    Ok(board) => {
                        tracing::info!(revision, todos = board.todos().len(), "Snapshot loaded");
                        state.board = Arc::new(board);
                        state.last_saved_revision = Some(revision);
                        state.last_error = None;
                        state.storage_error = None;
                    },
                    Err(error) => {
                        tracing::warn!(revision, %error, "Stored snapshot rejected");
                        metrics::record_storage_failure("load");
                        state.storage_error = Some(error.to_string());
                    },
                }
            },
            BoardAction::SnapshotLoadFailed { reason } => {
                tracing::warn!(%reason, "Snapshot load failed");
                metrics::record_storage_failure("load");
                state.storage_error = Some(reason);
            },
            BoardAction::SnapshotSaved { revision, written } => {
                if written {
                    metrics::record_saved();
                }
                tracing::debug!(revision, written, "Snapshot saved");
                state.last_saved_revision = state.last_saved_revision.max(Some(revision));
                state.storage_error = None;
            },
            BoardAction::SnapshotSaveFailed { revision, reason } => {
                tracing::warn!(revision, %reason, "Snapshot save failed");
                metrics::record_storage_failure("save");
                state.storage_error = Some(reason);
            },
            // Commands never reach here
            _ => {},
        }
    }
}

impl Reducer for BoardReducer {
    type State = BoardState;
    type Action = BoardAction;
    type Environment = BoardEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if action.is_event() {
            Self::apply_event(state, action);
            return SmallVec::new();
        }

        let intent = action.name();
        let now = env.clock.now();
        let config = &env.config;

        match action {
            BoardAction::CreateTodo { todo } => Self::mutate(state, env, intent, |board| {
                board.create_todo(todo, now, config).map(drop)
            }),
            BoardAction::UpdateTodo { id, patch } => Self::mutate(state, env, intent, |board| {
                board.update_todo(id, patch, now, config).map(drop)
            }),
            BoardAction::ToggleComplete { id } => Self::mutate(state, env, intent, |board| {
                board.toggle_complete(id, now).map(drop)
            }),
            BoardAction::DeleteTodo { id } => {
                Self::mutate(state, env, intent, |board| board.delete_todo(id).map(drop))
            },
            BoardAction::MoveUp { id } => {
                Self::mutate(state, env, intent, |board| board.move_up(id).map(drop))
            },
            BoardAction::MoveDown { id } => {
                Self::mutate(state, env, intent, |board| board.move_down(id).map(drop))
            },
            BoardAction::EnsureTag { label } => Self::mutate(state, env, intent, |board| {
                board.ensure_tag(&label, config).map(drop)
            }),
            BoardAction::AttachTag { todo_id, tag_id } => {
                Self::mutate(state, env, intent, |board| {
                    board.attach_tag(todo_id, tag_id).map(drop)
                })
            },
            BoardAction::DetachTag { todo_id, tag_id } => {
                Self::mutate(state, env, intent, |board| {
                    board.detach_tag(todo_id, tag_id);
                    Ok(())
                })
            },
            BoardAction::SetTodoTags { todo_id, labels } => {
                Self::mutate(state, env, intent, |board| {
                    board.set_todo_tags(todo_id, &labels, now, config).map(drop)
                })
            },
            BoardAction::Hydrate => Self::hydrate(env),
            BoardAction::SnapshotLoaded { .. }
            | BoardAction::SnapshotLoadFailed { .. }
            | BoardAction::SnapshotSaved { .. }
            | BoardAction::SnapshotSaveFailed { .. } => SmallVec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemorySnapshotStore;
    use crate::types::{NewTodo, TagId, TodoId, TodoPatch};
    use tidyboard_testing::{assertions, test_clock, test_time, ReducerTest};

    fn test_env() -> BoardEnvironment {
        BoardEnvironment::new(Arc::new(test_clock()))
    }

    fn create(name: &str) -> BoardAction {
        BoardAction::CreateTodo {
            todo: NewTodo::named(name),
        }
    }

    #[test]
    fn test_create_todo_success() {
        ReducerTest::new(BoardReducer::new())
            .with_env(test_env())
            .given_state(BoardState::new())
            .when_action(create("Buy milk"))
            .then_state(|state| {
                let todo = state.board.todos().get(TodoId::new(1)).unwrap();
                assert_eq!(todo.name, "Buy milk");
                assert_eq!(todo.created_datetime, test_time());
                assert_eq!(state.revision(), 1);
                assert!(state.last_error.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_create_todo_empty_name() {
        ReducerTest::new(BoardReducer::new())
            .with_env(test_env())
            .given_state(BoardState::new())
            .when_action(create("   "))
            .then_state(|state| {
                assert!(state.board.todos().is_empty());
                assert!(matches!(
                    state.last_error,
                    Some(BoardError::Validation { .. })
                ));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_success_clears_last_error() {
        ReducerTest::new(BoardReducer::new())
            .with_env(test_env())
            .given_state(BoardState::new())
            .when_action(BoardAction::DeleteTodo { id: TodoId::new(3) })
            .when_action(create("ok"))
            .then_state(|state| assert!(state.last_error.is_none()))
            .run();
    }

    #[test]
    fn test_move_up_example() {
        ReducerTest::new(BoardReducer::new())
            .with_env(test_env())
            .given_state(BoardState::new())
            .when_action(create("Buy milk"))
            .when_action(create("Walk dog"))
            .when_action(BoardAction::MoveUp { id: TodoId::new(2) })
            .then_state(|state| {
                let todos = state.board.todos();
                assert_eq!(todos.get(TodoId::new(2)).unwrap().order, 0);
                assert_eq!(todos.get(TodoId::new(1)).unwrap().order, 1);
            })
            .run();
    }

    #[test]
    fn test_rejected_intent_keeps_snapshot_identity() {
        let mut state = BoardState::new();
        let reducer = BoardReducer::new();
        let env = test_env();
        reducer.reduce(&mut state, create("a"), &env);
        let before = Arc::clone(&state.board);

        reducer.reduce(
            &mut state,
            BoardAction::UpdateTodo {
                id: TodoId::new(1),
                patch: TodoPatch::default().name(""),
            },
            &env,
        );
        assert!(Arc::ptr_eq(&before, &state.board));
        assert!(state.last_error.is_some());

        // Boundary move succeeds without a new snapshot
        reducer.reduce(&mut state, BoardAction::MoveUp { id: TodoId::new(1) }, &env);
        assert!(Arc::ptr_eq(&before, &state.board));
        assert!(state.last_error.is_none());

        reducer.reduce(&mut state, BoardAction::ToggleComplete { id: TodoId::new(1) }, &env);
        assert!(!Arc::ptr_eq(&before, &state.board));
    }

    #[test]
    fn test_attach_unknown_tag_is_not_found() {
        ReducerTest::new(BoardReducer::new())
            .with_env(test_env())
            .given_state(BoardState::new())
            .when_action(create("a"))
            .when_action(BoardAction::AttachTag {
                todo_id: TodoId::new(1),
                tag_id: TagId::new(7),
            })
            .then_state(|state| {
                assert_eq!(
                    state.last_error,
                    Some(BoardError::TagNotFound(TagId::new(7)))
                );
            })
            .run();
    }

    #[test]
    fn test_delete_cascades_tags() {
        ReducerTest::new(BoardReducer::new())
            .with_env(test_env())
            .given_state(BoardState::new())
            .when_action(create("a"))
            .when_action(BoardAction::SetTodoTags {
                todo_id: TodoId::new(1),
                labels: vec!["home".into(), "work".into()],
            })
            .when_action(BoardAction::DeleteTodo { id: TodoId::new(1) })
            .then_state(|state| {
                assert!(state.board.todos().is_empty());
                assert_eq!(state.board.tags().associations().count(), 0);
                assert_eq!(state.board.tags().len(), 2);
            })
            .run();
    }

    #[test]
    fn test_mutation_with_storage_saves() {
        let env = test_env().with_storage(Arc::new(InMemorySnapshotStore::new()));

        ReducerTest::new(BoardReducer::new())
            .with_env(env)
            .given_state(BoardState::new())
            .when_action(BoardAction::EnsureTag {
                label: "home".into(),
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_noop_with_storage_does_not_save() {
        let env = test_env().with_storage(Arc::new(InMemorySnapshotStore::new()));

        ReducerTest::new(BoardReducer::new())
            .with_env(env)
            .given_state(BoardState::new())
            .when_action(BoardAction::DetachTag {
                todo_id: TodoId::new(1),
                tag_id: TagId::new(1),
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_hydrate_without_storage_is_noop() {
        ReducerTest::new(BoardReducer::new())
            .with_env(test_env())
            .given_state(BoardState::new())
            .when_action(BoardAction::Hydrate)
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_snapshot_loaded_replaces_board() {
        let mut source = Board::new();
        source
            .create_todo(NewTodo::named("restored"), test_time(), &BoardConfig::default())
            .unwrap();
        let snapshot = source.to_snapshot();

        ReducerTest::new(BoardReducer::new())
            .with_env(test_env())
            .given_state(BoardState::new())
            .when_action(BoardAction::SnapshotLoaded {
                snapshot: Some(snapshot),
            })
            .then_state(|state| {
                assert_eq!(state.board.todos().len(), 1);
                assert_eq!(state.last_saved_revision, Some(1));
                assert!(!state.has_unsaved_changes());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_save_events_update_bookkeeping() {
        ReducerTest::new(BoardReducer::new())
            .with_env(test_env())
            .given_state(BoardState::new())
            .when_action(BoardAction::SnapshotSaveFailed {
                revision: 2,
                reason: "disk full".into(),
            })
            .when_action(BoardAction::SnapshotSaved {
                revision: 3,
                written: true,
            })
            .when_action(BoardAction::SnapshotSaved {
                revision: 2,
                written: false,
            })
            .then_state(|state| {
                assert_eq!(state.last_saved_revision, Some(3));
                assert!(state.storage_error.is_none());
            })
            .run();
    }
}
