//! Store state: the current board snapshot plus bookkeeping.

use crate::board::Board;
use crate::error::BoardError;
use std::sync::Arc;

/// State held by the store
///
/// `board` is replaced with a fresh `Arc` on every successful mutation and
/// left alone otherwise, so `Arc::ptr_eq` on two reads tells whether anything
/// changed in between.
#[derive(Clone, Debug, Default)]
pub struct BoardState {
    /// Current snapshot
    pub board: Arc<Board>,
    /// Why the most recent intent was rejected, cleared by the next success
    pub last_error: Option<BoardError>,
    /// Highest revision known to be in storage
    pub last_saved_revision: Option<u64>,
    /// Most recent storage failure, cleared by the next successful save
    pub storage_error: Option<String>,
}

impl BoardState {
    /// Empty board, nothing saved
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing board
    #[must_use]
    pub fn from_board(board: Board) -> Self {
        Self {
            board: Arc::new(board),
            ..Self::default()
        }
    }

    /// Revision of the current snapshot
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.board.revision()
    }

    /// True when the current revision has not been confirmed as saved
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.last_saved_revision
            .is_none_or(|saved| saved < self.board.revision())
            && self.board.revision() > 0
    }
}
