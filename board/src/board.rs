//! The board snapshot: todos, tags, and the rules that span both.

use crate::config::BoardConfig;
use crate::error::{BoardError, Result};
use crate::tags::TagBook;
use crate::todos::TodoList;
use crate::types::{Association, NewTodo, Tag, TagId, Todo, TodoId, TodoPatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tidyboard_macros::State;

/// Plain, serializable form of a [`Board`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    /// Revision the snapshot was taken at
    pub revision: u64,
    /// Todos in display order
    pub todos: Vec<Todo>,
    /// All tags
    pub tags: Vec<Tag>,
    /// Todo↔tag pairs
    #[serde(default)]
    pub associations: Vec<Association>,
    /// Id the next todo will get; absent in older files
    #[serde(default)]
    pub next_todo_id: u64,
    /// Id the next tag will get; absent in older files
    #[serde(default)]
    pub next_tag_id: u64,
}

/// Complete board state
///
/// Every method validates before it mutates, so an `Err` means the board is
/// exactly as it was. Methods that change something bump the revision; calls
/// that turn out to be no-ops (moving the first todo up, re-attaching a tag)
/// leave it alone.
#[derive(State, Clone, Debug, Default, PartialEq, Eq)]
pub struct Board {
    todos: TodoList,
    tags: TagBook,
    #[revision]
    revision: u64,
}

impl Board {
    /// Creates an empty board at revision zero
    #[must_use]
    pub const fn new() -> Self {
        Self {
            todos: TodoList::new(),
            tags: TagBook::new(),
            revision: 0,
        }
    }

    /// The todo list
    #[must_use]
    pub const fn todos(&self) -> &TodoList {
        &self.todos
    }

    /// The tags and associations
    #[must_use]
    pub const fn tags(&self) -> &TagBook {
        &self.tags
    }

    /// Adds a todo at the end of the list
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Validation`] for a blank or overlong name.
    pub fn create_todo(
        &mut self,
        new: NewTodo,
        now: DateTime<Utc>,
        config: &BoardConfig,
    ) -> Result<Todo> {
        let todo = self.todos.create(new, now, config.max_name_len)?;
        self.bump_revision();
        Ok(todo)
    }

    /// Applies a patch to a todo
    ///
    /// # Errors
    ///
    /// [`BoardError::TodoNotFound`] or [`BoardError::Validation`].
    pub fn update_todo(
        &mut self,
        id: TodoId,
        patch: TodoPatch,
        now: DateTime<Utc>,
        config: &BoardConfig,
    ) -> Result<Todo> {
        let todo = self.todos.update(id, patch, now, config.max_name_len)?;
        self.bump_revision();
        Ok(todo)
    }

    /// Flips completion of a todo
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::TodoNotFound`] if `id` is unknown.
    pub fn toggle_complete(&mut self, id: TodoId, now: DateTime<Utc>) -> Result<Todo> {
        let todo = self.todos.toggle_complete(id, now)?;
        self.bump_revision();
        Ok(todo)
    }

    /// Deletes a todo together with all of its tag associations
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::TodoNotFound`] if `id` is unknown.
    pub fn delete_todo(&mut self, id: TodoId) -> Result<Todo> {
        let removed = self.todos.delete(id)?;
        self.tags.remove_todo_associations(id);
        self.bump_revision();
        Ok(removed)
    }

    /// Moves a todo one place earlier; `Ok(false)` if it is already first
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::TodoNotFound`] if `id` is unknown.
    pub fn move_up(&mut self, id: TodoId) -> Result<bool> {
        let moved = self.todos.move_up(id)?;
        if moved {
            self.bump_revision();
        }
        Ok(moved)
    }

    /// Moves a todo one place later; `Ok(false)` if it is already last
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::TodoNotFound`] if `id` is unknown.
    pub fn move_down(&mut self, id: TodoId) -> Result<bool> {
        let moved = self.todos.move_down(id)?;
        if moved {
            self.bump_revision();
        }
        Ok(moved)
    }

    /// Returns the tag for `label`, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Validation`] for a blank label.
    pub fn ensure_tag(&mut self, label: &str, config: &BoardConfig) -> Result<Tag> {
        let (tag, created) = self.tags.ensure_tag(label, config.tag_matching)?;
        if created {
            self.bump_revision();
        }
        Ok(tag)
    }

    /// Attaches an existing tag to an existing todo
    ///
    /// Returns `Ok(false)` if the pair was already attached.
    ///
    /// # Errors
    ///
    /// [`BoardError::TodoNotFound`] or [`BoardError::TagNotFound`].
    pub fn attach_tag(&mut self, todo_id: TodoId, tag_id: TagId) -> Result<bool> {
        if !self.todos.contains(todo_id) {
            return Err(BoardError::TodoNotFound(todo_id));
        }
        if self.tags.get(tag_id).is_none() {
            return Err(BoardError::TagNotFound(tag_id));
        }
        let attached = self.tags.attach(todo_id, tag_id);
        if attached {
            self.bump_revision();
        }
        Ok(attached)
    }

    /// Detaches a tag from a todo; `false` if the pair did not exist
    pub fn detach_tag(&mut self, todo_id: TodoId, tag_id: TagId) -> bool {
        let detached = self.tags.detach(todo_id, tag_id);
        if detached {
            self.bump_revision();
        }
        detached
    }

    /// Replaces the tag set of a todo with exactly the tags for `labels`
    ///
    /// Missing tags are created. Duplicate labels collapse to one tag. The
    /// todo's update time is refreshed even if the set did not change.
    /// Returns the resulting tags ordered by id.
    ///
    /// # Errors
    ///
    /// - [`BoardError::TodoNotFound`] if `todo_id` is unknown
    /// - [`BoardError::Validation`] if any label is blank
    pub fn set_todo_tags<S: AsRef<str>>(
        &mut self,
        todo_id: TodoId,
        labels: &[S],
        now: DateTime<Utc>,
        config: &BoardConfig,
    ) -> Result<Vec<Tag>> {
        if !self.todos.contains(todo_id) {
            return Err(BoardError::TodoNotFound(todo_id));
        }
        if labels.iter().any(|label| label.as_ref().trim().is_empty()) {
            return Err(BoardError::validation("label", "must not be empty"));
        }

        let mut wanted = BTreeSet::new();
        let mut tags = Vec::with_capacity(labels.len());
        for label in labels {
            let (tag, _) = self.tags.ensure_tag(label.as_ref(), config.tag_matching)?;
            if wanted.insert(tag.id) {
                tags.push(tag);
            }
        }

        let current: Vec<TagId> = self.tags.tag_ids_for(todo_id).collect();
        for tag_id in current {
            if !wanted.contains(&tag_id) {
                self.tags.detach(todo_id, tag_id);
            }
        }
        for tag_id in &wanted {
            self.tags.attach(todo_id, *tag_id);
        }
        self.todos.touch(todo_id, now)?;
        self.bump_revision();

        tags.sort_by_key(|tag| tag.id);
        Ok(tags)
    }

    /// Plain form suitable for persistence
    #[must_use]
    pub fn to_snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            revision: self.revision,
            todos: self.todos.as_slice().to_vec(),
            tags: self.tags.iter().cloned().collect(),
            associations: self.tags.associations().collect(),
            next_todo_id: self.todos.next_id().get(),
            next_tag_id: self.tags.next_id().get(),
        }
    }

    /// Rebuilds a board from its plain form
    ///
    /// Todo order is renormalized; ids and association references are
    /// checked.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidSnapshot`] if the snapshot is inconsistent.
    pub fn from_snapshot(snapshot: BoardSnapshot) -> Result<Self> {
        let todos = TodoList::from_records(snapshot.todos, snapshot.next_todo_id)?;
        let tags = TagBook::from_records(
            snapshot.tags,
            snapshot.associations,
            snapshot.next_tag_id,
            |id| todos.contains(id),
        )?;
        Ok(Self {
            todos,
            tags,
            revision: snapshot.revision,
        })
    }
}
