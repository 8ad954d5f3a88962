//! Tags and the todo↔tag association relation.

use crate::error::{BoardError, Result};
use crate::types::{Association, Tag, TagId, TodoId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How `ensure_tag` decides that a label already exists
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagMatching {
    /// Labels must be byte-for-byte equal
    #[default]
    Exact,
    /// Labels are compared after Unicode lowercasing
    CaseInsensitive,
}

impl TagMatching {
    fn matches(self, existing: &str, wanted: &str) -> bool {
        match self {
            Self::Exact => existing == wanted,
            Self::CaseInsensitive => existing.to_lowercase() == wanted.to_lowercase(),
        }
    }
}

/// Tag records plus the many-to-many association set
///
/// Associations are stored as ordered `(TodoId, TagId)` pairs, so looking up
/// the tags of one todo is a range scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagBook {
    tags: BTreeMap<TagId, Tag>,
    associations: BTreeSet<Association>,
    next_id: u64,
}

impl Default for TagBook {
    fn default() -> Self {
        Self::new()
    }
}

impl TagBook {
    /// Creates an empty tag book
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tags: BTreeMap::new(),
            associations: BTreeSet::new(),
            next_id: 1,
        }
    }

    /// Rebuilds a tag book from persisted records
    ///
    /// Association pairs are checked against the known tags and `todo_exists`.
    /// Like todo ids, tag ids below the saved `next_id` stay retired.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidSnapshot`] for duplicate tag ids or for
    /// pairs that reference an unknown todo or tag.
    pub fn from_records(
        tags: Vec<Tag>,
        associations: Vec<Association>,
        next_id: u64,
        todo_exists: impl Fn(TodoId) -> bool,
    ) -> Result<Self> {
        let mut book = Self::new();
        for tag in tags {
            let id = tag.id;
            if book.tags.insert(id, tag).is_some() {
                return Err(BoardError::InvalidSnapshot(format!("duplicate tag id {id}")));
            }
        }
        book.next_id = book
            .tags
            .keys()
            .next_back()
            .map_or(1, |max| max.get() + 1)
            .max(next_id);

        for (todo_id, tag_id) in associations {
            if !todo_exists(todo_id) {
                return Err(BoardError::InvalidSnapshot(format!(
                    "association references unknown todo {todo_id}"
                )));
            }
            if !book.tags.contains_key(&tag_id) {
                return Err(BoardError::InvalidSnapshot(format!(
                    "association references unknown tag {tag_id}"
                )));
            }
            book.associations.insert((todo_id, tag_id));
        }
        Ok(book)
    }

    /// Number of tags
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// True when no tags exist
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// The id the next created tag will receive
    #[must_use]
    pub const fn next_id(&self) -> TagId {
        TagId::new(self.next_id)
    }

    /// All tags, by id
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }

    /// All association pairs, ordered by todo then tag
    pub fn associations(&self) -> impl Iterator<Item = Association> + '_ {
        self.associations.iter().copied()
    }

    /// Looks up a tag by id
    #[must_use]
    pub fn get(&self, id: TagId) -> Option<&Tag> {
        self.tags.get(&id)
    }

    /// Finds a tag whose label matches under `matching`
    #[must_use]
    pub fn find_by_label(&self, label: &str, matching: TagMatching) -> Option<&Tag> {
        self.tags.values().find(|tag| matching.matches(&tag.label, label))
    }

    /// Returns the tag labelled `label`, creating it when none matches
    ///
    /// The returned flag is `true` when a new tag was created.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Validation`] for an empty or whitespace-only label.
    pub fn ensure_tag(&mut self, label: &str, matching: TagMatching) -> Result<(Tag, bool)> {
        if label.trim().is_empty() {
            return Err(BoardError::validation("label", "must not be empty"));
        }
        if let Some(existing) = self.find_by_label(label, matching) {
            return Ok((existing.clone(), false));
        }

        let tag = Tag {
            id: TagId::new(self.next_id),
            label: label.to_string(),
        };
        self.next_id += 1;
        self.tags.insert(tag.id, tag.clone());
        Ok((tag, true))
    }

    /// Adds the pair; returns `false` if it was already present
    pub fn attach(&mut self, todo_id: TodoId, tag_id: TagId) -> bool {
        self.associations.insert((todo_id, tag_id))
    }

    /// Removes the pair; returns `false` if it was not present
    pub fn detach(&mut self, todo_id: TodoId, tag_id: TagId) -> bool {
        self.associations.remove(&(todo_id, tag_id))
    }

    /// Drops every pair involving `todo_id`, returning how many were removed
    pub fn remove_todo_associations(&mut self, todo_id: TodoId) -> usize {
        let before = self.associations.len();
        self.associations.retain(|(todo, _)| *todo != todo_id);
        before - self.associations.len()
    }

    /// Tag ids attached to a todo, ascending
    pub fn tag_ids_for(&self, todo_id: TodoId) -> impl Iterator<Item = TagId> + '_ {
        self.associations
            .range((todo_id, TagId::new(0))..=(todo_id, TagId::new(u64::MAX)))
            .map(|(_, tag)| *tag)
    }

    /// Todo ids carrying a tag, ascending
    pub fn todo_ids_for(&self, tag_id: TagId) -> impl Iterator<Item = TodoId> + '_ {
        self.associations
            .iter()
            .filter(move |(_, tag)| *tag == tag_id)
            .map(|(todo, _)| *todo)
    }

    /// True if the pair exists
    #[must_use]
    pub fn is_attached(&self, todo_id: TodoId, tag_id: TagId) -> bool {
        self.associations.contains(&(todo_id, tag_id))
    }
}
