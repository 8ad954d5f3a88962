//! The ordered todo list.
//!
//! Todos are kept in a `Vec` in display order, so a todo's `order` is always
//! its index. Every mutation re-establishes that, which keeps the order a
//! contiguous `0..len` sequence with no ties.

use crate::error::{BoardError, Result};
use crate::types::{NewTodo, Todo, TodoId, TodoPatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered collection of todos
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    items: Vec<Todo>,
    next_id: u64,
}

impl TodoList {
    /// Creates an empty list
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuilds a list from persisted records
    ///
    /// Records are sorted by their stored `order` (ties broken by id) and then
    /// renumbered, so gaps or duplicates in a hand-edited file are repaired
    /// rather than rejected. `next_id` is the counter saved alongside the
    /// records; ids below it are never handed out again, even when the todo
    /// that held the highest one was deleted before saving.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidSnapshot`] if two records share an id.
    pub fn from_records(mut records: Vec<Todo>, next_id: u64) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for todo in &records {
            if !seen.insert(todo.id) {
                return Err(BoardError::InvalidSnapshot(format!(
                    "duplicate todo id {}",
                    todo.id
                )));
            }
        }

        records.sort_by_key(|todo| (todo.order, todo.id));
        let next_id = records
            .iter()
            .map(|t| t.id.get() + 1)
            .max()
            .unwrap_or(1)
            .max(next_id);

        let mut list = Self {
            items: records,
            next_id,
        };
        list.renumber();
        Ok(list)
    }

    /// Number of todos
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when there are no todos
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|t| t.is_complete).count()
    }

    /// Todos in display order
    pub fn iter(&self) -> std::slice::Iter<'_, Todo> {
        self.items.iter()
    }

    /// Todos in display order, as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[Todo] {
        &self.items
    }

    /// Looks up a todo by id
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.items.iter().find(|t| t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn contains(&self, id: TodoId) -> bool {
        self.position(id).is_some()
    }

    /// The id the next created todo will receive
    #[must_use]
    pub const fn next_id(&self) -> TodoId {
        TodoId::new(self.next_id)
    }

    /// Appends a new todo at the end of the order
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Validation`] if the name is blank or longer than
    /// `max_name_len` characters.
    pub fn create(&mut self, new: NewTodo, now: DateTime<Utc>, max_name_len: usize) -> Result<Todo> {
        validate_name(&new.name, max_name_len)?;

        let id = TodoId::new(self.next_id);
        self.next_id += 1;

        let mut todo = Todo::new(id, new.name, self.items.len(), now);
        todo.description = new.description.unwrap_or_default();
        todo.finish_datetime = new.finish_datetime;

        self.items.push(todo.clone());
        Ok(todo)
    }

    /// Merges `patch` into an existing todo and refreshes its update time
    ///
    /// # Errors
    ///
    /// - [`BoardError::TodoNotFound`] if `id` is unknown
    /// - [`BoardError::Validation`] if the patch sets an invalid name
    pub fn update(
        &mut self,
        id: TodoId,
        patch: TodoPatch,
        now: DateTime<Utc>,
        max_name_len: usize,
    ) -> Result<Todo> {
        let index = self.position(id).ok_or(BoardError::TodoNotFound(id))?;
        if let Some(name) = &patch.name {
            validate_name(name, max_name_len)?;
        }

        let todo = &mut self.items[index];
        if let Some(name) = patch.name {
            todo.name = name;
        }
        if let Some(description) = patch.description {
            todo.description = description;
        }
        if let Some(finish) = patch.finish_datetime {
            todo.finish_datetime = finish;
        }
        todo.touch(now);

        Ok(todo.clone())
    }

    /// Flips the completion flag of a todo
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::TodoNotFound`] if `id` is unknown.
    pub fn toggle_complete(&mut self, id: TodoId, now: DateTime<Utc>) -> Result<Todo> {
        let todo = self.get_mut(id)?;
        todo.toggle_complete(now);
        Ok(todo.clone())
    }

    /// Refreshes the update time of a todo
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::TodoNotFound`] if `id` is unknown.
    pub fn touch(&mut self, id: TodoId, now: DateTime<Utc>) -> Result<()> {
        self.get_mut(id)?.touch(now);
        Ok(())
    }

    /// Removes a todo and closes the gap in the order
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::TodoNotFound`] if `id` is unknown.
    pub fn delete(&mut self, id: TodoId) -> Result<Todo> {
        let index = self.position(id).ok_or(BoardError::TodoNotFound(id))?;
        let removed = self.items.remove(index);
        self.renumber();
        Ok(removed)
    }

    /// Swaps a todo with its predecessor
    ///
    /// Returns `false` (and changes nothing) when the todo is already first.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::TodoNotFound`] if `id` is unknown.
    pub fn move_up(&mut self, id: TodoId) -> Result<bool> {
        let index = self.position(id).ok_or(BoardError::TodoNotFound(id))?;
        if index == 0 {
            return Ok(false);
        }
        self.swap(index - 1, index);
        Ok(true)
    }

    /// Swaps a todo with its successor
    ///
    /// Returns `false` (and changes nothing) when the todo is already last.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::TodoNotFound`] if `id` is unknown.
    pub fn move_down(&mut self, id: TodoId) -> Result<bool> {
        let index = self.position(id).ok_or(BoardError::TodoNotFound(id))?;
        if index + 1 >= self.items.len() {
            return Ok(false);
        }
        self.swap(index, index + 1);
        Ok(true)
    }

    fn position(&self, id: TodoId) -> Option<usize> {
        self.items.iter().position(|t| t.id == id)
    }

    fn get_mut(&mut self, id: TodoId) -> Result<&mut Todo> {
        self.items
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(BoardError::TodoNotFound(id))
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.items.swap(a, b);
        self.items[a].order = a;
        self.items[b].order = b;
    }

    fn renumber(&mut self) {
        for (index, todo) in self.items.iter_mut().enumerate() {
            todo.order = index;
        }
    }
}

impl Default for TodoList {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a TodoList {
    type Item = &'a Todo;
    type IntoIter = std::slice::Iter<'a, Todo>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn validate_name(name: &str, max_len: usize) -> Result<()> {
    if name.trim().is_empty() {
        return Err(BoardError::validation("name", "must not be empty"));
    }
    if name.chars().count() > max_len {
        return Err(BoardError::validation(
            "name",
            format!("too long (max {max_len} characters)"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use tidyboard_testing::test_time;

    const MAX: usize = 500;

    fn list_of(names: &[&str]) -> TodoList {
        let mut list = TodoList::new();
        for name in names {
            list.create(NewTodo::named(*name), test_time(), MAX).unwrap();
        }
        list
    }

    fn names(list: &TodoList) -> Vec<&str> {
        list.iter().map(|t| t.name.as_str()).collect()
    }

    fn assert_contiguous(list: &TodoList) {
        for (index, todo) in list.iter().enumerate() {
            assert_eq!(todo.order, index, "order must match position");
        }
    }

    #[test]
    fn create_appends_with_next_order() {
        let list = list_of(&["Buy milk", "Walk dog"]);

        let milk = list.get(TodoId::new(1)).unwrap();
        let dog = list.get(TodoId::new(2)).unwrap();
        assert_eq!(milk.order, 0);
        assert_eq!(dog.order, 1);
        assert_eq!(milk.created_datetime, test_time());
    }

    #[test]
    fn create_rejects_blank_name() {
        let mut list = TodoList::new();
        let err = list.create(NewTodo::named("   "), test_time(), MAX).unwrap_err();

        assert!(matches!(err, BoardError::Validation { ref field, .. } if field == "name"));
        assert!(list.is_empty());
        assert_eq!(list.next_id(), TodoId::new(1));
    }

    #[test]
    fn create_rejects_overlong_name() {
        let mut list = TodoList::new();
        let name = "x".repeat(11);
        assert!(list.create(NewTodo::named(name), test_time(), 10).is_err());
        assert!(list.create(NewTodo::named("x".repeat(10)), test_time(), 10).is_ok());
    }

    #[test]
    fn create_keeps_description_and_deadline() {
        let mut list = TodoList::new();
        let finish = test_time() + Duration::days(1);
        let todo = list
            .create(
                NewTodo::named("Report").with_description("Q3 numbers").with_finish(finish),
                test_time(),
                MAX,
            )
            .unwrap();

        assert_eq!(todo.description, "Q3 numbers");
        assert_eq!(todo.finish_datetime, Some(finish));
    }

    #[test]
    fn move_up_swaps_with_predecessor() {
        let mut list = list_of(&["Buy milk", "Walk dog"]);

        assert!(list.move_up(TodoId::new(2)).unwrap());

        assert_eq!(names(&list), ["Walk dog", "Buy milk"]);
        assert_eq!(list.get(TodoId::new(2)).unwrap().order, 0);
        assert_eq!(list.get(TodoId::new(1)).unwrap().order, 1);
    }

    #[test]
    fn moves_at_boundaries_are_noops() {
        let mut list = list_of(&["a", "b", "c"]);
        let before = list.clone();

        assert!(!list.move_up(TodoId::new(1)).unwrap());
        assert!(!list.move_down(TodoId::new(3)).unwrap());
        assert_eq!(list, before);
    }

    #[test]
    fn move_unknown_id_is_not_found() {
        let mut list = list_of(&["a"]);
        assert_eq!(
            list.move_down(TodoId::new(99)),
            Err(BoardError::TodoNotFound(TodoId::new(99)))
        );
    }

    #[test]
    fn delete_renumbers_and_never_reuses_ids() {
        let mut list = list_of(&["a", "b", "c"]);

        let removed = list.delete(TodoId::new(2)).unwrap();
        assert_eq!(removed.name, "b");
        assert_eq!(names(&list), ["a", "c"]);
        assert_contiguous(&list);

        let d = list.create(NewTodo::named("d"), test_time(), MAX).unwrap();
        assert_eq!(d.id, TodoId::new(4));
        assert_eq!(d.order, 2);
    }

    #[test]
    fn update_merges_fields_and_touches() {
        let mut list = list_of(&["draft"]);
        let later = test_time() + Duration::hours(1);

        let todo = list
            .update(
                TodoId::new(1),
                TodoPatch::default().name("final").description("done soon"),
                later,
                MAX,
            )
            .unwrap();

        assert_eq!(todo.name, "final");
        assert_eq!(todo.description, "done soon");
        assert_eq!(todo.updated_datetime, later);
        assert_eq!(todo.created_datetime, test_time());
    }

    #[test]
    fn update_with_blank_name_changes_nothing() {
        let mut list = list_of(&["keep"]);
        let before = list.clone();

        let result = list.update(
            TodoId::new(1),
            TodoPatch::default().name("").description("ignored"),
            test_time(),
            MAX,
        );

        assert!(result.is_err());
        assert_eq!(list, before);
    }

    #[test]
    fn update_unknown_is_not_found() {
        let mut list = TodoList::new();
        let result = list.update(TodoId::new(5), TodoPatch::default(), test_time(), MAX);
        assert_eq!(result, Err(BoardError::TodoNotFound(TodoId::new(5))));
    }

    #[test]
    fn toggle_complete_flips() {
        let mut list = list_of(&["a"]);
        assert!(list.toggle_complete(TodoId::new(1), test_time()).unwrap().is_complete);
        assert_eq!(list.completed_count(), 1);
        assert!(!list.toggle_complete(TodoId::new(1), test_time()).unwrap().is_complete);
        assert_eq!(list.completed_count(), 0);
    }

    #[test]
    fn from_records_repairs_order_and_tracks_next_id() {
        let a = Todo::new(TodoId::new(3), "a".into(), 5, test_time());
        let b = Todo::new(TodoId::new(8), "b".into(), 1, test_time());

        let list = TodoList::from_records(vec![a, b], 0).unwrap();

        assert_eq!(names(&list), ["b", "a"]);
        assert_contiguous(&list);
        assert_eq!(list.next_id(), TodoId::new(9));
    }

    #[test]
    fn saved_counter_beats_highest_id() {
        let a = Todo::new(TodoId::new(2), "a".into(), 0, test_time());

        let list = TodoList::from_records(vec![a.clone()], 7).unwrap();
        assert_eq!(list.next_id(), TodoId::new(7));

        // A stale counter never goes below the ids actually present
        let list = TodoList::from_records(vec![a], 1).unwrap();
        assert_eq!(list.next_id(), TodoId::new(3));
    }

    #[test]
    fn from_records_rejects_duplicate_ids() {
        let a = Todo::new(TodoId::new(1), "a".into(), 0, test_time());
        let b = Todo::new(TodoId::new(1), "b".into(), 1, test_time());
        assert!(matches!(
            TodoList::from_records(vec![a, b], 0),
            Err(BoardError::InvalidSnapshot(_))
        ));
    }

    #[derive(Debug, Clone)]
    enum Move {
        Up(u64),
        Down(u64),
    }

    fn moves() -> impl Strategy<Value = Vec<Move>> {
        proptest::collection::vec(
            prop_oneof![(1u64..=8).prop_map(Move::Up), (1u64..=8).prop_map(Move::Down)],
            0..64,
        )
    }

    proptest! {
        #[test]
        fn moves_preserve_ids_and_contiguous_order(count in 1usize..8, script in moves()) {
            let mut list = TodoList::new();
            for n in 0..count {
                list.create(NewTodo::named(format!("todo {n}")), test_time(), MAX).unwrap();
            }
            let mut expected: Vec<TodoId> = list.iter().map(|t| t.id).collect();
            expected.sort();

            for step in script {
                let (id, result) = match step {
                    Move::Up(id) => (id, list.move_up(TodoId::new(id))),
                    Move::Down(id) => (id, list.move_down(TodoId::new(id))),
                };
                let known = (id as usize) <= count;
                prop_assert_eq!(result.is_ok(), known);
            }

            let mut ids: Vec<TodoId> = list.iter().map(|t| t.id).collect();
            ids.sort();
            prop_assert_eq!(ids, expected);

            let orders: Vec<usize> = list.iter().map(|t| t.order).collect();
            prop_assert_eq!(orders, (0..count).collect::<Vec<_>>());
        }

        #[test]
        fn up_then_down_restores_order(count in 2usize..8, pick in 0usize..8) {
            let mut list = TodoList::new();
            for n in 0..count {
                list.create(NewTodo::named(format!("todo {n}")), test_time(), MAX).unwrap();
            }
            // Anything but the first item can move up
            let index = 1 + pick % (count - 1);
            let id = list.as_slice()[index].id;
            let before = list.clone();

            prop_assert!(list.move_up(id).unwrap());
            prop_assert!(list.move_down(id).unwrap());
            prop_assert_eq!(list, before);
        }
    }
}
