//! Tests for #[derive(State)] macro

use tidyboard_macros::State;

#[derive(State, Clone, Debug, Default)]
struct CounterSnapshot {
    pub count: i64,
    #[revision]
    pub revision: u64,
}

// No #[revision] field: the derive generates nothing
#[derive(State, Clone, Debug, Default)]
struct PlainState {
    pub count: i32,
}

#[test]
fn test_revision_accessor() {
    let state = CounterSnapshot {
        count: 2,
        revision: 5,
    };
    assert_eq!(state.revision(), 5);
}

#[test]
fn test_bump_revision() {
    let mut state = CounterSnapshot::default();
    assert_eq!(state.bump_revision(), 1);
    assert_eq!(state.bump_revision(), 2);
    assert_eq!(state.revision(), 2);
    assert_eq!(state.count, 0);
}

#[test]
fn test_state_without_revision() {
    let state = PlainState { count: 1 };
    assert_eq!(state.count, 1);
}
