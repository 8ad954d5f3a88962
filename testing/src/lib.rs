//! # Tidyboard Testing
//!
//! Testing utilities and helpers for the Tidyboard state architecture.
//!
//! This crate provides:
//! - Deterministic [`Clock`] implementations
//! - The [`ReducerTest`] Given-When-Then harness
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use tidyboard_testing::{test_clock, ReducerTest};
//!
//! ReducerTest::new(BoardReducer::new())
//!     .with_env(BoardEnvironment::new(Arc::new(test_clock())))
//!     .given_state(BoardState::new())
//!     .when_action(BoardAction::CreateTodo { .. })
//!     .then_state(|state| assert_eq!(state.board.todos().len(), 1))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use tidyboard_core::environment::Clock;


pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use chrono::Duration;
    use std::sync::{Arc, Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use tidyboard_testing::mocks::FixedClock;
    /// use tidyboard_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when told to
    ///
    /// Clones share the same underlying time, so a test can keep one handle
    /// and give another to the environment.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::Duration;
    /// use tidyboard_core::environment::Clock;
    /// use tidyboard_testing::{mocks::ManualClock, test_time};
    ///
    /// let clock = ManualClock::new(test_time());
    /// let shared = clock.clone();
    /// clock.advance(Duration::minutes(5));
    /// assert_eq!(shared.now(), test_time() + Duration::minutes(5));
    /// ```
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        /// Create a manual clock starting at `time`
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock forward (or backward, for a negative duration)
        pub fn advance(&self, by: Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }

        /// Jump to an absolute time
        pub fn set(&self, to: DateTime<Utc>) {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner) = to;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_time())
    }

    /// The instant [`test_clock`] is pinned to (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_time() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default()
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, test_time, FixedClock, ManualClock};
