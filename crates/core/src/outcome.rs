//! Outcomes of session write and destroy operations
//!
//! Store failures are reported through `Err`. Everything else, including
//! "gave up after repeated conflicts", is a variant here so callers can tell
//! the cases apart without parsing logs.

/// Result of `SessionHandler::write`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Key was not watched; the value was set without a condition
    Unconditional,
    /// Conditional commit succeeded on the given attempt (1-based)
    Committed {
        /// Attempt that committed
        attempts: u32,
    },
    /// Every attempt was aborted by a concurrent writer; the write is lost
    RetryExhausted {
        /// Number of aborted attempts
        attempts: u32,
    },
}

impl WriteOutcome {
    /// Whether the data reached the store
    pub fn is_success(&self) -> bool {
        !matches!(self, WriteOutcome::RetryExhausted { .. })
    }
}

/// Result of `SessionHandler::destroy`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    /// The key was deleted
    Destroyed {
        /// Attempt that committed (1 for unconditional deletes)
        attempts: u32,
    },
    /// The id was never watched in this scope; nothing was sent to the store
    NotWatched,
    /// Every conditional delete was aborted by a concurrent writer
    RetryExhausted {
        /// Number of aborted attempts
        attempts: u32,
    },
}

impl DestroyOutcome {
    /// Whether the key was deleted
    pub fn is_success(&self) -> bool {
        matches!(self, DestroyOutcome::Destroyed { .. })
    }
}
