//! Fault injection for the in-memory store
//!
//! Lets tests simulate an unreliable network store: the next N operations
//! (on any connection) fail with a chosen `StoreError`.
//!
//! # Example
//!
//! ```
//! use occ_session_core::StoreError;
//! use occ_session_storage::MemoryStore;
//!
//! let store = MemoryStore::new();
//! store.fail_next(1, StoreError::Timeout("injected".into()));
//! ```

use occ_session_core::StoreError;

/// Store operation kinds, used to scope injected faults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// `watch`
    Watch,
    /// `get`
    Get,
    /// `set`
    Set,
    /// `del`
    Del,
    /// `multi`
    Multi,
    /// `unwatch`
    Unwatch,
}

/// Pending injected failures
#[derive(Debug, Default)]
pub(crate) struct FaultPlan {
    remaining: u32,
    only: Option<StoreOp>,
    error: Option<StoreError>,
}

impl FaultPlan {
    pub(crate) fn arm(&mut self, count: u32, only: Option<StoreOp>, error: StoreError) {
        self.remaining = count;
        self.only = only;
        self.error = Some(error);
    }

    /// Consume one injected failure if one applies to `op`
    pub(crate) fn take(&mut self, op: StoreOp) -> Option<StoreError> {
        if self.remaining == 0 {
            return None;
        }
        if let Some(only) = self.only {
            if only != op {
                return None;
            }
        }
        self.remaining -= 1;
        let err = self.error.clone();
        if self.remaining == 0 {
            self.error = None;
            self.only = None;
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unarmed_plan_never_fails() {
        let mut plan = FaultPlan::default();
        assert!(plan.take(StoreOp::Get).is_none());
    }

    #[test]
    fn test_plan_counts_down() {
        let mut plan = FaultPlan::default();
        plan.arm(2, None, StoreError::Connection("down".into()));
        assert!(plan.take(StoreOp::Get).is_some());
        assert!(plan.take(StoreOp::Set).is_some());
        assert!(plan.take(StoreOp::Get).is_none());
    }

    #[test]
    fn test_scoped_plan_skips_other_ops() {
        let mut plan = FaultPlan::default();
        plan.arm(1, Some(StoreOp::Multi), StoreError::Timeout("exec".into()));
        assert!(plan.take(StoreOp::Watch).is_none());
        assert!(plan.take(StoreOp::Get).is_none());
        assert_eq!(
            plan.take(StoreOp::Multi),
            Some(StoreError::Timeout("exec".into()))
        );
        assert!(plan.take(StoreOp::Multi).is_none());
    }
}
