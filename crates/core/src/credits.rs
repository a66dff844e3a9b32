//! Process-wide credit accounting.
//!
//! Credits gate submission and are only charged when a job completes.
//! The ledger is plain data; the job store owns the single instance and
//! mutates it under its own lock.

use crate::error::CoreError;

/// Balance granted to a fresh process.
pub const DEFAULT_INITIAL_CREDITS: i64 = 10;

/// Credits added by one purchase.
pub const DEFAULT_CREDITS_IN_BUNDLE: i64 = 10;

/// Credit balance plus the bundle size used for purchases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditLedger {
    balance: i64,
    bundle_size: i64,
}

impl Default for CreditLedger {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_CREDITS, DEFAULT_CREDITS_IN_BUNDLE)
    }
}

impl CreditLedger {
    pub fn new(initial_balance: i64, bundle_size: i64) -> Self {
        Self {
            balance: initial_balance,
            bundle_size,
        }
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn bundle_size(&self) -> i64 {
        self.bundle_size
    }

    /// Reject submission when the balance is zero or below.
    pub fn ensure_available(&self) -> Result<(), CoreError> {
        if self.balance <= 0 {
            return Err(CoreError::InsufficientCredits {
                balance: self.balance,
            });
        }
        Ok(())
    }

    /// Charge one credit for a completed job and return the new balance.
    ///
    /// Only the gate in [`ensure_available`](Self::ensure_available) keeps the
    /// balance non-negative; jobs already in flight are always charged.
    pub fn charge_completion(&mut self) -> i64 {
        self.balance -= 1;
        self.balance
    }

    /// Add one bundle and return the new balance.
    pub fn purchase_bundle(&mut self) -> i64 {
        self.balance += self.bundle_size;
        self.balance
    }
}
