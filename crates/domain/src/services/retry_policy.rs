//! Delivery retry policy.
//!
//! Each claim is one delivery attempt. The claim that uses up the last
//! attempt still delivers the command, but marks it abandoned so it is not
//! handed out again.

/// Default number of delivery attempts before a command is abandoned.
pub const DEFAULT_MAX_DELIVERY_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    /// Creates a policy allowing `max_attempts` deliveries (at least one).
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Smallest pre-claim `try_count` at which the claim abandons the command.
    ///
    /// Bound into the claim statement so the decision is taken on the same
    /// row version that gets incremented.
    pub fn abandon_threshold(&self) -> i32 {
        i32::try_from(self.max_attempts - 1).unwrap_or(i32::MAX)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DELIVERY_ATTEMPTS)
    }
}
