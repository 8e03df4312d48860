//! Reporting of broken internal invariants.
//!
//! These paths are for states that correct upstream code can never produce.
//! Attacker-controlled input must always be rejected with an error instead.

use std::fmt::Display;
use tracing::error;

/// Report a severe invariant violation.
///
/// Panics in debug builds; release builds log and let the caller continue
/// with its fallback value.
pub fn severe(msg: impl Display) {
    error!(target: "stakechain::invariant", "severe: {}", msg);
    if cfg!(debug_assertions) {
        panic!("severe: {}", msg);
    }
}

/// Report a critical invariant violation. Always panics.
pub fn critical(msg: impl Display) -> ! {
    error!(target: "stakechain::invariant", "critical: {}", msg);
    panic!("critical: {}", msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "critical: broken")]
    fn test_critical_panics() {
        critical("broken");
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "severe: broken")]
    fn test_severe_panics_in_debug() {
        severe("broken");
    }
}
