//! Timing and wire constants shared by every gate component.
//!
//! All durations are expressed in milliseconds, matching how they are stored
//! in configuration. Convert with [`std::time::Duration::from_millis`].
//!
//! # Timing Overview
//!
//! ```text
//! control loop   |--100ms--|--100ms--|--100ms--| ...
//! reader poll    |-20ms-|read<=100ms|-20ms-| ...   (only while Locked)
//! reader idle    |------500ms------|------500ms------| (otherwise)
//! passage state  |<--------------- 4000ms fail-safe --------------->|
//! ```
//!
//! # Usage
//!
//! ```
//! use duogate_core::constants::*;
//! use std::time::Duration;
//!
//! let fail_safe = Duration::from_millis(FAIL_SAFE_TIMEOUT_MS);
//! assert_eq!(fail_safe, Duration::from_secs(4));
//! ```

// ============================================================================
// Control Loop
// ============================================================================

/// Period between two control-loop ticks.
pub const TICK_PERIOD_MS: u64 = 100;

/// Time after which an open gate state reverts to Locked when nothing
/// (motion or override button) keeps it open.
///
/// Checked after the motion and button guards of the same tick, so activity
/// always wins over the timeout.
pub const FAIL_SAFE_TIMEOUT_MS: u64 = 4000;

/// Number of state transitions retained for diagnostics.
pub const MAX_TRANSITION_HISTORY: usize = 100;

// ============================================================================
// Actuator
// ============================================================================

/// Delay after a direction change before the relays are considered stable.
///
/// Mechanical SPDT relays need this long to settle; reversing sooner can
/// short the motor supply through both contacts.
pub const RELAY_SETTLE_MS: u64 = 200;

// ============================================================================
// Card Reader
// ============================================================================

/// Pause between two scanner reads while polling.
pub const READER_POLL_INTERVAL_MS: u64 = 20;

/// Upper bound of a single scanner read. Expiry ends the current burst.
pub const READER_READ_TIMEOUT_MS: u64 = 100;

/// Back-off between checks while the gate is not Locked.
pub const READER_IDLE_BACKOFF_MS: u64 = 500;

/// Bound on each read that empties the scanner while the gate is not Locked.
///
/// Non-zero: libusb treats a zero timeout as "wait forever".
pub const READER_DRAIN_TIMEOUT_MS: u64 = 5;

/// Longest card code accepted from a scanner burst.
pub const MAX_CARD_CODE_LENGTH: usize = 64;

// ============================================================================
// Authorization Backend
// ============================================================================

/// Body prefix the backend uses to accept a card.
pub const DEFAULT_ACCEPT_PREFIX: &str = "OK";

/// Default timeout for a single backend request.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 3000;

/// Query parameter carrying the card code.
pub const PARAM_CODE: &str = "code";

/// Query parameter carrying the direction tag (`in` / `out`).
pub const PARAM_DIRECTION: &str = "direction";

/// Query parameter asking the backend for a verbose answer (`0` / `1`).
pub const PARAM_VERBOSE: &str = "verbose";

/// Query parameter marking a passage notification (always `1`).
pub const PARAM_PASSED: &str = "passed";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_multiple_of_tick() {
        assert_eq!(FAIL_SAFE_TIMEOUT_MS % TICK_PERIOD_MS, 0);
    }

    #[test]
    fn test_read_timeout_shorter_than_idle_backoff() {
        assert!(READER_READ_TIMEOUT_MS < READER_IDLE_BACKOFF_MS);
    }
}
