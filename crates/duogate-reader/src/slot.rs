//! Single-slot mailbox between a card reader and the gate controller.
//!
//! The reader is the only producer and the controller the only consumer. The
//! slot holds at most one authorized code; the ready flag is a one-shot that
//! the controller reads and clears in one step. The slot stays occupied until
//! the controller clears the code, after the passage it opened is reported or
//! timed out.
//!
//! ```text
//!            latch(code)                 consume_ready()
//! reader ───────────────> [ ready | code ] ──────────────> controller
//!                                  │        clear_code()
//!                                  └──────────────────────<
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use duogate_core::CardCode;
use thiserror::Error;

/// The slot still holds an authorization the controller has not finished with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("an authorized code is still pending")]
pub struct SlotOccupied;

#[derive(Debug, Default)]
struct SlotState {
    ready: bool,
    code: Option<CardCode>,
}

/// Shared handle to one reader's authorization mailbox.
///
/// Clones refer to the same slot.
///
/// # Examples
///
/// ```
/// use duogate_core::CardCode;
/// use duogate_reader::AuthorizationSlot;
///
/// let slot = AuthorizationSlot::new();
/// slot.latch(CardCode::new("1234").unwrap()).unwrap();
///
/// // A second swipe cannot overwrite the first.
/// assert!(slot.latch(CardCode::new("5678").unwrap()).is_err());
///
/// assert!(slot.consume_ready());
/// assert!(!slot.consume_ready());
/// assert_eq!(slot.authorized_code().unwrap().as_str(), "1234");
///
/// // Still occupied until the passage is done with the code.
/// assert!(slot.latch(CardCode::new("5678").unwrap()).is_err());
/// slot.clear_code();
/// assert!(slot.latch(CardCode::new("5678").unwrap()).is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AuthorizationSlot {
    inner: Arc<Mutex<SlotState>>,
}

impl AuthorizationSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an authorized code and raise the ready flag.
    ///
    /// # Errors
    ///
    /// Returns [`SlotOccupied`] while a previous code is waiting or still in
    /// use by a passage; the stored code is left untouched.
    pub fn latch(&self, code: CardCode) -> Result<(), SlotOccupied> {
        let mut state = self.lock();
        if state.ready || state.code.is_some() {
            return Err(SlotOccupied);
        }
        state.ready = true;
        state.code = Some(code);
        Ok(())
    }

    /// Read and clear the ready flag in one step.
    ///
    /// The authorized code stays available until [`clear_code`](Self::clear_code).
    pub fn consume_ready(&self) -> bool {
        std::mem::take(&mut self.lock().ready)
    }

    /// Whether an authorization is waiting, without consuming it.
    pub fn is_ready(&self) -> bool {
        self.lock().ready
    }

    /// Last authorized code, if not cleared.
    pub fn authorized_code(&self) -> Option<CardCode> {
        self.lock().code.clone()
    }

    /// Forget the authorized code.
    pub fn clear_code(&self) {
        self.lock().code = None;
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CardCode {
        CardCode::new(s).unwrap()
    }

    #[test]
    fn test_empty_slot() {
        let slot = AuthorizationSlot::new();
        assert!(!slot.is_ready());
        assert!(!slot.consume_ready());
        assert!(slot.authorized_code().is_none());
    }

    #[test]
    fn test_consume_is_one_shot() {
        let slot = AuthorizationSlot::new();
        slot.latch(code("1234")).unwrap();

        assert!(slot.is_ready());
        assert!(slot.consume_ready());
        assert!(!slot.is_ready());
        assert!(!slot.consume_ready());
    }

    #[test]
    fn test_consume_keeps_code() {
        let slot = AuthorizationSlot::new();
        slot.latch(code("1234")).unwrap();
        slot.consume_ready();

        assert_eq!(slot.authorized_code(), Some(code("1234")));
        slot.clear_code();
        assert_eq!(slot.authorized_code(), None);
    }

    #[test]
    fn test_second_latch_rejected() {
        let slot = AuthorizationSlot::new();
        slot.latch(code("1111")).unwrap();

        assert_eq!(slot.latch(code("2222")), Err(SlotOccupied));
        assert_eq!(slot.authorized_code(), Some(code("1111")));
    }

    #[test]
    fn test_latch_rejected_until_code_cleared() {
        let slot = AuthorizationSlot::new();
        slot.latch(code("1111")).unwrap();
        assert!(slot.consume_ready());

        assert_eq!(slot.latch(code("2222")), Err(SlotOccupied));
        assert_eq!(slot.authorized_code(), Some(code("1111")));
        assert!(!slot.is_ready());

        slot.clear_code();
        slot.latch(code("2222")).unwrap();
        assert_eq!(slot.authorized_code(), Some(code("2222")));
        assert!(slot.is_ready());
    }

    #[test]
    fn test_clones_share_state() {
        let reader_side = AuthorizationSlot::new();
        let controller_side = reader_side.clone();

        reader_side.latch(code("9")).unwrap();
        assert!(controller_side.consume_ready());
        assert!(!reader_side.is_ready());
    }
}
