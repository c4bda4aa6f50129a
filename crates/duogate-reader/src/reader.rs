//! Card reader task.
//!
//! One `CardReader` runs per scanner. While the gate is locked it reads the
//! scanner in short bounded reads, keeps the digits, and treats the first
//! read that fails (usually a timeout) as the end of a swipe. The collected
//! code is then authorized against the backend and, if granted, latched into
//! the reader's [`AuthorizationSlot`].
//!
//! Polling and authorization share one task, so a card presented while an
//! authorization is in flight is not read until the call returns.

use std::fmt;

use duogate_core::constants::MAX_CARD_CODE_LENGTH;
use duogate_core::{CardCode, Direction, GateState};
use duogate_hardware::{AnyScannerDevice, ScannerDevice};
use duogate_network::{AccessBackend, AnyBackend, AuthorizationOutcome};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ReaderConfig;
use crate::slot::AuthorizationSlot;

/// What became of one swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// Granted and stored in the slot.
    Latched,

    /// The backend answered with a rejection.
    Denied,

    /// No answer from the backend.
    Failed,

    /// Granted, but the slot still held an unconsumed authorization.
    Discarded,
}

impl fmt::Display for SwipeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SwipeOutcome::Latched => "latched",
            SwipeOutcome::Denied => "denied",
            SwipeOutcome::Failed => "failed",
            SwipeOutcome::Discarded => "discarded",
        };
        f.write_str(s)
    }
}

/// Append the ASCII digits of `chunk` to `buffer`, up to the code length limit.
pub fn push_digits(buffer: &mut Vec<u8>, chunk: &[u8]) {
    let room = MAX_CARD_CODE_LENGTH.saturating_sub(buffer.len());
    buffer.extend(chunk.iter().copied().filter(u8::is_ascii_digit).take(room));
}

/// Barcode card reader for one passage direction.
pub struct CardReader<S = AnyScannerDevice, B = AnyBackend> {
    direction: Direction,
    scanner: S,
    backend: B,
    slot: AuthorizationSlot,
    config: ReaderConfig,
    buffer: Vec<u8>,
}

impl<S: ScannerDevice, B: AccessBackend> CardReader<S, B> {
    /// Create a reader and the slot the controller consumes from.
    pub fn new(
        direction: Direction,
        scanner: S,
        backend: B,
        config: ReaderConfig,
    ) -> (Self, AuthorizationSlot) {
        let slot = AuthorizationSlot::new();
        let reader = Self {
            direction,
            scanner,
            backend,
            slot: slot.clone(),
            config,
            buffer: Vec::with_capacity(MAX_CARD_CODE_LENGTH),
        };
        (reader, slot)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Digits collected for the swipe in progress.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Authorize `code` and latch it into the slot if granted.
    ///
    /// Exactly one backend call, no retry.
    pub async fn authorize(&self, code: CardCode) -> SwipeOutcome {
        let direction = self.direction;

        match self.backend.authorize(&code, direction).await {
            Ok(AuthorizationOutcome::Granted) => match self.slot.latch(code) {
                Ok(()) => {
                    info!(%direction, "Card authorized");
                    SwipeOutcome::Latched
                }
                Err(e) => {
                    warn!(%direction, "Authorized swipe discarded: {e}");
                    SwipeOutcome::Discarded
                }
            },
            Ok(AuthorizationOutcome::Denied { status, .. }) => {
                info!(%direction, status, "Card rejected");
                SwipeOutcome::Denied
            }
            Err(e) => {
                warn!(%direction, error = %e, "Authorization failed");
                SwipeOutcome::Failed
            }
        }
    }

    /// Perform one bounded read.
    ///
    /// Returns `Some` when the read ended a non-empty burst and the code was
    /// submitted for authorization.
    ///
    /// # Errors
    ///
    /// Returns the device error if the scanner is disconnected. Any other read
    /// error only ends the burst.
    pub async fn poll_once(&mut self) -> duogate_hardware::Result<Option<SwipeOutcome>> {
        match self.scanner.read_chunk(self.config.read_timeout()).await {
            Ok(chunk) => {
                push_digits(&mut self.buffer, &chunk);
                Ok(None)
            }
            Err(e) if e.is_disconnected() => Err(e),
            Err(e) => {
                if !e.is_timeout() {
                    debug!(direction = %self.direction, error = %e, "Scanner read failed");
                }
                let burst = std::mem::take(&mut self.buffer);
                match CardCode::from_raw(&burst) {
                    Some(code) => {
                        debug!(direction = %self.direction, %code, "Card read");
                        Ok(Some(self.authorize(code).await))
                    }
                    None => Ok(None),
                }
            }
        }
    }

    /// Read and discard everything the scanner has queued, along with the
    /// partial burst.
    ///
    /// Returns the number of bytes dropped.
    ///
    /// # Errors
    ///
    /// Returns the device error if the scanner is disconnected.
    pub async fn drain(&mut self) -> duogate_hardware::Result<usize> {
        let mut dropped = std::mem::take(&mut self.buffer).len();

        loop {
            match self.scanner.read_chunk(self.config.drain_timeout()).await {
                Ok(chunk) => dropped += chunk.len(),
                Err(e) if e.is_disconnected() => return Err(e),
                Err(_) => break,
            }
        }

        if dropped > 0 {
            debug!(direction = %self.direction, dropped, "Scanner input discarded");
        }
        Ok(dropped)
    }

    /// Poll the scanner until cancelled, but only while the gate is locked.
    ///
    /// Outside `Locked` the task discards scanner input and checks the gate
    /// state every idle backoff period. Input is discarded once more when the
    /// gate locks again, so nothing swiped mid-cycle is authorized later.
    ///
    /// # Errors
    ///
    /// Returns the device error if the scanner disconnects.
    pub async fn run(
        mut self,
        gate: watch::Receiver<GateState>,
        cancel: CancellationToken,
    ) -> duogate_hardware::Result<()> {
        let direction = self.direction;
        info!(%direction, "Card reader started");

        let mut idle = false;
        loop {
            let locked = *gate.borrow() == GateState::Locked;

            if !locked || std::mem::take(&mut idle) {
                let drained = tokio::select! {
                    _ = cancel.cancelled() => break,
                    drained = self.drain() => drained,
                };
                if let Err(e) = drained {
                    warn!(%direction, error = %e, "Scanner disconnected");
                    return Err(e);
                }

                if !locked {
                    idle = true;
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(self.config.idle_backoff()) => continue,
                    }
                }
            }

            let polled = tokio::select! {
                _ = cancel.cancelled() => break,
                polled = self.poll_once() => polled,
            };
            if let Err(e) = polled {
                warn!(%direction, error = %e, "Scanner disconnected");
                return Err(e);
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.poll_interval()) => {}
            }
        }

        info!(%direction, "Card reader stopped");
        Ok(())
    }
}

impl<S, B> fmt::Debug for CardReader<S, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardReader")
            .field("direction", &self.direction)
            .field("pending", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duogate_hardware::mock::{MockScanner, MockScannerHandle};
    use duogate_network::{BackendCall, MockBackend, MockResponse};
    use proptest::prelude::*;
    use rstest::rstest;

    fn reader(
        response: MockResponse,
    ) -> (CardReader<MockScanner, MockBackend>, MockScannerHandle, MockBackend, AuthorizationSlot)
    {
        let (scanner, handle) = MockScanner::new();
        let backend = MockBackend::with_response(response);
        let (reader, slot) =
            CardReader::new(Direction::In, scanner, backend.clone(), ReaderConfig::default());
        (reader, handle, backend, slot)
    }

    /// Poll until a burst ends.
    async fn read_swipe(reader: &mut CardReader<MockScanner, MockBackend>) -> SwipeOutcome {
        loop {
            if let Some(outcome) = reader.poll_once().await.unwrap() {
                return outcome;
            }
        }
    }

    #[test]
    fn test_push_digits_filters_control_bytes() {
        let mut buffer = Vec::new();
        push_digits(&mut buffer, b"\x0212");
        push_digits(&mut buffer, b"34\r\n");
        assert_eq!(buffer, b"1234");
    }

    #[test]
    fn test_push_digits_caps_length() {
        let mut buffer = vec![b'1'; MAX_CARD_CODE_LENGTH - 1];
        push_digits(&mut buffer, b"234");
        assert_eq!(buffer.len(), MAX_CARD_CODE_LENGTH);
        assert_eq!(buffer.last(), Some(&b'2'));
    }

    proptest! {
        #[test]
        fn prop_buffer_holds_only_digits(chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), 0..16)) {
            let mut buffer = Vec::new();
            for chunk in &chunks {
                push_digits(&mut buffer, chunk);
            }

            let expected: Vec<u8> = chunks
                .iter()
                .flatten()
                .copied()
                .filter(u8::is_ascii_digit)
                .take(MAX_CARD_CODE_LENGTH)
                .collect();
            prop_assert_eq!(buffer, expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_bracketed_burst_decodes_to_code() {
        let (mut reader, handle, backend, slot) = reader(MockResponse::Grant);
        handle.swipe("1234").await.unwrap();

        assert_eq!(read_swipe(&mut reader).await, SwipeOutcome::Latched);
        assert_eq!(
            backend.calls(),
            vec![BackendCall::Authorize {
                code: CardCode::new("1234").unwrap(),
                direction: Direction::In
            }]
        );
        assert!(slot.is_ready());
        assert_eq!(slot.authorized_code().unwrap().as_str(), "1234");
    }

    #[rstest]
    #[case(MockResponse::Deny, SwipeOutcome::Denied)]
    #[case(MockResponse::Fail, SwipeOutcome::Failed)]
    #[tokio::test(start_paused = true)]
    async fn test_rejection_leaves_slot_empty(
        #[case] response: MockResponse,
        #[case] expected: SwipeOutcome,
    ) {
        let (mut reader, handle, _backend, slot) = reader(response);
        handle.swipe("1234").await.unwrap();

        assert_eq!(read_swipe(&mut reader).await, expected);
        assert!(!slot.is_ready());
        assert!(slot.authorized_code().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_swipe_discarded_while_unconsumed() {
        let (mut reader, handle, _backend, slot) = reader(MockResponse::Grant);

        handle.swipe("1111").await.unwrap();
        assert_eq!(read_swipe(&mut reader).await, SwipeOutcome::Latched);

        handle.swipe("2222").await.unwrap();
        assert_eq!(read_swipe(&mut reader).await, SwipeOutcome::Discarded);

        assert_eq!(slot.authorized_code().unwrap().as_str(), "1111");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_burst_ignored() {
        let (mut reader, handle, backend, _slot) = reader(MockResponse::Grant);
        handle.send_chunk(vec![0x02, b'\r']).await.unwrap();

        assert_eq!(reader.poll_once().await.unwrap(), None);
        assert_eq!(reader.poll_once().await.unwrap(), None);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_discards_queued_swipe() {
        let (mut reader, handle, backend, slot) = reader(MockResponse::Grant);
        handle.send_chunk(b"12".to_vec()).await.unwrap();
        assert_eq!(reader.poll_once().await.unwrap(), None);
        handle.swipe("34").await.unwrap();

        // Partial "12" plus STX, "3", "4" and CR.
        assert_eq!(reader.drain().await.unwrap(), 6);
        assert!(reader.pending().is_empty());

        assert_eq!(reader.poll_once().await.unwrap(), None);
        assert!(backend.calls().is_empty());
        assert!(!slot.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_reports_disconnect() {
        let (mut reader, handle, _backend, _slot) = reader(MockResponse::Grant);
        drop(handle);

        assert!(reader.drain().await.unwrap_err().is_disconnected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_is_an_error() {
        let (mut reader, handle, _backend, _slot) = reader(MockResponse::Grant);
        drop(handle);

        let result = reader.poll_once().await;
        assert!(result.unwrap_err().is_disconnected());
    }
}
