//! Integration tests for the CardReader task loop
//!
//! The reader runs on the paused Tokio clock next to a driver future that
//! feeds the mock scanner, flips the watched gate state and finally cancels
//! the task.

use std::time::Duration;

use duogate_core::{Direction, GateState};
use duogate_hardware::AnyScannerDevice;
use duogate_hardware::mock::MockScanner;
use duogate_network::{AnyBackend, MockBackend, MockResponse};
use duogate_reader::{CardReader, ReaderConfig};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn test_swipe_latches_while_locked() {
    let (scanner, handle) = MockScanner::with_name("scanner-out");
    let backend = MockBackend::with_response(MockResponse::Grant);
    let (reader, slot) = CardReader::new(
        Direction::Out,
        AnyScannerDevice::from(scanner),
        AnyBackend::from(backend.clone()),
        ReaderConfig::default(),
    );
    let (_state_tx, state_rx) = watch::channel(GateState::Locked);
    let cancel = CancellationToken::new();

    let driver = async {
        handle.swipe("1234").await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();
    };

    let (result, ()) = tokio::join!(reader.run(state_rx, cancel.clone()), driver);

    result.unwrap();
    assert!(slot.consume_ready());
    assert_eq!(slot.authorized_code().unwrap().as_str(), "1234");
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_swipe_outside_locked_is_discarded() {
    let (scanner, handle) = MockScanner::new();
    let backend = MockBackend::with_response(MockResponse::Grant);
    let (reader, slot) = CardReader::new(
        Direction::In,
        scanner,
        backend.clone(),
        ReaderConfig::default(),
    );
    let (state_tx, state_rx) = watch::channel(GateState::FreeEnter);
    let cancel = CancellationToken::new();

    let driver = async {
        handle.swipe("4321").await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert!(backend.calls().is_empty());
        assert!(!slot.is_ready());

        // Swiped just before the gate locks again: still mid-cycle.
        handle.swipe("8765").await.unwrap();
        state_tx.send(GateState::Locked).unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(backend.calls().is_empty());
        assert!(!slot.is_ready());

        handle.swipe("1234").await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();
    };

    let (result, ()) = tokio::join!(reader.run(state_rx, cancel.clone()), driver);

    result.unwrap();
    assert!(slot.is_ready());
    assert_eq!(slot.authorized_code().unwrap().as_str(), "1234");
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_ends_task() {
    let (scanner, handle) = MockScanner::new();
    let (reader, _slot) = CardReader::new(
        Direction::In,
        scanner,
        MockBackend::new(),
        ReaderConfig::default(),
    );
    let (_state_tx, state_rx) = watch::channel(GateState::Locked);
    drop(handle);

    let result = reader.run(state_rx, CancellationToken::new()).await;

    assert!(result.unwrap_err().is_disconnected());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_idle_reader() {
    let (scanner, _handle) = MockScanner::new();
    let (reader, _slot) = CardReader::new(
        Direction::In,
        scanner,
        MockBackend::new(),
        ReaderConfig::default(),
    );
    let (_state_tx, state_rx) = watch::channel(GateState::Freewheel);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = tokio::time::timeout(
        Duration::from_secs(1),
        reader.run(state_rx, cancel),
    )
    .await;

    assert!(matches!(result, Ok(Ok(()))));
}
