//! Mock barcode scanner implementation for testing and development.
//!
//! The scanner receives transfers through a channel. A read waits for the
//! next transfer for at most the caller's timeout, so a swipe pushed through
//! the handle is seen as a burst followed by a timeout, exactly like a real
//! USB scanner.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::{HardwareError, Result, traits::ScannerDevice, types::DeviceInfo};

/// Mock barcode scanner.
///
/// # Examples
///
/// ```
/// use duogate_hardware::mock::MockScanner;
/// use duogate_hardware::traits::ScannerDevice;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> duogate_hardware::Result<()> {
///     let (mut scanner, handle) = MockScanner::new();
///
///     handle.send_chunk(b"12".to_vec()).await?;
///
///     let chunk = scanner.read_chunk(Duration::from_millis(100)).await?;
///     assert_eq!(chunk, b"12");
///
///     // Nothing more queued: the read times out.
///     assert!(scanner.read_chunk(Duration::from_millis(10)).await.is_err());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockScanner {
    /// Channel receiver for simulated transfers
    chunk_rx: mpsc::Receiver<Vec<u8>>,

    /// Device name
    name: String,
}

impl MockScanner {
    /// Create a new mock scanner with the default name.
    pub fn new() -> (Self, MockScannerHandle) {
        Self::with_name("Mock Scanner")
    }

    /// Create a new mock scanner with a custom name.
    pub fn with_name(name: impl Into<String>) -> (Self, MockScannerHandle) {
        let name = name.into();
        let (chunk_tx, chunk_rx) = mpsc::channel(256);

        let scanner = Self {
            chunk_rx,
            name: name.clone(),
        };
        let handle = MockScannerHandle { chunk_tx, name };

        (scanner, handle)
    }
}

impl ScannerDevice for MockScanner {
    async fn read_chunk(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        match tokio::time::timeout(timeout, self.chunk_rx.recv()).await {
            Ok(Some(chunk)) => Ok(chunk),
            Ok(None) => Err(HardwareError::disconnected(format!(
                "{}: handle dropped",
                self.name
            ))),
            Err(_) => Err(HardwareError::timeout(timeout.as_millis() as u64)),
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock"))
    }
}

/// Handle for feeding a [`MockScanner`].
///
/// Dropping every handle disconnects the scanner.
#[derive(Debug, Clone)]
pub struct MockScannerHandle {
    chunk_tx: mpsc::Sender<Vec<u8>>,
    name: String,
}

impl MockScannerHandle {
    /// Queue one raw transfer.
    ///
    /// # Errors
    ///
    /// Returns an error if the scanner has been dropped.
    pub async fn send_chunk(&self, chunk: Vec<u8>) -> Result<()> {
        self.chunk_tx
            .send(chunk)
            .await
            .map_err(|_| HardwareError::disconnected(format!("{}: scanner dropped", self.name)))
    }

    /// Simulate a card swipe: the code framed by STX/CR control bytes, one
    /// byte per transfer as a keyboard-wedge scanner reports it.
    ///
    /// # Errors
    ///
    /// Returns an error if the scanner has been dropped.
    pub async fn swipe(&self, code: &str) -> Result<()> {
        self.send_chunk(vec![0x02]).await?;
        for byte in code.bytes() {
            self.send_chunk(vec![byte]).await?;
        }
        self.send_chunk(vec![b'\r']).await
    }

    /// Device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
