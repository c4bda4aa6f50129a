//! Hardware device trait definitions.
//!
//! These traits are the boundary between the gate logic and the physical
//! peripherals: relay and LED outputs, button and motion-sensor inputs, and
//! the barcode scanners. Real drivers and the mocks in [`crate::mock`] both
//! implement them.
//!
//! Digital lines are synchronous; a GPIO write or read does not suspend.
//! Scanner reads are `async fn` methods (Rust 1.90 + Edition 2024 RPITIT) with
//! a caller-specified timeout.

#![allow(async_fn_in_trait)]

use std::time::Duration;

use crate::error::Result;
use crate::types::DeviceInfo;

/// A digital output (relay coil, LED).
///
/// `active` is the logical state; polarity is handled by the implementation.
pub trait OutputLine: Send + Sync {
    /// Drive the line to the given logical state.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying driver rejects the write.
    fn set_active(&mut self, active: bool) -> Result<()>;

    /// Last logical state written to the line.
    fn is_active(&self) -> bool;

    /// Pin or channel label, used in logs.
    fn name(&self) -> &str;

    /// Shorthand for `set_active(true)`.
    fn on(&mut self) -> Result<()> {
        self.set_active(true)
    }

    /// Shorthand for `set_active(false)`.
    fn off(&mut self) -> Result<()> {
        self.set_active(false)
    }
}

/// A digital input (push button, motion sensor).
pub trait InputLine: Send + Sync {
    /// Sample the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying driver cannot read the pin.
    fn is_active(&self) -> Result<bool>;

    /// Pin or channel label, used in logs.
    fn name(&self) -> &str;
}

/// A barcode scanner delivering raw bytes.
///
/// Each successful read returns the bytes of one transfer. A card swipe
/// arrives as a run of transfers; the run ends with a read that times out.
///
/// # Examples
///
/// ```no_run
/// use duogate_hardware::traits::ScannerDevice;
/// use duogate_hardware::Result;
/// use std::time::Duration;
///
/// async fn read_burst<S: ScannerDevice>(scanner: &mut S) -> Result<Vec<u8>> {
///     let mut burst = Vec::new();
///     while let Ok(chunk) = scanner.read_chunk(Duration::from_millis(100)).await {
///         burst.extend(chunk);
///     }
///     Ok(burst)
/// }
/// ```
pub trait ScannerDevice: Send + Sync {
    /// Read the next transfer, waiting at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `HardwareError::Timeout` when nothing arrived in time
    /// - `HardwareError::Disconnected` when the device is gone
    /// - other variants for transient communication failures
    async fn read_chunk(&mut self, timeout: Duration) -> Result<Vec<u8>>;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be queried.
    async fn get_info(&self) -> Result<DeviceInfo>;
}
