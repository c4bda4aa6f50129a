//! Enum wrappers for hardware device dispatch.
//!
//! Native `async fn` in traits (RPITIT) is not object-safe, so
//! `Box<dyn ScannerDevice>` is not an option. The gate instead holds these
//! enums, which dispatch to the concrete device at compile time. The line
//! wrappers follow the same pattern so the controller names one concrete type
//! per peripheral kind.
//!
//! # Examples
//!
//! ```
//! use duogate_hardware::devices::AnyOutputLine;
//! use duogate_hardware::mock::MockOutputLine;
//! use duogate_hardware::traits::OutputLine;
//!
//! let (relay, handle) = MockOutputLine::new("GPIO17");
//! let mut relay = AnyOutputLine::Mock(relay);
//!
//! relay.on().unwrap();
//! assert!(handle.is_active());
//! ```

use std::time::Duration;

use crate::mock::{MockInputLine, MockOutputLine, MockScanner};
use crate::traits::{InputLine, OutputLine, ScannerDevice};
use crate::{DeviceInfo, Result};

#[cfg(feature = "hardware-usb")]
use crate::usb::UsbScanner;

/// Enum wrapper for output line dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyOutputLine {
    /// Mock line for development and testing.
    Mock(MockOutputLine),
}

impl OutputLine for AnyOutputLine {
    fn set_active(&mut self, active: bool) -> Result<()> {
        match self {
            Self::Mock(line) => line.set_active(active),
        }
    }

    fn is_active(&self) -> bool {
        match self {
            Self::Mock(line) => line.is_active(),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Mock(line) => OutputLine::name(line),
        }
    }
}

impl From<MockOutputLine> for AnyOutputLine {
    fn from(line: MockOutputLine) -> Self {
        Self::Mock(line)
    }
}

/// Enum wrapper for input line dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyInputLine {
    /// Mock line for development and testing.
    Mock(MockInputLine),
}

impl InputLine for AnyInputLine {
    fn is_active(&self) -> Result<bool> {
        match self {
            Self::Mock(line) => line.is_active(),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Mock(line) => InputLine::name(line),
        }
    }
}

impl From<MockInputLine> for AnyInputLine {
    fn from(line: MockInputLine) -> Self {
        Self::Mock(line)
    }
}

/// Enum wrapper for barcode scanner dispatch.
///
/// # Examples
///
/// ```
/// use duogate_hardware::devices::AnyScannerDevice;
/// use duogate_hardware::traits::ScannerDevice;
/// use duogate_hardware::mock::MockScanner;
///
/// #[tokio::main]
/// async fn main() -> duogate_hardware::Result<()> {
///     let (scanner, _handle) = MockScanner::with_name("scanner-in");
///     let scanner = AnyScannerDevice::Mock(scanner);
///
///     let info = scanner.get_info().await?;
///     assert_eq!(info.name, "scanner-in");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyScannerDevice {
    /// Mock scanner for development and testing.
    Mock(MockScanner),

    /// Scanner attached over USB.
    #[cfg(feature = "hardware-usb")]
    Usb(UsbScanner),
}

impl ScannerDevice for AnyScannerDevice {
    async fn read_chunk(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        match self {
            Self::Mock(device) => device.read_chunk(timeout).await,
            #[cfg(feature = "hardware-usb")]
            Self::Usb(device) => device.read_chunk(timeout).await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
            #[cfg(feature = "hardware-usb")]
            Self::Usb(device) => device.get_info().await,
        }
    }
}

impl From<MockScanner> for AnyScannerDevice {
    fn from(device: MockScanner) -> Self {
        Self::Mock(device)
    }
}
