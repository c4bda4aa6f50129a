//! Common types shared across hardware device implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generic device information.
///
/// Contains metadata about a hardware device such as name, model and
/// serial number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "scanner-in", "GPIO17").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional device serial number.
    pub serial_number: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            serial_number: None,
        }
    }

    /// Set the serial number.
    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }
}

/// Electrical polarity of a digital line.
///
/// Trait methods always speak in terms of *active* (relay energized, LED lit,
/// button pressed, motion present). The polarity maps that onto the raw
/// electrical level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// High level means active.
    #[default]
    ActiveHigh,

    /// Low level means active (relay boards, sinking LEDs, pull-up buttons).
    ActiveLow,
}

impl Polarity {
    /// Raw level for the given logical state.
    #[inline]
    #[must_use]
    pub fn level(self, active: bool) -> bool {
        match self {
            Self::ActiveHigh => active,
            Self::ActiveLow => !active,
        }
    }

    /// Logical state for the given raw level.
    #[inline]
    #[must_use]
    pub fn is_active(self, level: bool) -> bool {
        // The mapping is its own inverse.
        self.level(level)
    }
}

/// A named digital line with its polarity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineConfig {
    /// Pin or channel label, e.g. "GPIO17".
    pub pin: String,

    /// How the logical state maps to the electrical level.
    #[serde(default)]
    pub polarity: Polarity,
}

impl LineConfig {
    /// Active-high line.
    pub fn active_high(pin: impl Into<String>) -> Self {
        Self {
            pin: pin.into(),
            polarity: Polarity::ActiveHigh,
        }
    }

    /// Active-low line.
    pub fn active_low(pin: impl Into<String>) -> Self {
        Self {
            pin: pin.into(),
            polarity: Polarity::ActiveLow,
        }
    }
}

/// USB identity of a barcode scanner.
///
/// Two identical scanners share vendor and product IDs, so the serial number
/// is what tells the inbound scanner from the outbound one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsbDeviceId {
    /// USB vendor ID.
    pub vendor_id: u16,

    /// USB product ID.
    pub product_id: u16,

    /// Optional serial number to disambiguate identical devices.
    #[serde(default)]
    pub serial: Option<String>,
}

impl UsbDeviceId {
    /// Match any device with this vendor/product pair.
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
            serial: None,
        }
    }

    /// Only match the device with this serial number.
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }
}

impl fmt::Display for UsbDeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)?;
        if let Some(serial) = &self.serial {
            write!(f, " ({serial})")?;
        }
        Ok(())
    }
}
