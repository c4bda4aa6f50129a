//! Gate wiring and timing configuration.
//!
//! [`GateConfig::default`] carries the pin map of the reference build: relays
//! and LEDs wired active-low, buttons and motion sensors active-high.

use std::time::Duration;

use duogate_core::Direction;
use duogate_core::constants::{FAIL_SAFE_TIMEOUT_MS, RELAY_SETTLE_MS, TICK_PERIOD_MS};
use duogate_hardware::{LineConfig, UsbDeviceId};
use duogate_network::BackendConfig;
use duogate_reader::ReaderConfig;
use serde::{Deserialize, Serialize};

/// Vendor ID of the inbound USB scanner.
pub const IN_SCANNER_VENDOR_ID: u16 = 0x05e0;

/// Product ID of the inbound USB scanner.
pub const IN_SCANNER_PRODUCT_ID: u16 = 0x1200;

/// The two relays of one motor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorConfig {
    /// Energized to swing the leaf open.
    pub forward: LineConfig,

    /// Energized to swing it back.
    pub backward: LineConfig,
}

impl ActuatorConfig {
    fn active_low(forward: &str, backward: &str) -> Self {
        Self {
            forward: LineConfig::active_low(forward),
            backward: LineConfig::active_low(backward),
        }
    }
}

/// Lines and reader serving one passage direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideConfig {
    pub actuator: ActuatorConfig,
    pub led: LineConfig,
    pub button: LineConfig,
    pub motion: LineConfig,
    pub reader: ReaderConfig,
}

/// Complete gate configuration.
///
/// # Example
///
/// ```
/// use duogate_controller::GateConfig;
/// use duogate_core::Direction;
///
/// let config = GateConfig::default();
/// assert_eq!(config.side(Direction::In).actuator.forward.pin, "GPIO17");
/// assert_eq!(config.fail_safe_timeout().as_secs(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub inbound: SideConfig,
    pub outbound: SideConfig,
    pub stop_led: LineConfig,
    pub backend: BackendConfig,
    pub tick_period_ms: u64,
    pub fail_safe_timeout_ms: u64,
    pub relay_settle_ms: u64,
}

impl GateConfig {
    /// Configuration of the side serving `direction`.
    pub fn side(&self, direction: Direction) -> &SideConfig {
        match direction {
            Direction::In => &self.inbound,
            Direction::Out => &self.outbound,
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn fail_safe_timeout(&self) -> Duration {
        Duration::from_millis(self.fail_safe_timeout_ms)
    }

    pub fn relay_settle(&self) -> Duration {
        Duration::from_millis(self.relay_settle_ms)
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            inbound: SideConfig {
                actuator: ActuatorConfig::active_low("GPIO17", "GPIO27"),
                led: LineConfig::active_low("GPIO5"),
                button: LineConfig::active_high("GPIO19"),
                motion: LineConfig::active_high("GPIO20"),
                reader: ReaderConfig::usb(UsbDeviceId::new(
                    IN_SCANNER_VENDOR_ID,
                    IN_SCANNER_PRODUCT_ID,
                )),
            },
            outbound: SideConfig {
                actuator: ActuatorConfig::active_low("GPIO23", "GPIO24"),
                led: LineConfig::active_low("GPIO6"),
                button: LineConfig::active_high("GPIO26"),
                motion: LineConfig::active_high("GPIO21"),
                reader: ReaderConfig::default(),
            },
            stop_led: LineConfig::active_low("GPIO13"),
            backend: BackendConfig::default(),
            tick_period_ms: TICK_PERIOD_MS,
            fail_safe_timeout_ms: FAIL_SAFE_TIMEOUT_MS,
            relay_settle_ms: RELAY_SETTLE_MS,
        }
    }
}
