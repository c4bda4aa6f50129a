use std::time::Duration;

use duogate_core::constants::{
    READER_DRAIN_TIMEOUT_MS, READER_IDLE_BACKOFF_MS, READER_POLL_INTERVAL_MS,
    READER_READ_TIMEOUT_MS,
};
use duogate_hardware::UsbDeviceId;
use serde::{Deserialize, Serialize};

/// Timing and device selection for one card reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// USB scanner to open; `None` runs the reader on a mock scanner.
    pub usb: Option<UsbDeviceId>,

    /// Bound on a single scanner read. A read that times out ends the burst.
    pub read_timeout_ms: u64,

    /// Pause between reads while polling.
    pub poll_interval_ms: u64,

    /// Pause between gate-state checks while the gate is not locked.
    pub idle_backoff_ms: u64,

    /// Bound on each read that discards input while the gate is not locked.
    pub drain_timeout_ms: u64,
}

impl ReaderConfig {
    /// Reader bound to a USB scanner, default timings.
    pub fn usb(id: UsbDeviceId) -> Self {
        Self {
            usb: Some(id),
            ..Self::default()
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            usb: None,
            read_timeout_ms: READER_READ_TIMEOUT_MS,
            poll_interval_ms: READER_POLL_INTERVAL_MS,
            idle_backoff_ms: READER_IDLE_BACKOFF_MS,
            drain_timeout_ms: READER_DRAIN_TIMEOUT_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let config = ReaderConfig::default();
        assert_eq!(config.read_timeout(), Duration::from_millis(100));
        assert_eq!(config.poll_interval(), Duration::from_millis(20));
        assert_eq!(config.idle_backoff(), Duration::from_millis(500));
        assert_eq!(config.drain_timeout(), Duration::from_millis(5));
        assert!(config.usb.is_none());
    }

    #[test]
    fn test_usb_config_from_json() {
        let config: ReaderConfig = serde_json::from_str(
            r#"{"usb":{"vendor_id":1504,"product_id":4608,"serial":"IN-01"}}"#,
        )
        .unwrap();

        assert_eq!(
            config.usb,
            Some(UsbDeviceId::new(0x05e0, 0x1200).with_serial("IN-01"))
        );
        assert_eq!(config.read_timeout_ms, READER_READ_TIMEOUT_MS);
    }
}
