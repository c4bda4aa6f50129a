//! Hardware errors.
//!
//! Only [`HardwareError::Disconnected`] is fatal for a scanner task. The rest
//! are per-operation failures: a line write that did not take, a bulk read
//! that saw nothing before its deadline, a device that would not open.

/// Result alias for line and scanner operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// The device is gone: unplugged, or its mock handle dropped.
    #[error("{device} disconnected")]
    Disconnected { device: String },

    /// A bounded read returned nothing in time.
    #[error("Read timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    #[error("{operation} is not supported")]
    Unsupported { operation: String },

    /// A line read or write failed.
    #[error("Communication error: {message}")]
    Communication { message: String },

    /// The device was found but could not be claimed.
    #[error("Cannot open device: {message}")]
    InitializationFailed { message: String },
}

impl HardwareError {
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    pub fn communication(message: impl Into<String>) -> Self {
        Self::Communication {
            message: message.into(),
        }
    }

    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Whether the device is gone for good.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }

    /// Whether a bounded read simply saw no data.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(HardwareError::disconnected("scanner-in"), "scanner-in disconnected")]
    #[case(HardwareError::timeout(100), "Read timed out after 100ms")]
    #[case(HardwareError::unsupported("Pipe"), "Pipe is not supported")]
    #[case(
        HardwareError::communication("GPIO17 write failed"),
        "Communication error: GPIO17 write failed"
    )]
    #[case(
        HardwareError::initialization_failed("05e0:1200: no IN endpoint"),
        "Cannot open device: 05e0:1200: no IN endpoint"
    )]
    fn test_display(#[case] error: HardwareError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_only_disconnect_is_fatal() {
        assert!(HardwareError::disconnected("scanner-out").is_disconnected());
        assert!(!HardwareError::timeout(100).is_disconnected());
        assert!(!HardwareError::communication("GPIO17").is_disconnected());
    }

    #[test]
    fn test_timeout_predicate() {
        assert!(HardwareError::timeout(20).is_timeout());
        assert!(!HardwareError::communication("GPIO5").is_timeout());
    }
}
