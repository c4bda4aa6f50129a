use duogate_hardware::HardwareError;
use duogate_network::BackendError;
use thiserror::Error;

/// Result type alias for gate operations.
pub type Result<T> = std::result::Result<T, GateError>;

/// Errors raised by the gate controller.
#[derive(Debug, Error)]
pub enum GateError {
    /// State machine or configuration error.
    #[error(transparent)]
    Core(#[from] duogate_core::Error),

    /// A relay, LED, button or sensor operation failed.
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// The access backend could not be set up.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}
