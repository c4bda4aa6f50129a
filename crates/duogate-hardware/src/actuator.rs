//! Relay-driven gate motor.
//!
//! The motor is not driven by an H-bridge but by two SPDT relays: energizing
//! the first turns it forward, the second backward. Energizing both would
//! short the supply, so every direction change releases the opposite relay
//! before energizing the new one, then waits for the contacts to settle.
//!
//! ```text
//!            forward relay   backward relay
//! Stopped        off              off
//! Forward        ON               off
//! Backward       off              ON
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;
use crate::devices::AnyOutputLine;
use crate::traits::OutputLine;

/// Last commanded motion of an [`Actuator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    Stopped,
    Forward,
    Backward,
}

impl fmt::Display for Motion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Motion::Stopped => "stopped",
            Motion::Forward => "forward",
            Motion::Backward => "backward",
        };
        f.write_str(name)
    }
}

/// Motor driven through two mutually exclusive relay outputs.
///
/// # Examples
///
/// ```
/// use duogate_hardware::actuator::{Actuator, Motion};
/// use duogate_hardware::mock::MockOutputLine;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> duogate_hardware::Result<()> {
/// let (fwd, fwd_handle) = MockOutputLine::new("GPIO17");
/// let (bwd, bwd_handle) = MockOutputLine::new("GPIO27");
/// let mut motor: Actuator = Actuator::new("in", fwd.into(), bwd.into(), Duration::from_millis(1));
///
/// motor.forward().await?;
/// assert_eq!(motor.motion(), Motion::Forward);
/// assert!(fwd_handle.is_active() && !bwd_handle.is_active());
///
/// motor.stop()?;
/// assert!(!fwd_handle.is_active() && !bwd_handle.is_active());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Actuator<O = AnyOutputLine> {
    name: String,
    forward_line: O,
    backward_line: O,
    settle: Duration,
    motion: Motion,
}

impl<O: OutputLine> Actuator<O> {
    /// Create an actuator. The relays are not touched until the first command.
    pub fn new(name: impl Into<String>, forward_line: O, backward_line: O, settle: Duration) -> Self {
        Self {
            name: name.into(),
            forward_line,
            backward_line,
            settle,
            motion: Motion::Stopped,
        }
    }

    /// Run the motor forward and wait for the relays to settle.
    ///
    /// # Errors
    ///
    /// Returns an error if a relay write fails. The forward relay is never
    /// energized unless the backward relay was released first.
    pub async fn forward(&mut self) -> Result<()> {
        self.backward_line.off()?;
        self.forward_line.on()?;
        self.motion = Motion::Forward;
        debug!(actuator = %self.name, "Actuator forward");
        tokio::time::sleep(self.settle).await;
        Ok(())
    }

    /// Run the motor backward and wait for the relays to settle.
    ///
    /// # Errors
    ///
    /// Returns an error if a relay write fails. The backward relay is never
    /// energized unless the forward relay was released first.
    pub async fn backward(&mut self) -> Result<()> {
        self.forward_line.off()?;
        self.backward_line.on()?;
        self.motion = Motion::Backward;
        debug!(actuator = %self.name, "Actuator backward");
        tokio::time::sleep(self.settle).await;
        Ok(())
    }

    /// De-energize both relays. Does not wait.
    ///
    /// # Errors
    ///
    /// Returns an error if a relay write fails; the other relay is still
    /// released.
    pub fn stop(&mut self) -> Result<()> {
        let forward = self.forward_line.off();
        let backward = self.backward_line.off();
        self.motion = Motion::Stopped;
        debug!(actuator = %self.name, "Actuator stop");
        forward.and(backward)
    }

    /// Last commanded motion.
    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// Actuator name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Settle delay applied after each direction change.
    pub fn settle(&self) -> Duration {
        self.settle
    }
}
