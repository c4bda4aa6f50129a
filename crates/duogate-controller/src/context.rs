//! Hardware and collaborators shared by every gate state.

use std::time::Duration;

use duogate_core::Direction;
use duogate_hardware::{Actuator, AnyInputLine, AnyOutputLine, InputLine, OutputLine, Result};
use duogate_network::{AccessBackend, AnyBackend};
use duogate_reader::AuthorizationSlot;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Everything serving one passage direction.
#[derive(Debug)]
pub struct GateSide {
    pub actuator: Actuator,
    pub led: AnyOutputLine,
    pub button: AnyInputLine,
    pub motion: AnyInputLine,
    pub slot: AuthorizationSlot,
}

/// Context handed to every state hook.
#[derive(Debug)]
pub struct GateContext {
    inbound: GateSide,
    outbound: GateSide,
    stop_led: AnyOutputLine,
    backend: AnyBackend,
    fail_safe_timeout: Duration,
}

impl GateContext {
    pub fn new(
        inbound: GateSide,
        outbound: GateSide,
        stop_led: AnyOutputLine,
        backend: AnyBackend,
        fail_safe_timeout: Duration,
    ) -> Self {
        Self {
            inbound,
            outbound,
            stop_led,
            backend,
            fail_safe_timeout,
        }
    }

    pub fn side(&self, direction: Direction) -> &GateSide {
        match direction {
            Direction::In => &self.inbound,
            Direction::Out => &self.outbound,
        }
    }

    pub fn side_mut(&mut self, direction: Direction) -> &mut GateSide {
        match direction {
            Direction::In => &mut self.inbound,
            Direction::Out => &mut self.outbound,
        }
    }

    pub fn stop_led_mut(&mut self) -> &mut AnyOutputLine {
        &mut self.stop_led
    }

    pub fn fail_safe_timeout(&self) -> Duration {
        self.fail_safe_timeout
    }

    /// Whether `entered_at` is at least one fail-safe timeout ago.
    pub fn timed_out(&self, entered_at: Instant) -> bool {
        entered_at.elapsed() >= self.fail_safe_timeout
    }

    /// Sample the override button of `direction`.
    pub fn button_active(&self, direction: Direction) -> Result<bool> {
        self.side(direction).button.is_active()
    }

    pub fn both_buttons_active(&self) -> Result<bool> {
        Ok(self.button_active(Direction::In)? && self.button_active(Direction::Out)?)
    }

    /// Either motion sensor reports the gate moving.
    pub fn gate_moving(&self) -> Result<bool> {
        Ok(self.inbound.motion.is_active()? || self.outbound.motion.is_active()?)
    }

    /// Swing the leaf of `direction` open and light its LED.
    pub async fn open(&mut self, direction: Direction) -> Result<()> {
        let side = self.side_mut(direction);
        side.actuator.forward().await?;
        side.led.on()
    }

    /// Stop both motors and clear both direction LEDs.
    pub fn stop_all(&mut self) -> Result<()> {
        self.inbound.actuator.stop()?;
        self.outbound.actuator.stop()?;
        self.inbound.led.off()?;
        self.outbound.led.off()
    }

    /// De-energize every output, continuing past failures.
    ///
    /// Returns the first error encountered.
    pub fn release(&mut self) -> Result<()> {
        let results = [
            self.inbound.actuator.stop(),
            self.outbound.actuator.stop(),
            self.inbound.led.off(),
            self.outbound.led.off(),
            self.stop_led.off(),
        ];
        results.into_iter().collect()
    }

    /// Report a passage in the background and forget the authorized code.
    ///
    /// The notification runs as a detached task; its result is only logged.
    pub fn report_passage(&self, direction: Direction) {
        let slot = &self.side(direction).slot;
        let Some(code) = slot.authorized_code() else {
            warn!(%direction, "Passage without an authorized code");
            return;
        };
        slot.clear_code();

        let backend = self.backend.clone();
        tokio::spawn(async move {
            match backend.notify_passage(&code, direction).await {
                Ok(status) => debug!(%direction, status, "Passage notification sent"),
                Err(e) => warn!(%direction, error = %e, "Passage notification failed"),
            }
        });
    }
}
