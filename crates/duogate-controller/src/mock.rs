//! Gate context wired to mock lines.
//!
//! Used by the tests and by the binary when no GPIO driver is available. Every
//! line is built from its [`LineConfig`](duogate_hardware::LineConfig), so the
//! handles report electrical levels with the configured polarity.

use duogate_core::Direction;
use duogate_hardware::mock::{MockInputHandle, MockInputLine, MockOutputHandle, MockOutputLine};
use duogate_hardware::{Actuator, Motion};
use duogate_network::AnyBackend;
use duogate_reader::AuthorizationSlot;

use crate::config::{GateConfig, SideConfig};
use crate::context::{GateContext, GateSide};

/// Handles to the mock lines of one side.
#[derive(Debug, Clone)]
pub struct MockSideHandles {
    pub forward: MockOutputHandle,
    pub backward: MockOutputHandle,
    pub led: MockOutputHandle,
    pub button: MockInputHandle,
    pub motion: MockInputHandle,
}

impl MockSideHandles {
    /// Motion implied by the relay levels.
    pub fn motion_state(&self) -> Motion {
        match (self.forward.is_active(), self.backward.is_active()) {
            (true, false) => Motion::Forward,
            (false, true) => Motion::Backward,
            _ => Motion::Stopped,
        }
    }
}

/// Handles to every mock line of the gate.
#[derive(Debug, Clone)]
pub struct MockGateHandles {
    pub inbound: MockSideHandles,
    pub outbound: MockSideHandles,
    pub stop_led: MockOutputHandle,
}

impl MockGateHandles {
    pub fn side(&self, direction: Direction) -> &MockSideHandles {
        match direction {
            Direction::In => &self.inbound,
            Direction::Out => &self.outbound,
        }
    }
}

fn mock_side(
    direction: Direction,
    config: &SideConfig,
    settle: std::time::Duration,
    slot: AuthorizationSlot,
) -> (GateSide, MockSideHandles) {
    let (forward, forward_handle) = MockOutputLine::from_config(&config.actuator.forward);
    let (backward, backward_handle) = MockOutputLine::from_config(&config.actuator.backward);
    let (led, led_handle) = MockOutputLine::from_config(&config.led);
    let (button, button_handle) = MockInputLine::from_config(&config.button);
    let (motion, motion_handle) = MockInputLine::from_config(&config.motion);

    let side = GateSide {
        actuator: Actuator::new(direction.tag(), forward.into(), backward.into(), settle),
        led: led.into(),
        button: button.into(),
        motion: motion.into(),
        slot,
    };
    let handles = MockSideHandles {
        forward: forward_handle,
        backward: backward_handle,
        led: led_handle,
        button: button_handle,
        motion: motion_handle,
    };
    (side, handles)
}

/// Build a gate context on mock lines.
///
/// `slots` are the inbound and outbound reader mailboxes.
pub fn mock_context(
    config: &GateConfig,
    backend: AnyBackend,
    slots: [AuthorizationSlot; 2],
) -> (GateContext, MockGateHandles) {
    let [in_slot, out_slot] = slots;
    let settle = config.relay_settle();

    let (inbound, inbound_handles) = mock_side(Direction::In, &config.inbound, settle, in_slot);
    let (outbound, outbound_handles) =
        mock_side(Direction::Out, &config.outbound, settle, out_slot);
    let (stop_led, stop_led_handle) = MockOutputLine::from_config(&config.stop_led);

    let ctx = GateContext::new(
        inbound,
        outbound,
        stop_led.into(),
        backend,
        config.fail_safe_timeout(),
    );
    let handles = MockGateHandles {
        inbound: inbound_handles,
        outbound: outbound_handles,
        stop_led: stop_led_handle,
    };
    (ctx, handles)
}
