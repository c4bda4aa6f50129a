//! Gate controller and its control loop.

use std::time::Duration;

use duogate_core::GateState;
use duogate_hardware::ScannerDevice;
use duogate_network::AccessBackend;
use duogate_reader::CardReader;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::context::GateContext;
use crate::error::Result;
use crate::state_machine::{StateMachine, TickOutcome};
use crate::states::GateStateHandler;

/// Two-direction gate controller.
///
/// Owns the state machine and the hardware context. The current state is
/// published on a watch channel in the same tick it is requested, so card
/// readers stop polling as soon as the gate leaves `Locked`.
///
/// # Examples
///
/// ```
/// use duogate_controller::{GateConfig, GateController, mock};
/// use duogate_core::GateState;
/// use duogate_network::MockBackend;
/// use duogate_reader::AuthorizationSlot;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> duogate_controller::Result<()> {
/// let config = GateConfig::default();
/// let (ctx, lines) = mock::mock_context(
///     &config,
///     MockBackend::new().into(),
///     [AuthorizationSlot::new(), AuthorizationSlot::new()],
/// );
/// let mut controller = GateController::new(ctx, config.tick_period())?;
///
/// controller.tick().await?;
/// assert_eq!(controller.state(), GateState::Locked);
/// assert!(lines.stop_led.is_active());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GateController {
    machine: StateMachine<GateState, GateStateHandler>,
    ctx: GateContext,
    state_tx: watch::Sender<GateState>,
    tick_period: Duration,
}

impl GateController {
    /// Build the controller in `Locked`. No hook runs until the first tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the state table cannot be built.
    pub fn new(ctx: GateContext, tick_period: Duration) -> Result<Self> {
        let machine = StateMachine::new(GateState::Locked, GateStateHandler::table())?;
        let (state_tx, _) = watch::channel(GateState::Locked);

        Ok(Self {
            machine,
            ctx,
            state_tx,
            tick_period,
        })
    }

    /// Current state (the target, while a transition is pending).
    pub fn state(&self) -> GateState {
        self.machine.current_state()
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.state_tx.subscribe()
    }

    pub fn machine(&self) -> &StateMachine<GateState, GateStateHandler> {
        &self.machine
    }

    pub fn context(&self) -> &GateContext {
        &self.ctx
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    /// Request a transition from outside the state hooks.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not legal from the current state.
    pub fn request(&mut self, to: GateState) -> Result<bool> {
        let from = self.state();
        let changed = self.machine.set_state(to)?;
        if changed {
            self.publish(from, to);
        }
        Ok(changed)
    }

    /// Run one control-loop iteration.
    ///
    /// # Errors
    ///
    /// Returns hardware errors raised by a hook.
    pub async fn tick(&mut self) -> Result<TickOutcome<GateState>> {
        let outcome = self.machine.tick(&mut self.ctx).await?;

        match outcome {
            TickOutcome::Requested { from, to } => self.publish(from, to),
            TickOutcome::Entered { from, to } => {
                debug!(from = ?from, %to, "State entered");
            }
            TickOutcome::Stepped => {}
        }
        Ok(outcome)
    }

    /// De-energize both motors and every LED.
    ///
    /// # Errors
    ///
    /// Returns the first hardware error; every output is still attempted.
    pub fn release(&mut self) -> Result<()> {
        self.ctx.release()?;
        Ok(())
    }

    /// Tick at the configured period until `cancel` fires, then release all
    /// outputs.
    ///
    /// Hook errors are logged and the loop keeps ticking.
    ///
    /// # Errors
    ///
    /// Returns an error only if the final release fails.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        info!(state = %self.state(), period_ms = self.tick_period.as_millis() as u64, "Gate controller started");

        let mut interval = tokio::time::interval(self.tick_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            if let Err(e) = self.tick().await {
                error!(state = %self.state(), error = %e, "Gate tick failed");
            }
        }

        info!("Gate controller stopping, releasing outputs");
        self.release()
    }

    fn publish(&self, from: GateState, to: GateState) {
        info!(%from, %to, "Gate transition");
        self.state_tx.send_replace(to);
    }
}

/// Run the control loop and both card readers in one task until `cancel`
/// fires.
///
/// A reader that fails (its scanner disconnected) stops on its own; the gate
/// keeps running on the other reader and the override buttons.
///
/// # Errors
///
/// Returns an error if the final output release fails.
pub async fn run_gate<S1, B1, S2, B2>(
    controller: &mut GateController,
    inbound: CardReader<S1, B1>,
    outbound: CardReader<S2, B2>,
    cancel: CancellationToken,
) -> Result<()>
where
    S1: ScannerDevice,
    B1: AccessBackend,
    S2: ScannerDevice,
    B2: AccessBackend,
{
    let in_direction = inbound.direction();
    let out_direction = outbound.direction();
    let in_state = controller.subscribe();
    let out_state = controller.subscribe();

    let (gate, in_result, out_result) = tokio::join!(
        controller.run(cancel.clone()),
        inbound.run(in_state, cancel.clone()),
        outbound.run(out_state, cancel.clone()),
    );

    for (direction, result) in [(in_direction, in_result), (out_direction, out_result)] {
        if let Err(e) = result {
            warn!(%direction, error = %e, "Card reader ended with an error");
        }
    }
    gate
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use duogate_core::Direction;
    use duogate_network::MockBackend;
    use duogate_reader::AuthorizationSlot;

    use super::*;
    use crate::config::GateConfig;
    use crate::mock::{MockGateHandles, mock_context};

    fn controller() -> (GateController, MockGateHandles) {
        let config = GateConfig::default();
        let (ctx, handles) = mock_context(
            &config,
            MockBackend::new().into(),
            [AuthorizationSlot::new(), AuthorizationSlot::new()],
        );
        let controller = GateController::new(ctx, config.tick_period()).unwrap();
        (controller, handles)
    }

    #[tokio::test]
    async fn test_starts_locked_without_hooks() {
        let (controller, handles) = controller();

        assert_eq!(controller.state(), GateState::Locked);
        assert!(controller.machine().previous_state().is_none());
        assert!(!handles.stop_led.is_active());
        assert_eq!(*controller.subscribe().borrow(), GateState::Locked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_publishes_immediately() {
        let (mut controller, _handles) = controller();
        let rx = controller.subscribe();
        controller.tick().await.unwrap();

        assert!(controller.request(GateState::Freewheel).unwrap());
        assert_eq!(*rx.borrow(), GateState::Freewheel);
        assert!(controller.machine().is_transition_pending());
    }

    #[tokio::test]
    async fn test_request_rejects_illegal_edge() {
        let (mut controller, _handles) = controller();
        controller.tick().await.unwrap();
        controller.request(GateState::Enter).unwrap();

        let err = controller.request(GateState::Exit).unwrap_err();
        assert!(err.to_string().contains("Invalid state transition"));
        assert_eq!(controller.state(), GateState::Enter);
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_clears_every_output() {
        let (mut controller, handles) = controller();
        controller.tick().await.unwrap();
        controller.request(GateState::Freewheel).unwrap();
        controller.tick().await.unwrap();

        for direction in Direction::ALL {
            assert!(handles.side(direction).led.is_active());
        }

        controller.release().unwrap();
        for direction in Direction::ALL {
            let side = handles.side(direction);
            assert!(!side.forward.is_active());
            assert!(!side.backward.is_active());
            assert!(!side.led.is_active());
        }
        assert!(!handles.stop_led.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_releases_on_cancel() {
        let (mut controller, handles) = controller();
        let cancel = CancellationToken::new();

        let driver = async {
            tokio::time::sleep(Duration::from_millis(250)).await;
            assert!(handles.stop_led.is_active());
            cancel.cancel();
        };
        let (result, ()) = tokio::join!(controller.run(cancel.clone()), driver);

        result.unwrap();
        assert!(!handles.stop_led.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_survives_hardware_fault() {
        let (mut controller, handles) = controller();
        let cancel = CancellationToken::new();
        handles.inbound.button.set_failing(true);

        let driver = async {
            tokio::time::sleep(Duration::from_millis(550)).await;
            handles.inbound.button.set_failing(false);
            handles.inbound.button.set_active(true);
            tokio::time::sleep(Duration::from_millis(550)).await;
            cancel.cancel();
        };
        let (result, ()) = tokio::join!(controller.run(cancel.clone()), driver);

        result.unwrap();
        assert_eq!(controller.state(), GateState::FreeEnter);
    }
}
