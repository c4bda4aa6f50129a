//! Gate state objects.
//!
//! One object per [`GateState`], built once when the controller is created.
//! Timed states remember when their enter hook finished; every guard reads
//! the hardware through the [`GateContext`] it is handed.
//!
//! | state       | on_enter                        | on_exit          |
//! |-------------|---------------------------------|------------------|
//! | Locked      | stop motors, LEDs off, stop on  | stop LED off     |
//! | Enter/Exit  | open leaf, LED on               | LED off          |
//! | FreeEnter/FreeExit | open leaf, LED on        | LED off          |
//! | Freewheel   | open both, both LEDs on         | both LEDs off    |
//! | Fault       | nothing                         | nothing          |

use duogate_core::{Direction, GateState};
use duogate_hardware::OutputLine;
use tokio::time::Instant;
use tracing::debug;

use crate::context::GateContext;
use crate::error::{GateError, Result};
use crate::state_machine::State;

/// Idle: leaves closed, waiting for a card or a button.
#[derive(Debug, Default)]
pub struct LockedState;

impl State<GateState, GateContext> for LockedState {
    type Error = GateError;

    async fn on_enter(&mut self, ctx: &mut GateContext) -> Result<()> {
        ctx.stop_all()?;
        ctx.stop_led_mut().on()?;
        Ok(())
    }

    async fn step(&mut self, ctx: &mut GateContext) -> Result<Option<GateState>> {
        if ctx.both_buttons_active()? {
            debug!("Both override buttons active");
            return Ok(Some(GateState::Freewheel));
        }

        for direction in Direction::ALL {
            if ctx.side(direction).slot.consume_ready() {
                debug!(%direction, "Authorized card waiting");
                return Ok(Some(GateState::passage(direction)));
            }
        }

        for direction in Direction::ALL {
            if ctx.button_active(direction)? {
                debug!(%direction, "Override button active");
                return Ok(Some(GateState::manual(direction)));
            }
        }

        Ok(None)
    }

    async fn on_exit(&mut self, ctx: &mut GateContext) -> Result<()> {
        ctx.stop_led_mut().off()?;
        Ok(())
    }
}

/// Authorized passage in one direction.
#[derive(Debug)]
pub struct PassageState {
    direction: Direction,
    entered_at: Option<Instant>,
}

impl PassageState {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            entered_at: None,
        }
    }
}

impl State<GateState, GateContext> for PassageState {
    type Error = GateError;

    async fn on_enter(&mut self, ctx: &mut GateContext) -> Result<()> {
        ctx.open(self.direction).await?;
        self.entered_at = Some(Instant::now());
        Ok(())
    }

    async fn step(&mut self, ctx: &mut GateContext) -> Result<Option<GateState>> {
        let direction = self.direction;

        if ctx.gate_moving()? {
            debug!(%direction, "Passage detected");
            ctx.report_passage(direction);
            return Ok(Some(GateState::Locked));
        }

        if self.entered_at.is_some_and(|at| ctx.timed_out(at)) {
            debug!(%direction, "No passage before timeout");
            ctx.side(direction).slot.clear_code();
            return Ok(Some(GateState::Locked));
        }

        Ok(None)
    }

    async fn on_exit(&mut self, ctx: &mut GateContext) -> Result<()> {
        self.entered_at = None;
        ctx.side_mut(self.direction).led.off()?;
        Ok(())
    }
}

/// Leaf held open by its override button.
#[derive(Debug)]
pub struct ManualState {
    direction: Direction,
    entered_at: Option<Instant>,
}

impl ManualState {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            entered_at: None,
        }
    }
}

impl State<GateState, GateContext> for ManualState {
    type Error = GateError;

    async fn on_enter(&mut self, ctx: &mut GateContext) -> Result<()> {
        ctx.open(self.direction).await?;
        self.entered_at = Some(Instant::now());
        Ok(())
    }

    async fn step(&mut self, ctx: &mut GateContext) -> Result<Option<GateState>> {
        let direction = self.direction;

        if ctx.both_buttons_active()? {
            debug!(%direction, "Second override button pressed");
            return Ok(Some(GateState::Freewheel));
        }

        if ctx.button_active(direction)? {
            return Ok(None);
        }

        if ctx.gate_moving()? {
            debug!(%direction, "Motion after button release");
            return Ok(Some(GateState::Locked));
        }

        if self.entered_at.is_some_and(|at| ctx.timed_out(at)) {
            debug!(%direction, "Override timed out");
            return Ok(Some(GateState::Locked));
        }

        Ok(None)
    }

    async fn on_exit(&mut self, ctx: &mut GateContext) -> Result<()> {
        self.entered_at = None;
        ctx.side_mut(self.direction).led.off()?;
        Ok(())
    }
}

/// Both leaves held open by both override buttons.
#[derive(Debug, Default)]
pub struct FreewheelState {
    entered_at: Option<Instant>,
}

impl State<GateState, GateContext> for FreewheelState {
    type Error = GateError;

    async fn on_enter(&mut self, ctx: &mut GateContext) -> Result<()> {
        for direction in Direction::ALL {
            ctx.open(direction).await?;
        }
        self.entered_at = Some(Instant::now());
        Ok(())
    }

    async fn step(&mut self, ctx: &mut GateContext) -> Result<Option<GateState>> {
        if ctx.both_buttons_active()? {
            return Ok(None);
        }

        if ctx.gate_moving()? {
            debug!("Motion after override release");
            return Ok(Some(GateState::Locked));
        }

        if self.entered_at.is_some_and(|at| ctx.timed_out(at)) {
            debug!("Freewheel timed out");
            return Ok(Some(GateState::Locked));
        }

        Ok(None)
    }

    async fn on_exit(&mut self, ctx: &mut GateContext) -> Result<()> {
        self.entered_at = None;
        for direction in Direction::ALL {
            ctx.side_mut(direction).led.off()?;
        }
        Ok(())
    }
}

/// Reserved. No hook does anything.
#[derive(Debug, Default)]
pub struct FaultState;

impl State<GateState, GateContext> for FaultState {
    type Error = GateError;
}

/// Enum wrapper for gate state dispatch.
#[derive(Debug)]
pub enum GateStateHandler {
    Locked(LockedState),
    Passage(PassageState),
    Manual(ManualState),
    Freewheel(FreewheelState),
    Fault(FaultState),
}

impl GateStateHandler {
    /// The state object serving `state`.
    pub fn for_state(state: GateState) -> Self {
        match state {
            GateState::Locked => Self::Locked(LockedState),
            GateState::Enter => Self::Passage(PassageState::new(Direction::In)),
            GateState::Exit => Self::Passage(PassageState::new(Direction::Out)),
            GateState::FreeEnter => Self::Manual(ManualState::new(Direction::In)),
            GateState::FreeExit => Self::Manual(ManualState::new(Direction::Out)),
            GateState::Freewheel => Self::Freewheel(FreewheelState::default()),
            GateState::Fault => Self::Fault(FaultState),
        }
    }

    /// One handler per gate state.
    pub fn table() -> impl Iterator<Item = (GateState, Self)> {
        GateState::ALL
            .into_iter()
            .map(|state| (state, Self::for_state(state)))
    }
}

impl State<GateState, GateContext> for GateStateHandler {
    type Error = GateError;

    async fn on_enter(&mut self, ctx: &mut GateContext) -> Result<()> {
        match self {
            Self::Locked(state) => state.on_enter(ctx).await,
            Self::Passage(state) => state.on_enter(ctx).await,
            Self::Manual(state) => state.on_enter(ctx).await,
            Self::Freewheel(state) => state.on_enter(ctx).await,
            Self::Fault(state) => state.on_enter(ctx).await,
        }
    }

    async fn step(&mut self, ctx: &mut GateContext) -> Result<Option<GateState>> {
        match self {
            Self::Locked(state) => state.step(ctx).await,
            Self::Passage(state) => state.step(ctx).await,
            Self::Manual(state) => state.step(ctx).await,
            Self::Freewheel(state) => state.step(ctx).await,
            Self::Fault(state) => state.step(ctx).await,
        }
    }

    async fn on_exit(&mut self, ctx: &mut GateContext) -> Result<()> {
        match self {
            Self::Locked(state) => state.on_exit(ctx).await,
            Self::Passage(state) => state.on_exit(ctx).await,
            Self::Manual(state) => state.on_exit(ctx).await,
            Self::Freewheel(state) => state.on_exit(ctx).await,
            Self::Fault(state) => state.on_exit(ctx).await,
        }
    }
}
