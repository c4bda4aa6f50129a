//! Gate controller for duogate.
//!
//! A generic [`StateMachine`] drives one state object per [`GateState`]. The
//! objects read buttons, motion sensors and the card readers' mailboxes
//! through a [`GateContext`] and command the two leaf actuators and the
//! indicator LEDs.
//!
//! [`run_gate`] runs the control loop next to both [`CardReader`] tasks on
//! the current task until cancelled.
//!
//! [`CardReader`]: duogate_reader::CardReader
//! [`GateState`]: duogate_core::GateState

#![allow(async_fn_in_trait)]

pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod mock;
pub mod state_machine;
pub mod states;

pub use config::{ActuatorConfig, GateConfig, SideConfig};
pub use context::{GateContext, GateSide};
pub use controller::{GateController, run_gate};
pub use error::{GateError, Result};
pub use state_machine::{State, StateKey, StateMachine, StateTransition, TickOutcome};
pub use states::GateStateHandler;
