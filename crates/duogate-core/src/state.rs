//! Gate states and their legal transitions.
//!
//! The controller owns the state machine; this enum lives here because the
//! card readers watch it too (they only poll while the gate is locked).
//!
//! # Valid Transitions
//!
//! - Locked → Enter | Exit | FreeEnter | FreeExit | Freewheel
//! - Enter | Exit → Locked
//! - FreeEnter | FreeExit → Freewheel | Locked
//! - Freewheel → Locked
//! - any → Fault, Fault → Locked (reserved, never requested today)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Direction, Error, Result};

/// Every state the gate can be in.
///
/// # Examples
///
/// ```
/// use duogate_core::{Direction, GateState};
///
/// assert!(GateState::Locked.can_transition_to(GateState::Enter));
/// assert!(!GateState::Enter.can_transition_to(GateState::Exit));
/// assert_eq!(GateState::passage(Direction::Out), GateState::Exit);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    /// Both leaves closed, readers polling.
    #[default]
    Locked,

    /// Authorized inbound passage.
    Enter,

    /// Authorized outbound passage.
    Exit,

    /// Inbound leaf held open by the in-button.
    FreeEnter,

    /// Outbound leaf held open by the out-button.
    FreeExit,

    /// Both leaves held open by both buttons.
    Freewheel,

    /// Reserved; no guard leads here.
    Fault,
}

impl GateState {
    /// All states, in table order.
    pub const ALL: [GateState; 7] = [
        GateState::Locked,
        GateState::Enter,
        GateState::Exit,
        GateState::FreeEnter,
        GateState::FreeExit,
        GateState::Freewheel,
        GateState::Fault,
    ];

    /// Authorized passage state for `direction`.
    #[must_use]
    pub fn passage(direction: Direction) -> Self {
        match direction {
            Direction::In => GateState::Enter,
            Direction::Out => GateState::Exit,
        }
    }

    /// Manual override state for `direction`.
    #[must_use]
    pub fn manual(direction: Direction) -> Self {
        match direction {
            Direction::In => GateState::FreeEnter,
            Direction::Out => GateState::FreeExit,
        }
    }

    /// Check if a transition to `target` is legal from this state.
    ///
    /// A state never transitions to itself.
    #[must_use]
    pub fn can_transition_to(self, target: GateState) -> bool {
        use GateState::*;

        matches!(
            (self, target),
            (Locked, Enter | Exit | FreeEnter | FreeExit | Freewheel)
                | (Enter | Exit, Locked)
                | (FreeEnter | FreeExit, Freewheel | Locked)
                | (Freewheel, Locked)
                | (Locked | Enter | Exit | FreeEnter | FreeExit | Freewheel, Fault)
                | (Fault, Locked)
        )
    }

    /// State name as used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            GateState::Locked => "Locked",
            GateState::Enter => "Enter",
            GateState::Exit => "Exit",
            GateState::FreeEnter => "FreeEnter",
            GateState::FreeExit => "FreeExit",
            GateState::Freewheel => "Freewheel",
            GateState::Fault => "Fault",
        }
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GateState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        GateState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| Error::UnknownState(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(GateState::Locked, GateState::Enter)]
    #[case(GateState::Locked, GateState::Exit)]
    #[case(GateState::Locked, GateState::FreeEnter)]
    #[case(GateState::Locked, GateState::FreeExit)]
    #[case(GateState::Locked, GateState::Freewheel)]
    #[case(GateState::Enter, GateState::Locked)]
    #[case(GateState::Exit, GateState::Locked)]
    #[case(GateState::FreeEnter, GateState::Freewheel)]
    #[case(GateState::FreeExit, GateState::Locked)]
    #[case(GateState::Freewheel, GateState::Locked)]
    #[case(GateState::Fault, GateState::Locked)]
    fn test_valid_transitions(#[case] from: GateState, #[case] to: GateState) {
        assert!(from.can_transition_to(to));
    }

    #[rstest]
    #[case(GateState::Enter, GateState::Exit)]
    #[case(GateState::Enter, GateState::Freewheel)]
    #[case(GateState::Freewheel, GateState::FreeEnter)]
    #[case(GateState::FreeEnter, GateState::FreeExit)]
    #[case(GateState::Fault, GateState::Enter)]
    fn test_invalid_transitions(#[case] from: GateState, #[case] to: GateState) {
        assert!(!from.can_transition_to(to));
    }

    #[test]
    fn test_no_self_transitions() {
        for state in GateState::ALL {
            assert!(!state.can_transition_to(state), "{state} -> {state}");
        }
    }

    #[test]
    fn test_every_state_can_reach_locked() {
        for state in GateState::ALL.into_iter().filter(|s| *s != GateState::Locked) {
            assert!(state.can_transition_to(GateState::Locked), "{state}");
        }
    }

    #[test]
    fn test_direction_helpers() {
        assert_eq!(GateState::passage(Direction::In), GateState::Enter);
        assert_eq!(GateState::passage(Direction::Out), GateState::Exit);
        assert_eq!(GateState::manual(Direction::In), GateState::FreeEnter);
        assert_eq!(GateState::manual(Direction::Out), GateState::FreeExit);
    }

    #[test]
    fn test_from_str_round_trip() {
        for state in GateState::ALL {
            assert_eq!(state.to_string().parse::<GateState>().unwrap(), state);
        }
        assert!(matches!(
            "Open".parse::<GateState>(),
            Err(Error::UnknownState(s)) if s == "Open"
        ));
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&GateState::FreeEnter).unwrap();
        assert_eq!(json, "\"free_enter\"");
    }
}
