//! Generic state machine with deferred transitions.
//!
//! Each state is an object with three lifecycle hooks: `on_enter`, `step`
//! and `on_exit`. The machine owns one object per state key, built once, and
//! passes the caller's context to every hook.
//!
//! Requesting a transition only records the new key. The hooks run on the
//! *next* tick:
//!
//! ```text
//! tick n     current == prev   -> step()            (may request `to`)
//! tick n+1   current != prev   -> prev.on_exit(), to.on_enter()
//! tick n+2   current == prev   -> step()
//! ```
//!
//! On the very first tick there is no previous state, so only `on_enter` of
//! the initial state runs.
//!
//! # Examples
//!
//! ```
//! use duogate_controller::state_machine::{State, StateMachine, TickOutcome};
//! use duogate_core::GateState;
//!
//! struct Idle;
//!
//! impl State<GateState, u32> for Idle {
//!     type Error = duogate_core::Error;
//!
//!     async fn on_enter(&mut self, entries: &mut u32) -> Result<(), Self::Error> {
//!         *entries += 1;
//!         Ok(())
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> duogate_core::Result<()> {
//! let mut machine = StateMachine::new(GateState::Locked, [(GateState::Locked, Idle)])?;
//! let mut entries = 0;
//!
//! let outcome = machine.tick(&mut entries).await?;
//! assert_eq!(outcome, TickOutcome::Entered { from: None, to: GateState::Locked });
//! assert_eq!(machine.tick(&mut entries).await?, TickOutcome::Stepped);
//! assert_eq!(entries, 1);
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use duogate_core::constants::MAX_TRANSITION_HISTORY;
use duogate_core::{Error, GateState, Result};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Key identifying a state, with its table of legal transitions.
pub trait StateKey: Copy + Eq + Hash + fmt::Debug + fmt::Display {
    /// Whether the machine may move from `self` to `target`.
    fn can_transition_to(self, target: Self) -> bool;
}

impl StateKey for GateState {
    fn can_transition_to(self, target: Self) -> bool {
        GateState::can_transition_to(self, target)
    }
}

/// Lifecycle hooks of one state.
///
/// Every hook has a no-op default. `step` returns the key of the state it
/// wants to move to, if any.
pub trait State<K, C> {
    /// Error raised by hooks. Must absorb transition errors from the machine.
    type Error: From<Error>;

    /// Called once when the state becomes current.
    async fn on_enter(&mut self, _ctx: &mut C) -> std::result::Result<(), Self::Error> {
        Ok(())
    }

    /// Called on every tick while the state stays current.
    async fn step(&mut self, _ctx: &mut C) -> std::result::Result<Option<K>, Self::Error> {
        Ok(None)
    }

    /// Called once when another state takes over.
    async fn on_exit(&mut self, _ctx: &mut C) -> std::result::Result<(), Self::Error> {
        Ok(())
    }
}

/// Represents a single requested state transition with timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition<K> {
    /// The state transitioned from.
    pub from: K,

    /// The state transitioned to.
    pub to: K,

    /// Wall-clock time of the request, for logs and history dumps.
    pub at: DateTime<Utc>,

    /// Monotonic time of the request.
    ///
    /// Not serialized; set to the deserialization time on the way back in.
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl<K> StateTransition<K> {
    /// Create a new state transition record.
    pub fn new(from: K, to: K) -> Self {
        Self {
            from,
            to,
            at: Utc::now(),
            timestamp: Instant::now(),
        }
    }
}

/// What a call to [`StateMachine::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome<K> {
    /// Ran `step` on the current state; nothing was requested.
    Stepped,

    /// Ran `step`, which requested a transition. Hooks run next tick.
    Requested { from: K, to: K },

    /// Ran the exit hook of `from` (if any) and the enter hook of `to`.
    Entered { from: Option<K>, to: K },
}

/// State machine over keys `K` and state objects `S`.
pub struct StateMachine<K, S> {
    states: HashMap<K, S>,

    /// State the machine is in, or moving to.
    current: K,

    /// State whose enter hook ran last. Differs from `current` while a
    /// transition is pending.
    prev: Option<K>,

    /// Requested transitions, oldest first, bounded.
    history: VecDeque<StateTransition<K>>,
}

impl<K: StateKey, S> StateMachine<K, S> {
    /// Build the machine from its state table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownState`] if the table has no entry for
    /// `initial`.
    pub fn new(initial: K, states: impl IntoIterator<Item = (K, S)>) -> Result<Self> {
        let states: HashMap<K, S> = states.into_iter().collect();
        if !states.contains_key(&initial) {
            return Err(Error::UnknownState(initial.to_string()));
        }

        Ok(Self {
            states,
            current: initial,
            prev: None,
            history: VecDeque::with_capacity(MAX_TRANSITION_HISTORY),
        })
    }

    /// Current state key (the target, while a transition is pending).
    pub fn current_state(&self) -> K {
        self.current
    }

    /// State whose enter hook ran last.
    pub fn previous_state(&self) -> Option<K> {
        self.prev
    }

    /// Whether the next tick will run hooks instead of `step`.
    pub fn is_transition_pending(&self) -> bool {
        self.prev != Some(self.current)
    }

    /// State object for `key`.
    pub fn state(&self, key: K) -> Option<&S> {
        self.states.get(&key)
    }

    /// Requested transitions, ordered from oldest to newest.
    pub fn history(&self) -> &VecDeque<StateTransition<K>> {
        &self.history
    }

    /// Get the last `count` transitions, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition<K>> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).cloned().collect()
    }

    /// Record a transition to `to`. Hooks run on the next tick.
    ///
    /// Returns `false` if `to` is already the current state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] if the edge is not legal, or
    /// [`Error::UnknownState`] if `to` has no state object.
    pub fn set_state(&mut self, to: K) -> Result<bool> {
        let from = self.current;
        if from == to {
            return Ok(false);
        }
        if !from.can_transition_to(to) {
            return Err(Error::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        if !self.states.contains_key(&to) {
            return Err(Error::UnknownState(to.to_string()));
        }

        self.current = to;
        self.history.push_back(StateTransition::new(from, to));
        if self.history.len() > MAX_TRANSITION_HISTORY {
            self.history.pop_front();
        }
        Ok(true)
    }

    /// Advance the machine by one tick.
    ///
    /// If a hook fails, its error is returned. A failed exit hook is not
    /// retried; a failed enter hook is retried on the next tick.
    ///
    /// # Errors
    ///
    /// Returns the first hook error, or a transition error if `step`
    /// requested an illegal edge.
    pub async fn tick<C>(&mut self, ctx: &mut C) -> std::result::Result<TickOutcome<K>, S::Error>
    where
        S: State<K, C>,
    {
        let current = self.current;

        if !self.is_transition_pending() {
            let requested = self.state_mut(current)?.step(ctx).await?;
            if let Some(to) = requested {
                if self.set_state(to)? {
                    return Ok(TickOutcome::Requested { from: current, to });
                }
            }
            return Ok(TickOutcome::Stepped);
        }

        let from = self.prev.take();
        if let Some(prev) = from {
            self.state_mut(prev)?.on_exit(ctx).await?;
        }
        self.state_mut(current)?.on_enter(ctx).await?;
        self.prev = Some(current);

        Ok(TickOutcome::Entered { from, to: current })
    }

    fn state_mut(&mut self, key: K) -> Result<&mut S> {
        self.states
            .get_mut(&key)
            .ok_or_else(|| Error::UnknownState(key.to_string()))
    }
}

impl<K: fmt::Debug, S> fmt::Debug for StateMachine<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("prev", &self.prev)
            .field("states", &self.states.len())
            .field("history", &self.history.len())
            .finish()
    }
}
