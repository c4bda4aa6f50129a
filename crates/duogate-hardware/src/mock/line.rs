//! Mock digital lines for testing and development.
//!
//! Each mock comes paired with a handle that shares its state, so a test can
//! observe what the gate wrote to an output or flip an input the gate polls.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    HardwareError, Result,
    traits::{InputLine, OutputLine},
    types::{LineConfig, Polarity},
};

/// State shared between a mock line and its handle.
#[derive(Debug)]
struct LineState {
    /// Raw electrical level.
    level: AtomicBool,

    /// When set, every access fails with a communication error.
    failing: AtomicBool,
}

impl LineState {
    fn new(level: bool) -> Arc<Self> {
        Arc::new(Self {
            level: AtomicBool::new(level),
            failing: AtomicBool::new(false),
        })
    }
}

/// Mock output line (relay coil, LED).
///
/// # Examples
///
/// ```
/// use duogate_hardware::mock::MockOutputLine;
/// use duogate_hardware::traits::OutputLine;
/// use duogate_hardware::types::Polarity;
///
/// let (mut led, handle) = MockOutputLine::with_polarity("GPIO13", Polarity::ActiveLow);
/// led.on().unwrap();
///
/// assert!(handle.is_active());
/// assert!(!handle.level()); // active-low: lit means pulled low
/// ```
#[derive(Debug)]
pub struct MockOutputLine {
    name: String,
    polarity: Polarity,
    state: Arc<LineState>,
}

impl MockOutputLine {
    /// Create an active-high output, initially inactive.
    pub fn new(name: impl Into<String>) -> (Self, MockOutputHandle) {
        Self::with_polarity(name, Polarity::ActiveHigh)
    }

    /// Create an output with the given polarity, initially inactive.
    pub fn with_polarity(name: impl Into<String>, polarity: Polarity) -> (Self, MockOutputHandle) {
        let name = name.into();
        let state = LineState::new(polarity.level(false));

        let line = Self {
            name: name.clone(),
            polarity,
            state: Arc::clone(&state),
        };
        let handle = MockOutputHandle {
            name,
            polarity,
            state,
        };

        (line, handle)
    }

    /// Create an output from its configuration.
    pub fn from_config(config: &LineConfig) -> (Self, MockOutputHandle) {
        Self::with_polarity(config.pin.clone(), config.polarity)
    }
}

impl OutputLine for MockOutputLine {
    fn set_active(&mut self, active: bool) -> Result<()> {
        if self.state.failing.load(Ordering::SeqCst) {
            return Err(HardwareError::communication(format!(
                "{}: write rejected",
                self.name
            )));
        }
        self.state
            .level
            .store(self.polarity.level(active), Ordering::SeqCst);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.polarity
            .is_active(self.state.level.load(Ordering::SeqCst))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Handle for observing a [`MockOutputLine`].
#[derive(Debug, Clone)]
pub struct MockOutputHandle {
    name: String,
    polarity: Polarity,
    state: Arc<LineState>,
}

impl MockOutputHandle {
    /// Logical state of the line.
    pub fn is_active(&self) -> bool {
        self.polarity
            .is_active(self.state.level.load(Ordering::SeqCst))
    }

    /// Raw electrical level of the line.
    pub fn level(&self) -> bool {
        self.state.level.load(Ordering::SeqCst)
    }

    /// Make subsequent writes fail.
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Line name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Mock input line (button, motion sensor).
///
/// # Examples
///
/// ```
/// use duogate_hardware::mock::MockInputLine;
/// use duogate_hardware::traits::InputLine;
///
/// let (button, handle) = MockInputLine::new("GPIO19");
/// assert!(!button.is_active().unwrap());
///
/// handle.set_active(true);
/// assert!(button.is_active().unwrap());
/// ```
#[derive(Debug)]
pub struct MockInputLine {
    name: String,
    polarity: Polarity,
    state: Arc<LineState>,
}

impl MockInputLine {
    /// Create an active-high input, initially inactive.
    pub fn new(name: impl Into<String>) -> (Self, MockInputHandle) {
        Self::with_polarity(name, Polarity::ActiveHigh)
    }

    /// Create an input with the given polarity, initially inactive.
    pub fn with_polarity(name: impl Into<String>, polarity: Polarity) -> (Self, MockInputHandle) {
        let name = name.into();
        let state = LineState::new(polarity.level(false));

        let line = Self {
            name: name.clone(),
            polarity,
            state: Arc::clone(&state),
        };
        let handle = MockInputHandle {
            name,
            polarity,
            state,
        };

        (line, handle)
    }

    /// Create an input from its configuration.
    pub fn from_config(config: &LineConfig) -> (Self, MockInputHandle) {
        Self::with_polarity(config.pin.clone(), config.polarity)
    }
}

impl InputLine for MockInputLine {
    fn is_active(&self) -> Result<bool> {
        if self.state.failing.load(Ordering::SeqCst) {
            return Err(HardwareError::communication(format!(
                "{}: read failed",
                self.name
            )));
        }
        Ok(self
            .polarity
            .is_active(self.state.level.load(Ordering::SeqCst)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Handle for driving a [`MockInputLine`].
#[derive(Debug, Clone)]
pub struct MockInputHandle {
    name: String,
    polarity: Polarity,
    state: Arc<LineState>,
}

impl MockInputHandle {
    /// Set the logical state the line will report.
    pub fn set_active(&self, active: bool) {
        self.state
            .level
            .store(self.polarity.level(active), Ordering::SeqCst);
    }

    /// Set the raw electrical level.
    pub fn set_level(&self, level: bool) {
        self.state.level.store(level, Ordering::SeqCst);
    }

    /// Make subsequent reads fail.
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Line name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
