//! In-process stand-ins for gate peripherals.
//!
//! Every mock is created together with a handle sharing its state: tests and
//! the development binary drive inputs and observe outputs through the handle.

pub mod line;
pub mod scanner;

pub use line::{MockInputHandle, MockInputLine, MockOutputHandle, MockOutputLine};
pub use scanner::{MockScanner, MockScannerHandle};
