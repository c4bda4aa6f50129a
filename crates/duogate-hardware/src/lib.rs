//! Hardware abstraction layer for the duogate turnstile controller.
//!
//! The gate talks to three kinds of peripherals:
//!
//! - **Output lines**: relay coils and LEDs, driven through [`OutputLine`].
//! - **Input lines**: push buttons and passage sensors, sampled through
//!   [`InputLine`].
//! - **Barcode scanners**: one per direction, read through [`ScannerDevice`].
//!
//! Line traits are synchronous because a GPIO write never blocks. Scanner reads
//! are `async` (native `async fn` in traits), so scanners are dispatched
//! through the [`AnyScannerDevice`] enum instead of trait objects.
//!
//! Every line speaks in *active* terms; a [`Polarity`] per line maps that onto
//! the electrical level, so an active-low relay board needs no special casing
//! above this crate.
//!
//! ```no_run
//! use duogate_hardware::{Actuator, AnyOutputLine, Result};
//!
//! async fn open_inwards(motor: &mut Actuator<AnyOutputLine>) -> Result<()> {
//!     motor.forward().await
//! }
//! ```
//!
//! Real USB scanners are available behind the `hardware-usb` feature. The mock
//! implementations in [`mock`] are always compiled and come with handles for
//! driving them from tests.
//!
//! [`AnyScannerDevice`]: devices::AnyScannerDevice

#![allow(async_fn_in_trait)]

pub mod actuator;
pub mod devices;
pub mod error;
pub mod hid;
pub mod mock;
pub mod traits;
pub mod types;

#[cfg(feature = "hardware-usb")]
pub mod usb;

pub use actuator::{Actuator, Motion};
pub use devices::{AnyInputLine, AnyOutputLine, AnyScannerDevice};
pub use error::{HardwareError, Result};
pub use traits::{InputLine, OutputLine, ScannerDevice};
pub use types::{DeviceInfo, LineConfig, Polarity, UsbDeviceId};
