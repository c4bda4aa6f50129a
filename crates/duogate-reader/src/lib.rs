//! Barcode card readers for duogate.
//!
//! Each passage direction has its own scanner and its own [`CardReader`]
//! task. A reader turns raw scanner bursts into card codes, asks the access
//! backend about them, and hands granted codes to the gate controller through
//! a single-slot [`AuthorizationSlot`].
//!
//! # Example
//!
//! ```no_run
//! use duogate_core::{Direction, GateState};
//! use duogate_hardware::mock::MockScanner;
//! use duogate_network::MockBackend;
//! use duogate_reader::{CardReader, ReaderConfig};
//! use tokio::sync::watch;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> duogate_hardware::Result<()> {
//! let (scanner, _handle) = MockScanner::new();
//! let (reader, slot) = CardReader::new(
//!     Direction::In,
//!     scanner,
//!     MockBackend::new(),
//!     ReaderConfig::default(),
//! );
//!
//! let (_state_tx, state_rx) = watch::channel(GateState::Locked);
//! reader.run(state_rx, CancellationToken::new()).await?;
//! # let _ = slot;
//! # Ok(())
//! # }
//! ```

mod config;
mod reader;
mod slot;

pub use config::ReaderConfig;
pub use reader::{CardReader, SwipeOutcome, push_digits};
pub use slot::{AuthorizationSlot, SlotOccupied};
