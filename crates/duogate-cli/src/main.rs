//! duogate: two-direction access gate controller.
//!
//! Wires the controller to the configured backend and scanners, then runs
//! until Ctrl-C. Relays, LEDs, buttons and motion sensors are mock lines. Takes no arguments; set `RUST_LOG` to change verbosity.

use anyhow::{Context, Result};
use duogate_controller::{GateConfig, GateController, mock::mock_context, run_gate};
use duogate_core::Direction;
use duogate_hardware::AnyScannerDevice;
use duogate_hardware::mock::{MockScanner, MockScannerHandle};
use duogate_network::{AnyBackend, HttpBackend};
use duogate_reader::{CardReader, ReaderConfig};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    init_tracing()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    runtime.block_on(run())
}

fn init_tracing() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).compact())
        .try_init()
        .context("Failed to initialize logging")
}

async fn run() -> Result<()> {
    let config = GateConfig::default();
    info!(
        version = duogate_core::VERSION,
        endpoint = %config.backend.endpoint,
        lines = "mock",
        "Starting duogate; no GPIO driver bundled, outputs and inputs are mock lines"
    );

    let backend = AnyBackend::from(
        HttpBackend::new(config.backend.clone()).context("Invalid backend configuration")?,
    );

    // Mock scanners disconnect once their handle drops.
    let (in_scanner, _in_handle) = open_scanner(Direction::In, &config.inbound.reader);
    let (out_scanner, _out_handle) = open_scanner(Direction::Out, &config.outbound.reader);

    let (in_reader, in_slot) = CardReader::new(
        Direction::In,
        in_scanner,
        backend.clone(),
        config.inbound.reader.clone(),
    );
    let (out_reader, out_slot) = CardReader::new(
        Direction::Out,
        out_scanner,
        backend.clone(),
        config.outbound.reader.clone(),
    );

    let (ctx, _lines) = mock_context(&config, backend, [in_slot, out_slot]);
    let mut controller = GateController::new(ctx, config.tick_period())
        .context("Failed to build gate controller")?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
        }
        shutdown.cancel();
    });

    run_gate(&mut controller, in_reader, out_reader, cancel)
        .await
        .context("Failed to release gate outputs")?;

    info!("duogate stopped");
    Ok(())
}

/// Open the scanner for `direction`, falling back to an idle mock.
fn open_scanner(
    direction: Direction,
    config: &ReaderConfig,
) -> (AnyScannerDevice, Option<MockScannerHandle>) {
    #[cfg(feature = "hardware-usb")]
    if let Some(id) = &config.usb {
        match duogate_hardware::usb::UsbScanner::open(id.clone()) {
            Ok(scanner) => {
                info!(%direction, %id, "USB scanner opened");
                return (AnyScannerDevice::Usb(scanner), None);
            }
            Err(e) => warn!(%direction, %id, error = %e, "USB scanner unavailable"),
        }
    }

    #[cfg(not(feature = "hardware-usb"))]
    if let Some(id) = &config.usb {
        warn!(%direction, %id, "Built without USB support");
    }

    info!(%direction, "Using mock scanner");
    let (scanner, handle) = MockScanner::with_name(format!("scanner-{}", direction.tag()));
    (AnyScannerDevice::from(scanner), Some(handle))
}
