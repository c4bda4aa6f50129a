//! libusb-backed barcode scanner.
//!
//! Opens the scanner by vendor/product ID (and serial number when two
//! identical scanners are attached), detaches the kernel HID driver and reads
//! keyboard reports from the first IN endpoint. Each report is translated to
//! the byte it types by [`crate::hid::decode_report`].
//!
//! libusb calls block, so every read runs on Tokio's blocking pool.

use std::sync::Arc;
use std::time::Duration;

use rusb::{DeviceHandle, GlobalContext, TransferType};
use tracing::{debug, info};

use crate::{
    HardwareError, Result, hid,
    traits::ScannerDevice,
    types::{DeviceInfo, UsbDeviceId},
};

/// Interface number of the scanner's keyboard function.
const SCANNER_INTERFACE: u8 = 0;

/// Barcode scanner attached over USB.
pub struct UsbScanner {
    handle: Arc<DeviceHandle<GlobalContext>>,
    id: UsbDeviceId,
    endpoint: u8,
    transfer_type: TransferType,
    packet_size: usize,
}

impl std::fmt::Debug for UsbScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsbScanner")
            .field("id", &self.id)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl UsbScanner {
    /// Open and claim the scanner matching `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if no matching device is attached, the kernel driver
    /// cannot be detached, or the device exposes no IN endpoint.
    pub fn open(id: UsbDeviceId) -> Result<Self> {
        let devices = rusb::devices().map_err(map_usb_error)?;

        for device in devices.iter() {
            let descriptor = device.device_descriptor().map_err(map_usb_error)?;
            if descriptor.vendor_id() != id.vendor_id || descriptor.product_id() != id.product_id {
                continue;
            }

            let mut handle = device.open().map_err(map_usb_error)?;

            if let Some(wanted) = &id.serial {
                let serial = handle
                    .read_serial_number_string_ascii(&descriptor)
                    .unwrap_or_default();
                if &serial != wanted {
                    debug!(%id, serial = %serial, "Skipping scanner with other serial");
                    continue;
                }
            }

            if handle
                .kernel_driver_active(SCANNER_INTERFACE)
                .unwrap_or(false)
            {
                handle
                    .detach_kernel_driver(SCANNER_INTERFACE)
                    .map_err(map_usb_error)?;
            }
            handle
                .claim_interface(SCANNER_INTERFACE)
                .map_err(map_usb_error)?;

            let config = device.active_config_descriptor().map_err(map_usb_error)?;
            let mut found = None;
            for interface in config.interfaces() {
                for setting in interface.descriptors() {
                    if setting.interface_number() != SCANNER_INTERFACE {
                        continue;
                    }
                    if let Some(endpoint) = setting
                        .endpoint_descriptors()
                        .find(|endpoint| endpoint.direction() == rusb::Direction::In)
                    {
                        found = Some((
                            endpoint.address(),
                            endpoint.transfer_type(),
                            endpoint.max_packet_size(),
                        ));
                    }
                }
            }
            let (endpoint, transfer_type, packet_size) = found.ok_or_else(|| {
                HardwareError::initialization_failed(format!("{id}: no IN endpoint"))
            })?;

            info!(%id, endpoint, "Opened USB scanner");

            return Ok(Self {
                handle: Arc::new(handle),
                endpoint,
                transfer_type,
                packet_size: usize::from(packet_size),
                id,
            });
        }

        Err(HardwareError::disconnected(format!("USB scanner {id}")))
    }
}

impl ScannerDevice for UsbScanner {
    async fn read_chunk(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        let handle = Arc::clone(&self.handle);
        let endpoint = self.endpoint;
        let transfer_type = self.transfer_type;
        let mut report = vec![0u8; self.packet_size];

        let read = tokio::task::spawn_blocking(move || {
            let len = match transfer_type {
                TransferType::Bulk => handle.read_bulk(endpoint, &mut report, timeout),
                _ => handle.read_interrupt(endpoint, &mut report, timeout),
            }?;
            report.truncate(len);
            Ok::<_, rusb::Error>(report)
        })
        .await
        .map_err(|e| HardwareError::communication(format!("USB read task failed: {e}")))?;

        let report = read.map_err(|e| match e {
            rusb::Error::Timeout => HardwareError::timeout(timeout.as_millis() as u64),
            other => map_usb_error(other),
        })?;

        Ok(hid::decode_report(&report).into_iter().collect())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        let info = DeviceInfo::new(self.id.to_string(), "USB HID scanner");
        Ok(match &self.id.serial {
            Some(serial) => info.with_serial_number(serial.clone()),
            None => info,
        })
    }
}

fn map_usb_error(error: rusb::Error) -> HardwareError {
    match error {
        rusb::Error::NoDevice | rusb::Error::NotFound => HardwareError::disconnected(error.to_string()),
        rusb::Error::Timeout => HardwareError::timeout(0),
        rusb::Error::NotSupported => HardwareError::unsupported(error.to_string()),
        other => HardwareError::communication(other.to_string()),
    }
}
