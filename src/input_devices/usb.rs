use std::time::Duration;

use rusb::{DeviceHandle, Direction, GlobalContext, TransferType};
use tracing::{debug, info, warn};

use super::{PacketReader, TransportError};
use crate::config::UsbConfig;

/// 通过 libusb 直接读数位板的中断端点
///
/// 打开时会从内核驱动手里抢走设备, drop 时尽量还回去.
pub struct UsbTablet {
    handle: DeviceHandle<GlobalContext>,
    interface: u8,
    endpoint: u8,
    timeout: Duration,
    detached: Vec<u8>,
    buf: Vec<u8>,
}

impl UsbTablet {
    pub fn open(
        vendor_id: u16,
        product_id: u16,
        config: &UsbConfig,
    ) -> Result<Self, TransportError> {
        let mut handle = rusb::open_device_with_vid_pid(vendor_id, product_id).ok_or(
            TransportError::DeviceNotFound {
                vendor_id,
                product_id,
            },
        )?;
        let device = handle.device();
        info!(
            "tablet found on bus {:03} address {:03}",
            device.bus_number(),
            device.address()
        );

        let descriptor = device.config_descriptor(0)?;
        let (endpoint, max_packet_size) = descriptor
            .interfaces()
            .filter(|interface| interface.number() == config.interface)
            .flat_map(|interface| interface.descriptors())
            .flat_map(|setting| setting.endpoint_descriptors())
            .find(|ep| {
                ep.direction() == Direction::In && ep.transfer_type() == TransferType::Interrupt
            })
            .map(|ep| (ep.address(), ep.max_packet_size()))
            .ok_or(TransportError::EndpointNotFound(config.interface))?;
        debug!(endpoint, max_packet_size, "using interrupt endpoint");

        // 不 reset 的话设备有时不出数据
        handle.reset()?;

        let mut detached = Vec::new();
        for &iface in &config.detach_interfaces {
            if handle.kernel_driver_active(iface)? {
                handle.detach_kernel_driver(iface)?;
                detached.push(iface);
            }
        }
        debug!(?detached, "kernel drivers detached");

        handle.set_active_configuration(descriptor.number())?;
        handle.claim_interface(config.interface)?;

        Ok(Self {
            handle,
            interface: config.interface,
            endpoint,
            timeout: Duration::from_millis(config.read_timeout_ms),
            detached,
            buf: vec![0; usize::from(max_packet_size)],
        })
    }
}

impl PacketReader for UsbTablet {
    fn read_packet(&mut self) -> Result<Option<&[u8]>, TransportError> {
        match self
            .handle
            .read_interrupt(self.endpoint, &mut self.buf, self.timeout)
        {
            Ok(len) => Ok(Some(&self.buf[..len])),
            Err(rusb::Error::Timeout) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for UsbTablet {
    fn drop(&mut self) {
        if let Err(e) = self.handle.release_interface(self.interface) {
            debug!("release interface {}: {e}", self.interface);
        }
        for &iface in &self.detached {
            if let Err(e) = self.handle.attach_kernel_driver(iface) {
                warn!("unable to reattach kernel driver to interface {iface}: {e}");
            }
        }
    }
}
