/// USB 接入, 基于 `rusb`
pub mod usb;

use thiserror::Error;

pub use usb::UsbTablet;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no device {vendor_id:04x}:{product_id:04x} is connected")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    #[error("interface {0} has no interrupt IN endpoint")]
    EndpointNotFound(u8),

    #[error("device has been disconnected")]
    Disconnected,

    #[error("USB error: {0}")]
    Usb(rusb::Error),
}

impl From<rusb::Error> for TransportError {
    fn from(e: rusb::Error) -> Self {
        match e {
            rusb::Error::NoDevice => TransportError::Disconnected,
            e => TransportError::Usb(e),
        }
    }
}

/// 报文来源
///
/// 每次调用阻塞读取一个报文. 超时返回 `Ok(None)`, 调用方可以借机检查是否该退出.
pub trait PacketReader {
    fn read_packet(&mut self) -> Result<Option<&[u8]>, TransportError>;
}

impl<R: PacketReader + ?Sized> PacketReader for Box<R> {
    fn read_packet(&mut self) -> Result<Option<&[u8]>, TransportError> {
        (**self).read_packet()
    }
}
