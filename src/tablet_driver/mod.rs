pub mod buttons;
pub mod decoder;
pub mod report;

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{debug, info};

pub use buttons::{ButtonMapping, Combo};
pub use decoder::{DecodeError, Decoder, PenState};
pub use report::Report;

use crate::event_dispatcher::EventSink;
use crate::input_devices::{PacketReader, TransportError};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// 驱动主循环: 阻塞读报文, 逐个交给解码器, 直到 `stop` 被置位或者出现致命错误
///
/// 只在报文之间检查 `stop`, 所以读超时决定了退出的响应速度.
pub fn run<R, S>(
    reader: &mut R,
    decoder: &mut Decoder<S>,
    stop: &AtomicBool,
) -> Result<(), DriverError>
where
    R: PacketReader + ?Sized,
    S: EventSink,
{
    let mut handled = 0u64;
    while !stop.load(Ordering::Relaxed) {
        let Some(packet) = reader.read_packet()? else {
            continue;
        };
        match decoder.handle_report(packet) {
            Ok(_) => handled += 1,
            Err(e) if e.is_recoverable() => debug!("dropping packet: {e}"),
            Err(e) => return Err(e.into()),
        }
    }
    info!(handled, "driver loop stopped");
    Ok(())
}
