/// 基于 uinput 的虚拟数位板
pub mod uinput;

use std::io;

use evdev_rs::enums::{EV_ABS, EV_KEY};
use tracing::info;

pub use uinput::VirtualPen;

/// 事件出口
///
/// 一个报文产生的事件按顺序写入, 最后调用一次 [`EventSink::flush`] 作为一帧的结束.
pub trait EventSink {
    fn emit_key(&mut self, key: EV_KEY, pressed: bool) -> io::Result<()>;
    fn emit_abs(&mut self, axis: EV_ABS, value: i32) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn emit_key(&mut self, key: EV_KEY, pressed: bool) -> io::Result<()> {
        (**self).emit_key(key, pressed)
    }

    fn emit_abs(&mut self, axis: EV_ABS, value: i32) -> io::Result<()> {
        (**self).emit_abs(axis, value)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// 只打日志, 不创建设备. 调试协议用
#[derive(Debug, Default)]
pub struct LogSink {
    frames: u64,
}

impl EventSink for LogSink {
    fn emit_key(&mut self, key: EV_KEY, pressed: bool) -> io::Result<()> {
        info!(frame = self.frames, ?key, pressed, "key");
        Ok(())
    }

    fn emit_abs(&mut self, axis: EV_ABS, value: i32) -> io::Result<()> {
        info!(frame = self.frames, ?axis, value, "abs");
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        info!(frame = self.frames, "syn");
        self.frames += 1;
        Ok(())
    }
}
