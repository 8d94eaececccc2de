//! 单元测试用的事件记录器

use std::io;

use evdev_rs::enums::{EV_ABS, EV_KEY};

use crate::event_dispatcher::EventSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emitted {
    Key(EV_KEY, bool),
    Abs(EV_ABS, i32),
    Sync,
}

#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Emitted>,
    fail: bool,
}

impl Recorder {
    /// 每次写入都返回错误
    pub fn failing() -> Self {
        Self {
            events: Vec::new(),
            fail: true,
        }
    }

    pub fn flushes(&self) -> usize {
        self.events.iter().filter(|e| **e == Emitted::Sync).count()
    }

    /// 按 `Sync` 切开的完整帧, 不含 `Sync` 本身
    pub fn frames(&self) -> Vec<Vec<Emitted>> {
        let mut frames = Vec::new();
        let mut current = Vec::new();
        for event in &self.events {
            match event {
                Emitted::Sync => frames.push(std::mem::take(&mut current)),
                other => current.push(*other),
            }
        }
        frames
    }

    fn record(&mut self, event: Emitted) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::other("sink closed"));
        }
        self.events.push(event);
        Ok(())
    }
}

impl EventSink for Recorder {
    fn emit_key(&mut self, key: EV_KEY, pressed: bool) -> io::Result<()> {
        self.record(Emitted::Key(key, pressed))
    }

    fn emit_abs(&mut self, axis: EV_ABS, value: i32) -> io::Result<()> {
        self.record(Emitted::Abs(axis, value))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.record(Emitted::Sync)
    }
}
