use std::io;

use evdev_rs::enums::{EV_ABS, EV_KEY};
use thiserror::Error;
use tracing::trace;

use super::buttons::{ButtonMapping, derive_actions};
use super::report::{PenStatus, Report, ReportKind};
use crate::event_dispatcher::EventSink;
use crate::event_model::{AuxButtonEvent, PenLocation, PenSample, TabletEvent};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed report ({len} bytes)")]
    MalformedReport { len: usize },
    #[error("button {index} has no key combo ({len} configured)")]
    InvalidButtonIndex { index: u8, len: usize },
    #[error("failed to write to the virtual device: {0}")]
    Sink(#[from] io::Error),
}

impl DecodeError {
    /// 只有坏报文可以丢掉继续读, 其它都是配置或设备的问题
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedReport { .. })
    }
}

/// 笔是否已经进入感应范围
///
/// 第一次收到笔报文后置位, 协议里没有离开范围的报文, 所以不会复位.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PenState {
    hovering: bool,
}

impl PenState {
    pub fn hovering(&self) -> bool {
        self.hovering
    }

    /// 收到笔报文后的新状态, 以及这次是否刚进入范围
    pub fn observe_pen(self) -> (Self, bool) {
        (Self { hovering: true }, !self.hovering)
    }
}

/// 把报文解成 [`TabletEvent`], 不涉及任何状态
pub fn decode(report: &Report, max_y: i32) -> TabletEvent {
    match report.kind() {
        ReportKind::Pen(status) => TabletEvent::PenEvent(PenSample {
            x: report.raw_x(),
            y: max_y - report.raw_y(),
            pressure: report.pressure(),
            location: match status {
                PenStatus::Hover => PenLocation::Floating,
                PenStatus::Contact => PenLocation::Pressed,
            },
        }),
        ReportKind::Button => TabletEvent::AuxButton(derive_actions(report)),
        ReportKind::Ignored => TabletEvent::Unknown,
    }
}

/// 协议解码器, 每个报文解码后立即写入 `sink`, 每个报文以一次 flush 结尾
pub struct Decoder<S> {
    mapping: ButtonMapping,
    max_y: i32,
    pen: PenState,
    sink: S,
}

impl<S: EventSink> Decoder<S> {
    pub fn new(mapping: ButtonMapping, max_y: i32, sink: S) -> Self {
        Self {
            mapping,
            max_y,
            pen: PenState::default(),
            sink,
        }
    }

    pub fn pen_state(&self) -> PenState {
        self.pen
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// 处理一个报文
    ///
    /// 被忽略的报文返回 `TabletEvent::Unknown`, 不会碰 `sink`.
    /// 出错的报文同样不会写入任何事件.
    pub fn handle_report(&mut self, packet: &[u8]) -> Result<TabletEvent, DecodeError> {
        let report = Report::parse(packet)?;
        let event = decode(&report, self.max_y);
        trace!(?report, ?event, "decoded");

        match &event {
            TabletEvent::PenEvent(sample) => self.emit_pen(sample)?,
            TabletEvent::AuxButton(actions) => self.emit_buttons(actions)?,
            TabletEvent::Unknown => {}
        }
        Ok(event)
    }

    fn emit_pen(&mut self, sample: &PenSample) -> Result<(), DecodeError> {
        let (pen, entered) = self.pen.observe_pen();
        if entered {
            // 要先报 BTN_TOOL_PEN, 系统才会把它识别成数位板
            self.sink.emit_key(EV_KEY::BTN_TOOL_PEN, true)?;
        }
        self.pen = pen;

        self.sink.emit_abs(EV_ABS::ABS_X, sample.x)?;
        self.sink.emit_abs(EV_ABS::ABS_Y, sample.y)?;
        self.sink.emit_abs(EV_ABS::ABS_PRESSURE, sample.pressure)?;
        self.sink.emit_key(EV_KEY::BTN_TOUCH, sample.location.touching())?;
        self.sink.flush()?;
        Ok(())
    }

    fn emit_buttons(&mut self, actions: &[AuxButtonEvent]) -> Result<(), DecodeError> {
        // 先全部查表, 映射不全时整包不发
        let resolved = actions
            .iter()
            .map(|action| Ok((self.mapping.combo_for(action.button_id)?, action.pressed)))
            .collect::<Result<Vec<_>, DecodeError>>()?;

        for (combo, pressed) in resolved {
            for &key in combo {
                self.sink.emit_key(key, pressed)?;
            }
        }
        self.sink.flush()?;
        Ok(())
    }
}
