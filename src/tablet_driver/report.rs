//! T503 中断端点报文的固定布局
//!
//! 每个报文有意义的部分只有前 8 个字节. 笔报文和按键报文共用同一个缓冲区布局,
//! 通过 byte 1 (笔状态) 和 byte 0 (报文 ID) 区分.

use num_enum::TryFromPrimitive;

use super::DecodeError;

/// 报文中有意义的字节数, 端点的 `max_packet_size` 可能更大, 多余的字节忽略
pub const REPORT_LEN: usize = 8;

/// byte 0 等于它时是按键报文
pub const BUTTON_REPORT_ID: u8 = 2;

/// byte 1 上的笔状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum PenStatus {
    Hover = 192,
    Contact = 193,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Pen(PenStatus),
    Button,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report([u8; REPORT_LEN]);

impl Report {
    pub fn new(bytes: [u8; REPORT_LEN]) -> Self {
        Self(bytes)
    }

    /// 从设备读到的原始数据构造报文, 短于 [`REPORT_LEN`] 的返回 `MalformedReport`
    pub fn parse(packet: &[u8]) -> Result<Self, DecodeError> {
        let bytes = packet
            .get(..REPORT_LEN)
            .and_then(|head| <[u8; REPORT_LEN]>::try_from(head).ok())
            .ok_or(DecodeError::MalformedReport { len: packet.len() })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; REPORT_LEN] {
        &self.0
    }

    /// 先看笔状态, 再看报文 ID
    pub fn kind(&self) -> ReportKind {
        if let Ok(status) = PenStatus::try_from(self.pen_status_byte()) {
            ReportKind::Pen(status)
        } else if self.report_id() == BUTTON_REPORT_ID {
            ReportKind::Button
        } else {
            ReportKind::Ignored
        }
    }

    /// byte 0
    pub fn report_id(&self) -> u8 {
        self.0[0]
    }

    /// byte 1: 笔报文里是 [`PenStatus`], 按键报文里是第一组按键
    pub fn pen_status_byte(&self) -> u8 {
        self.0[1]
    }

    /// byte 1, 按键报文的第一组按键
    pub fn first_button_group(&self) -> u8 {
        self.0[1]
    }

    /// byte 3, 按键报文的第二组按键
    pub fn second_button_group(&self) -> u8 {
        self.0[3]
    }

    /// bytes 2..4, 传感器原始 Y (高字节在 byte 3)
    pub fn raw_y(&self) -> i32 {
        combine(self.0[3], self.0[2])
    }

    /// bytes 4..6, 传感器原始 X (高字节在 byte 5)
    pub fn raw_x(&self) -> i32 {
        combine(self.0[5], self.0[4])
    }

    /// bytes 6..8, 压感 (高字节在 byte 7)
    pub fn pressure(&self) -> i32 {
        combine(self.0[7], self.0[6])
    }
}

// 固件按 255 进位, 不是 256
fn combine(high: u8, low: u8) -> i32 {
    i32::from(high) * 255 + i32::from(low)
}
