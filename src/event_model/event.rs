/// 笔尖相对板面的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenLocation {
    /// 悬停, 在感应范围内但未接触板面
    Floating,
    /// 笔尖接触板面
    Pressed,
}

impl PenLocation {
    /// `BTN_TOUCH` 的值
    pub fn touching(self) -> bool {
        matches!(self, Self::Pressed)
    }
}

/// 一次笔报文解码出来的采样, 坐标已经换算到虚拟设备的坐标系 (Y 轴翻转)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenSample {
    pub x: i32,
    pub y: i32,
    pub pressure: i32,
    pub location: PenLocation,
}

/// 逻辑按键的按下/抬起, `button_id` 从 1 开始
///
/// 协议里用有符号整数表示: 绝对值是按键序号, 正数按下, 负数抬起.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuxButtonEvent {
    pub button_id: u8,
    pub pressed: bool,
}

impl AuxButtonEvent {
    pub fn from_signed(action: i8) -> Self {
        Self {
            button_id: action.unsigned_abs(),
            pressed: action > 0,
        }
    }

    /// 还原成协议里的有符号表示
    pub fn as_signed(&self) -> i8 {
        let id = self.button_id as i8;
        if self.pressed { id } else { -id }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabletEvent {
    PenEvent(PenSample),
    /// 一个按键报文里的全部动作, 按发送顺序排列
    AuxButton(Vec<AuxButtonEvent>),
    Unknown,
}

impl Default for TabletEvent {
    fn default() -> Self {
        Self::Unknown
    }
}
