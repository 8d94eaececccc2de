/// 虚拟设备出口, 把解码结果写给系统输入栈 (uinput)
pub mod event_dispatcher;

/// 数位板驱动相关逻辑实现: 报文布局, 按键表, 解码器和主循环
pub mod tablet_driver;

/// 原始输入接口实现 (USB)
pub mod input_devices;

/// 数位板事件的抽象层, 定义事件模型
pub mod event_model;

/// 配置文件
pub mod config;

#[cfg(test)]
pub(crate) mod testing;

// 数据流: `input_devices` 读报文 -> `tablet_driver` 解码 -> `event_dispatcher` 写事件
// 全程单线程阻塞, 一个报文处理完才读下一个

// `tablet_driver` 里唯一跨报文的状态是笔有没有进入感应范围 (`PenState`)
// 这块板子 (10moons T503) 只有悬停和接触两种笔报文, 没有离开范围的报文,
// 所以 `BTN_TOOL_PEN` 只在第一次看到笔的时候按下, 之后一直保持

// 板载按键发出来的不是按键码, 而是两组固定的字节组合, 见 `tablet_driver::buttons`
// 每个逻辑按键在配置里对应一组键 (比如 ctrl+z), 按下时整组按下, 抬起时整组抬起
