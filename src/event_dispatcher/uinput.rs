use std::io;

use evdev_rs::enums::{EV_ABS, EV_KEY, EV_SYN, EventCode, EventType};
use evdev_rs::{
    AbsInfo, DeviceWrapper, EnableCodeData, InputEvent, TimeVal, UInputDevice, UninitDevice,
};
use tracing::info;

use super::EventSink;
use crate::config::Config;

/// uinput 设备版本号
const DEVICE_VERSION: u16 = 0x3;

/// 系统里看到的虚拟数位板
pub struct VirtualPen {
    device: UInputDevice,
}

impl VirtualPen {
    /// 按配置启用笔的按键, 三个绝对轴, 以及所有组合键用到的键
    pub fn create(config: &Config) -> io::Result<Self> {
        let dev = UninitDevice::new().ok_or_else(|| io::Error::other("libevdev_new failed"))?;
        dev.set_name(&config.xinput_name);
        dev.set_version(DEVICE_VERSION);

        dev.enable_event_type(&EventType::EV_KEY)?;
        let mut keys = vec![EV_KEY::BTN_TOOL_PEN, EV_KEY::BTN_TOUCH];
        for key in config.button_mapping().keys() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        for key in keys {
            dev.enable_event_code(&EventCode::EV_KEY(key), None)?;
        }

        let pen = &config.pen;
        dev.enable_event_type(&EventType::EV_ABS)?;
        for (axis, maximum, resolution) in [
            (EV_ABS::ABS_X, pen.max_x, pen.resolution_x),
            (EV_ABS::ABS_Y, pen.max_y, pen.resolution_y),
            (EV_ABS::ABS_PRESSURE, pen.max_pressure, 0),
        ] {
            let info = AbsInfo {
                value: 0,
                minimum: 0,
                maximum,
                fuzz: 0,
                flat: 0,
                resolution,
            };
            dev.enable_event_code(
                &EventCode::EV_ABS(axis),
                Some(EnableCodeData::AbsInfo(info)),
            )?;
        }

        let device = UInputDevice::create_from_device(&dev)?;
        info!(
            name = %config.xinput_name,
            devnode = device.devnode().unwrap_or("?"),
            "virtual pen created"
        );
        Ok(Self { device })
    }

    fn write(&self, code: EventCode, value: i32) -> io::Result<()> {
        // 时间戳由内核填
        let event = InputEvent::new(&TimeVal::new(0, 0), &code, value);
        self.device.write_event(&event)
    }
}

impl EventSink for VirtualPen {
    fn emit_key(&mut self, key: EV_KEY, pressed: bool) -> io::Result<()> {
        self.write(EventCode::EV_KEY(key), i32::from(pressed))
    }

    fn emit_abs(&mut self, axis: EV_ABS, value: i32) -> io::Result<()> {
        self.write(EventCode::EV_ABS(axis), value)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.write(EventCode::EV_SYN(EV_SYN::SYN_REPORT), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // 需要 /dev/uinput 权限 (cargo test -- --ignored)
    fn create_virtual_pen() {
        let config = Config::from_toml(
            r#"
vendor_id = 0x08f2
product_id = 0x6811
buttons = ["KEY_LEFTCTRL+KEY_Z", "KEY_Z"]

[pen]
max_x = 4095
max_y = 2047
max_pressure = 1023
"#,
        )
        .unwrap();
        let mut pen = VirtualPen::create(&config).unwrap();
        pen.emit_key(EV_KEY::BTN_TOOL_PEN, true).unwrap();
        pen.emit_abs(EV_ABS::ABS_X, 100).unwrap();
        pen.flush().unwrap();
    }
}
