use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use tracing::warn;

use crate::tablet_driver::buttons::{ButtonMapping, Combo, LOGICAL_BUTTONS};

/// 数位板配置, 从 TOML 读取
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub vendor_id: u16,
    pub product_id: u16,
    /// 虚拟设备名, `xinput list` 里显示的就是它
    #[serde(default = "default_xinput_name")]
    pub xinput_name: String,
    /// 逻辑按键 1..=5 的组合键
    pub buttons: Vec<Combo>,
    pub pen: PenConfig,
    #[serde(default)]
    pub usb: UsbConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PenConfig {
    pub max_x: i32,
    pub max_y: i32,
    pub max_pressure: i32,
    #[serde(default)]
    pub resolution_x: i32,
    #[serde(default)]
    pub resolution_y: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsbConfig {
    /// 出数据的接口
    #[serde(default = "default_interface")]
    pub interface: u8,
    /// 需要从内核驱动手里拿过来的接口
    #[serde(default = "default_detach_interfaces")]
    pub detach_interfaces: Vec<u8>,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_xinput_name() -> String {
    "10moons-pen".to_string()
}

fn default_interface() -> u8 {
    2
}

fn default_detach_interfaces() -> Vec<u8> {
    vec![0, 1, 2]
}

fn default_read_timeout_ms() -> u64 {
    500
}

impl Default for UsbConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            detach_interfaces: default_detach_interfaces(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let pen = &self.pen;
        ensure!(pen.max_x > 0, "pen.max_x must be positive");
        ensure!(pen.max_y > 0, "pen.max_y must be positive");
        ensure!(pen.max_pressure > 0, "pen.max_pressure must be positive");
        ensure!(
            self.usb.read_timeout_ms > 0,
            "usb.read_timeout_ms must be positive"
        );
        if self.buttons.len() < LOGICAL_BUTTONS {
            warn!(
                "only {} of {LOGICAL_BUTTONS} buttons have a key combo, pressing the others will stop the driver",
                self.buttons.len()
            );
        }
        Ok(())
    }

    pub fn button_mapping(&self) -> ButtonMapping {
        ButtonMapping::new(self.buttons.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use evdev_rs::enums::EV_KEY;

    use super::*;

    const T503: &str = r#"
vendor_id = 0x08f2
product_id = 0x6811
xinput_name = "10moons-pen"
buttons = ["KEY_LEFTCTRL+KEY_Z", "KEY_E", "KEY_B", "KEY_LEFTBRACE", "KEY_RIGHTBRACE"]

[pen]
max_x = 4095
max_y = 2047
max_pressure = 1023
resolution_x = 160
resolution_y = 160
"#;

    #[test]
    fn parses_full_config() {
        let config = Config::from_toml(T503).unwrap();
        assert_eq!(config.vendor_id, 0x08f2);
        assert_eq!(config.product_id, 0x6811);
        assert_eq!(config.pen.max_y, 2047);
        assert_eq!(config.pen.resolution_x, 160);

        let mapping = config.button_mapping();
        assert_eq!(mapping.len(), 5);
        assert_eq!(
            mapping.combo_for(1).unwrap(),
            &[EV_KEY::KEY_LEFTCTRL, EV_KEY::KEY_Z]
        );
        assert_eq!(mapping.combo_for(5).unwrap(), &[EV_KEY::KEY_RIGHTBRACE]);
    }

    #[test]
    fn usb_section_defaults() {
        let config = Config::from_toml(T503).unwrap();
        assert_eq!(config.usb.interface, 2);
        assert_eq!(config.usb.detach_interfaces, vec![0, 1, 2]);
        assert_eq!(config.usb.read_timeout_ms, 500);
    }

    #[test]
    fn unknown_key_name_is_rejected() {
        let text = T503.replace("KEY_E\"", "KEY_NOT_A_KEY\"");
        let err = Config::from_toml(&text).unwrap_err();
        assert!(format!("{err:#}").contains("KEY_NOT_A_KEY"));
    }

    #[test]
    fn non_positive_axis_is_rejected() {
        let text = T503.replace("max_y = 2047", "max_y = 0");
        assert!(Config::from_toml(&text).is_err());
    }

    #[test]
    fn short_button_list_is_allowed() {
        let text = T503.replace(
            r#"["KEY_LEFTCTRL+KEY_Z", "KEY_E", "KEY_B", "KEY_LEFTBRACE", "KEY_RIGHTBRACE"]"#,
            r#"["KEY_A", "KEY_B"]"#,
        );
        let config = Config::from_toml(&text).unwrap();
        assert_eq!(config.button_mapping().len(), 2);
    }

    #[test]
    fn load_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(T503.as_bytes()).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.xinput_name, "10moons-pen");

        let missing = file.path().with_extension("missing");
        let err = Config::load(&missing).unwrap_err();
        assert!(err.to_string().contains("reading config"));
    }
}
