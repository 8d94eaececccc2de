//! 板载快捷键: 报文 -> 逻辑按键动作 -> 组合键
//!
//! 板子上的物理按键分两组, 分别编码在 byte 1 和 byte 3. 每组各查一张表,
//! 两组的结果按顺序拼接; 都没命中时发送 "全部抬起".

use std::str::FromStr;

use evdev_rs::enums::{EV_KEY, EventCode, EventType};
use serde::Deserialize;
use thiserror::Error;

use super::DecodeError;
use super::report::Report;
use crate::event_model::AuxButtonEvent;

/// 协议能编码的逻辑按键数
pub const LOGICAL_BUTTONS: usize = 5;

/// byte 1 -> 动作
const FIRST_GROUP: &[(u8, &[i8])] = &[(2, &[-2, 1]), (4, &[-1, 2]), (6, &[1, 2])];

/// byte 3 -> 动作, 第二项是额外要求的 byte 1
const SECOND_GROUP: &[(u8, Option<u8>, &[i8])] = &[
    (44, None, &[-4, -5, 3]),
    (43, None, &[-3, -5, 4]),
    (29, Some(1), &[-3, -4, 5]),
];

const ALL_RELEASED: &[i8] = &[-1, -2, -3, -4, -5];

fn first_group(report: &Report) -> &'static [i8] {
    let value = report.first_button_group();
    FIRST_GROUP
        .iter()
        .find(|(code, _)| *code == value)
        .map(|(_, actions)| *actions)
        .unwrap_or_default()
}

fn second_group(report: &Report) -> &'static [i8] {
    let value = report.second_button_group();
    let first = report.first_button_group();
    SECOND_GROUP
        .iter()
        .find(|(code, with_first, _)| *code == value && with_first.is_none_or(|f| f == first))
        .map(|(_, _, actions)| *actions)
        .unwrap_or_default()
}

/// 计算一个按键报文对应的动作序列
pub fn derive_actions(report: &Report) -> Vec<AuxButtonEvent> {
    let mut actions: Vec<i8> = first_group(report)
        .iter()
        .chain(second_group(report))
        .copied()
        .collect();
    if actions.is_empty() {
        actions.extend_from_slice(ALL_RELEASED);
    }
    actions.into_iter().map(AuxButtonEvent::from_signed).collect()
}

#[derive(Debug, Error)]
pub enum ComboParseError {
    #[error("empty key combo")]
    Empty,
    #[error("unknown key name `{0}`")]
    UnknownKey(String),
}

/// 一个逻辑按键对应的一组键, 同时按下同时抬起
///
/// 配置文件里写成 `KEY_LEFTCTRL+KEY_Z` 的形式.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Combo(Vec<EV_KEY>);

impl Combo {
    pub fn new(keys: Vec<EV_KEY>) -> Result<Self, ComboParseError> {
        if keys.is_empty() {
            return Err(ComboParseError::Empty);
        }
        Ok(Self(keys))
    }

    pub fn keys(&self) -> &[EV_KEY] {
        &self.0
    }
}

impl FromStr for Combo {
    type Err = ComboParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keys = s
            .split('+')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(parse_key)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(keys)
    }
}

impl TryFrom<String> for Combo {
    type Error = ComboParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

fn parse_key(name: &str) -> Result<EV_KEY, ComboParseError> {
    match EventCode::from_str(&EventType::EV_KEY, name) {
        Some(EventCode::EV_KEY(key)) => Ok(key),
        _ => Err(ComboParseError::UnknownKey(name.to_string())),
    }
}

/// 逻辑按键 -> 组合键, 第 `i` 项对应逻辑按键 `i + 1`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonMapping {
    combos: Vec<Combo>,
}

impl ButtonMapping {
    pub fn new(combos: Vec<Combo>) -> Self {
        Self { combos }
    }

    pub fn len(&self) -> usize {
        self.combos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combos.is_empty()
    }

    /// `index` 从 1 开始
    pub fn combo_for(&self, index: u8) -> Result<&[EV_KEY], DecodeError> {
        usize::from(index)
            .checked_sub(1)
            .and_then(|i| self.combos.get(i))
            .map(Combo::keys)
            .ok_or(DecodeError::InvalidButtonIndex {
                index,
                len: self.combos.len(),
            })
    }

    /// 所有会被发送的键, 建虚拟设备时需要逐个启用
    pub fn keys(&self) -> impl Iterator<Item = EV_KEY> + '_ {
        self.combos.iter().flat_map(|combo| combo.keys().iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button_report(first: u8, second: u8) -> Report {
        Report::new([2, first, 0, second, 0, 0, 0, 0])
    }

    fn signed(report: &Report) -> Vec<i8> {
        derive_actions(report).iter().map(AuxButtonEvent::as_signed).collect()
    }

    #[test]
    fn first_group_table() {
        assert_eq!(signed(&button_report(2, 0)), vec![-2, 1]);
        assert_eq!(signed(&button_report(4, 0)), vec![-1, 2]);
        assert_eq!(signed(&button_report(6, 0)), vec![1, 2]);
    }

    #[test]
    fn second_group_table() {
        assert_eq!(signed(&button_report(0, 44)), vec![-4, -5, 3]);
        assert_eq!(signed(&button_report(0, 43)), vec![-3, -5, 4]);
        assert_eq!(signed(&button_report(1, 29)), vec![-3, -4, 5]);
    }

    #[test]
    fn button_five_needs_first_byte_one() {
        assert_eq!(signed(&button_report(0, 29)), vec![-1, -2, -3, -4, -5]);
    }

    #[test]
    fn groups_concatenate_in_order() {
        assert_eq!(signed(&button_report(6, 44)), vec![1, 2, -4, -5, 3]);
    }

    #[test]
    fn nothing_recognised_releases_everything() {
        assert_eq!(signed(&button_report(0, 0)), vec![-1, -2, -3, -4, -5]);
        assert_eq!(signed(&button_report(7, 12)), vec![-1, -2, -3, -4, -5]);
    }

    #[test]
    fn parse_combo() {
        let combo: Combo = "KEY_LEFTCTRL+KEY_Z".parse().unwrap();
        assert_eq!(combo.keys(), &[EV_KEY::KEY_LEFTCTRL, EV_KEY::KEY_Z]);

        let single: Combo = " KEY_E ".parse().unwrap();
        assert_eq!(single.keys(), &[EV_KEY::KEY_E]);
    }

    #[test]
    fn parse_combo_rejects_bad_input() {
        assert!(matches!("".parse::<Combo>(), Err(ComboParseError::Empty)));
        assert!(matches!(
            "KEY_A+KEY_NOPE".parse::<Combo>(),
            Err(ComboParseError::UnknownKey(name)) if name == "KEY_NOPE"
        ));
    }

    #[test]
    fn index_past_mapping_is_an_error() {
        let combos = ["KEY_A", "KEY_B", "KEY_C", "KEY_D", "KEY_E"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let mapping = ButtonMapping::new(combos);

        assert_eq!(mapping.combo_for(1).unwrap(), &[EV_KEY::KEY_A]);
        assert_eq!(mapping.combo_for(5).unwrap(), &[EV_KEY::KEY_E]);
        assert!(matches!(
            mapping.combo_for(6),
            Err(DecodeError::InvalidButtonIndex { index: 6, len: 5 })
        ));
        assert!(matches!(
            mapping.combo_for(0),
            Err(DecodeError::InvalidButtonIndex { index: 0, len: 5 })
        ));
    }
}
