//! 命名通道与引脚

use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// ADC 通道
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum AdcChannel {
    /// 点火输入
    AnalogIn1 = 0,
    GpioIn1 = 1,
    GpioIn2 = 2,
    GpioIn3 = 3,
    GpioIn4 = 4,
    GpioIn5 = 5,
    GpioIn6 = 6,
    GpioIn7 = 7,
    PowerIn = 8,
    PowerVcap = 9,
    Temperature = 10,
    CableType = 11,
}

impl AdcChannel {
    /// 全部通道（按编号排序）
    pub const ALL: [AdcChannel; 12] = [
        AdcChannel::AnalogIn1,
        AdcChannel::GpioIn1,
        AdcChannel::GpioIn2,
        AdcChannel::GpioIn3,
        AdcChannel::GpioIn4,
        AdcChannel::GpioIn5,
        AdcChannel::GpioIn6,
        AdcChannel::GpioIn7,
        AdcChannel::PowerIn,
        AdcChannel::PowerVcap,
        AdcChannel::Temperature,
        AdcChannel::CableType,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AdcChannel::AnalogIn1 => "analog_in1",
            AdcChannel::GpioIn1 => "gpio_in1",
            AdcChannel::GpioIn2 => "gpio_in2",
            AdcChannel::GpioIn3 => "gpio_in3",
            AdcChannel::GpioIn4 => "gpio_in4",
            AdcChannel::GpioIn5 => "gpio_in5",
            AdcChannel::GpioIn6 => "gpio_in6",
            AdcChannel::GpioIn7 => "gpio_in7",
            AdcChannel::PowerIn => "power_in",
            AdcChannel::PowerVcap => "power_vcap",
            AdcChannel::Temperature => "temperature",
            AdcChannel::CableType => "cable_type",
        }
    }
}

impl fmt::Display for AdcChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 指示灯
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum LedId {
    Right = 0,
    Center = 1,
    Left = 2,
}

/// CAN1 / J1708 电源使能引脚（MCU 编号）
pub const CAN1_J1708_POWER_GPIO: u32 = 512;
