//! 协议值类型
//!
//! 命令参数和响应字段使用的强类型值。

use crate::ProtocolError;
use bilge::prelude::*;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// 版本号
// ============================================================================

/// 4 字节版本号（MCU / FPGA）
///
/// 文本形式为 `%X.%X.%X.%X`：大写十六进制，不补零，点号分隔。
/// 下游会解析这个字符串，格式本身属于契约。
///
/// ```rust
/// use mctl_protocol::FirmwareVersion;
///
/// assert_eq!(FirmwareVersion([0xAB, 0x00, 0x01, 0xFF]).to_string(), "AB.0.1.FF");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FirmwareVersion(pub [u8; 4]);

impl FirmwareVersion {
    /// 按大端拼成 u32
    pub fn as_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// 紧凑的小写十六进制形式（如 `41000002`），FPGA 版本习惯用这种写法
    pub fn to_compact_hex(self) -> String {
        format!("{:x}", self.as_u32())
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{:X}.{:X}.{:X}.{:X}", a, b, c, d)
    }
}

// ============================================================================
// LED 颜色与状态
// ============================================================================

/// 24 位 RGB 颜色
///
/// 位布局固定：red = bit 16-23，green = bit 8-15，blue = bit 0-7。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RgbColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor::new(0, 0, 0);
    pub const WHITE: RgbColor = RgbColor::new(0xFF, 0xFF, 0xFF);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// 从 `0xRRGGBB` 解包（bit 24 以上被忽略）
    pub const fn from_rgb24(rgb: u32) -> Self {
        Self {
            red: ((rgb & 0xFF0000) >> 16) as u8,
            green: ((rgb & 0x00FF00) >> 8) as u8,
            blue: (rgb & 0x0000FF) as u8,
        }
    }

    /// 打包为 `0xRRGGBB`
    pub const fn to_rgb24(self) -> u32 {
        ((self.red as u32) << 16) | ((self.green as u32) << 8) | self.blue as u32
    }
}

impl From<u32> for RgbColor {
    fn from(rgb: u32) -> Self {
        Self::from_rgb24(rgb)
    }
}

impl From<RgbColor> for u32 {
    fn from(color: RgbColor) -> Self {
        color.to_rgb24()
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.to_rgb24())
    }
}

impl FromStr for RgbColor {
    type Err = ProtocolError;

    /// 接受 `#RRGGBB`、`0xRRGGBB` 或十进制整数
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = if let Some(hex) = s.strip_prefix('#') {
            u32::from_str_radix(hex, 16).ok().filter(|_| hex.len() == 6)
        } else if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u32::from_str_radix(hex, 16).ok()
        } else {
            s.parse::<u32>().ok()
        };

        match parsed {
            Some(rgb) if rgb <= 0xFF_FFFF => Ok(Self::from_rgb24(rgb)),
            Some(rgb) => Err(ProtocolError::InvalidValue {
                field: "rgb",
                value: rgb,
            }),
            None => Err(ProtocolError::InvalidValue {
                field: "rgb",
                value: 0,
            }),
        }
    }
}

/// LED 当前状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedStatus {
    /// 亮度 0-255，0 表示熄灭
    pub brightness: u8,
    pub color: RgbColor,
}

impl LedStatus {
    pub fn is_on(&self) -> bool {
        self.brightness != 0
    }
}

// ============================================================================
// 电源
// ============================================================================

/// 上电阈值配置
///
/// 三个字段都是 16 位无符号数，大端传输。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerThresholdConfig {
    /// 晃动计数阈值
    pub wiggle_count: u16,
    /// 晃动计数采样周期（ms）
    pub wiggle_count_sample_period_ms: u16,
    /// 点火电压阈值（mV）
    pub ignition_threshold_mv: u16,
}

impl PowerThresholdConfig {
    /// 按大端编码为 6 字节
    pub fn to_bytes(self) -> [u8; 6] {
        let mut out = [0u8; 6];
        out[0..2].copy_from_slice(&self.wiggle_count.to_be_bytes());
        out[2..4].copy_from_slice(&self.wiggle_count_sample_period_ms.to_be_bytes());
        out[4..6].copy_from_slice(&self.ignition_threshold_mv.to_be_bytes());
        out
    }

    pub fn from_bytes(bytes: [u8; 6]) -> Self {
        Self {
            wiggle_count: u16::from_be_bytes([bytes[0], bytes[1]]),
            wiggle_count_sample_period_ms: u16::from_be_bytes([bytes[2], bytes[3]]),
            ignition_threshold_mv: u16::from_be_bytes([bytes[4], bytes[5]]),
        }
    }
}

/// 上电原因位域
///
/// - Bit 0: 点火触发
/// - Bit 1: 晃动触发
/// - Bit 2: ARM 锁死
/// - Bit 3: 看门狗复位
/// - Bit 4-7: 保留
#[bitsize(8)]
#[derive(FromBits, DebugBits, Clone, Copy, Default, PartialEq, Eq)]
pub struct PowerOnReason {
    pub ignition_trigger: bool, // Bit 0
    pub wiggle_trigger: bool,   // Bit 1
    pub arm_lockup: bool,       // Bit 2
    pub watchdog_reset: bool,   // Bit 3
    pub reserved: u4,           // Bit 4-7
}

impl PowerOnReason {
    /// 原始字节
    pub fn raw(self) -> u8 {
        u8::from(self).value()
    }

    pub fn from_raw(raw: u8) -> Self {
        Self::from(u8::new(raw))
    }
}

// ============================================================================
// RTC
// ============================================================================

/// RTC 校准寄存器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationRegisters {
    pub digital: u8,
    pub analog: u8,
}

/// RTC 电池健康状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BatteryHealth {
    Good,
    LowOrAbsent,
}

impl BatteryHealth {
    pub fn is_good(self) -> bool {
        matches!(self, BatteryHealth::Good)
    }
}

impl fmt::Display for BatteryHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatteryHealth::Good => f.write_str("Good"),
            BatteryHealth::LowOrAbsent => f.write_str("Low or not present"),
        }
    }
}

/// 电池检测结果的布尔约定
///
/// 设备固件的不同版本对"电池良好"的表达不一致，因此显式选择：
/// - `PayloadNonZero`：电池状态字节非零即良好（状态码只用于区分成功/失败）
/// - `StatusPositive`：状态码大于零即良好（载荷只做长度校验）
///
/// 两种约定下，负状态码一律是设备错误，与载荷无关。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BatteryConvention {
    #[default]
    PayloadNonZero,
    StatusPositive,
}

impl BatteryConvention {
    /// 在状态码非负的前提下判定电池健康
    pub fn evaluate(self, status: i32, battery_state: u8) -> BatteryHealth {
        let good = match self {
            BatteryConvention::PayloadNonZero => battery_state != 0,
            BatteryConvention::StatusPositive => status > 0,
        };
        if good {
            BatteryHealth::Good
        } else {
            BatteryHealth::LowOrAbsent
        }
    }
}

impl FromStr for BatteryConvention {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "payload_non_zero" | "payload" => Ok(BatteryConvention::PayloadNonZero),
            "status_positive" | "status" => Ok(BatteryConvention::StatusPositive),
            _ => Err(ProtocolError::InvalidValue {
                field: "battery_convention",
                value: 0,
            }),
        }
    }
}

// ============================================================================
// GPIO
// ============================================================================

/// GPIO 编号掩码为 16 位
pub const fn mask_gpio_pin(pin: u32) -> u16 {
    (pin & 0x0000_FFFF) as u16
}

/// GPIO 电平掩码为 1 位
pub const fn mask_gpio_value(value: u32) -> u8 {
    (value & 0x0000_0001) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_formatting() {
        assert_eq!(FirmwareVersion([0x01, 0x02, 0x03, 0x04]).to_string(), "1.2.3.4");
        assert_eq!(FirmwareVersion([0xAB, 0x00, 0x01, 0xFF]).to_string(), "AB.0.1.FF");
        assert_eq!(FirmwareVersion([0x0A, 0x10, 0x2C, 0x00]).to_string(), "A.10.2C.0");
    }

    #[test]
    fn test_version_compact_hex() {
        let version = FirmwareVersion([0x41, 0x00, 0x00, 0x02]);
        assert_eq!(version.as_u32(), 0x4100_0002);
        assert_eq!(version.to_compact_hex(), "41000002");
    }

    #[test]
    fn test_rgb_bit_positions() {
        let color = RgbColor::from_rgb24(0xFF0000);
        assert_eq!(color, RgbColor::new(0xFF, 0, 0));

        let color = RgbColor::from_rgb24(0x00FF00);
        assert_eq!(color, RgbColor::new(0, 0xFF, 0));

        let color = RgbColor::from_rgb24(0x0000FF);
        assert_eq!(color, RgbColor::new(0, 0, 0xFF));

        let color = RgbColor::from_rgb24(0x123456);
        assert_eq!((color.red, color.green, color.blue), (0x12, 0x34, 0x56));
        assert_eq!(color.to_rgb24(), 0x123456);
    }

    #[test]
    fn test_rgb_ignores_high_byte() {
        assert_eq!(RgbColor::from_rgb24(0xFF12_3456), RgbColor::new(0x12, 0x34, 0x56));
    }

    #[test]
    fn test_rgb_parse() {
        assert_eq!("#FF8000".parse::<RgbColor>().unwrap(), RgbColor::new(0xFF, 0x80, 0));
        assert_eq!("0x00ff00".parse::<RgbColor>().unwrap(), RgbColor::new(0, 0xFF, 0));
        assert_eq!("16711680".parse::<RgbColor>().unwrap(), RgbColor::new(0xFF, 0, 0));
        assert!("#FFF".parse::<RgbColor>().is_err());
        assert!("0x1000000".parse::<RgbColor>().is_err());
        assert!("red".parse::<RgbColor>().is_err());
    }

    #[test]
    fn test_rgb_display() {
        assert_eq!(RgbColor::new(0xFF, 0x80, 0x01).to_string(), "#FF8001");
    }

    #[test]
    fn test_threshold_bytes_big_endian() {
        let cfg = PowerThresholdConfig {
            wiggle_count: 0x0102,
            wiggle_count_sample_period_ms: 0x0304,
            ignition_threshold_mv: 0x0506,
        };
        assert_eq!(cfg.to_bytes(), [1, 2, 3, 4, 5, 6]);
        assert_eq!(PowerThresholdConfig::from_bytes(cfg.to_bytes()), cfg);
    }

    #[test]
    fn test_power_on_reason_bit_order() {
        let reason = PowerOnReason::from_raw(0x01);
        assert!(reason.ignition_trigger());
        assert!(!reason.wiggle_trigger());

        let reason = PowerOnReason::from_raw(0x0A);
        assert!(!reason.ignition_trigger());
        assert!(reason.wiggle_trigger());
        assert!(!reason.arm_lockup());
        assert!(reason.watchdog_reset());
        assert_eq!(reason.raw(), 0x0A);
    }

    #[test]
    fn test_battery_convention_payload() {
        let c = BatteryConvention::PayloadNonZero;
        assert_eq!(c.evaluate(0, 1), BatteryHealth::Good);
        assert_eq!(c.evaluate(0, 0), BatteryHealth::LowOrAbsent);
        assert_eq!(c.evaluate(1, 0), BatteryHealth::LowOrAbsent);
    }

    #[test]
    fn test_battery_convention_status() {
        let c = BatteryConvention::StatusPositive;
        assert_eq!(c.evaluate(1, 0), BatteryHealth::Good);
        assert_eq!(c.evaluate(0, 1), BatteryHealth::LowOrAbsent);
    }

    #[test]
    fn test_battery_health_display() {
        assert_eq!(BatteryHealth::Good.to_string(), "Good");
        assert_eq!(BatteryHealth::LowOrAbsent.to_string(), "Low or not present");
    }

    #[test]
    fn test_battery_convention_parse() {
        assert_eq!(
            "status_positive".parse::<BatteryConvention>().unwrap(),
            BatteryConvention::StatusPositive
        );
        assert_eq!("payload".parse::<BatteryConvention>().unwrap(), BatteryConvention::PayloadNonZero);
        assert!("sign".parse::<BatteryConvention>().is_err());
    }

    #[test]
    fn test_gpio_masks() {
        assert_eq!(mask_gpio_pin(512), 512);
        assert_eq!(mask_gpio_pin(0x0001_0200), 0x0200);
        assert_eq!(mask_gpio_value(1), 1);
        assert_eq!(mask_gpio_value(2), 0);
        assert_eq!(mask_gpio_value(0xFFFF_FFFF), 1);
    }
}
