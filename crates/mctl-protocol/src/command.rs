//! 命令编解码
//!
//! 每个硬件操作是一个实现了 [`Command`] 的结构体：
//! - `payload()` 把参数编码为请求载荷
//! - `decode()` 在状态码非负时把响应载荷解码为类型化结果
//!
//! 解码严格按字段宽度校验长度，绝不读越界，也不对截断的响应"补零"。

use crate::frame::{Payload, RequestFrame};
use crate::timestamp::RtcTimestamp;
use crate::types::{
    BatteryConvention, BatteryHealth, CalibrationRegisters, FirmwareVersion, LedStatus,
    PowerOnReason, PowerThresholdConfig, RgbColor, mask_gpio_pin, mask_gpio_value,
};
use crate::{Opcode, ProtocolError, exact};
use smallvec::smallvec;

/// 单个硬件命令
pub trait Command {
    /// 成功时的类型化结果
    type Output;

    /// 操作码
    const OPCODE: Opcode;

    /// 是否需要独占 LED 锁
    const EXCLUSIVE: bool = false;

    /// 设备命令集是否实现了该操作
    const IMPLEMENTED: bool = true;

    /// 发送前的本地校验（失败时不建立连接）
    fn validate(&self) -> Result<(), ProtocolError> {
        Ok(())
    }

    /// 请求载荷
    fn payload(&self) -> Payload;

    /// 解码响应载荷（仅在 `status >= 0` 时调用）
    fn decode(&self, status: i32, payload: &[u8]) -> Result<Self::Output, ProtocolError>;

    /// 构建请求帧
    fn to_request(&self) -> RequestFrame {
        RequestFrame::new(Self::OPCODE, &self.payload())
    }
}

/// 无响应载荷的命令：载荷必须为空
fn expect_empty(opcode: Opcode, payload: &[u8]) -> Result<(), ProtocolError> {
    exact::<0>(opcode, payload).map(|_| ())
}

// ============================================================================
// 版本查询
// ============================================================================

/// 查询 MCU 版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetMcuVersion;

impl Command for GetMcuVersion {
    type Output = FirmwareVersion;
    const OPCODE: Opcode = Opcode::GetMcuVersion;

    fn payload(&self) -> Payload {
        Payload::new()
    }

    fn decode(&self, _status: i32, payload: &[u8]) -> Result<FirmwareVersion, ProtocolError> {
        Ok(FirmwareVersion(exact::<4>(Self::OPCODE, payload)?))
    }
}

/// 查询 FPGA 版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetFpgaVersion;

impl Command for GetFpgaVersion {
    type Output = FirmwareVersion;
    const OPCODE: Opcode = Opcode::GetFpgaVersion;

    fn payload(&self) -> Payload {
        Payload::new()
    }

    fn decode(&self, _status: i32, payload: &[u8]) -> Result<FirmwareVersion, ProtocolError> {
        Ok(FirmwareVersion(exact::<4>(Self::OPCODE, payload)?))
    }
}

// ============================================================================
// ADC / GPI 电压
// ============================================================================

/// 读取 ADC 或 GPI 电压（mV）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetAdcOrGpiVoltage {
    pub channel: u8,
}

impl Command for GetAdcOrGpiVoltage {
    type Output = u32;
    const OPCODE: Opcode = Opcode::GetAdcOrGpiVoltage;

    fn payload(&self) -> Payload {
        smallvec![self.channel]
    }

    fn decode(&self, _status: i32, payload: &[u8]) -> Result<u32, ProtocolError> {
        Ok(u32::from_be_bytes(exact::<4>(Self::OPCODE, payload)?))
    }
}

// ============================================================================
// LED
// ============================================================================

/// 读取 LED 状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetLedStatus {
    pub led: u8,
}

impl Command for GetLedStatus {
    type Output = LedStatus;
    const OPCODE: Opcode = Opcode::GetLedStatus;

    fn payload(&self) -> Payload {
        smallvec![self.led]
    }

    fn decode(&self, _status: i32, payload: &[u8]) -> Result<LedStatus, ProtocolError> {
        let [brightness, red, green, blue] = exact::<4>(Self::OPCODE, payload)?;
        Ok(LedStatus {
            brightness,
            color: RgbColor::new(red, green, blue),
        })
    }
}

/// 设置 LED 亮度和颜色
///
/// 唯一需要独占 LED 锁的命令：并发的设置请求按全序执行。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetLedValue {
    pub led: u8,
    pub brightness: u8,
    pub color: RgbColor,
}

impl SetLedValue {
    /// 颜色以 `0xRRGGBB` 给出
    pub fn new(led: u8, brightness: u8, rgb: u32) -> Self {
        Self {
            led,
            brightness,
            color: RgbColor::from_rgb24(rgb),
        }
    }
}

impl Command for SetLedValue {
    type Output = ();
    const OPCODE: Opcode = Opcode::SetLedValue;
    const EXCLUSIVE: bool = true;

    fn payload(&self) -> Payload {
        smallvec![
            self.led,
            self.brightness,
            self.color.red,
            self.color.green,
            self.color.blue
        ]
    }

    fn decode(&self, _status: i32, payload: &[u8]) -> Result<(), ProtocolError> {
        expect_empty(Self::OPCODE, payload)
    }
}

// ============================================================================
// 电源管理
// ============================================================================

/// 读取上电阈值配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetPowerOnThresholdConfig;

impl Command for GetPowerOnThresholdConfig {
    type Output = PowerThresholdConfig;
    const OPCODE: Opcode = Opcode::GetPowerOnThresholdConfig;

    fn payload(&self) -> Payload {
        Payload::new()
    }

    fn decode(&self, _status: i32, payload: &[u8]) -> Result<PowerThresholdConfig, ProtocolError> {
        Ok(PowerThresholdConfig::from_bytes(exact::<6>(Self::OPCODE, payload)?))
    }
}

/// 写入上电阈值配置（设备命令集未实现）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetPowerOnThresholdConfig {
    pub config: PowerThresholdConfig,
}

impl Command for SetPowerOnThresholdConfig {
    type Output = ();
    const OPCODE: Opcode = Opcode::SetPowerOnThresholdConfig;
    const IMPLEMENTED: bool = false;

    fn payload(&self) -> Payload {
        Payload::from_slice(&self.config.to_bytes())
    }

    fn decode(&self, _status: i32, payload: &[u8]) -> Result<(), ProtocolError> {
        expect_empty(Self::OPCODE, payload)
    }
}

/// 读取上电原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetPowerOnReason;

impl Command for GetPowerOnReason {
    type Output = PowerOnReason;
    const OPCODE: Opcode = Opcode::GetPowerOnReason;

    fn payload(&self) -> Payload {
        Payload::new()
    }

    fn decode(&self, _status: i32, payload: &[u8]) -> Result<PowerOnReason, ProtocolError> {
        let [raw] = exact::<1>(Self::OPCODE, payload)?;
        Ok(PowerOnReason::from_raw(raw))
    }
}

/// 延时关机
///
/// MCU 等待 `wait_seconds` 秒后关闭主处理器，进入低功耗监测模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetDevicePowerOff {
    pub wait_seconds: u32,
}

impl Command for SetDevicePowerOff {
    type Output = ();
    const OPCODE: Opcode = Opcode::SetDevicePowerOff;

    fn payload(&self) -> Payload {
        Payload::from_slice(&self.wait_seconds.to_be_bytes())
    }

    fn decode(&self, _status: i32, payload: &[u8]) -> Result<(), ProtocolError> {
        expect_empty(Self::OPCODE, payload)
    }
}

// ============================================================================
// RTC
// ============================================================================

/// 读取 RTC 日期时间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetRtcDateTime;

impl Command for GetRtcDateTime {
    type Output = RtcTimestamp;
    const OPCODE: Opcode = Opcode::GetRtcDateTime;

    fn payload(&self) -> Payload {
        Payload::new()
    }

    fn decode(&self, _status: i32, payload: &[u8]) -> Result<RtcTimestamp, ProtocolError> {
        if payload.len() != crate::RTC_STRING_SIZE {
            return Err(ProtocolError::InvalidLength {
                opcode: Self::OPCODE,
                expected: crate::RTC_STRING_SIZE,
                actual: payload.len(),
            });
        }
        RtcTimestamp::from_wire(payload)
    }
}

/// 设置 RTC 日期时间
///
/// 保留调用方给出的原始文本：格式错误在发送前由 [`Command::validate`] 拒绝。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRtcDateTime {
    text: String,
}

impl SetRtcDateTime {
    pub fn new(timestamp: RtcTimestamp) -> Self {
        Self {
            text: timestamp.to_string(),
        }
    }

    /// 未经校验的文本（校验推迟到执行前）
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Command for SetRtcDateTime {
    type Output = ();
    const OPCODE: Opcode = Opcode::SetRtcDateTime;

    fn validate(&self) -> Result<(), ProtocolError> {
        self.text.parse::<RtcTimestamp>().map(|_| ())
    }

    fn payload(&self) -> Payload {
        // 未通过校验的文本不会走到这里；仍按固定宽度截断并补 NUL
        let mut field = [0u8; crate::RTC_STRING_SIZE];
        let bytes = self.text.as_bytes();
        let len = bytes.len().min(crate::RTC_TEXT_LEN);
        field[..len].copy_from_slice(&bytes[..len]);
        Payload::from_slice(&field)
    }

    fn decode(&self, _status: i32, payload: &[u8]) -> Result<(), ProtocolError> {
        expect_empty(Self::OPCODE, payload)
    }
}

/// 读取 RTC 校准寄存器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetRtcCalibrationRegisters;

impl Command for GetRtcCalibrationRegisters {
    type Output = CalibrationRegisters;
    const OPCODE: Opcode = Opcode::GetRtcCalibrationRegisters;

    fn payload(&self) -> Payload {
        Payload::new()
    }

    fn decode(&self, _status: i32, payload: &[u8]) -> Result<CalibrationRegisters, ProtocolError> {
        let [digital, analog] = exact::<2>(Self::OPCODE, payload)?;
        Ok(CalibrationRegisters { digital, analog })
    }
}

/// 写入 RTC 校准寄存器（设备命令集未实现）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetRtcCalibrationRegisters {
    pub registers: CalibrationRegisters,
}

impl Command for SetRtcCalibrationRegisters {
    type Output = ();
    const OPCODE: Opcode = Opcode::SetRtcCalibrationRegisters;
    const IMPLEMENTED: bool = false;

    fn payload(&self) -> Payload {
        smallvec![self.registers.digital, self.registers.analog]
    }

    fn decode(&self, _status: i32, payload: &[u8]) -> Result<(), ProtocolError> {
        expect_empty(Self::OPCODE, payload)
    }
}

/// 读取 RTC 调试寄存器（设备命令集未实现）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetRtcDebugRegister {
    pub address: u8,
}

impl Command for GetRtcDebugRegister {
    type Output = u8;
    const OPCODE: Opcode = Opcode::GetRtcDebugRegister;
    const IMPLEMENTED: bool = false;

    fn payload(&self) -> Payload {
        smallvec![self.address]
    }

    fn decode(&self, _status: i32, payload: &[u8]) -> Result<u8, ProtocolError> {
        let [value] = exact::<1>(Self::OPCODE, payload)?;
        Ok(value)
    }
}

/// 写入 RTC 调试寄存器（设备命令集未实现）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetRtcDebugRegister {
    pub address: u8,
    pub value: u8,
}

impl Command for SetRtcDebugRegister {
    type Output = ();
    const OPCODE: Opcode = Opcode::SetRtcDebugRegister;
    const IMPLEMENTED: bool = false;

    fn payload(&self) -> Payload {
        smallvec![self.address, self.value]
    }

    fn decode(&self, _status: i32, payload: &[u8]) -> Result<(), ProtocolError> {
        expect_empty(Self::OPCODE, payload)
    }
}

/// 检查 RTC 电池
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckRtcBattery {
    pub convention: BatteryConvention,
}

impl Command for CheckRtcBattery {
    type Output = BatteryHealth;
    const OPCODE: Opcode = Opcode::CheckRtcBattery;

    fn payload(&self) -> Payload {
        Payload::new()
    }

    fn decode(&self, status: i32, payload: &[u8]) -> Result<BatteryHealth, ProtocolError> {
        let [battery_state] = exact::<1>(Self::OPCODE, payload)?;
        Ok(self.convention.evaluate(status, battery_state))
    }
}

// ============================================================================
// GPIO（调试）
// ============================================================================

/// 设置 GPIO 电平（MCU 编号）
///
/// 编号掩码为 16 位，电平掩码为 1 位，掩码在构造时完成。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetGpioDebugState {
    pub pin: u16,
    pub high: bool,
}

impl SetGpioDebugState {
    pub fn new(pin: u32, value: u32) -> Self {
        Self {
            pin: mask_gpio_pin(pin),
            high: mask_gpio_value(value) == 1,
        }
    }
}

impl Command for SetGpioDebugState {
    type Output = ();
    const OPCODE: Opcode = Opcode::SetGpioDebugState;

    fn payload(&self) -> Payload {
        let [hi, lo] = self.pin.to_be_bytes();
        smallvec![hi, lo, u8::from(self.high)]
    }

    fn decode(&self, _status: i32, payload: &[u8]) -> Result<(), ProtocolError> {
        expect_empty(Self::OPCODE, payload)
    }
}

/// 读取 GPIO 电平（MCU 编号）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetGpioDebugState {
    pub pin: u16,
}

impl GetGpioDebugState {
    pub fn new(pin: u32) -> Self {
        Self {
            pin: mask_gpio_pin(pin),
        }
    }
}

impl Command for GetGpioDebugState {
    /// `true` 表示高电平
    type Output = bool;
    const OPCODE: Opcode = Opcode::GetGpioDebugState;

    fn payload(&self) -> Payload {
        Payload::from_slice(&self.pin.to_be_bytes())
    }

    fn decode(&self, _status: i32, payload: &[u8]) -> Result<bool, ProtocolError> {
        match exact::<1>(Self::OPCODE, payload)? {
            [0] => Ok(false),
            [1] => Ok(true),
            [other] => Err(ProtocolError::InvalidValue {
                field: "gpio_value",
                value: u32::from(other),
            }),
        }
    }
}
