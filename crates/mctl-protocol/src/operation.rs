//! 动态分发的操作与结果
//!
//! [`Operation`] 覆盖全部硬件操作，供 CLI 等需要运行时选择命令的调用方使用；
//! 静态调用方直接使用 [`crate::command`] 中的命令结构体。

use crate::command::{
    CheckRtcBattery, Command, GetAdcOrGpiVoltage, GetFpgaVersion, GetGpioDebugState, GetLedStatus,
    GetMcuVersion, GetPowerOnReason, GetPowerOnThresholdConfig, GetRtcCalibrationRegisters,
    GetRtcDateTime, GetRtcDebugRegister, SetDevicePowerOff, SetGpioDebugState, SetLedValue,
    SetPowerOnThresholdConfig, SetRtcCalibrationRegisters, SetRtcDateTime, SetRtcDebugRegister,
};
use crate::timestamp::RtcTimestamp;
use crate::types::{
    BatteryHealth, CalibrationRegisters, FirmwareVersion, LedStatus, PowerOnReason,
    PowerThresholdConfig, RgbColor,
};
use crate::Opcode;
use std::fmt;

/// 硬件操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    GetMcuVersion,
    GetFpgaVersion,
    GetAdcOrGpiVoltage { channel: u8 },
    GetLedStatus { led: u8 },
    SetLedValue { led: u8, brightness: u8, color: RgbColor },
    GetPowerOnThresholdConfig,
    SetPowerOnThresholdConfig(PowerThresholdConfig),
    GetPowerOnReason,
    SetDevicePowerOff { wait_seconds: u32 },
    GetRtcDateTime,
    /// 文本在执行前校验
    SetRtcDateTime { timestamp: String },
    GetRtcCalibrationRegisters,
    SetRtcCalibrationRegisters(CalibrationRegisters),
    GetRtcDebugRegister { address: u8 },
    SetRtcDebugRegister { address: u8, value: u8 },
    /// 编号和电平在编码时掩码
    SetGpioDebugState { pin: u32, value: u32 },
    GetGpioDebugState { pin: u32 },
    CheckRtcBattery,
}

/// 把操作映射到对应命令结构体的关联常量
macro_rules! command_const {
    ($op:expr, $item:ident) => {
        match $op {
            Operation::GetMcuVersion => GetMcuVersion::$item,
            Operation::GetFpgaVersion => GetFpgaVersion::$item,
            Operation::GetAdcOrGpiVoltage { .. } => GetAdcOrGpiVoltage::$item,
            Operation::GetLedStatus { .. } => GetLedStatus::$item,
            Operation::SetLedValue { .. } => SetLedValue::$item,
            Operation::GetPowerOnThresholdConfig => GetPowerOnThresholdConfig::$item,
            Operation::SetPowerOnThresholdConfig(_) => SetPowerOnThresholdConfig::$item,
            Operation::GetPowerOnReason => GetPowerOnReason::$item,
            Operation::SetDevicePowerOff { .. } => SetDevicePowerOff::$item,
            Operation::GetRtcDateTime => GetRtcDateTime::$item,
            Operation::SetRtcDateTime { .. } => SetRtcDateTime::$item,
            Operation::GetRtcCalibrationRegisters => GetRtcCalibrationRegisters::$item,
            Operation::SetRtcCalibrationRegisters(_) => SetRtcCalibrationRegisters::$item,
            Operation::GetRtcDebugRegister { .. } => GetRtcDebugRegister::$item,
            Operation::SetRtcDebugRegister { .. } => SetRtcDebugRegister::$item,
            Operation::SetGpioDebugState { .. } => SetGpioDebugState::$item,
            Operation::GetGpioDebugState { .. } => GetGpioDebugState::$item,
            Operation::CheckRtcBattery => CheckRtcBattery::$item,
        }
    };
}

impl Operation {
    pub fn opcode(&self) -> Opcode {
        command_const!(self, OPCODE)
    }

    /// 是否需要独占 LED 锁（[`Command::EXCLUSIVE`]）
    pub fn is_exclusive(&self) -> bool {
        command_const!(self, EXCLUSIVE)
    }

    /// 设备命令集是否实现了该操作（[`Command::IMPLEMENTED`]）
    pub fn is_implemented(&self) -> bool {
        command_const!(self, IMPLEMENTED)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode().name())
    }
}

/// 操作结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    McuVersion(FirmwareVersion),
    FpgaVersion(FirmwareVersion),
    /// 电压（mV）
    Voltage(u32),
    LedStatus(LedStatus),
    /// 无返回值的写操作
    Done,
    PowerThresholdConfig(PowerThresholdConfig),
    PowerOnReason(PowerOnReason),
    RtcDateTime(RtcTimestamp),
    RtcCalibration(CalibrationRegisters),
    RtcDebugRegister(u8),
    /// `true` 表示高电平
    GpioState(bool),
    RtcBattery(BatteryHealth),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::McuVersion(v) | Reply::FpgaVersion(v) => write!(f, "{}", v),
            Reply::Voltage(mv) => write!(f, "{} mV", mv),
            Reply::LedStatus(s) => write!(f, "brightness={} color={}", s.brightness, s.color),
            Reply::Done => f.write_str("ok"),
            Reply::PowerThresholdConfig(c) => write!(
                f,
                "wiggle_count={} wiggle_count_sample_period_ms={} ignition_threshold_mv={}",
                c.wiggle_count, c.wiggle_count_sample_period_ms, c.ignition_threshold_mv
            ),
            Reply::PowerOnReason(r) => write!(f, "0x{:02X}", r.raw()),
            Reply::RtcDateTime(ts) => write!(f, "{}", ts),
            Reply::RtcCalibration(c) => write!(f, "digital={} analog={}", c.digital, c.analog),
            Reply::RtcDebugRegister(v) => write!(f, "0x{:02X}", v),
            Reply::GpioState(high) => write!(f, "{}", u8::from(*high)),
            Reply::RtcBattery(h) => write!(f, "{}", h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_operations() -> Vec<Operation> {
        vec![
            Operation::GetMcuVersion,
            Operation::GetFpgaVersion,
            Operation::GetAdcOrGpiVoltage { channel: 0 },
            Operation::SetLedValue {
                led: 0,
                brightness: 0,
                color: RgbColor::BLACK,
            },
            Operation::GetLedStatus { led: 0 },
            Operation::GetPowerOnThresholdConfig,
            Operation::SetPowerOnThresholdConfig(PowerThresholdConfig::default()),
            Operation::GetPowerOnReason,
            Operation::SetDevicePowerOff { wait_seconds: 0 },
            Operation::GetRtcDateTime,
            Operation::SetRtcDateTime {
                timestamp: String::new(),
            },
            Operation::GetRtcCalibrationRegisters,
            Operation::SetRtcCalibrationRegisters(CalibrationRegisters::default()),
            Operation::GetRtcDebugRegister { address: 0 },
            Operation::SetRtcDebugRegister { address: 0, value: 0 },
            Operation::SetGpioDebugState { pin: 0, value: 0 },
            Operation::GetGpioDebugState { pin: 0 },
            Operation::CheckRtcBattery,
        ]
    }

    #[test]
    fn test_operation_opcodes_cover_all() {
        let opcodes: Vec<Opcode> = all_operations().iter().map(Operation::opcode).collect();
        assert_eq!(opcodes, Opcode::ALL.to_vec());
    }

    #[test]
    fn test_flags_match_commands() {
        let ops = all_operations();
        let exclusive: Vec<Opcode> =
            ops.iter().filter(|op| op.is_exclusive()).map(Operation::opcode).collect();
        assert_eq!(exclusive, vec![Opcode::SetLedValue]);
        assert!(SetLedValue::EXCLUSIVE);

        let unimplemented: Vec<Opcode> =
            ops.iter().filter(|op| !op.is_implemented()).map(Operation::opcode).collect();
        assert_eq!(
            unimplemented,
            vec![
                SetPowerOnThresholdConfig::OPCODE,
                SetRtcCalibrationRegisters::OPCODE,
                GetRtcDebugRegister::OPCODE,
                SetRtcDebugRegister::OPCODE,
            ]
        );
        assert!(!GetRtcDebugRegister::IMPLEMENTED);
        assert!(CheckRtcBattery::IMPLEMENTED);
    }

    #[test]
    fn test_reply_display() {
        assert_eq!(Reply::McuVersion(FirmwareVersion([0xA, 2, 3, 0])).to_string(), "A.2.3.0");
        assert_eq!(Reply::Voltage(12000).to_string(), "12000 mV");
        assert_eq!(Reply::GpioState(true).to_string(), "1");
        assert_eq!(Reply::RtcBattery(BatteryHealth::Good).to_string(), "Good");
    }
}
