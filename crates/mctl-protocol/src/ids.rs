//! 操作码定义
//!
//! 每个硬件操作在命令边界上对应一个 1 字节操作码，响应帧回显同一操作码。

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 操作码
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Opcode {
    GetMcuVersion = 0x01,
    GetFpgaVersion = 0x02,
    GetAdcOrGpiVoltage = 0x03,
    SetLedValue = 0x04,
    GetLedStatus = 0x05,
    GetPowerOnThresholdConfig = 0x06,
    SetPowerOnThresholdConfig = 0x07,
    GetPowerOnReason = 0x08,
    SetDevicePowerOff = 0x09,
    GetRtcDateTime = 0x0A,
    SetRtcDateTime = 0x0B,
    GetRtcCalibrationRegisters = 0x0C,
    SetRtcCalibrationRegisters = 0x0D,
    GetRtcDebugRegister = 0x0E,
    SetRtcDebugRegister = 0x0F,
    SetGpioDebugState = 0x10,
    GetGpioDebugState = 0x11,
    CheckRtcBattery = 0x12,
}

impl Opcode {
    /// 全部操作码（按数值排序）
    pub const ALL: [Opcode; 18] = [
        Opcode::GetMcuVersion,
        Opcode::GetFpgaVersion,
        Opcode::GetAdcOrGpiVoltage,
        Opcode::SetLedValue,
        Opcode::GetLedStatus,
        Opcode::GetPowerOnThresholdConfig,
        Opcode::SetPowerOnThresholdConfig,
        Opcode::GetPowerOnReason,
        Opcode::SetDevicePowerOff,
        Opcode::GetRtcDateTime,
        Opcode::SetRtcDateTime,
        Opcode::GetRtcCalibrationRegisters,
        Opcode::SetRtcCalibrationRegisters,
        Opcode::GetRtcDebugRegister,
        Opcode::SetRtcDebugRegister,
        Opcode::SetGpioDebugState,
        Opcode::GetGpioDebugState,
        Opcode::CheckRtcBattery,
    ];

    /// 人类可读名称（用于日志）
    pub fn name(self) -> &'static str {
        match self {
            Opcode::GetMcuVersion => "get_mcu_version",
            Opcode::GetFpgaVersion => "get_fpga_version",
            Opcode::GetAdcOrGpiVoltage => "get_adc_or_gpi_voltage",
            Opcode::SetLedValue => "set_led_value",
            Opcode::GetLedStatus => "get_led_status",
            Opcode::GetPowerOnThresholdConfig => "get_power_on_threshold_cfg",
            Opcode::SetPowerOnThresholdConfig => "set_power_on_threshold_cfg",
            Opcode::GetPowerOnReason => "get_power_on_reason",
            Opcode::SetDevicePowerOff => "set_device_power_off",
            Opcode::GetRtcDateTime => "get_rtc_date_time",
            Opcode::SetRtcDateTime => "set_rtc_date_time",
            Opcode::GetRtcCalibrationRegisters => "get_rtc_cal_reg",
            Opcode::SetRtcCalibrationRegisters => "set_rtc_cal_reg",
            Opcode::GetRtcDebugRegister => "get_rtc_reg_dbg",
            Opcode::SetRtcDebugRegister => "set_rtc_reg_dbg",
            Opcode::SetGpioDebugState => "set_gpio_state_dbg",
            Opcode::GetGpioDebugState => "get_gpio_state_dbg",
            Opcode::CheckRtcBattery => "check_rtc_battery",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
