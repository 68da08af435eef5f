//! 带外状态的调用方适配器
//!
//! 方法直接返回值（失败时为零值），结果写入"最近状态"槽，由调用方随后读取。
//! 适用于无法表达 `Result` 的调用方（如外部运行时的绑定层）。

use crate::channels::AdcChannel;
use crate::hardware::MAX_LED;
use mctl_driver::{CommandError, CommandResult, ExclusiveAccess, LedLock, SessionExecutor};
use mctl_protocol::{
    CalibrationRegisters, CheckRtcBattery, Command, GetAdcOrGpiVoltage, GetFpgaVersion,
    GetGpioDebugState, GetLedStatus, GetMcuVersion, GetPowerOnReason, GetPowerOnThresholdConfig,
    GetRtcCalibrationRegisters, GetRtcDateTime, LedStatus, PowerThresholdConfig, ProtocolError,
    SetDevicePowerOff, SetGpioDebugState, SetLedValue, SetRtcDateTime,
};
use mctl_transport::{STATUS_CONNECT_FAILED, STATUS_INVALID_RESPONSE, Transport};
use parking_lot::Mutex;
use tracing::{debug, error};

/// 未实现操作的历史状态码
pub const STATUS_UNIMPLEMENTED: i32 = -5;

/// 最近一次调用的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastStatus {
    /// 成功（非负状态码）
    Ok(i32),
    /// 设备/传输负状态码
    Device(i32),
    Unavailable,
    Decode,
    Unimplemented,
    /// 尚未调用
    #[default]
    None,
}

impl LastStatus {
    pub fn is_ok(self) -> bool {
        matches!(self, LastStatus::Ok(_))
    }

    /// 折叠为单个整数状态码（非负为成功）
    pub fn code(self) -> i32 {
        match self {
            LastStatus::Ok(status) | LastStatus::Device(status) => status,
            LastStatus::Unavailable => STATUS_CONNECT_FAILED,
            LastStatus::Decode => STATUS_INVALID_RESPONSE,
            LastStatus::Unimplemented => STATUS_UNIMPLEMENTED,
            LastStatus::None => 0,
        }
    }
}

impl From<&CommandError> for LastStatus {
    fn from(e: &CommandError) -> Self {
        match e {
            CommandError::Unavailable => LastStatus::Unavailable,
            CommandError::Device { status } => LastStatus::Device(*status),
            CommandError::Decode(_) => LastStatus::Decode,
            CommandError::Unimplemented(_) => LastStatus::Unimplemented,
        }
    }
}

/// 带外状态的硬件接口
#[derive(Debug)]
pub struct StatusSlotHardware<T: Transport, G: ExclusiveAccess = LedLock> {
    executor: SessionExecutor<T, G>,
    last: Mutex<LastStatus>,
}

impl<T: Transport, G: ExclusiveAccess> StatusSlotHardware<T, G> {
    pub fn new(executor: SessionExecutor<T, G>) -> Self {
        Self {
            executor,
            last: Mutex::new(LastStatus::None),
        }
    }

    /// 最近一次调用的结果
    pub fn last_status(&self) -> LastStatus {
        *self.last.lock()
    }

    /// 写入状态槽，并把本次写入的状态一并返回
    fn settle<V: Default>(&self, opcode_name: &str, result: CommandResult<V>) -> (V, LastStatus) {
        let (value, status) = match result {
            Ok(done) => {
                debug!("{} success (status {})", opcode_name, done.status);
                (done.value, LastStatus::Ok(done.status))
            },
            Err(e) => {
                error!("{} failed: {}", opcode_name, e);
                (V::default(), LastStatus::from(&e))
            },
        };
        *self.last.lock() = status;
        (value, status)
    }

    fn record<V: Default>(&self, opcode_name: &str, result: CommandResult<V>) -> V {
        self.settle(opcode_name, result).0
    }

    /// 整数状态码取自本次调用，不回读共享槽
    fn status_code<V: Default>(&self, opcode_name: &str, result: CommandResult<V>) -> i32 {
        self.settle(opcode_name, result).1.code()
    }

    fn call<C: Command>(&self, command: &C) -> C::Output
    where
        C::Output: Default,
    {
        self.record(C::OPCODE.name(), self.executor.execute(command))
    }

    /// `%X.%X.%X.%X`；失败时为空串
    pub fn mcu_version(&self) -> String {
        self.record(
            GetMcuVersion::OPCODE.name(),
            self.executor.execute(&GetMcuVersion).map(|d| d.map(|v| v.to_string())),
        )
    }

    /// 紧凑十六进制；失败时为空串
    pub fn fpga_version(&self) -> String {
        self.record(
            GetFpgaVersion::OPCODE.name(),
            self.executor.execute(&GetFpgaVersion).map(|d| d.map(|v| v.to_compact_hex())),
        )
    }

    pub fn voltage(&self, channel: AdcChannel) -> u32 {
        self.call(&GetAdcOrGpiVoltage {
            channel: channel.into(),
        })
    }

    pub fn led_status(&self, led: u8) -> LedStatus {
        if let Err(e) = check_led(led) {
            return self.record(GetLedStatus::OPCODE.name(), Err(e));
        }
        self.call(&GetLedStatus { led })
    }

    /// 返回本次调用的整数状态码
    pub fn set_led(&self, led: u8, brightness: u8, rgb: u32) -> i32 {
        let result = match check_led(led) {
            Ok(()) => self.executor.execute(&SetLedValue::new(led, brightness, rgb)),
            Err(e) => Err(e),
        };
        self.status_code(SetLedValue::OPCODE.name(), result)
    }

    pub fn power_on_threshold(&self) -> PowerThresholdConfig {
        self.call(&GetPowerOnThresholdConfig)
    }

    /// 上电原因原始位
    pub fn power_on_reason(&self) -> u8 {
        self.record(
            GetPowerOnReason::OPCODE.name(),
            self.executor.execute(&GetPowerOnReason).map(|d| d.map(|r| r.raw())),
        )
    }

    pub fn power_off(&self, wait_seconds: u32) -> i32 {
        self.status_code(
            SetDevicePowerOff::OPCODE.name(),
            self.executor.execute(&SetDevicePowerOff { wait_seconds }),
        )
    }

    /// 失败时为空串
    pub fn rtc_date_time(&self) -> String {
        self.record(
            GetRtcDateTime::OPCODE.name(),
            self.executor.execute(&GetRtcDateTime).map(|d| d.map(|ts| ts.to_string())),
        )
    }

    pub fn set_rtc_date_time(&self, text: &str) -> i32 {
        self.status_code(
            SetRtcDateTime::OPCODE.name(),
            self.executor.execute(&SetRtcDateTime::from_text(text)),
        )
    }

    pub fn rtc_calibration(&self) -> CalibrationRegisters {
        self.call(&GetRtcCalibrationRegisters)
    }

    /// `true` 表示电池良好
    pub fn rtc_battery_good(&self) -> bool {
        let command = CheckRtcBattery {
            convention: self.executor.battery_convention(),
        };
        self.record(
            CheckRtcBattery::OPCODE.name(),
            self.executor.execute(&command).map(|d| d.map(|h| h.is_good())),
        )
    }

    pub fn gpio_state(&self, pin: u32) -> bool {
        self.call(&GetGpioDebugState::new(pin))
    }

    pub fn set_gpio_state(&self, pin: u32, value: u32) -> i32 {
        let result = if value > 1 {
            Err(ProtocolError::InvalidValue {
                field: "gpio_value",
                value,
            }
            .into())
        } else {
            self.executor.execute(&SetGpioDebugState::new(pin, value))
        };
        self.status_code(SetGpioDebugState::OPCODE.name(), result)
    }
}

fn check_led(led: u8) -> Result<(), CommandError> {
    if led > MAX_LED {
        return Err(ProtocolError::InvalidValue {
            field: "led",
            value: u32::from(led),
        }
        .into());
    }
    Ok(())
}
