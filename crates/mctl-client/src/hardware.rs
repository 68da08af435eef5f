//! 结构化返回的调用方适配器
//!
//! 每个操作一个方法，返回 `Result<T, CommandError>`。参数校验在这一层完成，
//! 成功/失败各记一条日志；协议逻辑全部委托给 [`SessionExecutor`]。

use crate::channels::{AdcChannel, CAN1_J1708_POWER_GPIO, LedId};
use mctl_driver::{CommandError, ExclusiveAccess, LedLock, SessionExecutor};
use mctl_protocol::{
    BatteryHealth, CalibrationRegisters, CheckRtcBattery, Command, FirmwareVersion,
    GetAdcOrGpiVoltage, GetFpgaVersion, GetGpioDebugState, GetLedStatus, GetMcuVersion,
    GetPowerOnReason, GetPowerOnThresholdConfig, GetRtcCalibrationRegisters, GetRtcDateTime,
    GetRtcDebugRegister, LedStatus, PowerOnReason, PowerThresholdConfig, ProtocolError,
    RtcTimestamp, SetDevicePowerOff, SetGpioDebugState, SetLedValue, SetPowerOnThresholdConfig,
    SetRtcCalibrationRegisters, SetRtcDateTime, SetRtcDebugRegister,
};
use mctl_transport::Transport;
use std::fmt::Debug;
use tracing::{debug, error};

/// 最大 LED 编号
pub const MAX_LED: u8 = 2;

/// 结构化返回的硬件接口
#[derive(Debug)]
pub struct Hardware<T: Transport, G: ExclusiveAccess = LedLock> {
    executor: SessionExecutor<T, G>,
}

impl<T: Transport, G: ExclusiveAccess> Hardware<T, G> {
    pub fn new(executor: SessionExecutor<T, G>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &SessionExecutor<T, G> {
        &self.executor
    }

    fn call<C: Command>(&self, command: &C) -> Result<C::Output, CommandError>
    where
        C::Output: Debug,
    {
        match self.executor.execute(command) {
            Ok(done) => {
                debug!("{} success: {:?} (status {})", C::OPCODE, done.value, done.status);
                Ok(done.value)
            },
            Err(e) => {
                error!("{} failed: {}", C::OPCODE, e);
                Err(e)
            },
        }
    }

    // ------------------------------------------------------------------------
    // 版本
    // ------------------------------------------------------------------------

    pub fn mcu_version(&self) -> Result<FirmwareVersion, CommandError> {
        self.call(&GetMcuVersion)
    }

    pub fn fpga_version(&self) -> Result<FirmwareVersion, CommandError> {
        self.call(&GetFpgaVersion)
    }

    // ------------------------------------------------------------------------
    // ADC
    // ------------------------------------------------------------------------

    /// 通道电压（mV）
    pub fn voltage(&self, channel: AdcChannel) -> Result<u32, CommandError> {
        self.voltage_raw(channel.into())
    }

    /// 按原始编号读取（不校验范围，由设备判定）
    pub fn voltage_raw(&self, channel: u8) -> Result<u32, CommandError> {
        self.call(&GetAdcOrGpiVoltage { channel })
    }

    /// 依次读取全部 12 个通道，每个通道各自的结果
    pub fn all_analog_inputs(&self) -> Vec<(AdcChannel, Result<u32, CommandError>)> {
        AdcChannel::ALL.iter().map(|&ch| (ch, self.voltage(ch))).collect()
    }

    // ------------------------------------------------------------------------
    // LED
    // ------------------------------------------------------------------------

    pub fn led_status(&self, led: u8) -> Result<LedStatus, CommandError> {
        check_led(led)?;
        self.call(&GetLedStatus { led })
    }

    /// 设置 LED；颜色为 `0xRRGGBB`
    pub fn set_led(&self, led: u8, brightness: u8, rgb: u32) -> Result<(), CommandError> {
        check_led(led)?;
        self.call(&SetLedValue::new(led, brightness, rgb))
    }

    pub fn set_led_id(&self, led: LedId, brightness: u8, rgb: u32) -> Result<(), CommandError> {
        self.set_led(led.into(), brightness, rgb)
    }

    // ------------------------------------------------------------------------
    // 电源
    // ------------------------------------------------------------------------

    pub fn power_on_threshold(&self) -> Result<PowerThresholdConfig, CommandError> {
        self.call(&GetPowerOnThresholdConfig)
    }

    pub fn set_power_on_threshold(&self, config: PowerThresholdConfig) -> Result<(), CommandError> {
        self.call(&SetPowerOnThresholdConfig { config })
    }

    pub fn power_on_reason(&self) -> Result<PowerOnReason, CommandError> {
        self.call(&GetPowerOnReason)
    }

    /// 等待 `wait_seconds` 秒后关机
    pub fn power_off(&self, wait_seconds: u32) -> Result<(), CommandError> {
        self.call(&SetDevicePowerOff { wait_seconds })
    }

    // ------------------------------------------------------------------------
    // RTC
    // ------------------------------------------------------------------------

    pub fn rtc_date_time(&self) -> Result<RtcTimestamp, CommandError> {
        self.call(&GetRtcDateTime)
    }

    /// 格式 `YYYY-MM-DD HH:MM:SS.ss`；畸形文本在发送前被拒绝
    pub fn set_rtc_date_time(&self, text: &str) -> Result<(), CommandError> {
        self.call(&SetRtcDateTime::from_text(text))
    }

    pub fn rtc_calibration(&self) -> Result<CalibrationRegisters, CommandError> {
        self.call(&GetRtcCalibrationRegisters)
    }

    pub fn set_rtc_calibration(&self, registers: CalibrationRegisters) -> Result<(), CommandError> {
        self.call(&SetRtcCalibrationRegisters { registers })
    }

    pub fn rtc_debug_register(&self, address: u8) -> Result<u8, CommandError> {
        self.call(&GetRtcDebugRegister { address })
    }

    pub fn set_rtc_debug_register(&self, address: u8, value: u8) -> Result<(), CommandError> {
        self.call(&SetRtcDebugRegister { address, value })
    }

    pub fn rtc_battery(&self) -> Result<BatteryHealth, CommandError> {
        self.call(&CheckRtcBattery {
            convention: self.executor.battery_convention(),
        })
    }

    // ------------------------------------------------------------------------
    // GPIO
    // ------------------------------------------------------------------------

    pub fn gpio_state(&self, pin: u32) -> Result<bool, CommandError> {
        self.call(&GetGpioDebugState::new(pin))
    }

    /// 电平只接受 0 或 1
    pub fn set_gpio_state(&self, pin: u32, value: u32) -> Result<(), CommandError> {
        if value > 1 {
            return Err(ProtocolError::InvalidValue {
                field: "gpio_value",
                value,
            }
            .into());
        }
        self.call(&SetGpioDebugState::new(pin, value))
    }

    pub fn can1_j1708_power_enabled(&self) -> Result<bool, CommandError> {
        self.gpio_state(CAN1_J1708_POWER_GPIO)
    }

    pub fn set_can1_j1708_power(&self, enable: bool) -> Result<(), CommandError> {
        self.set_gpio_state(CAN1_J1708_POWER_GPIO, u32::from(enable))
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

#[cfg(test)]
mod tests {
    use super::*;
    use mctl_protocol::{Opcode, RgbColor};
    use mctl_transport::mock::{MockTransport, SimulatedDevice};
    use std::sync::Arc;

    fn hardware() -> (Hardware<MockTransport>, MockTransport, Arc<SimulatedDevice>) {
        let device = Arc::new(SimulatedDevice::new());
        let transport = MockTransport::with_device(Arc::clone(&device));
        (Hardware::new(SessionExecutor::new(transport.clone())), transport, device)
    }

    #[test]
    fn test_versions() {
        let (hw, _, _) = hardware();
        assert_eq!(hw.mcu_version().unwrap().to_string(), "A.2.3.0");
        assert_eq!(hw.fpga_version().unwrap().to_compact_hex(), "41000002");
    }

    #[test]
    fn test_led_validation_skips_transport() {
        let (hw, transport, _) = hardware();
        let err = hw.set_led(3, 10, 0xFFFFFF).unwrap_err();
        assert!(matches!(
            err,
            CommandError::Decode(ProtocolError::InvalidValue { field: "led", value: 3 })
        ));
        assert!(hw.led_status(9).is_err());
        assert!(transport.events().is_empty());
    }

    #[test]
    fn test_led_roundtrip() {
        let (hw, _, _) = hardware();
        hw.set_led_id(LedId::Left, 255, 0x0000FF).unwrap();
        let status = hw.led_status(2).unwrap();
        assert_eq!(status.brightness, 255);
        assert_eq!(status.color, RgbColor::new(0, 0, 0xFF));
    }

    #[test]
    fn test_all_analog_inputs_in_order() {
        let (hw, transport, _) = hardware();
        let readings = hw.all_analog_inputs();
        assert_eq!(readings.len(), 12);
        assert_eq!(readings[0].0, AdcChannel::AnalogIn1);
        assert_eq!(readings[0].1, Ok(12000));
        assert_eq!(readings[11].0, AdcChannel::CableType);
        assert_eq!(transport.connect_count(), 12);
    }

    #[test]
    fn test_gpio_value_validation() {
        let (hw, transport, device) = hardware();
        assert!(hw.set_gpio_state(100, 2).is_err());
        assert!(transport.events().is_empty());

        hw.set_can1_j1708_power(true).unwrap();
        assert!(device.gpio(512));
        assert!(hw.can1_j1708_power_enabled().unwrap());
    }

    #[test]
    fn test_unimplemented_surface() {
        let (hw, _, _) = hardware();
        assert_eq!(
            hw.rtc_debug_register(1),
            Err(CommandError::Unimplemented(Opcode::GetRtcDebugRegister))
        );
        assert_eq!(
            hw.set_power_on_threshold(PowerThresholdConfig::default()),
            Err(CommandError::Unimplemented(Opcode::SetPowerOnThresholdConfig))
        );
    }

    #[test]
    fn test_power_off_wait() {
        let (hw, _, device) = hardware();
        hw.power_off(30).unwrap();
        assert_eq!(device.power_off_wait(), Some(30));
    }
}
