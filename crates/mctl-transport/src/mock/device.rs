//! 模拟设备
//!
//! 按操作码表应答每一种请求的有状态设备模型，用于无硬件测试。
//! 设备端未实现的操作返回负状态码。

use crate::TransportError;
use mctl_protocol::{
    CalibrationRegisters, FirmwareVersion, LedStatus, Opcode, PowerThresholdConfig, RequestFrame,
    ResponseFrame, RgbColor, RtcTimestamp,
};
use parking_lot::Mutex;
use std::collections::HashMap;

/// 设备拒绝请求时的状态码
pub const DEVICE_REJECTED: i32 = -1;

/// ADC 通道数
pub const ADC_CHANNELS: usize = 12;

/// LED 数量
pub const LED_COUNT: usize = 3;

#[derive(Debug, Clone)]
struct DeviceState {
    mcu_version: FirmwareVersion,
    fpga_version: FirmwareVersion,
    voltages: [u32; ADC_CHANNELS],
    leds: [LedStatus; LED_COUNT],
    threshold: PowerThresholdConfig,
    power_on_reason: u8,
    power_off_wait: Option<u32>,
    rtc: RtcTimestamp,
    calibration: CalibrationRegisters,
    gpio: HashMap<u16, bool>,
    battery_state: u8,
    scripted: HashMap<Opcode, ResponseFrame>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            mcu_version: FirmwareVersion([0x0A, 0x02, 0x03, 0x00]),
            fpga_version: FirmwareVersion([0x41, 0x00, 0x00, 0x02]),
            voltages: [
                12000, 0, 0, 0, 0, 0, 0, 0, 12100, 4800, 2500, 1000,
            ],
            leds: [LedStatus::default(); LED_COUNT],
            threshold: PowerThresholdConfig {
                wiggle_count: 5,
                wiggle_count_sample_period_ms: 500,
                ignition_threshold_mv: 8000,
            },
            power_on_reason: 0x01,
            power_off_wait: None,
            rtc: RtcTimestamp {
                year: 2016,
                month: 3,
                day: 29,
                hour: 19,
                minute: 9,
                second: 6,
                fraction: 58,
            },
            calibration: CalibrationRegisters {
                digital: 0x10,
                analog: 0x20,
            },
            gpio: HashMap::new(),
            battery_state: 1,
            scripted: HashMap::new(),
        }
    }
}

/// 模拟设备
#[derive(Debug, Default)]
pub struct SimulatedDevice {
    state: Mutex<DeviceState>,
}

impl SimulatedDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mcu_version(self, version: [u8; 4]) -> Self {
        self.state.lock().mcu_version = FirmwareVersion(version);
        self
    }

    pub fn with_fpga_version(self, version: [u8; 4]) -> Self {
        self.state.lock().fpga_version = FirmwareVersion(version);
        self
    }

    pub fn with_voltage(self, channel: usize, millivolts: u32) -> Self {
        if let Some(v) = self.state.lock().voltages.get_mut(channel) {
            *v = millivolts;
        }
        self
    }

    pub fn with_power_on_reason(self, raw: u8) -> Self {
        self.state.lock().power_on_reason = raw;
        self
    }

    pub fn with_battery_state(self, battery_state: u8) -> Self {
        self.state.lock().battery_state = battery_state;
        self
    }

    /// 固定某个操作码的响应（原样返回，可用于构造错误或畸形响应）
    pub fn script(&self, opcode: Opcode, response: ResponseFrame) {
        self.state.lock().scripted.insert(opcode, response);
    }

    pub fn clear_script(&self, opcode: Opcode) {
        self.state.lock().scripted.remove(&opcode);
    }

    pub fn led(&self, led: usize) -> Option<LedStatus> {
        self.state.lock().leds.get(led).copied()
    }

    pub fn gpio(&self, pin: u16) -> bool {
        self.state.lock().gpio.get(&pin).copied().unwrap_or(false)
    }

    pub fn rtc(&self) -> RtcTimestamp {
        self.state.lock().rtc
    }

    /// 最近一次关机请求的等待秒数
    pub fn power_off_wait(&self) -> Option<u32> {
        self.state.lock().power_off_wait
    }

    /// 处理一条请求消息体，返回响应消息体
    pub fn handle(&self, body: &[u8]) -> Result<Vec<u8>, TransportError> {
        let request = RequestFrame::from_bytes(body)
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;
        let mut state = self.state.lock();

        if let Some(frame) = state.scripted.get(&request.opcode) {
            return Ok(frame.to_bytes());
        }

        Ok(respond(&mut state, &request).to_bytes())
    }
}

fn respond(state: &mut DeviceState, request: &RequestFrame) -> ResponseFrame {
    let opcode = request.opcode;
    let reject = ResponseFrame::error(opcode, DEVICE_REJECTED);
    let p = request.payload();

    match (opcode, p) {
        (Opcode::GetMcuVersion, []) => ResponseFrame::ok(opcode, &state.mcu_version.0),
        (Opcode::GetFpgaVersion, []) => ResponseFrame::ok(opcode, &state.fpga_version.0),
        (Opcode::GetAdcOrGpiVoltage, [channel]) => match state.voltages.get(*channel as usize) {
            Some(mv) => ResponseFrame::ok(opcode, &mv.to_be_bytes()),
            None => reject,
        },
        (Opcode::SetLedValue, [led, brightness, r, g, b]) => match state.leds.get_mut(*led as usize) {
            Some(slot) => {
                *slot = LedStatus {
                    brightness: *brightness,
                    color: RgbColor::new(*r, *g, *b),
                };
                ResponseFrame::ok(opcode, &[])
            },
            None => reject,
        },
        (Opcode::GetLedStatus, [led]) => match state.leds.get(*led as usize) {
            Some(s) => ResponseFrame::ok(
                opcode,
                &[s.brightness, s.color.red, s.color.green, s.color.blue],
            ),
            None => reject,
        },
        (Opcode::GetPowerOnThresholdConfig, []) => {
            ResponseFrame::ok(opcode, &state.threshold.to_bytes())
        },
        (Opcode::GetPowerOnReason, []) => ResponseFrame::ok(opcode, &[state.power_on_reason]),
        (Opcode::SetDevicePowerOff, [a, b, c, d]) => {
            state.power_off_wait = Some(u32::from_be_bytes([*a, *b, *c, *d]));
            ResponseFrame::ok(opcode, &[])
        },
        (Opcode::GetRtcDateTime, []) => ResponseFrame::ok(opcode, &state.rtc.to_wire()),
        (Opcode::SetRtcDateTime, field) => match RtcTimestamp::from_wire(field) {
            Ok(ts) => {
                state.rtc = ts;
                ResponseFrame::ok(opcode, &[])
            },
            Err(_) => reject,
        },
        (Opcode::GetRtcCalibrationRegisters, []) => ResponseFrame::ok(
            opcode,
            &[state.calibration.digital, state.calibration.analog],
        ),
        (Opcode::SetGpioDebugState, [hi, lo, value]) if *value <= 1 => {
            state.gpio.insert(u16::from_be_bytes([*hi, *lo]), *value == 1);
            ResponseFrame::ok(opcode, &[])
        },
        (Opcode::GetGpioDebugState, [hi, lo]) => {
            let high = state.gpio.get(&u16::from_be_bytes([*hi, *lo])).copied().unwrap_or(false);
            ResponseFrame::ok(opcode, &[u8::from(high)])
        },
        (Opcode::CheckRtcBattery, []) => {
            // 状态码和载荷同时给出电池状态，两种约定下结论一致
            let status = i32::from(state.battery_state.min(1));
            ResponseFrame::new(opcode, status, &[state.battery_state])
        },
        // 设备未实现的操作以及载荷长度不符的请求
        _ => reject,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mctl_protocol::{
        CheckRtcBattery, Command, GetAdcOrGpiVoltage, GetGpioDebugState, GetLedStatus,
        GetMcuVersion, SetGpioDebugState, SetLedValue, SetPowerOnThresholdConfig,
    };

    fn roundtrip<C: Command>(device: &SimulatedDevice, cmd: &C) -> ResponseFrame {
        let body = device.handle(&cmd.to_request().to_bytes()).unwrap();
        ResponseFrame::from_bytes(&body).unwrap()
    }

    #[test]
    fn test_version_response() {
        let device = SimulatedDevice::new().with_mcu_version([1, 2, 3, 4]);
        let frame = roundtrip(&device, &GetMcuVersion);
        assert_eq!(frame.status, 0);
        assert_eq!(frame.payload(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_led_state_persists() {
        let device = SimulatedDevice::new();
        roundtrip(&device, &SetLedValue::new(2, 200, 0x00FF00));
        assert_eq!(device.led(2).unwrap().color, RgbColor::new(0, 0xFF, 0));

        let frame = roundtrip(&device, &GetLedStatus { led: 2 });
        assert_eq!(frame.payload(), &[200, 0, 0xFF, 0]);
    }

    #[test]
    fn test_led_out_of_range_rejected() {
        let device = SimulatedDevice::new();
        let frame = roundtrip(&device, &GetLedStatus { led: 3 });
        assert_eq!(frame.status, DEVICE_REJECTED);
    }

    #[test]
    fn test_adc_channel_range() {
        let device = SimulatedDevice::new().with_voltage(9, 4321);
        let frame = roundtrip(&device, &GetAdcOrGpiVoltage { channel: 9 });
        assert_eq!(frame.payload(), &4321u32.to_be_bytes());
        let frame = roundtrip(&device, &GetAdcOrGpiVoltage { channel: 12 });
        assert_eq!(frame.status, DEVICE_REJECTED);
    }

    #[test]
    fn test_gpio_state() {
        let device = SimulatedDevice::new();
        roundtrip(&device, &SetGpioDebugState::new(512, 1));
        assert!(device.gpio(512));
        let frame = roundtrip(&device, &GetGpioDebugState::new(512));
        assert_eq!(frame.payload(), &[1]);
    }

    #[test]
    fn test_unimplemented_rejected() {
        let device = SimulatedDevice::new();
        let frame = roundtrip(
            &device,
            &SetPowerOnThresholdConfig {
                config: PowerThresholdConfig::default(),
            },
        );
        assert_eq!(frame.status, DEVICE_REJECTED);
    }

    #[test]
    fn test_scripted_response() {
        let device = SimulatedDevice::new();
        device.script(
            Opcode::CheckRtcBattery,
            ResponseFrame::new(Opcode::CheckRtcBattery, -1, &[1]),
        );
        let frame = roundtrip(&device, &CheckRtcBattery::default());
        assert_eq!(frame.status, -1);

        device.clear_script(Opcode::CheckRtcBattery);
        let frame = roundtrip(&device, &CheckRtcBattery::default());
        assert_eq!(frame.status, 1);
    }

    #[test]
    fn test_garbage_request() {
        let device = SimulatedDevice::new();
        assert!(device.handle(&[]).is_err());
        assert!(device.handle(&[0x77]).is_err());
    }
}
