//! 会话执行器
//!
//! 每次调用：
//!
//! 1. 未实现的命令直接失败（`Unimplemented`），不触碰传输
//! 2. 本地校验失败（如畸形 RTC 时间戳）直接失败（`Decode`）
//! 3. 需要独占的命令先获取 LED 锁
//! 4. 建立连接；不可用时返回 `Unavailable`，不调用编解码
//! 5. 编码 → 交换一条消息 → 断开（作用域守卫，恰好一次）
//! 6. 归一化并返回
//!
//! 不重试；超时由传输层自己的 I/O 超时负责。

use crate::error::CommandError;
use crate::guard::{ExclusiveAccess, LedLock, Session};
use crate::result::{CommandResult, normalize};
use mctl_protocol::{
    BatteryConvention, CheckRtcBattery, Command, GetAdcOrGpiVoltage, GetFpgaVersion,
    GetGpioDebugState, GetLedStatus, GetMcuVersion, GetPowerOnReason, GetPowerOnThresholdConfig,
    GetRtcCalibrationRegisters, GetRtcDateTime, GetRtcDebugRegister, Operation, Reply,
    SetDevicePowerOff, SetGpioDebugState, SetLedValue, SetPowerOnThresholdConfig,
    SetRtcCalibrationRegisters, SetRtcDateTime, SetRtcDebugRegister,
};
use mctl_transport::Transport;
use tracing::trace;

/// 会话执行器
///
/// 可以在任意多个线程间共享（`Send + Sync`），每次调用持有自己的连接。
/// LED 锁是唯一的共享可变状态，生命周期与执行器相同。
#[derive(Debug)]
pub struct SessionExecutor<T: Transport, G: ExclusiveAccess = LedLock> {
    transport: T,
    led_lock: G,
    battery_convention: BatteryConvention,
}

impl<T: Transport> SessionExecutor<T> {
    pub fn new(transport: T) -> Self {
        Self::with_lock(transport, LedLock::new())
    }
}

impl<T: Transport, G: ExclusiveAccess> SessionExecutor<T, G> {
    /// 使用指定的独占原语
    pub fn with_lock(transport: T, led_lock: G) -> Self {
        Self {
            transport,
            led_lock,
            battery_convention: BatteryConvention::default(),
        }
    }

    pub fn with_battery_convention(mut self, convention: BatteryConvention) -> Self {
        self.battery_convention = convention;
        self
    }

    pub fn battery_convention(&self) -> BatteryConvention {
        self.battery_convention
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn led_lock(&self) -> &G {
        &self.led_lock
    }

    /// 执行单个命令
    pub fn execute<C: Command>(&self, command: &C) -> CommandResult<C::Output> {
        if !C::IMPLEMENTED {
            trace!("{}: not implemented", C::OPCODE);
            return Err(CommandError::Unimplemented(C::OPCODE));
        }
        command.validate()?;

        // 声明顺序保证先断开连接、后释放锁
        let _exclusive = C::EXCLUSIVE.then(|| self.led_lock.acquire());

        let Some(mut session) = Session::open(&self.transport) else {
            trace!("{}: endpoint unavailable", C::OPCODE);
            return Err(CommandError::Unavailable);
        };

        let request = command.to_request().to_bytes();
        trace!("{}: sending {} bytes", C::OPCODE, request.len());
        let response = session.exchange(&request);
        drop(session);

        let result = normalize(command, response);
        if let Err(e) = &result {
            trace!("{}: {}", C::OPCODE, e);
        }
        result
    }

    /// 动态分发执行
    pub fn execute_operation(&self, operation: Operation) -> CommandResult<Reply> {
        match operation {
            Operation::GetMcuVersion => self.run(&GetMcuVersion, Reply::McuVersion),
            Operation::GetFpgaVersion => self.run(&GetFpgaVersion, Reply::FpgaVersion),
            Operation::GetAdcOrGpiVoltage { channel } => {
                self.run(&GetAdcOrGpiVoltage { channel }, Reply::Voltage)
            },
            Operation::GetLedStatus { led } => self.run(&GetLedStatus { led }, Reply::LedStatus),
            Operation::SetLedValue {
                led,
                brightness,
                color,
            } => self.run(
                &SetLedValue {
                    led,
                    brightness,
                    color,
                },
                |()| Reply::Done,
            ),
            Operation::GetPowerOnThresholdConfig => {
                self.run(&GetPowerOnThresholdConfig, Reply::PowerThresholdConfig)
            },
            Operation::SetPowerOnThresholdConfig(config) => {
                self.run(&SetPowerOnThresholdConfig { config }, |()| Reply::Done)
            },
            Operation::GetPowerOnReason => self.run(&GetPowerOnReason, Reply::PowerOnReason),
            Operation::SetDevicePowerOff { wait_seconds } => {
                self.run(&SetDevicePowerOff { wait_seconds }, |()| Reply::Done)
            },
            Operation::GetRtcDateTime => self.run(&GetRtcDateTime, Reply::RtcDateTime),
            Operation::SetRtcDateTime { timestamp } => {
                self.run(&SetRtcDateTime::from_text(timestamp), |()| Reply::Done)
            },
            Operation::GetRtcCalibrationRegisters => {
                self.run(&GetRtcCalibrationRegisters, Reply::RtcCalibration)
            },
            Operation::SetRtcCalibrationRegisters(registers) => {
                self.run(&SetRtcCalibrationRegisters { registers }, |()| Reply::Done)
            },
            Operation::GetRtcDebugRegister { address } => {
                self.run(&GetRtcDebugRegister { address }, Reply::RtcDebugRegister)
            },
            Operation::SetRtcDebugRegister { address, value } => {
                self.run(&SetRtcDebugRegister { address, value }, |()| Reply::Done)
            },
            Operation::SetGpioDebugState { pin, value } => {
                self.run(&SetGpioDebugState::new(pin, value), |()| Reply::Done)
            },
            Operation::GetGpioDebugState { pin } => {
                self.run(&GetGpioDebugState::new(pin), Reply::GpioState)
            },
            Operation::CheckRtcBattery => self.run(
                &CheckRtcBattery {
                    convention: self.battery_convention,
                },
                Reply::RtcBattery,
            ),
        }
    }

    fn run<C: Command>(&self, command: &C, wrap: impl FnOnce(C::Output) -> Reply) -> CommandResult<Reply> {
        self.execute(command).map(|completed| completed.map(wrap))
    }
}
