//! 模拟量与车载输入命令

use crate::context::GlobalArgs;
use anyhow::{Context, Result};
use clap::Args;
use mctl_client::{AdcChannel, SysfsGpio};
use std::path::PathBuf;

/// 解析通道：编号（0-11）或名称（如 `power_in`）
pub fn parse_channel(s: &str) -> Result<AdcChannel, String> {
    if let Ok(n) = s.parse::<u8>() {
        return AdcChannel::try_from(n).map_err(|_| format!("channel {} out of range (0-11)", n));
    }
    AdcChannel::ALL
        .iter()
        .copied()
        .find(|ch| ch.name().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown channel: {}", s))
}

/// 读取单个通道
#[derive(Args, Debug)]
pub struct VoltageCommand {
    /// 通道编号或名称
    #[arg(value_parser = parse_channel)]
    pub channel: AdcChannel,
}

impl VoltageCommand {
    pub fn execute(&self, global: &GlobalArgs) -> Result<()> {
        let hw = global.hardware()?;
        let mv = hw
            .voltage(self.channel)
            .with_context(|| format!("Failed to read {}", self.channel))?;
        if global.json {
            return global.emit(self.channel.name(), mv);
        }
        println!("{} mV", mv);
        Ok(())
    }
}

/// 依次读取全部通道；任一通道失败时整体返回错误（其余照常打印）
pub fn voltages(global: &GlobalArgs) -> Result<()> {
    let hw = global.hardware()?;
    let mut failures = 0;
    let mut json = serde_json::Map::new();

    for (channel, reading) in hw.all_analog_inputs() {
        match reading {
            Ok(mv) => {
                if global.json {
                    json.insert(channel.name().to_string(), mv.into());
                } else {
                    println!("{:<12} {:>6} mV", channel.name(), mv);
                }
            },
            Err(e) => {
                failures += 1;
                eprintln!("{:<12} error: {}", channel.name(), e);
            },
        }
    }

    if global.json {
        println!("{}", serde_json::Value::Object(json));
    }
    anyhow::ensure!(failures == 0, "{} channel(s) failed", failures);
    Ok(())
}

/// 车载数字输入（sysfs）
#[derive(Args, Debug)]
pub struct InputsCommand {
    /// sysfs GPIO 根目录
    #[arg(long, default_value = mctl_client::sysfs::DEFAULT_SYSFS_GPIO_ROOT)]
    pub sysfs_root: PathBuf,

    /// 只读取某一路输入（0-7）
    pub input: Option<u32>,
}

impl InputsCommand {
    pub fn execute(&self, global: &GlobalArgs) -> Result<()> {
        let gpio = SysfsGpio::new(&self.sysfs_root);

        if let Some(n) = self.input {
            let state = gpio.input_state(n)?;
            return global.emit("input", u8::from(state));
        }

        let mut failures = 0;
        for (n, state) in gpio.all_inputs() {
            match state {
                Ok(high) => println!("input{} {}", n, u8::from(high)),
                Err(e) => {
                    failures += 1;
                    eprintln!("input{} error: {}", n, e);
                },
            }
        }
        anyhow::ensure!(failures == 0, "{} input(s) failed", failures);
        Ok(())
    }
}
