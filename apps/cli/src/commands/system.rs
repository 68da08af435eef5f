//! 版本、电源与电池命令

use crate::context::GlobalArgs;
use anyhow::{Context, Result};
use clap::Args;

/// 打印 MCU 固件版本
pub fn mcu_version(global: &GlobalArgs) -> Result<()> {
    let hw = global.hardware()?;
    let version = hw.mcu_version().context("Failed to read MCU version")?;
    global.emit("mcu_version", version.to_string())
}

/// 打印 FPGA 版本
pub fn fpga_version(global: &GlobalArgs, dotted: bool) -> Result<()> {
    let hw = global.hardware()?;
    let version = hw.fpga_version().context("Failed to read FPGA version")?;
    let text = if dotted {
        version.to_string()
    } else {
        version.to_compact_hex()
    };
    global.emit("fpga_version", text)
}

pub fn power_on_reason(global: &GlobalArgs) -> Result<()> {
    let hw = global.hardware()?;
    let reason = hw.power_on_reason().context("Failed to read power-on reason")?;

    if global.json {
        return global.emit("power_on_reason", reason.raw());
    }

    println!("0x{:02X}", reason.raw());
    let flags = [
        (reason.ignition_trigger(), "ignition trigger"),
        (reason.wiggle_trigger(), "wiggle trigger"),
        (reason.arm_lockup(), "arm lockup"),
        (reason.watchdog_reset(), "watchdog reset"),
    ];
    for (_, name) in flags.iter().filter(|(set, _)| *set) {
        println!("  {}", name);
    }
    Ok(())
}

pub fn threshold(global: &GlobalArgs) -> Result<()> {
    let hw = global.hardware()?;
    let config = hw.power_on_threshold().context("Failed to read power-on threshold")?;

    if global.json {
        println!("{}", serde_json::to_string(&config)?);
        return Ok(());
    }
    println!("wiggle count:             {}", config.wiggle_count);
    println!("wiggle sample period:     {} ms", config.wiggle_count_sample_period_ms);
    println!("ignition threshold:       {} mV", config.ignition_threshold_mv);
    Ok(())
}

/// 关机命令参数
#[derive(Args, Debug)]
pub struct PowerOffCommand {
    /// 关机前等待秒数
    #[arg(default_value_t = 0)]
    pub wait_seconds: u32,
}

impl PowerOffCommand {
    pub fn execute(&self, global: &GlobalArgs) -> Result<()> {
        let hw = global.hardware()?;
        hw.power_off(self.wait_seconds).context("Failed to request power off")?;
        tracing::info!("Power off requested in {} s", self.wait_seconds);
        Ok(())
    }
}

pub fn battery(global: &GlobalArgs) -> Result<()> {
    let hw = global.hardware()?;
    let health = hw.rtc_battery().context("Failed to check RTC battery")?;
    if global.json {
        return global.emit("rtc_battery_good", health.is_good());
    }
    println!("{}", health);
    Ok(())
}
