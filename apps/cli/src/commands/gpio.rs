//! MCU GPIO 命令

use crate::context::GlobalArgs;
use anyhow::{Context, Result};
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum GpioCommand {
    /// 读取 GPIO 电平
    Get { pin: u32 },

    /// 设置 GPIO 电平（0 或 1）
    Set { pin: u32, value: u32 },
}

impl GpioCommand {
    pub fn execute(&self, global: &GlobalArgs) -> Result<()> {
        let hw = global.hardware()?;
        match *self {
            GpioCommand::Get { pin } => {
                let high = hw.gpio_state(pin).with_context(|| format!("Failed to read GPIO {}", pin))?;
                global.emit("value", u8::from(high))?;
            },
            GpioCommand::Set { pin, value } => {
                hw.set_gpio_state(pin, value)
                    .with_context(|| format!("Failed to set GPIO {}", pin))?;
                tracing::info!("GPIO {} set to {}", pin, value);
            },
        }
        Ok(())
    }
}
