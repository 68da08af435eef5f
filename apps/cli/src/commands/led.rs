//! LED 命令

use crate::context::GlobalArgs;
use anyhow::{Context, Result};
use clap::Subcommand;
use mctl_client::LedId;
use mctl_protocol::RgbColor;

/// 解析 LED：编号（0-2）或名称（right/center/left）
///
/// 编号不在此处限定范围，交给适配器校验。
pub fn parse_led(s: &str) -> Result<u8, String> {
    match s.to_ascii_lowercase().as_str() {
        "right" => Ok(LedId::Right.into()),
        "center" => Ok(LedId::Center.into()),
        "left" => Ok(LedId::Left.into()),
        other => other.parse().map_err(|_| format!("invalid led: {}", s)),
    }
}

#[derive(Subcommand, Debug)]
pub enum LedCommand {
    /// 读取 LED 状态
    Get {
        #[arg(value_parser = parse_led)]
        led: u8,
    },

    /// 设置 LED
    Set {
        #[arg(value_parser = parse_led)]
        led: u8,

        /// 亮度 0-255
        brightness: u8,

        /// 颜色（#RRGGBB、0xRRGGBB 或十进制）
        #[arg(value_parser = parse_color)]
        color: RgbColor,
    },
}

fn parse_color(s: &str) -> Result<RgbColor, String> {
    s.parse().map_err(|_| format!("invalid color: {}", s))
}

impl LedCommand {
    pub fn execute(&self, global: &GlobalArgs) -> Result<()> {
        let hw = global.hardware()?;
        match *self {
            LedCommand::Get { led } => {
                let status = hw.led_status(led).with_context(|| format!("Failed to read LED {}", led))?;
                if global.json {
                    println!("{}", serde_json::to_string(&status)?);
                } else {
                    println!("brightness {} color {}", status.brightness, status.color);
                }
            },
            LedCommand::Set {
                led,
                brightness,
                color,
            } => {
                hw.set_led(led, brightness, color.to_rgb24())
                    .with_context(|| format!("Failed to set LED {}", led))?;
                tracing::info!("LED {} set to {} @ {}", led, color, brightness);
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_led() {
        assert_eq!(parse_led("left").unwrap(), 2);
        assert_eq!(parse_led("Right").unwrap(), 0);
        assert_eq!(parse_led("1").unwrap(), 1);
        // 越界编号由适配器拒绝
        assert_eq!(parse_led("5").unwrap(), 5);
        assert!(parse_led("top").is_err());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#FF8000").unwrap(), RgbColor::new(0xFF, 0x80, 0x00));
        assert!(parse_color("purple").is_err());
    }
}
