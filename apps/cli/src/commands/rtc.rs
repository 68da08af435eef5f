//! RTC 命令

use crate::context::GlobalArgs;
use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone, Timelike};
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum RtcCommand {
    /// 读取 RTC 时间
    Get,

    /// 设置 RTC 时间（`YYYY-MM-DD HH:MM:SS.ss`）
    Set { timestamp: String },

    /// 以本机时间设置 RTC
    Sync,

    /// 读取校准寄存器
    Cal,
}

/// 按设备格式渲染时间（两位小数秒）
pub fn format_rtc<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let centis = (time.nanosecond() % 1_000_000_000) / 10_000_000;
    format!("{}.{:02}", time.format("%Y-%m-%d %H:%M:%S"), centis)
}

impl RtcCommand {
    pub fn execute(&self, global: &GlobalArgs) -> Result<()> {
        let hw = global.hardware()?;
        match self {
            RtcCommand::Get => {
                let ts = hw.rtc_date_time().context("Failed to read RTC")?;
                global.emit("rtc", ts.to_string())?;
            },
            RtcCommand::Set { timestamp } => {
                hw.set_rtc_date_time(timestamp).context("Failed to set RTC")?;
                tracing::info!("RTC set to {}", timestamp);
            },
            RtcCommand::Sync => {
                let text = format_rtc(&Local::now());
                hw.set_rtc_date_time(&text).context("Failed to set RTC")?;
                global.emit_labeled("RTC synced to", "rtc", text)?;
            },
            RtcCommand::Cal => {
                let cal = hw.rtc_calibration().context("Failed to read RTC calibration")?;
                if global.json {
                    println!("{}", serde_json::to_string(&cal)?);
                } else {
                    println!("digital 0x{:02X} analog 0x{:02X}", cal.digital, cal.analog);
                }
            },
        }
        Ok(())
    }
}
