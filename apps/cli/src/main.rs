//! # MCTL CLI
//!
//! Command-line interface for the MCU hardware-control endpoint.
//!
//! 每条命令都是一次性的：连接 → 交换一条消息 → 断开。
//!
//! ```bash
//! # 配置默认端点
//! mctl-cli config set endpoint /dev/socket/iosocket
//!
//! # 查询
//! mctl-cli mcu-version
//! mctl-cli voltage power_in
//! mctl-cli rtc get
//!
//! # 控制
//! mctl-cli led set left 255 '#00FF00'
//! mctl-cli rtc sync
//! ```
//!
//! 任一命令失败时以非零状态退出。

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod context;

use commands::{
    ConfigCommand, GpioCommand, InputsCommand, LedCommand, PowerOffCommand, RtcCommand,
    VoltageCommand,
};
use context::GlobalArgs;

/// MCTL CLI - MCU 硬件控制命令行工具
#[derive(Parser, Debug)]
#[command(name = "mctl-cli")]
#[command(about = "Command-line interface for the MCU hardware-control endpoint", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// MCU 固件版本
    McuVersion,

    /// FPGA 版本
    FpgaVersion {
        /// 以点分形式输出
        #[arg(long)]
        dotted: bool,
    },

    /// 读取 ADC/GPI 通道电压
    Voltage {
        #[command(flatten)]
        args: VoltageCommand,
    },

    /// 读取全部 ADC 通道
    Voltages,

    /// LED 控制
    #[command(subcommand)]
    Led(LedCommand),

    /// 上电阈值配置
    Threshold,

    /// 上电原因
    PowerOnReason,

    /// 延时关机
    PowerOff {
        #[command(flatten)]
        args: PowerOffCommand,
    },

    /// RTC
    #[command(subcommand)]
    Rtc(RtcCommand),

    /// MCU GPIO
    #[command(subcommand)]
    Gpio(GpioCommand),

    /// RTC 电池检测
    Battery,

    /// 车载数字输入（sysfs）
    Inputs {
        #[command(flatten)]
        args: InputsCommand,
    },
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mctl_cli=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let global = &cli.global;

    match &cli.command {
        Commands::Config(cmd) => cmd.execute(global),
        Commands::McuVersion => commands::system::mcu_version(global),
        Commands::FpgaVersion { dotted } => commands::system::fpga_version(global, *dotted),
        Commands::Voltage { args } => args.execute(global),
        Commands::Voltages => commands::adc::voltages(global),
        Commands::Led(cmd) => cmd.execute(global),
        Commands::Threshold => commands::system::threshold(global),
        Commands::PowerOnReason => commands::system::power_on_reason(global),
        Commands::PowerOff { args } => args.execute(global),
        Commands::Rtc(cmd) => cmd.execute(global),
        Commands::Gpio(cmd) => cmd.execute(global),
        Commands::Battery => commands::system::battery(global),
        Commands::Inputs { args } => args.execute(global),
    }
}
