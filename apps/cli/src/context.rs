//! 全局参数与执行上下文
//!
//! 配置优先级（低 → 高）：配置文件 → `MCTL_ENDPOINT` → 命令行参数。

use anyhow::{Context, Result};
use clap::Args;
use mctl_client::{ClientConfig, Hardware};
use mctl_protocol::BatteryConvention;
use mctl_transport::UnixSocketTransport;
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;

/// 所有子命令共享的参数
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// 配置文件路径（默认 `<config_dir>/mctl/config.toml`）
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// 端点路径（覆盖配置与环境变量）
    #[arg(short, long, global = true, value_name = "PATH")]
    pub endpoint: Option<PathBuf>,

    /// I/O 超时（毫秒）
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// 电池判定约定（payload_non_zero | status_positive）
    #[arg(long, global = true, value_parser = parse_convention)]
    pub battery_convention: Option<BatteryConvention>,

    /// 以 JSON 输出结果
    #[arg(long, global = true)]
    pub json: bool,
}

fn parse_convention(s: &str) -> Result<BatteryConvention, String> {
    s.parse()
        .map_err(|_| format!("invalid battery convention: {} (expected payload_non_zero or status_positive)", s))
}

impl GlobalArgs {
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => mctl_client::config::default_path(),
        }
    }

    /// 加载配置文件并叠加环境变量与命令行参数
    pub fn resolve_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::load_from(&self.config_path()?)?;
        config.apply_process_env();

        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout_ms = Some(ms);
        }
        if let Some(convention) = self.battery_convention {
            config.battery_convention = Some(convention);
        }
        Ok(config)
    }

    pub fn hardware(&self) -> Result<Hardware<UnixSocketTransport>> {
        let config = self.resolve_config()?;
        let executor = config.builder().build().context("Invalid endpoint configuration")?;
        tracing::debug!("Using endpoint {}", executor.transport().path().display());
        Ok(Hardware::new(executor))
    }

    /// 输出单个结果
    pub fn emit<V: Serialize + Display>(&self, key: &str, value: V) -> Result<()> {
        if self.json {
            let object = serde_json::json!({ key: value });
            println!("{}", serde_json::to_string(&object)?);
        } else {
            println!("{}", value);
        }
        Ok(())
    }

    /// 输出带标签的结果
    pub fn emit_labeled<V: Serialize + Display>(&self, label: &str, key: &str, value: V) -> Result<()> {
        if self.json {
            self.emit(key, value)
        } else {
            println!("{}: {}", label, value);
            Ok(())
        }
    }
}
