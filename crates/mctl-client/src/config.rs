//! 客户端配置
//!
//! 配置文件位于 `<config_dir>/mctl/config.toml`，优先级（低 → 高）：
//! 配置文件 → 环境变量 `MCTL_ENDPOINT` → 命令行参数（由调用方叠加）。
//!
//! ```toml
//! endpoint = "/dev/socket/iosocket"
//! timeout_ms = 1000
//! battery_convention = "payload_non_zero"
//! ```

use anyhow::{Context, Result, anyhow, bail};
use mctl_driver::ExecutorBuilder;
use mctl_protocol::BatteryConvention;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// 覆盖端点路径的环境变量
pub const ENDPOINT_ENV: &str = "MCTL_ENDPOINT";

/// 可通过 `config set/get` 访问的键
pub const KEYS: [&str; 3] = ["endpoint", "timeout_ms", "battery_convention"];

/// 客户端配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// 端点路径
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<PathBuf>,

    /// I/O 超时（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// 电池健康判定约定
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_convention: Option<BatteryConvention>,
}

/// 默认配置文件路径
pub fn default_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow!("Cannot determine config directory"))?;
    path.push("mctl");
    path.push("config.toml");
    Ok(path)
}

impl ClientConfig {
    /// 从默认路径加载；文件不存在时返回默认配置
    pub fn load() -> Result<Self> {
        Self::load_from(&default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = default_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// 叠加环境变量（`lookup` 便于测试注入）
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.is_empty()) {
            debug!("{} overrides endpoint: {}", ENDPOINT_ENV, endpoint);
            self.endpoint = Some(PathBuf::from(endpoint));
        }
    }

    pub fn apply_process_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    /// 按键设置值（字符串形式）
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "endpoint" => self.endpoint = Some(PathBuf::from(value)),
            "timeout_ms" => {
                let ms: u64 = value.parse().with_context(|| format!("Invalid timeout_ms: {}", value))?;
                if ms == 0 {
                    bail!("timeout_ms must be non-zero");
                }
                self.timeout_ms = Some(ms);
            },
            "battery_convention" => {
                let convention: BatteryConvention = value
                    .parse()
                    .map_err(|_| anyhow!("Invalid battery_convention: {} (expected payload_non_zero or status_positive)", value))?;
                self.battery_convention = Some(convention);
            },
            _ => bail!("Unknown config key: {} (expected one of {})", key, KEYS.join(", ")),
        }
        Ok(())
    }

    /// 按键读取值；未设置时为 `None`
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = match key {
            "endpoint" => self.endpoint.as_ref().map(|p| p.display().to_string()),
            "timeout_ms" => self.timeout_ms.map(|ms| ms.to_string()),
            "battery_convention" => self.battery_convention.map(|c| match c {
                BatteryConvention::PayloadNonZero => "payload_non_zero".to_string(),
                BatteryConvention::StatusPositive => "status_positive".to_string(),
            }),
            _ => bail!("Unknown config key: {} (expected one of {})", key, KEYS.join(", ")),
        };
        Ok(value)
    }

    /// 转换为执行器构建器
    pub fn builder(&self) -> ExecutorBuilder {
        let mut builder = ExecutorBuilder::new();
        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint(endpoint);
        }
        if let Some(ms) = self.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        if let Some(convention) = self.battery_convention {
            builder = builder.battery_convention(convention);
        }
        builder
    }
}
