//! 配置管理命令
//!
//! 用于管理 CLI 配置（端点路径、超时、电池判定约定）

use crate::context::GlobalArgs;
use anyhow::Result;
use clap::Subcommand;
use mctl_client::ClientConfig;
use mctl_client::config::KEYS;

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置配置项
    Set {
        /// 配置项名称（endpoint | timeout_ms | battery_convention）
        key: String,
        value: String,
    },

    /// 获取配置项
    Get {
        /// 配置项名称
        #[arg(default_value = "all")]
        key: String,
    },

    /// 打印配置文件路径
    Path,
}

impl ConfigCommand {
    pub fn execute(&self, global: &GlobalArgs) -> Result<()> {
        let path = global.config_path()?;

        match self {
            ConfigCommand::Set { key, value } => {
                let mut config = ClientConfig::load_from(&path)?;
                config.set(key, value)?;
                config.save_to(&path)?;
                println!("✅ {} = {}", key, value);
            },

            ConfigCommand::Get { key } => {
                let config = ClientConfig::load_from(&path)?;
                if key == "all" {
                    for key in KEYS {
                        println!("{} = {}", key, config.get(key)?.unwrap_or_else(|| "(unset)".into()));
                    }
                } else {
                    println!("{}", config.get(key)?.unwrap_or_else(|| "(unset)".into()));
                }
            },

            ConfigCommand::Path => println!("{}", path.display()),
        }

        Ok(())
    }
}
