//! sysfs GPIO 输入读取
//!
//! 车载数字输入映射到内核 GPIO 692..=699，通过 `/sys/class/gpio` 读取，
//! 不经过 MCU 端点。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

/// 默认 sysfs GPIO 根目录
pub const DEFAULT_SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// 第一个车载输入对应的内核 GPIO 编号
pub const INPUT_GPIO_BASE: u32 = 692;

/// 车载输入数量
pub const INPUT_COUNT: u32 = 8;

#[derive(Error, Debug)]
pub enum SysfsError {
    #[error("Input {0} out of range (0..8)")]
    InputOutOfRange(u32),

    #[error("Failed to export gpio{gpio}: {source}")]
    Export {
        gpio: u32,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read gpio{gpio}: {source}")]
    Read {
        gpio: u32,
        #[source]
        source: io::Error,
    },

    #[error("Unexpected value {value:?} for gpio{gpio}")]
    InvalidValue { gpio: u32, value: String },
}

/// sysfs GPIO 读取器
#[derive(Debug, Clone)]
pub struct SysfsGpio {
    root: PathBuf,
}

impl Default for SysfsGpio {
    fn default() -> Self {
        Self::new(DEFAULT_SYSFS_GPIO_ROOT)
    }
}

impl SysfsGpio {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn value_path(&self, gpio: u32) -> PathBuf {
        self.root.join(format!("gpio{}", gpio)).join("value")
    }

    /// 读取 GPIO 电平；引脚未导出时先导出
    pub fn value(&self, gpio: u32) -> Result<bool, SysfsError> {
        let path = self.value_path(gpio);
        if !path.exists() {
            self.export(gpio)?;
        }

        let text = fs::read_to_string(&path).map_err(|source| SysfsError::Read { gpio, source })?;
        trace!("gpio{} = {:?}", gpio, text.trim());
        match text.trim() {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(SysfsError::InvalidValue {
                gpio,
                value: other.to_string(),
            }),
        }
    }

    fn export(&self, gpio: u32) -> Result<(), SysfsError> {
        debug!("Exporting gpio{}", gpio);
        fs::write(self.root.join("export"), gpio.to_string())
            .map_err(|source| SysfsError::Export { gpio, source })
    }

    /// 车载输入 `n`（0..8）的电平
    pub fn input_state(&self, input: u32) -> Result<bool, SysfsError> {
        if input >= INPUT_COUNT {
            return Err(SysfsError::InputOutOfRange(input));
        }
        self.value(INPUT_GPIO_BASE + input)
    }

    /// 全部车载输入，每个输入各自的结果
    pub fn all_inputs(&self) -> Vec<(u32, Result<bool, SysfsError>)> {
        (0..INPUT_COUNT).map(|n| (n, self.input_state(n))).collect()
    }
}
