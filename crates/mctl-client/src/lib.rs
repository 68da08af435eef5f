//! # MCTL Client
//!
//! 面向调用方的硬件接口，包括：
//! - [`Hardware`]：结构化返回（`Result<T, CommandError>`）
//! - [`StatusSlotHardware`]：直接返回值，结果写入"最近状态"槽
//! - 命名通道（[`AdcChannel`]、[`LedId`]）
//! - sysfs 车载输入读取（[`SysfsGpio`]）
//! - 客户端配置（[`ClientConfig`]）
//!
//! 两种适配器都只是 [`SessionExecutor`](mctl_driver::SessionExecutor) 之上的薄层。
//!
//! # 使用示例
//!
//! ```no_run
//! use mctl_client::{AdcChannel, ClientConfig, Hardware};
//!
//! let mut config = ClientConfig::load().unwrap();
//! config.apply_process_env();
//! let hw = Hardware::new(config.builder().build().unwrap());
//!
//! println!("MCU {}", hw.mcu_version().unwrap());
//! println!("Power in: {} mV", hw.voltage(AdcChannel::PowerIn).unwrap());
//! ```

pub mod channels;
pub mod config;
pub mod hardware;
pub mod status_slot;
pub mod sysfs;

pub use channels::{AdcChannel, CAN1_J1708_POWER_GPIO, LedId};
pub use config::{ClientConfig, ENDPOINT_ENV};
pub use hardware::{Hardware, MAX_LED};
pub use status_slot::{LastStatus, STATUS_UNIMPLEMENTED, StatusSlotHardware};
pub use sysfs::{SysfsError, SysfsGpio};

pub use mctl_driver::{CommandError, ExecutorBuilder};
