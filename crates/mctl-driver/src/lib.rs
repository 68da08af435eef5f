//! # MCTL Driver
//!
//! 硬件控制会话层：连接生命周期、LED 互斥、结果归一化。
//!
//! ```text
//! 调用方 → SessionExecutor → [LED 锁] → Transport → 编码 → 设备 → 解码 → 归一化 → 调用方
//! ```
//!
//! # 使用示例
//!
//! ```no_run
//! use mctl_driver::ExecutorBuilder;
//! use mctl_protocol::GetMcuVersion;
//!
//! let executor = ExecutorBuilder::new().build().unwrap();
//! match executor.execute(&GetMcuVersion) {
//!     Ok(done) => println!("MCU {}", done.value),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

pub mod builder;
pub mod error;
pub mod executor;
pub mod guard;
pub mod result;

pub use builder::ExecutorBuilder;
pub use error::{CommandError, DriverError};
pub use executor::SessionExecutor;
pub use guard::{ExclusiveAccess, LedLock};
pub use result::{CommandResult, Completed, normalize};
