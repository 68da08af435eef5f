//! 执行器构建器
//!
//! 提供链式 API 创建 [`SessionExecutor`]。

use crate::error::DriverError;
use crate::executor::SessionExecutor;
use crate::guard::LedLock;
use mctl_protocol::BatteryConvention;
use mctl_transport::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, Transport, UnixSocketTransport};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// 执行器构建器
///
/// # Example
///
/// ```no_run
/// use mctl_driver::ExecutorBuilder;
/// use std::time::Duration;
///
/// let executor = ExecutorBuilder::new()
///     .endpoint("/dev/socket/iosocket")
///     .timeout(Duration::from_millis(500))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ExecutorBuilder {
    /// 端点路径（默认 `/dev/socket/iosocket`）
    endpoint: Option<PathBuf>,
    /// I/O 超时；`None` 表示无限等待
    timeout: Option<Duration>,
    battery_convention: BatteryConvention,
}

impl ExecutorBuilder {
    pub fn new() -> Self {
        Self {
            endpoint: None,
            timeout: Some(DEFAULT_TIMEOUT),
            battery_convention: BatteryConvention::default(),
        }
    }

    pub fn endpoint(mut self, path: impl Into<PathBuf>) -> Self {
        self.endpoint = Some(path.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// 关闭 I/O 超时
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn battery_convention(mut self, convention: BatteryConvention) -> Self {
        self.battery_convention = convention;
        self
    }

    /// 构建基于 Unix 域套接字的执行器
    ///
    /// 不会在构建时连接端点：每次操作各自连接。
    pub fn build(self) -> Result<SessionExecutor<UnixSocketTransport>, DriverError> {
        let endpoint = self.endpoint.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_ENDPOINT));
        if endpoint.as_os_str().is_empty() {
            return Err(DriverError::InvalidEndpoint(String::new()));
        }
        // 零超时会被 set_read_timeout 拒绝
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(DriverError::InvalidConfig("timeout must be non-zero".into()));
        }

        debug!(
            "Building executor: endpoint={}, timeout={:?}, battery={:?}",
            endpoint.display(),
            self.timeout,
            self.battery_convention
        );
        let transport = UnixSocketTransport::new(endpoint).with_timeout(self.timeout);
        Ok(self.build_with(transport))
    }

    /// 使用自定义传输构建
    pub fn build_with<T: Transport>(self, transport: T) -> SessionExecutor<T> {
        SessionExecutor::with_lock(transport, LedLock::new())
            .with_battery_convention(self.battery_convention)
    }
}

impl Default for ExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
