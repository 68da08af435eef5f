//! 互斥与连接守卫
//!
//! - [`ExclusiveAccess`]: 需要独占的操作（LED 写入）在连接前获取，断开后释放
//! - [`Session`]: 作用域连接，离开作用域时（包括 panic 展开）恰好断开一次

use mctl_transport::{Connection, Transport, TransportError};
use parking_lot::{Mutex, MutexGuard};
use tracing::trace;

/// 独占访问原语
///
/// 由执行器在构造时持有，测试中可以替换为计数实现。
pub trait ExclusiveAccess: Send + Sync {
    /// 持有期间独占；Drop 时释放
    type Guard<'a>
    where
        Self: 'a;

    fn acquire(&self) -> Self::Guard<'_>;
}

/// 默认 LED 锁
#[derive(Debug, Default)]
pub struct LedLock {
    inner: Mutex<()>,
}

impl LedLock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExclusiveAccess for LedLock {
    type Guard<'a> = MutexGuard<'a, ()>;

    fn acquire(&self) -> MutexGuard<'_, ()> {
        self.inner.lock()
    }
}

/// 作用域连接
pub(crate) struct Session<'t, T: Transport> {
    transport: &'t T,
    connection: Option<T::Connection>,
}

impl<'t, T: Transport> Session<'t, T> {
    /// 打开连接；端点不可用时返回 `None`
    pub(crate) fn open(transport: &'t T) -> Option<Self> {
        let connection = transport.connect()?;
        trace!("Session opened");
        Some(Self {
            transport,
            connection: Some(connection),
        })
    }

    pub(crate) fn exchange(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        match self.connection.as_mut() {
            Some(connection) => connection.exchange(request),
            None => Err(TransportError::InvalidResponse("session already closed".into())),
        }
    }
}

impl<T: Transport> Drop for Session<'_, T> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.transport.disconnect(connection);
            trace!("Session closed");
        }
    }
}
