//! Unix 域套接字传输
//!
//! 每次操作新建一个流式连接，交换一条消息后关闭。端点路径默认为
//! `/dev/socket/iosocket`。

use crate::framing::{read_frame, write_frame};
use crate::{Connection, Transport, TransportError};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, trace};

/// 默认端点路径
pub const DEFAULT_ENDPOINT: &str = "/dev/socket/iosocket";

/// 默认 I/O 超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Unix 域套接字传输
#[derive(Debug, Clone)]
pub struct UnixSocketTransport {
    path: PathBuf,
    timeout: Option<Duration>,
}

impl UnixSocketTransport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// 设置读写超时（`None` 表示无限等待）
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn open(&self) -> std::io::Result<UnixStream> {
        let stream = UnixStream::connect(&self.path)?;
        stream.set_read_timeout(self.timeout)?;
        stream.set_write_timeout(self.timeout)?;
        Ok(stream)
    }
}

impl Default for UnixSocketTransport {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl Transport for UnixSocketTransport {
    type Connection = UnixConnection;

    fn connect(&self) -> Option<UnixConnection> {
        match self.open() {
            Ok(stream) => {
                trace!("Connected to {}", self.path.display());
                Some(UnixConnection { stream })
            },
            Err(e) => {
                debug!("Failed to connect to {}: {}", self.path.display(), e);
                None
            },
        }
    }

    fn disconnect(&self, connection: UnixConnection) {
        // 对端可能已经关闭，忽略 shutdown 错误
        let _ = connection.stream.shutdown(Shutdown::Both);
        trace!("Disconnected from {}", self.path.display());
    }
}

/// 一个 Unix 域套接字连接
#[derive(Debug)]
pub struct UnixConnection {
    stream: UnixStream,
}

impl Connection for UnixConnection {
    fn exchange(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        write_frame(&mut self.stream, request)?;
        trace!("Sent {} bytes", request.len());
        let response = read_frame(&mut self.stream)?;
        trace!("Received {} bytes", response.len());
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_missing_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let transport = UnixSocketTransport::new(dir.path().join("missing.sock"));
        assert!(transport.connect().is_none());
    }

    #[test]
    fn test_default_endpoint() {
        let transport = UnixSocketTransport::default();
        assert_eq!(transport.path(), Path::new(DEFAULT_ENDPOINT));
        assert_eq!(transport.timeout(), Some(DEFAULT_TIMEOUT));
    }

    #[test]
    fn test_with_timeout() {
        let transport = UnixSocketTransport::new("/tmp/x.sock").with_timeout(None);
        assert_eq!(transport.timeout(), None);
    }
}
