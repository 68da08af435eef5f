//! 录制型假传输
//!
//! 记录每一次 connect / exchange / disconnect，供测试断言调用顺序；
//! 响应由可替换的应答函数生成（默认是 [`SimulatedDevice`]）。

mod device;

pub use device::{ADC_CHANNELS, DEVICE_REJECTED, LED_COUNT, SimulatedDevice};

use crate::{Connection, Transport, TransportError};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// 应答函数：请求消息体 → 响应消息体
pub type Responder = Arc<dyn Fn(&[u8]) -> Result<Vec<u8>, TransportError> + Send + Sync>;

/// 录制的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEvent {
    Connect(u64),
    Exchange { connection: u64, opcode: u8 },
    Disconnect(u64),
}

impl MockEvent {
    pub fn connection(&self) -> u64 {
        match *self {
            MockEvent::Connect(id) | MockEvent::Disconnect(id) => id,
            MockEvent::Exchange { connection, .. } => connection,
        }
    }
}

struct MockState {
    events: Mutex<Vec<MockEvent>>,
    responder: Mutex<Responder>,
    refuse_connect: AtomicBool,
    next_id: AtomicU64,
    exchange_delay: Mutex<Duration>,
}

/// 录制型假传输
///
/// `Clone` 共享同一份录制状态：测试保留一份，执行器持有另一份。
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<MockState>,
}

impl MockTransport {
    pub fn new(responder: Responder) -> Self {
        Self {
            state: Arc::new(MockState {
                events: Mutex::new(Vec::new()),
                responder: Mutex::new(responder),
                refuse_connect: AtomicBool::new(false),
                next_id: AtomicU64::new(1),
                exchange_delay: Mutex::new(Duration::ZERO),
            }),
        }
    }

    /// 由模拟设备应答
    pub fn with_device(device: Arc<SimulatedDevice>) -> Self {
        Self::new(Arc::new(move |body: &[u8]| device.handle(body)))
    }

    /// 拒绝连接（模拟端点不可用）
    pub fn refuse_connections(&self, refuse: bool) {
        self.state.refuse_connect.store(refuse, Ordering::SeqCst);
    }

    pub fn set_responder(&self, responder: Responder) {
        *self.state.responder.lock() = responder;
    }

    /// 每次交换前的人为延迟（用于放大并发窗口）
    pub fn set_exchange_delay(&self, delay: Duration) {
        *self.state.exchange_delay.lock() = delay;
    }

    pub fn events(&self) -> Vec<MockEvent> {
        self.state.events.lock().clone()
    }

    pub fn clear_events(&self) {
        self.state.events.lock().clear();
    }

    pub fn connect_count(&self) -> usize {
        self.count(|e| matches!(e, MockEvent::Connect(_)))
    }

    pub fn exchange_count(&self) -> usize {
        self.count(|e| matches!(e, MockEvent::Exchange { .. }))
    }

    pub fn disconnect_count(&self) -> usize {
        self.count(|e| matches!(e, MockEvent::Disconnect(_)))
    }

    /// 尚未断开的连接数
    pub fn open_connections(&self) -> usize {
        self.connect_count() - self.disconnect_count()
    }

    fn count(&self, f: impl Fn(&MockEvent) -> bool) -> usize {
        self.state.events.lock().iter().filter(|e| f(e)).count()
    }

    fn record(&self, event: MockEvent) {
        self.state.events.lock().push(event);
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::with_device(Arc::new(SimulatedDevice::new()))
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("events", &self.state.events.lock().len())
            .field("refuse_connect", &self.state.refuse_connect.load(Ordering::SeqCst))
            .finish()
    }
}

impl Transport for MockTransport {
    type Connection = MockConnection;

    fn connect(&self) -> Option<MockConnection> {
        if self.state.refuse_connect.load(Ordering::SeqCst) {
            return None;
        }
        let id = self.state.next_id.fetch_add(1, Ordering::SeqCst);
        self.record(MockEvent::Connect(id));
        Some(MockConnection {
            id,
            transport: self.clone(),
        })
    }

    fn disconnect(&self, connection: MockConnection) {
        self.record(MockEvent::Disconnect(connection.id));
    }
}

/// 假连接
pub struct MockConnection {
    id: u64,
    transport: MockTransport,
}

impl MockConnection {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Connection for MockConnection {
    fn exchange(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        self.transport.record(MockEvent::Exchange {
            connection: self.id,
            opcode: request.first().copied().unwrap_or(0),
        });

        let delay = *self.transport.state.exchange_delay.lock();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        // 应答函数在锁外调用，允许并发交换真正交错
        let responder = self.transport.state.responder.lock().clone();
        responder(request)
    }
}
