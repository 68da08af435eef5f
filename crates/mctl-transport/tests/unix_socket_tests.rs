//! Unix 域套接字传输的集成测试
//!
//! 在临时目录中启动一个单线程应答服务，验证分帧、超时和连接生命周期。

use mctl_protocol::{Opcode, ProtocolError, RequestFrame, ResponseFrame};
use mctl_transport::{
    Connection, MAX_FRAME_LEN, Transport, TransportError, UnixSocketTransport, read_frame,
    write_frame,
};
use std::io::Write;
use std::os::unix::net::UnixListener;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// 启动应答服务：每个连接处理一条消息
fn spawn_server<F>(connections: usize, handler: F) -> (tempfile::TempDir, PathBuf, thread::JoinHandle<()>)
where
    F: Fn(&mut std::os::unix::net::UnixStream) + Send + 'static,
{
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("iosocket");
    let listener = UnixListener::bind(&path).unwrap();
    let handle = thread::spawn(move || {
        for stream in listener.incoming().take(connections) {
            let mut stream = stream.unwrap();
            handler(&mut stream);
        }
    });
    (dir, path, handle)
}

fn echo_version(stream: &mut std::os::unix::net::UnixStream) {
    let body = read_frame(stream).unwrap();
    let request = RequestFrame::from_bytes(&body).unwrap();
    let response = ResponseFrame::ok(request.opcode, &[0x0A, 0x02, 0x03, 0x00]);
    write_frame(stream, &response.to_bytes()).unwrap();
}

#[test]
fn exchange_one_message() {
    let (_dir, path, server) = spawn_server(1, echo_version);
    let transport = UnixSocketTransport::new(&path);

    let mut conn = transport.connect().expect("endpoint should be reachable");
    let request = RequestFrame::new(Opcode::GetMcuVersion, &[]).to_bytes();
    let body = conn.exchange(&request).unwrap();
    transport.disconnect(conn);

    let response = ResponseFrame::from_bytes(&body).unwrap();
    assert_eq!(response.opcode, Opcode::GetMcuVersion);
    assert_eq!(response.status, 0);
    assert_eq!(response.payload(), &[0x0A, 0x02, 0x03, 0x00]);
    server.join().unwrap();
}

#[test]
fn one_connection_per_call() {
    let (_dir, path, server) = spawn_server(3, echo_version);
    let transport = UnixSocketTransport::new(&path);
    let request = RequestFrame::new(Opcode::GetFpgaVersion, &[]).to_bytes();

    for _ in 0..3 {
        let mut conn = transport.connect().unwrap();
        assert!(conn.exchange(&request).is_ok());
        transport.disconnect(conn);
    }
    server.join().unwrap();
}

#[test]
fn peer_closes_without_reply() {
    let (_dir, path, server) = spawn_server(1, |stream| {
        let _ = read_frame(stream);
    });
    let transport = UnixSocketTransport::new(&path);

    let mut conn = transport.connect().unwrap();
    let request = RequestFrame::new(Opcode::GetMcuVersion, &[]).to_bytes();
    let err = conn.exchange(&request).unwrap_err();
    assert!(err.status() < 0);
    transport.disconnect(conn);
    server.join().unwrap();
}

#[test]
fn read_timeout_is_receive_failure() {
    let (_dir, path, server) = spawn_server(1, |stream| {
        let _ = read_frame(stream);
        thread::sleep(Duration::from_millis(300));
    });
    let transport = UnixSocketTransport::new(&path).with_timeout(Some(Duration::from_millis(50)));

    let mut conn = transport.connect().unwrap();
    let request = RequestFrame::new(Opcode::GetMcuVersion, &[]).to_bytes();
    let err = conn.exchange(&request).unwrap_err();
    assert!(matches!(err, TransportError::Receive(_)));
    assert_eq!(err.status(), -3);
    transport.disconnect(conn);
    server.join().unwrap();
}

#[test]
fn oversized_length_prefix_rejected() {
    let (_dir, path, server) = spawn_server(1, |stream| {
        let _ = read_frame(stream);
        let len = (MAX_FRAME_LEN + 1) as u16;
        stream.write_all(&len.to_be_bytes()).unwrap();
    });
    let transport = UnixSocketTransport::new(&path);

    let mut conn = transport.connect().unwrap();
    let request = RequestFrame::new(Opcode::GetMcuVersion, &[]).to_bytes();
    let err = conn.exchange(&request).unwrap_err();
    assert!(matches!(
        err,
        TransportError::MalformedResponse(ProtocolError::ResponseTooLong { .. })
    ));
    assert_eq!(err.status(), -4);
    transport.disconnect(conn);
    server.join().unwrap();
}

#[test]
fn missing_endpoint_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let transport = UnixSocketTransport::new(dir.path().join("nothing-here"));
    assert!(transport.connect().is_none());
}
