//! Minimal WebSocket client shared by the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const OPCODE_TEXT: u8 = 0x1;
const OPCODE_CLOSE: u8 = 0x8;

/// Handshakes, then reads the server's unmasked frames.
pub struct PushClient {
    stream: TcpStream,
    buf: Vec<u8>,
}

impl PushClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "GET / HTTP/1.1\r\n\
             Host: {addr}\r\n\
             Upgrade: websocket\r\n\
             Connection: Upgrade\r\n\
             Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
             Sec-WebSocket-Version: 13\r\n\r\n"
        );
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut client = Self {
            stream,
            buf: Vec::new(),
        };
        let header_end = loop {
            if let Some(pos) = client.buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            assert!(client.fill().await, "connection closed during handshake");
        };
        let head = String::from_utf8_lossy(&client.buf[..header_end]).to_string();
        assert!(head.starts_with("HTTP/1.1 101"), "unexpected handshake: {head}");
        client.buf.drain(..header_end);
        client
    }

    /// Reads more bytes; false once the server has closed the connection.
    async fn fill(&mut self) -> bool {
        let mut chunk = [0u8; 16 * 1024];
        match self.stream.read(&mut chunk).await {
            Ok(0) | Err(_) => false,
            Ok(n) => {
                self.buf.extend_from_slice(&chunk[..n]);
                true
            }
        }
    }

    /// Next complete frame as `(opcode, payload)`, or `None` at end of stream.
    pub async fn next_frame(&mut self) -> Option<(u8, Vec<u8>)> {
        loop {
            let ready = frame_header(&self.buf).filter(|&(_, header, len)| self.buf.len() >= header + len);
            if let Some((opcode, header, len)) = ready {
                let payload = self.buf.drain(..header + len).skip(header).collect();
                return Some((opcode, payload));
            }
            if !self.fill().await {
                return None;
            }
        }
    }

    pub async fn next_text(&mut self) -> String {
        let (opcode, payload) = self.next_frame().await.expect("connection closed");
        assert_eq!(opcode, OPCODE_TEXT, "expected a text frame");
        String::from_utf8(payload).unwrap()
    }

    /// Sends an empty, masked close frame.
    pub async fn send_close(&mut self) {
        self.stream
            .write_all(&[0x80 | OPCODE_CLOSE, 0x80, 0, 0, 0, 0])
            .await
            .unwrap();
    }

    /// Reads until the server sends a close frame or hangs up.
    pub async fn wait_closed(&mut self) {
        while let Some((opcode, _)) = self.next_frame().await {
            if opcode == OPCODE_CLOSE {
                return;
            }
        }
    }
}

/// Parses a server frame header: `(opcode, header_len, payload_len)`.
///
/// Handles the 7-bit, 16-bit and 64-bit payload length forms. Server frames
/// are never masked.
fn frame_header(buf: &[u8]) -> Option<(u8, usize, usize)> {
    if buf.len() < 2 {
        return None;
    }
    assert_eq!(buf[1] & 0x80, 0, "server frames must not be masked");
    let opcode = buf[0] & 0x0f;
    match buf[1] & 0x7f {
        126 => {
            let bytes: [u8; 2] = buf.get(2..4)?.try_into().unwrap();
            Some((opcode, 4, usize::from(u16::from_be_bytes(bytes))))
        }
        127 => {
            let bytes: [u8; 8] = buf.get(2..10)?.try_into().unwrap();
            Some((opcode, 10, usize::try_from(u64::from_be_bytes(bytes)).unwrap()))
        }
        len => Some((opcode, 2, usize::from(len))),
    }
}

/// Polls `condition` until it holds, failing the test after ten seconds.
pub async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
