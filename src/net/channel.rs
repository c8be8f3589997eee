//! Plain-TCP framing for the coordinator/agent protocol: the JOIN handshake
//! and the `Task`/`Response` read/write pair built on top of [`super::wire`].
//!
//! The reference implementation and the spec describe a raw, un-encrypted
//! TCP session (fixed-size framing only, no record layer) -- unlike the
//! teacher's `rustls`-backed channel, there is no transport security layer to
//! reuse here; see `DESIGN.md` for the dropped dependency.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use crate::error::MpcError;
use crate::net::wire::{Response, Task, RESPONSE_LEN, TASK_LEN};

/// The literal 5-byte handshake every agent sends on connect.
pub const JOIN_MSG: &[u8; 5] = b"JOIN\n";

/// One TCP connection, framed for exchanging `Task`/`Response` messages.
/// Used by both sides: the coordinator holds three of these (one per agent),
/// and each agent holds exactly one (to the coordinator).
pub struct Channel {
    stream: TcpStream,
}

impl Channel {
    pub fn from_stream(stream: TcpStream) -> Self {
        Self { stream }
    }

    pub fn connect(addr: SocketAddr, timeout: Option<Duration>) -> Result<Self, MpcError> {
        let stream = match timeout {
            Some(t) => TcpStream::connect_timeout(&addr, t)?,
            None => TcpStream::connect(addr)?,
        };
        Ok(Self { stream })
    }

    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), MpcError> {
        self.stream.set_read_timeout(timeout)?;
        Ok(())
    }

    pub fn peer_addr(&self) -> std::io::Result<SocketAddr> {
        self.stream.peer_addr()
    }

    /// Agent side: sends the literal `JOIN\n` handshake.
    pub fn send_join(&mut self) -> Result<(), MpcError> {
        self.stream.write_all(JOIN_MSG)?;
        Ok(())
    }

    /// Coordinator side: reads exactly 5 bytes and checks they equal `JOIN\n`.
    /// Returns a `Handshake` error (non-fatal: caller drops the connection
    /// and keeps listening) rather than a `Network`/`Protocol` error.
    pub fn expect_join(&mut self) -> Result<(), MpcError> {
        let peer = self
            .peer_addr()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 0)));
        let mut buf = [0u8; 5];
        self.stream.read_exact(&mut buf).map_err(|_| MpcError::Handshake {
            peer,
            reason: "connection closed before JOIN was received".to_string(),
        })?;
        if &buf != JOIN_MSG {
            return Err(MpcError::Handshake {
                peer,
                reason: format!("expected JOIN handshake, got {buf:?}"),
            });
        }
        Ok(())
    }

    pub fn send_task(&mut self, task: &Task) -> Result<(), MpcError> {
        self.stream.write_all(&task.encode())?;
        Ok(())
    }

    pub fn recv_task(&mut self) -> Result<Task, MpcError> {
        let mut buf = [0u8; TASK_LEN];
        self.stream.read_exact(&mut buf)?;
        Task::decode(&buf)
    }

    pub fn send_response(&mut self, response: &Response) -> Result<(), MpcError> {
        self.stream.write_all(&response.encode())?;
        Ok(())
    }

    pub fn recv_response(&mut self) -> Result<Response, MpcError> {
        let mut buf = [0u8; RESPONSE_LEN];
        self.stream.read_exact(&mut buf)?;
        Response::decode(&buf)
    }

    pub fn shutdown(&mut self) -> Result<(), MpcError> {
        let _ = self.stream.shutdown(std::net::Shutdown::Both);
        log::info!("channel successfully closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn join_handshake_roundtrips() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = thread::spawn(move || {
            let mut channel = Channel::connect(addr, None).unwrap();
            channel.send_join().unwrap();
        });

        let (stream, _) = listener.accept().unwrap();
        let mut server_channel = Channel::from_stream(stream);
        server_channel.expect_join().unwrap();
        client.join().unwrap();
    }

    #[test]
    fn rejects_a_malformed_handshake() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.write_all(b"NOPE\n").unwrap();
        });

        let (stream, _) = listener.accept().unwrap();
        let mut server_channel = Channel::from_stream(stream);
        assert!(server_channel.expect_join().is_err());
        client.join().unwrap();
    }

    #[test]
    fn task_and_response_roundtrip_over_a_real_socket() {
        use crate::net::wire::{OP_ADD, OP_RES};

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = thread::spawn(move || {
            let mut channel = Channel::connect(addr, None).unwrap();
            let task = channel.recv_task().unwrap();
            assert_eq!(task.op, OP_ADD);
            channel
                .send_response(&Response::new(OP_RES, task.a + task.b))
                .unwrap();
        });

        let (stream, _) = listener.accept().unwrap();
        let mut server_channel = Channel::from_stream(stream);
        server_channel
            .send_task(&Task::arith(OP_ADD, 3, 9))
            .unwrap();
        let response = server_channel.recv_response().unwrap();
        assert_eq!(response.value, 12);
        client.join().unwrap();
    }
}
