use std::net::SocketAddr;

use thiserror::Error;

/// Errors produced by the session, wire codec, and protocol state machines.
#[derive(Debug, Error)]
pub enum MpcError {
    /// Socket connect/bind/accept/send/recv failure. Always fatal to the session.
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    /// A connection presented a malformed JOIN or an IP outside the allow-list.
    /// Non-fatal: the listener drops the connection and keeps waiting.
    #[error("handshake rejected from {peer}: {reason}")]
    Handshake { peer: SocketAddr, reason: String },

    /// Unexpected opcode, short frame, or an operation invoked before the
    /// session reached three joined agents. Fatal to the in-flight operation.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Operand out of range, or malformed calculator input. Reported to the
    /// caller; the session itself remains healthy.
    #[error("domain error: {0}")]
    Domain(String),
}

pub type Result<T> = std::result::Result<T, MpcError>;
