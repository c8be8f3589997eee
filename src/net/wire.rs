//! Fixed-layout, big-endian wire frames for the coordinator/agent protocol.
//!
//! `Task` and `Response` mirror the packed C structs in the reference
//! implementation byte for byte, so the `encode`/`decode` pair here is
//! hand-rolled instead of going through `serde`/`bincode` (which has no way
//! to express a fixed `#[repr(C, packed)]`-style layout with network byte
//! order). Every integer is big-endian ("network byte order").

use crate::error::MpcError;
use crate::mpc::BIT_LEN;

/// Task opcodes, coordinator to agent.
pub const OP_ADD: u8 = 0x01;
pub const OP_MUL: u8 = 0x02;
pub const OP_CMP: u8 = 0x03;
/// Renormalization round-trip, sent by either side.
pub const OP_REN: u8 = 0x80;
/// Final result share, agent to coordinator.
pub const OP_RES: u8 = 0x81;

/// `task` frame: `u8 op, u32 a, u32 b, i32 u_shares[14], i32 v_shares[14]`.
pub const TASK_LEN: usize = 1 + 4 + 4 + 4 * BIT_LEN + 4 * BIT_LEN;
/// `response` frame: `u8 op, u32 value`.
pub const RESPONSE_LEN: usize = 1 + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    pub op: u8,
    pub a: u32,
    pub b: u32,
    pub u_shares: [i32; BIT_LEN],
    pub v_shares: [i32; BIT_LEN],
}

impl Task {
    /// An ADD or MUL task: only `a`/`b` are meaningful, the bit-share arrays
    /// are sent zeroed as the spec requires.
    pub fn arith(op: u8, a: u32, b: u32) -> Self {
        Self {
            op,
            a,
            b,
            u_shares: [0; BIT_LEN],
            v_shares: [0; BIT_LEN],
        }
    }

    /// A CMP task: `a` carries this party's share of the constant 1 (the
    /// seed for `prefixEq[0]`), `b` is unused.
    pub fn cmp(seed_one_share: u32, u_shares: [i32; BIT_LEN], v_shares: [i32; BIT_LEN]) -> Self {
        Self {
            op: OP_CMP,
            a: seed_one_share,
            b: 0,
            u_shares,
            v_shares,
        }
    }

    pub fn encode(&self) -> [u8; TASK_LEN] {
        let mut buf = [0u8; TASK_LEN];
        let mut offset = 0;
        buf[offset] = self.op;
        offset += 1;
        buf[offset..offset + 4].copy_from_slice(&self.a.to_be_bytes());
        offset += 4;
        buf[offset..offset + 4].copy_from_slice(&self.b.to_be_bytes());
        offset += 4;
        for &share in self.u_shares.iter() {
            buf[offset..offset + 4].copy_from_slice(&share.to_be_bytes());
            offset += 4;
        }
        for &share in self.v_shares.iter() {
            buf[offset..offset + 4].copy_from_slice(&share.to_be_bytes());
            offset += 4;
        }
        debug_assert_eq!(offset, TASK_LEN);
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self, MpcError> {
        if buf.len() != TASK_LEN {
            return Err(MpcError::Protocol(format!(
                "short task frame: expected {TASK_LEN} bytes, got {}",
                buf.len()
            )));
        }
        let mut offset = 0;
        let op = buf[offset];
        offset += 1;
        let a = u32::from_be_bytes(buf[offset..offset + 4].try_into().unwrap());
        offset += 4;
        let b = u32::from_be_bytes(buf[offset..offset + 4].try_into().unwrap());
        offset += 4;
        let mut u_shares = [0i32; BIT_LEN];
        for share in u_shares.iter_mut() {
            *share = i32::from_be_bytes(buf[offset..offset + 4].try_into().unwrap());
            offset += 4;
        }
        let mut v_shares = [0i32; BIT_LEN];
        for share in v_shares.iter_mut() {
            *share = i32::from_be_bytes(buf[offset..offset + 4].try_into().unwrap());
            offset += 4;
        }
        debug_assert_eq!(offset, TASK_LEN);
        Ok(Self {
            op,
            a,
            b,
            u_shares,
            v_shares,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    pub op: u8,
    pub value: u32,
}

impl Response {
    pub fn new(op: u8, value: u32) -> Self {
        Self { op, value }
    }

    pub fn encode(&self) -> [u8; RESPONSE_LEN] {
        let mut buf = [0u8; RESPONSE_LEN];
        buf[0] = self.op;
        buf[1..5].copy_from_slice(&self.value.to_be_bytes());
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self, MpcError> {
        if buf.len() != RESPONSE_LEN {
            return Err(MpcError::Protocol(format!(
                "short response frame: expected {RESPONSE_LEN} bytes, got {}",
                buf.len()
            )));
        }
        Ok(Self {
            op: buf[0],
            value: u32::from_be_bytes(buf[1..5].try_into().unwrap()),
        })
    }
}
