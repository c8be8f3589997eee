//! The coordinator: dealer, message router, and reconstructor for the
//! three-party session. Mirrors the reference `server.c` one call at a time
//! -- `add`/`sub`/`mul` are single request/response round trips, `cmp` drives
//! the full bit-decomposed comparison state machine with its 69 REN rounds.

use std::net::IpAddr;

use log::{info, warn};
use rand::Rng;

use crate::error::{MpcError, Result};
use crate::field::{FieldElem, MOD};
use crate::mpc::share::{split, ShareTriple, NP};
use crate::mpc::{bits_msb_first, BIT_LEN};
use crate::net::channel::Channel;
use crate::net::config::SessionConfig;
use crate::net::wire::{Response, Task, OP_ADD, OP_CMP, OP_MUL, OP_REN, OP_RES};

/// A live three-party session. Constructing one already performed the JOIN
/// handshake with all three agents, so there is no separate "initialized"
/// flag to check before calling an operation -- a `Coordinator` value can
/// only exist once exactly three agents are seated.
pub struct Coordinator<R> {
    channels: [Channel; NP],
    rng: R,
}

impl<R: Rng> Coordinator<R> {
    /// Binds `config.listen_addr`, accepts connections until three distinct
    /// agents complete the JOIN handshake, then closes the listener. A
    /// connection that fails the allow-list check or sends a malformed
    /// handshake is logged and dropped; the listener keeps waiting for the
    /// third seat to fill.
    pub fn bind(config: &SessionConfig, rng: R) -> Result<Self> {
        let listener = std::net::TcpListener::bind(config.listen_addr)?;
        info!("listening on {} for {NP} agents", config.listen_addr);

        let mut channels: Vec<Channel> = Vec::with_capacity(NP);
        while channels.len() < NP {
            let (stream, peer) = listener.accept()?;
            let ip: IpAddr = peer.ip();
            if !config.permits(ip) {
                warn!("rejecting connection from {peer}: not in the allow-list");
                continue;
            }
            let mut channel = Channel::from_stream(stream);
            if let Some(timeout) = config.read_timeout {
                channel.set_read_timeout(Some(timeout))?;
            }
            match channel.expect_join() {
                Ok(()) => {
                    info!("agent {} joined from {peer}", channels.len() + 1);
                    channels.push(channel);
                }
                Err(MpcError::Handshake { reason, .. }) => {
                    warn!("dropping connection from {peer}: {reason}");
                }
                Err(e) => return Err(e),
            }
        }
        // Drop the listener: exactly NP agents are seated, no more JOINs
        // are accepted for this session.
        drop(listener);
        info!("all {NP} agents joined, session starting");

        let channels: [Channel; NP] = channels
            .try_into()
            .unwrap_or_else(|_| unreachable!("loop above only exits once len == NP"));
        Ok(Self { channels, rng })
    }

    fn expect_opcode(op: u8, expected: u8) -> Result<()> {
        if op != expected {
            return Err(MpcError::Protocol(format!(
                "expected opcode {expected:#x}, got {op:#x}"
            )));
        }
        Ok(())
    }

    fn collect_responses(&mut self, expected_op: u8) -> Result<ShareTriple> {
        let mut shares = [FieldElem::ZERO; NP];
        for (j, channel) in self.channels.iter_mut().enumerate() {
            let response = channel.recv_response()?;
            Self::expect_opcode(response.op, expected_op)?;
            shares[j] = FieldElem::new(response.value);
        }
        Ok(ShareTriple(shares))
    }

    /// One REN round trip: each agent has already shipped its current raw
    /// share as a `{OP_REN, value}` response; the coordinator renormalizes
    /// the collected triple and replies in kind. See spec.md §4.B.
    fn wait_renorm(&mut self) -> Result<()> {
        let collected = self.collect_responses(OP_REN)?;
        let renormalized = collected.renormalize(&mut self.rng);
        for (j, channel) in self.channels.iter_mut().enumerate() {
            channel.send_response(&Response::new(OP_REN, renormalized.share(j).value()))?;
        }
        Ok(())
    }

    fn deal_and_send(&mut self, op: u8, a: FieldElem, b: FieldElem) -> Result<()> {
        let r1 = FieldElem::random(&mut self.rng);
        let r2 = FieldElem::random(&mut self.rng);
        for (j, channel) in self.channels.iter_mut().enumerate() {
            let task = Task::arith(op, split(j, r1, a).value(), split(j, r2, b).value());
            channel.send_task(&task)?;
        }
        Ok(())
    }

    /// `ADD(a, b)`: a single dealt round trip, no renormalization needed
    /// since the agents' local sum stays degree 1.
    pub fn add(&mut self, a: u32, b: u32) -> Result<u32> {
        self.deal_and_send(OP_ADD, FieldElem::from_u64(a as u64), FieldElem::from_u64(b as u64))?;
        Ok(self.collect_responses(OP_RES)?.reconstruct().value())
    }

    /// `SUB(a, b) = ADD(a, -b)`.
    pub fn sub(&mut self, a: u32, b: u32) -> Result<u32> {
        let neg_b = FieldElem::from_u64(b as u64).negate().value();
        self.add(a, neg_b)
    }

    /// `MUL(a, b)`: the agents' local product is degree 2, so the
    /// coordinator renormalizes the collected triple once, locally, before
    /// reconstructing -- there is no network round trip for this
    /// renormalization, because the agents have nothing further to do with
    /// the result (see SPEC_FULL.md §4.B / §9).
    pub fn mul(&mut self, a: u32, b: u32) -> Result<u32> {
        self.deal_and_send(OP_MUL, FieldElem::from_u64(a as u64), FieldElem::from_u64(b as u64))?;
        let degree_two = self.collect_responses(OP_RES)?;
        let renormalized = degree_two.renormalize(&mut self.rng);
        Ok(renormalized.reconstruct().value())
    }

    /// Runs the full comparison protocol for `u` versus `v` and returns
    /// `(c, e)`: `c` is the shared `u >= v` flag reconstructed from
    /// `[0, p/2]`, `e` is the shared equality flag.
    pub fn cmp(&mut self, u: u32, v: u32) -> Result<(bool, bool)> {
        if u >= (1 << BIT_LEN) || v >= (1 << BIT_LEN) {
            return Err(MpcError::Domain(format!(
                "comparison operands must fit in {BIT_LEN} bits, got {u} and {v}"
            )));
        }
        let bits_u = bits_msb_first(u);
        let bits_v = bits_msb_first(v);

        let mut u_shares = [[0i32; BIT_LEN]; NP];
        let mut v_shares = [[0i32; BIT_LEN]; NP];
        for bit in 0..BIT_LEN {
            let ru = FieldElem::random(&mut self.rng);
            let rv = FieldElem::random(&mut self.rng);
            let bu = FieldElem::new(bits_u[bit] as u32);
            let bv = FieldElem::new(bits_v[bit] as u32);
            for j in 0..NP {
                u_shares[j][bit] = split(j, ru, bu).to_wire();
                v_shares[j][bit] = split(j, rv, bv).to_wire();
            }
        }

        let r0 = FieldElem::random(&mut self.rng);
        for (j, channel) in self.channels.iter_mut().enumerate() {
            let seed = split(j, r0, FieldElem::ONE).value();
            let task = Task::cmp(seed, u_shares[j], v_shares[j]);
            channel.send_task(&task)?;
        }

        // Phase A: per bit, t then gt then lt -- 3*BIT_LEN rounds.
        for _ in 0..BIT_LEN {
            self.wait_renorm()?;
            self.wait_renorm()?;
            self.wait_renorm()?;
        }
        // Phase B: the prefixEq chain, BIT_LEN-1 rounds (bit 0 needs no REN).
        for _ in 1..BIT_LEN {
            self.wait_renorm()?;
        }
        // Phase C: per-bit flag, BIT_LEN rounds.
        for _ in 0..BIT_LEN {
            self.wait_renorm()?;
        }

        let cmp = self.collect_responses(OP_RES)?.reconstruct().value();
        let c = cmp <= MOD / 2;
        let e = cmp == 0;
        Ok((c, e))
    }

    pub fn lt(&mut self, a: u32, b: u32) -> Result<bool> {
        let (c, _) = self.cmp(a, b)?;
        Ok(!c)
    }

    pub fn gt(&mut self, a: u32, b: u32) -> Result<bool> {
        self.lt(b, a)
    }

    pub fn le(&mut self, a: u32, b: u32) -> Result<bool> {
        let (c, e) = self.cmp(a, b)?;
        Ok(e || !c)
    }

    pub fn ge(&mut self, a: u32, b: u32) -> Result<bool> {
        let (c, _) = self.cmp(a, b)?;
        Ok(c)
    }

    pub fn eq(&mut self, a: u32, b: u32) -> Result<bool> {
        let (_, e) = self.cmp(a, b)?;
        Ok(e)
    }

    pub fn ne(&mut self, a: u32, b: u32) -> Result<bool> {
        Ok(!self.eq(a, b)?)
    }

    /// Tears the session down, shutting each agent's socket.
    pub fn close(&mut self) {
        for channel in self.channels.iter_mut() {
            let _ = channel.shutdown();
        }
    }
}
