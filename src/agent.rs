//! The agent: connects to a coordinator, joins, and answers `Task` frames
//! until the socket closes. Mirrors `agent.c`'s main loop -- ADD and MUL are
//! one local operation each, CMP runs the full per-bit protocol with its
//! interleaved REN round trips.

use std::net::SocketAddr;
use std::time::Duration;

use log::info;

use crate::error::{MpcError, Result};
use crate::field::FieldElem;
use crate::mpc::BIT_LEN;
use crate::net::channel::Channel;
use crate::net::wire::{Response, Task, OP_ADD, OP_CMP, OP_MUL, OP_REN, OP_RES};

pub struct Agent {
    channel: Channel,
}

impl Agent {
    /// Connects to `coordinator` and sends the JOIN handshake.
    pub fn connect(coordinator: SocketAddr, timeout: Option<Duration>) -> Result<Self> {
        let mut channel = Channel::connect(coordinator, timeout)?;
        channel.send_join()?;
        info!("joined coordinator at {coordinator}");
        Ok(Self { channel })
    }

    /// Sends `value` as a REN request and blocks for the renormalized
    /// share the coordinator sends back.
    fn renorm(&mut self, value: FieldElem) -> Result<FieldElem> {
        self.channel
            .send_response(&Response::new(OP_REN, value.value()))?;
        let response = self.channel.recv_response()?;
        if response.op != OP_REN {
            return Err(MpcError::Protocol(format!(
                "expected OP_REN in reply, got {:#x}",
                response.op
            )));
        }
        Ok(FieldElem::new(response.value))
    }

    fn handle_add(&mut self, task: &Task) -> Result<()> {
        let sum = FieldElem::new(task.a).add(FieldElem::new(task.b));
        self.channel.send_response(&Response::new(OP_RES, sum.value()))
    }

    fn handle_mul(&mut self, task: &Task) -> Result<()> {
        let product = FieldElem::new(task.a).multiply(FieldElem::new(task.b));
        self.channel.send_response(&Response::new(OP_RES, product.value()))
    }

    /// The full bit-decomposed comparison, one party's view of it. Follows
    /// `agent.c`'s CMP handler bit for bit: per-bit `t`/`eq`/`gt`/`lt`, the
    /// `prefixEq` chain, the per-bit `flag`, and the final sum.
    fn handle_cmp(&mut self, task: &Task) -> Result<()> {
        let u_shares: Vec<FieldElem> = task.u_shares.iter().map(|&w| FieldElem::from_wire(w)).collect();
        let v_shares: Vec<FieldElem> = task.v_shares.iter().map(|&w| FieldElem::from_wire(w)).collect();

        let mut eq = [FieldElem::ZERO; BIT_LEN];
        let mut gt = [FieldElem::ZERO; BIT_LEN];
        let mut lt = [FieldElem::ZERO; BIT_LEN];
        let mut prefix_eq = [FieldElem::ZERO; BIT_LEN];
        let mut flag = [FieldElem::ZERO; BIT_LEN];
        prefix_eq[0] = FieldElem::new(task.a);

        for j in 0..BIT_LEN {
            let t = self.renorm(u_shares[j].multiply(v_shares[j]))?;
            let two_t = t.add(t);
            let xor = u_shares[j].add(v_shares[j]).subtract(two_t);
            eq[j] = xor.complement();

            let gt_raw = u_shares[j].multiply(v_shares[j].complement());
            gt[j] = self.renorm(gt_raw)?;

            let lt_raw = u_shares[j].complement().multiply(v_shares[j]);
            lt[j] = self.renorm(lt_raw)?;
        }

        for j in 1..BIT_LEN {
            prefix_eq[j] = self.renorm(prefix_eq[j - 1].multiply(eq[j - 1]))?;
        }

        for j in 0..BIT_LEN {
            let diff = gt[j].subtract(lt[j]);
            flag[j] = self.renorm(prefix_eq[j].multiply(diff))?;
        }

        let cmp_share = flag.iter().fold(FieldElem::ZERO, |acc, &f| acc.add(f));
        self.channel.send_response(&Response::new(OP_RES, cmp_share.value()))
    }

    /// Runs the receive loop until the coordinator closes the socket.
    pub fn serve(&mut self) -> Result<()> {
        loop {
            let task = match self.channel.recv_task() {
                Ok(task) => task,
                Err(MpcError::Network(e)) if is_clean_eof(&e) => {
                    info!("coordinator closed the session");
                    return Ok(());
                }
                Err(e) => return Err(e),
            };
            match task.op {
                OP_ADD => self.handle_add(&task)?,
                OP_MUL => self.handle_mul(&task)?,
                OP_CMP => self.handle_cmp(&task)?,
                other => {
                    return Err(MpcError::Protocol(format!(
                        "unexpected task opcode {other:#x}"
                    )))
                }
            }
        }
    }
}

fn is_clean_eof(e: &std::io::Error) -> bool {
    e.kind() == std::io::ErrorKind::UnexpectedEof
}
