//! Reads `<int> <op> <int>` lines and drives a [`Coordinator`] one line at a
//! time, the way `server.c`'s `main()` loop does over `stdin`.

use std::io::{BufRead, Write};

use rand::Rng;

use crate::coordinator::Coordinator;
use crate::error::{MpcError, Result};
use crate::field::MOD;
use crate::mpc::BIT_LEN;

/// A parsed `a op b` line.
struct Line {
    a: i64,
    op: String,
    b: i64,
}

fn parse_line(line: &str) -> Result<Line> {
    let mut tokens = line.split_whitespace();
    let a = tokens
        .next()
        .ok_or_else(|| MpcError::Domain("expected: <int> <op> <int>".to_string()))?;
    let op = tokens
        .next()
        .ok_or_else(|| MpcError::Domain("expected: <int> <op> <int>".to_string()))?;
    let b = tokens
        .next()
        .ok_or_else(|| MpcError::Domain("expected: <int> <op> <int>".to_string()))?;
    if tokens.next().is_some() {
        return Err(MpcError::Domain(format!("trailing tokens after {b:?}")));
    }
    let a: i64 = a
        .parse()
        .map_err(|_| MpcError::Domain(format!("{a:?} is not an integer")))?;
    let b: i64 = b
        .parse()
        .map_err(|_| MpcError::Domain(format!("{b:?} is not an integer")))?;
    Ok(Line {
        a,
        op: op.to_string(),
        b,
    })
}

/// Reduces an arbitrary signed operand into the field's canonical `[0, MOD)`
/// representative, for the arithmetic operators.
fn reduce(value: i64) -> u32 {
    value.rem_euclid(MOD as i64) as u32
}

/// Validates a comparison operand against the bit-decomposition domain:
/// `CMP` only makes sense for non-negative integers under `2^ℓ`.
fn cmp_operand(value: i64) -> Result<u32> {
    if value < 0 || value >= (1 << BIT_LEN) {
        return Err(MpcError::Domain(format!(
            "comparison operands must be in [0, {}), got {value}",
            1 << BIT_LEN
        )));
    }
    Ok(value as u32)
}

fn execute<R: Rng>(coordinator: &mut Coordinator<R>, line: &Line) -> Result<u32> {
    match line.op.as_str() {
        "+" => coordinator.add(reduce(line.a), reduce(line.b)),
        "-" => coordinator.sub(reduce(line.a), reduce(line.b)),
        "*" => coordinator.mul(reduce(line.a), reduce(line.b)),
        "<" => coordinator
            .lt(cmp_operand(line.a)?, cmp_operand(line.b)?)
            .map(bool_to_u32),
        "<=" => coordinator
            .le(cmp_operand(line.a)?, cmp_operand(line.b)?)
            .map(bool_to_u32),
        ">" => coordinator
            .gt(cmp_operand(line.a)?, cmp_operand(line.b)?)
            .map(bool_to_u32),
        ">=" => coordinator
            .ge(cmp_operand(line.a)?, cmp_operand(line.b)?)
            .map(bool_to_u32),
        "==" => coordinator
            .eq(cmp_operand(line.a)?, cmp_operand(line.b)?)
            .map(bool_to_u32),
        "!=" => coordinator
            .ne(cmp_operand(line.a)?, cmp_operand(line.b)?)
            .map(bool_to_u32),
        other => Err(MpcError::Domain(format!("unsupported operator: {other}"))),
    }
}

fn bool_to_u32(b: bool) -> u32 {
    b as u32
}

/// Drives the calculator loop until `reader` hits EOF. `Domain` errors (bad
/// input, out-of-range comparison operands) are reported and the loop
/// continues; any other error tears the session down.
pub fn run<R: Rng>(
    coordinator: &mut Coordinator<R>,
    reader: impl BufRead,
    mut writer: impl Write,
) -> Result<()> {
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&line).and_then(|parsed| execute(coordinator, &parsed)) {
            Ok(result) => writeln!(writer, "Result: {result}")?,
            Err(MpcError::Domain(reason)) => writeln!(writer, "error: {reason}")?,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
