//! Applies a decoded [`Command`] to the value stack and DP/CC registers,
//! including the two Piet I/O opcodes (§4.1, §4.5, §4.3, §9).

use crate::piet::color::Command;
use crate::piet::dp::InstructionPointer;
use crate::io::{parse_leading_decimal, Io};
use crate::stack::Stack;
use log::trace;
use num_integer::Integer;

/// Applies `command` to `stack`/`ip`, using `value` as the `push` operand
/// (the size of the color block just exited, per §4.5).
///
/// Every branch that needs operands the stack doesn't have is a silent
/// no-op (§4.3, §9): this function never fails and never panics.
pub fn execute(command: Command, value: i64, stack: &mut Stack, ip: &mut InstructionPointer, io: &mut dyn Io) {
    match command {
        Command::Nop => {}
        Command::Push => stack.push(value),
        Command::Pop => {
            stack.pop();
        }
        Command::Add => binary_op(stack, |a, b| Some(a.wrapping_add(b))),
        Command::Subtract => binary_op(stack, |a, b| Some(a.wrapping_sub(b))),
        Command::Multiply => binary_op(stack, |a, b| Some(a.wrapping_mul(b))),
        Command::Divide => binary_op(stack, |a, b| if b == 0 { None } else { Some(a.div_floor(&b)) }),
        Command::Mod => binary_op(stack, |a, b| if b == 0 { None } else { Some(a.mod_floor(&b)) }),
        Command::Not => {
            if let Some(top) = stack.pop() {
                stack.push(if top == 0 { 1 } else { 0 });
            }
        }
        Command::Greater => binary_op(stack, |a, b| Some(if a > b { 1 } else { 0 })),
        Command::Pointer => {
            // Per §9's Open Question: the value is always consumed, even
            // when it's zero (a zero rotation is then just the identity).
            if let Some(n) = stack.pop() {
                ip.rotate_dp(n);
            }
        }
        Command::Switch => {
            if let Some(n) = stack.pop() {
                if n.rem_euclid(2) != 0 {
                    ip.toggle_cc();
                }
            }
        }
        Command::Duplicate => stack.dup(),
        Command::Roll => roll(stack),
        Command::InNum => {
            if let Some(line) = io.read_line() {
                stack.push(parse_leading_decimal(&line).unwrap_or(0));
            }
            // Piet no-ops the instruction on EOF instead of pushing a
            // sentinel; unlike Whitespace, there is no stack effect at all.
        }
        Command::InChar => {
            if let Some(byte) = io.read_byte() {
                stack.push(byte as i64);
            }
        }
        Command::OutNum => {
            if let Some(top) = stack.pop() {
                io.write_str(&top.to_string());
            }
        }
        Command::OutChar => {
            if let Some(top) = stack.pop() {
                io.write_str(&((top as u8) as char).to_string());
            }
        }
    }
    trace!("executed {command:?} -> stack depth {}", stack.len());
}

fn binary_op(stack: &mut Stack, op: impl FnOnce(i64, i64) -> Option<i64>) {
    if stack.len() < 2 {
        return;
    }
    let b = stack.peek(0).unwrap();
    let a = stack.peek(1).unwrap();
    match op(a, b) {
        Some(result) => {
            stack.pop();
            stack.pop();
            stack.push(result);
        }
        // Division/modulo by zero: leave the stack untouched (§9).
        None => {}
    }
}

fn roll(stack: &mut Stack) {
    if stack.len() < 2 {
        return;
    }
    let count = stack.peek(0).unwrap();
    let depth = stack.peek(1).unwrap();
    if depth < 0 {
        return;
    }
    let available = (stack.len() - 2) as i64;
    if depth > available {
        return;
    }
    stack.pop();
    stack.pop();
    stack.roll(depth, count);
}
