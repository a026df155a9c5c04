//! Pass 2 (§4.8): the Whitespace dispatcher and its stack/heap/call-stack
//! machine state (§3).

use crate::io::{parse_leading_decimal, Io};
use crate::stack::Stack;
use crate::whitespace::error::{Halt, WhitespaceError};
use crate::whitespace::program::{Instruction, Program};
use log::trace;
use std::collections::HashMap;

/// Matches the reference interpreter's heap bound exactly (`HEAP_SIZE` in
/// the original C source), not a rounder power of two.
pub const HEAP_SIZE: i64 = 524228;

/// The ceiling `Machine::with_stack_cap` applies when a caller wants the
/// "configured ceiling" §3 allows without picking a number themselves.
pub const DEFAULT_STACK_CAP: i64 = 1 << 16;

pub enum StepOutcome {
    Continued,
    Halted(Halt),
}

pub struct Machine<'a> {
    program: &'a Program,
    pc: usize,
    stack: Stack,
    heap: HashMap<i64, i64>,
    call_stack: Vec<usize>,
    step_count: u64,
    stack_cap: Option<i64>,
}

impl<'a> Machine<'a> {
    pub fn new(program: &'a Program) -> Self {
        Machine {
            program,
            pc: 0,
            stack: Stack::new(),
            heap: HashMap::new(),
            call_stack: Vec::new(),
            step_count: 0,
            stack_cap: None,
        }
    }

    /// Like [`Machine::new`], but rejects `push`/`dup`/`copy` once the
    /// stack would grow past `cap` (§3's optional "configured ceiling",
    /// e.g. [`DEFAULT_STACK_CAP`]), raising [`WhitespaceError::StackOverflowCap`]
    /// instead of growing unbounded.
    pub fn with_stack_cap(program: &'a Program, cap: i64) -> Self {
        Machine { stack_cap: Some(cap), ..Machine::new(program) }
    }

    fn check_stack_room(&self, growth: usize) -> Result<(), WhitespaceError> {
        if let Some(cap) = self.stack_cap {
            if self.stack.len() as i64 + growth as i64 > cap {
                return Err(WhitespaceError::StackOverflowCap);
            }
        }
        Ok(())
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    fn heap_get(&self, address: i64) -> Result<i64, WhitespaceError> {
        if address < 0 || address >= HEAP_SIZE {
            return Err(WhitespaceError::HeapOutOfBounds(address));
        }
        Ok(*self.heap.get(&address).unwrap_or(&0))
    }

    fn heap_set(&mut self, address: i64, value: i64) -> Result<(), WhitespaceError> {
        if address < 0 || address >= HEAP_SIZE {
            return Err(WhitespaceError::HeapOutOfBounds(address));
        }
        self.heap.insert(address, value);
        Ok(())
    }

    fn resolve_label(&self, bits: &[bool]) -> Result<usize, WhitespaceError> {
        self.program.label(bits).ok_or_else(|| WhitespaceError::UndefinedLabel(bits.to_vec()))
    }

    /// Executes one decoded instruction. An implicit fall-off-the-end of
    /// the token stream behaves like `end` (§4.8 only documents an
    /// explicit `end`; falling off is the natural total extension).
    pub fn step(&mut self, io: &mut dyn Io) -> Result<StepOutcome, WhitespaceError> {
        if self.pc >= self.program.len() {
            return Ok(StepOutcome::Halted(Halt::Ended));
        }
        let (instruction, next_pc) = self.program.decode_at(self.pc)?;
        self.pc = next_pc;
        self.step_count += 1;
        trace!("pc={} executing {instruction:?}", next_pc);

        match instruction {
            Instruction::Push(n) => {
                self.check_stack_room(1)?;
                self.stack.push(n);
            }
            Instruction::Copy(n) => {
                if n >= 0 {
                    if let Some(v) = self.stack.peek(n as usize) {
                        self.check_stack_room(1)?;
                        self.stack.push(v);
                    }
                }
                // Negative copy indices can't be produced by the decoder
                // from a well-formed sign encoding; treat as a no-op if
                // one somehow arrives.
            }
            Instruction::Slide(n) => {
                if n >= 0 {
                    self.stack.discard_below_top(n as usize);
                }
            }
            Instruction::Dup => {
                if !self.stack.is_empty() {
                    self.check_stack_room(1)?;
                }
                self.stack.dup();
            }
            Instruction::Swap => self.stack.swap(),
            Instruction::Discard => {
                self.stack.pop();
            }
            Instruction::Add => self.binary_op(|a, b| a.wrapping_add(b)),
            Instruction::Sub => self.binary_op(|a, b| a.wrapping_sub(b)),
            Instruction::Mul => self.binary_op(|a, b| a.wrapping_mul(b)),
            Instruction::Div => return self.checked_binary_op(|a, b| a / b),
            Instruction::Mod => return self.checked_binary_op(|a, b| a % b),
            Instruction::Store => {
                if self.stack.len() >= 2 {
                    let value = self.stack.pop().unwrap();
                    let address = self.stack.pop().unwrap();
                    self.heap_set(address, value)?;
                }
            }
            Instruction::Load => {
                if let Some(address) = self.stack.pop() {
                    self.stack.push(self.heap_get(address)?);
                }
            }
            Instruction::Mark(_) => {}
            Instruction::Call(bits) => {
                let target = self.resolve_label(&bits)?;
                self.call_stack.push(self.pc);
                self.pc = target;
            }
            Instruction::Jump(bits) => {
                self.pc = self.resolve_label(&bits)?;
            }
            Instruction::Jz(bits) => {
                if let Some(top) = self.stack.pop() {
                    if top == 0 {
                        self.pc = self.resolve_label(&bits)?;
                    }
                }
            }
            Instruction::Jn(bits) => {
                if let Some(top) = self.stack.pop() {
                    if top < 0 {
                        self.pc = self.resolve_label(&bits)?;
                    }
                }
            }
            Instruction::Return => {
                if let Some(return_pc) = self.call_stack.pop() {
                    self.pc = return_pc;
                }
                // Returning with an empty call stack has no defined
                // target; treat it as falling off the end.
                else {
                    return Ok(StepOutcome::Halted(Halt::Ended));
                }
            }
            Instruction::End => return Ok(StepOutcome::Halted(Halt::Ended)),
            Instruction::OutChar => {
                if let Some(top) = self.stack.pop() {
                    io.write_str(&((top as u8) as char).to_string());
                }
            }
            Instruction::OutNum => {
                if let Some(top) = self.stack.pop() {
                    io.write_str(&top.to_string());
                }
            }
            Instruction::InChar => {
                if let Some(address) = self.stack.pop() {
                    let value = io.read_byte().map(|b| b as i64).unwrap_or(-1);
                    self.heap_set(address, value)?;
                }
            }
            Instruction::InNum => {
                if let Some(address) = self.stack.pop() {
                    let value = io
                        .read_line()
                        .map(|line| parse_leading_decimal(&line).unwrap_or(0))
                        .unwrap_or(-1);
                    self.heap_set(address, value)?;
                }
            }
        }
        Ok(StepOutcome::Continued)
    }

    fn binary_op(&mut self, op: impl FnOnce(i64, i64) -> i64) {
        if self.stack.len() < 2 {
            return;
        }
        let b = self.stack.pop().unwrap();
        let a = self.stack.pop().unwrap();
        self.stack.push(op(a, b));
    }

    fn checked_binary_op(&mut self, op: impl FnOnce(i64, i64) -> i64) -> Result<StepOutcome, WhitespaceError> {
        if self.stack.len() < 2 {
            return Ok(StepOutcome::Continued);
        }
        let b = self.stack.pop().unwrap();
        let a = self.stack.pop().unwrap();
        if b == 0 {
            return Err(WhitespaceError::DivisionByZero);
        }
        self.stack.push(op(a, b));
        Ok(StepOutcome::Continued)
    }

    /// Runs until halt, a step cap, or a fatal error. `max_steps` is a
    /// cooperative external ceiling, not part of the language (§5).
    pub fn run(&mut self, io: &mut dyn Io, max_steps: Option<u64>) -> Result<Halt, WhitespaceError> {
        loop {
            if let Some(cap) = max_steps {
                if self.step_count >= cap {
                    return Ok(Halt::StepCapExceeded);
                }
            }
            match self.step(io)? {
                StepOutcome::Continued => {}
                StepOutcome::Halted(reason) => return Ok(reason),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::BufferIo;
    use crate::whitespace::lexer::{encode_number, Token};
    use crate::whitespace::program::Program;

    fn bytes_of(tokens: Vec<Token>) -> Vec<u8> {
        tokens
            .iter()
            .map(|t| match t {
                Token::Space => 0x20,
                Token::Tab => 0x09,
                Token::Line => 0x0A,
            })
            .collect()
    }

    fn push(n: i64) -> Vec<Token> {
        let mut t = vec![Token::Space, Token::Space];
        t.extend(encode_number(n));
        t
    }

    #[test]
    fn push_add_out_num_then_end() {
        let mut tokens = push(2);
        tokens.extend(push(3));
        tokens.extend([Token::Tab, Token::Space, Token::Space, Token::Space]); // add
        tokens.extend([Token::Tab, Token::Line, Token::Space, Token::Tab]); // out_num
        tokens.extend([Token::Line, Token::Line]); // end
        let program = Program::parse(&bytes_of(tokens)).unwrap();
        let mut machine = Machine::new(&program);
        let mut io = BufferIo::default();
        let halt = machine.run(&mut io, None).unwrap();
        assert_eq!(halt, Halt::Ended);
        assert_eq!(io.output, "5");
    }

    #[test]
    fn division_by_zero_is_fatal() {
        let mut tokens = push(1);
        tokens.extend(push(0));
        tokens.extend([Token::Tab, Token::Space, Token::Tab, Token::Space]); // div
        let program = Program::parse(&bytes_of(tokens)).unwrap();
        let mut machine = Machine::new(&program);
        let mut io = BufferIo::default();
        assert_eq!(machine.run(&mut io, None), Err(WhitespaceError::DivisionByZero));
    }

    #[test]
    fn heap_store_and_load_round_trip() {
        let mut tokens = push(10); // address
        tokens.extend(push(42)); // value
        tokens.extend([Token::Tab, Token::Tab, Token::Space]); // store
        tokens.extend(push(10)); // address
        tokens.extend([Token::Tab, Token::Tab, Token::Tab]); // load
        let program = Program::parse(&bytes_of(tokens)).unwrap();
        let mut machine = Machine::new(&program);
        let mut io = BufferIo::default();
        machine.run(&mut io, Some(100)).unwrap();
        assert_eq!(machine.stack().peek(0), Some(42));
    }

    #[test]
    fn out_of_bounds_heap_address_is_fatal() {
        let mut tokens = push(HEAP_SIZE);
        tokens.extend(push(1));
        tokens.extend([Token::Tab, Token::Tab, Token::Space]); // store
        let program = Program::parse(&bytes_of(tokens)).unwrap();
        let mut machine = Machine::new(&program);
        let mut io = BufferIo::default();
        assert_eq!(machine.run(&mut io, None), Err(WhitespaceError::HeapOutOfBounds(HEAP_SIZE)));
    }

    #[test]
    fn jump_to_undefined_label_is_fatal() {
        let mut tokens = vec![Token::Line, Token::Space, Token::Line]; // jump
        tokens.extend([Token::Space, Token::Line]); // label "0"
        let program = Program::parse(&bytes_of(tokens)).unwrap();
        let mut machine = Machine::new(&program);
        let mut io = BufferIo::default();
        assert_eq!(machine.run(&mut io, None), Err(WhitespaceError::UndefinedLabel(vec![false])));
    }

    #[test]
    fn in_char_eof_stores_negative_one() {
        let mut tokens = push(0); // address
        tokens.extend([Token::Tab, Token::Line, Token::Tab, Token::Space]); // in_char
        tokens.extend(push(0));
        tokens.extend([Token::Tab, Token::Tab, Token::Tab]); // load
        let program = Program::parse(&bytes_of(tokens)).unwrap();
        let mut machine = Machine::new(&program);
        let mut io = BufferIo::default(); // no input queued
        machine.run(&mut io, Some(100)).unwrap();
        assert_eq!(machine.stack().peek(0), Some(-1));
    }

    #[test]
    fn call_then_return_resumes_after_the_call() {
        // call sub; out_num 7 (pushed before call is irrelevant); end
        // sub: push 9; return
        let mut tokens = vec![Token::Line, Token::Space, Token::Tab]; // call
        tokens.extend([Token::Space, Token::Line]); // label "0"
        tokens.extend([Token::Tab, Token::Line, Token::Space, Token::Tab]); // out_num
        tokens.extend([Token::Line, Token::Line]); // end
        tokens.extend([Token::Line, Token::Space, Token::Space]); // mark "0"
        tokens.extend([Token::Space, Token::Line]); // label bits "0"
        tokens.extend(push(9));
        tokens.extend([Token::Line, Token::Tab, Token::Line]); // return
        let program = Program::parse(&bytes_of(tokens)).unwrap();
        let mut machine = Machine::new(&program);
        let mut io = BufferIo::default();
        let halt = machine.run(&mut io, Some(100)).unwrap();
        assert_eq!(halt, Halt::Ended);
        assert_eq!(io.output, "9");
    }

    #[test]
    fn stack_cap_rejects_growth_past_the_ceiling() {
        let mut tokens = push(1);
        tokens.extend(push(2));
        tokens.extend(push(3));
        let program = Program::parse(&bytes_of(tokens)).unwrap();
        let mut machine = Machine::with_stack_cap(&program, 2);
        let mut io = BufferIo::default();
        assert_eq!(machine.run(&mut io, Some(100)), Err(WhitespaceError::StackOverflowCap));
        assert_eq!(machine.stack().len(), 2);
    }

    #[test]
    fn uncapped_machine_grows_past_what_a_cap_would_reject() {
        let mut tokens = push(1);
        tokens.extend(push(2));
        tokens.extend(push(3));
        let program = Program::parse(&bytes_of(tokens)).unwrap();
        let mut machine = Machine::new(&program);
        let mut io = BufferIo::default();
        machine.run(&mut io, Some(100)).unwrap();
        assert_eq!(machine.stack().len(), 3);
    }

    #[test]
    fn step_cap_halts_with_controlled_outcome() {
        let mut tokens = vec![Token::Line, Token::Space, Token::Space]; // mark "loop"
        tokens.extend([Token::Line]); // label ""
        tokens.extend([Token::Line, Token::Space, Token::Line]); // jump
        tokens.extend([Token::Line]); // label ""
        let program = Program::parse(&bytes_of(tokens)).unwrap();
        let mut machine = Machine::new(&program);
        let mut io = BufferIo::default();
        assert_eq!(machine.run(&mut io, Some(50)).unwrap(), Halt::StepCapExceeded);
    }
}
