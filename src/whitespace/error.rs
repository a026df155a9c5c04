use std::fmt;

/// Fatal errors raised by the lexer, the two-pass parser, or the running
/// VM (§7). Unlike Piet, several Whitespace runtime conditions *are*
/// fatal — division by zero, heap bounds, undefined labels — matching the
/// reference implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhitespaceError {
    UnexpectedEof,
    UnknownInstruction,
    UndefinedLabel(Vec<bool>),
    DivisionByZero,
    HeapOutOfBounds(i64),
    StackOverflowCap,
}

impl fmt::Display for WhitespaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhitespaceError::UnexpectedEof => write!(f, "unexpected end of input while decoding a number or label"),
            WhitespaceError::UnknownInstruction => write!(f, "unrecognized IMP/opcode sequence"),
            WhitespaceError::UndefinedLabel(bits) => {
                write!(f, "jump/call to undefined label {}", bits_to_string(bits))
            }
            WhitespaceError::DivisionByZero => write!(f, "division or modulo by zero"),
            WhitespaceError::HeapOutOfBounds(addr) => write!(f, "heap address {addr} out of bounds"),
            WhitespaceError::StackOverflowCap => write!(f, "stack exceeded its configured ceiling"),
        }
    }
}

impl std::error::Error for WhitespaceError {}

fn bits_to_string(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Why a [`crate::whitespace::vm::Machine`] stopped running. `Ended` is a
/// normal, successful halt (the program ran `end`), not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    Ended,
    StepCapExceeded,
}
