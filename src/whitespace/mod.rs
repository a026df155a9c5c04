//! The Whitespace interpreter: a two-pass bitstring decoder feeding a
//! stack/heap/call-stack dispatcher (§2 items 8-10).

pub mod error;
pub mod lexer;
pub mod program;
pub mod vm;

pub use error::{Halt, WhitespaceError};
pub use program::Program;
pub use vm::{Machine, StepOutcome, DEFAULT_STACK_CAP, HEAP_SIZE};

/// Parses `source` into a [`Program`] — the common entry point for a CLI
/// frontend (§6).
pub fn load(source: &[u8]) -> Result<Program, WhitespaceError> {
    Program::parse(source)
}
