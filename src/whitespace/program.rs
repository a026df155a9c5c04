//! Instruction decoding (§4.7) and the two-pass label table (§4.8 pass 1).

use crate::whitespace::error::WhitespaceError;
use crate::whitespace::lexer::{tokenize, Lexer, Token};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Push(i64),
    Copy(i64),
    Slide(i64),
    Dup,
    Swap,
    Discard,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Store,
    Load,
    Mark(Vec<bool>),
    Call(Vec<bool>),
    Jump(Vec<bool>),
    Jz(Vec<bool>),
    Jn(Vec<bool>),
    Return,
    End,
    OutChar,
    OutNum,
    InChar,
    InNum,
}

/// Decodes exactly one instruction, including its parameter, advancing
/// `lexer` past it. This is the single decode path used by both passes —
/// pass 1 relies on it to skip non-`mark` parameters correctly (§4.8).
pub fn decode_instruction(lexer: &mut Lexer) -> Result<Instruction, WhitespaceError> {
    use Token::{Line, Space, Tab};
    use WhitespaceError::UnexpectedEof as Eof;
    use WhitespaceError::UnknownInstruction as Unk;

    match lexer.next_token().ok_or(Eof)? {
        Space => match lexer.next_token().ok_or(Eof)? {
            Space => Ok(Instruction::Push(lexer.read_number()?)),
            Tab => match lexer.next_token().ok_or(Eof)? {
                Space => Ok(Instruction::Copy(lexer.read_number()?)),
                Line => Ok(Instruction::Slide(lexer.read_number()?)),
                Tab => Err(Unk),
            },
            Line => match lexer.next_token().ok_or(Eof)? {
                Space => Ok(Instruction::Dup),
                Tab => Ok(Instruction::Swap),
                Line => Ok(Instruction::Discard),
            },
        },
        Tab => match lexer.next_token().ok_or(Eof)? {
            Space => match lexer.next_token().ok_or(Eof)? {
                Space => match lexer.next_token().ok_or(Eof)? {
                    Space => Ok(Instruction::Add),
                    Tab => Ok(Instruction::Sub),
                    Line => Ok(Instruction::Mul),
                },
                Tab => match lexer.next_token().ok_or(Eof)? {
                    Space => Ok(Instruction::Div),
                    Tab => Ok(Instruction::Mod),
                    Line => Err(Unk),
                },
                Line => Err(Unk),
            },
            Tab => match lexer.next_token().ok_or(Eof)? {
                Space => Ok(Instruction::Store),
                Tab => Ok(Instruction::Load),
                Line => Err(Unk),
            },
            Line => match lexer.next_token().ok_or(Eof)? {
                Space => match lexer.next_token().ok_or(Eof)? {
                    Space => Ok(Instruction::OutChar),
                    Tab => Ok(Instruction::OutNum),
                    Line => Err(Unk),
                },
                Tab => match lexer.next_token().ok_or(Eof)? {
                    Space => Ok(Instruction::InChar),
                    Tab => Ok(Instruction::InNum),
                    Line => Err(Unk),
                },
                Line => Err(Unk),
            },
        },
        Line => match lexer.next_token().ok_or(Eof)? {
            Space => match lexer.next_token().ok_or(Eof)? {
                Space => Ok(Instruction::Mark(lexer.read_label()?)),
                Tab => Ok(Instruction::Call(lexer.read_label()?)),
                Line => Ok(Instruction::Jump(lexer.read_label()?)),
            },
            Tab => match lexer.next_token().ok_or(Eof)? {
                Space => Ok(Instruction::Jz(lexer.read_label()?)),
                Tab => Ok(Instruction::Jn(lexer.read_label()?)),
                Line => Ok(Instruction::Return),
            },
            Line => match lexer.next_token().ok_or(Eof)? {
                Line => Ok(Instruction::End),
                _ => Err(Unk),
            },
        },
    }
}

/// A loaded Whitespace program: its token stream plus the label table
/// built by pass 1 (§4.8).
pub struct Program {
    tokens: Vec<Token>,
    labels: HashMap<Vec<bool>, usize>,
}

impl Program {
    pub fn parse(source: &[u8]) -> Result<Self, WhitespaceError> {
        let tokens = tokenize(source);
        let labels = collect_labels(&tokens)?;
        Ok(Program { tokens, labels })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn label(&self, bits: &[bool]) -> Option<usize> {
        self.labels.get(bits).copied()
    }

    /// Decodes the instruction at `pc`, returning it along with the pc of
    /// the instruction that follows.
    pub fn decode_at(&self, pc: usize) -> Result<(Instruction, usize), WhitespaceError> {
        let mut lexer = Lexer::at(&self.tokens, pc);
        let instruction = decode_instruction(&mut lexer)?;
        Ok((instruction, lexer.pos()))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Pass 1 (§4.8): walk every instruction — decoding, never skipping raw
/// bytes — so that parameters of non-`mark` instructions don't get
/// misread as instructions and produce phantom label matches. Later
/// definitions of the same label win.
fn collect_labels(tokens: &[Token]) -> Result<HashMap<Vec<bool>, usize>, WhitespaceError> {
    let mut labels = HashMap::new();
    let mut lexer = Lexer::new(tokens);
    while lexer.peek_token().is_some() {
        let instruction = decode_instruction(&mut lexer)?;
        if let Instruction::Mark(bits) = instruction {
            labels.insert(bits, lexer.pos());
        }
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::whitespace::lexer::encode_number;

    fn decode_all(tokens: &[Token]) -> Vec<Instruction> {
        let mut lexer = Lexer::new(tokens);
        let mut out = Vec::new();
        while lexer.peek_token().is_some() {
            out.push(decode_instruction(&mut lexer).unwrap());
        }
        out
    }

    fn label_tokens(bits: &[bool]) -> Vec<Token> {
        let mut tokens: Vec<Token> = bits.iter().map(|&b| if b { Token::Tab } else { Token::Space }).collect();
        tokens.push(Token::Line);
        tokens
    }

    #[test]
    fn decodes_push_pop_and_arithmetic() {
        let mut tokens = vec![Token::Space, Token::Space]; // push
        tokens.extend(encode_number(5));
        tokens.extend([Token::Tab, Token::Space, Token::Space]); // add
        tokens.extend([Token::Line, Token::Line]); // end
        let instructions = decode_all(&tokens);
        assert_eq!(instructions, vec![Instruction::Push(5), Instruction::Add, Instruction::End]);
    }

    #[test]
    fn decodes_mark_call_jump_with_label_bits() {
        let mut tokens = vec![Token::Line, Token::Space, Token::Space]; // mark
        tokens.extend(label_tokens(&[false]));
        tokens.extend([Token::Line, Token::Space, Token::Tab]); // call
        tokens.extend(label_tokens(&[true]));
        tokens.extend([Token::Line, Token::Space, Token::Line]); // jump
        tokens.extend(label_tokens(&[]));
        let instructions = decode_all(&tokens);
        assert_eq!(
            instructions,
            vec![Instruction::Mark(vec![false]), Instruction::Call(vec![true]), Instruction::Jump(vec![])]
        );
    }

    #[test]
    fn unknown_opcode_prefix_is_fatal() {
        // S then T then T: SLS=dup, SLT=swap, SLL=discard are the only
        // valid L-opcodes under stack IMP; S,T,T is not one of them.
        let tokens = vec![Token::Space, Token::Tab, Token::Tab];
        let mut lexer = Lexer::new(&tokens);
        assert_eq!(decode_instruction(&mut lexer), Err(WhitespaceError::UnknownInstruction));
    }

    #[test]
    fn pass1_skips_parameters_of_non_mark_instructions_correctly() {
        let mut tokens = vec![Token::Space, Token::Space]; // push
        tokens.extend(encode_number(3));
        tokens.extend([Token::Line, Token::Space, Token::Space]); // mark
        tokens.extend(label_tokens(&[true]));
        let program = Program::parse(&tokens_to_bytes(&tokens)).unwrap();
        assert_eq!(program.label(&[true]), Some(program.len()));
    }

    #[test]
    fn duplicate_label_definitions_last_one_wins() {
        let mut tokens = vec![Token::Line, Token::Space, Token::Space]; // mark ""
        tokens.extend(label_tokens(&[]));
        tokens.extend([Token::Space, Token::Space]); // push
        tokens.extend(encode_number(1));
        tokens.extend([Token::Line, Token::Space, Token::Space]); // mark "" again, later pc
        tokens.extend(label_tokens(&[]));
        let program = Program::parse(&tokens_to_bytes(&tokens)).unwrap();
        assert_eq!(program.label(&[]), Some(program.len()));
    }

    fn tokens_to_bytes(tokens: &[Token]) -> Vec<u8> {
        tokens
            .iter()
            .map(|t| match t {
                Token::Space => 0x20,
                Token::Tab => 0x09,
                Token::Line => 0x0A,
            })
            .collect()
    }
}
