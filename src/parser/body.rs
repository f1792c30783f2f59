//! Function body decoding.
//!
//! Drives the opcode loop over one body: read an opcode, classify it, decode
//! its immediates, append. Control flow is resolved on the way through, so the
//! finished body carries every branch target as a label.

use super::control::{BlockInfo, ControlStack, LabelId};
use super::instruction::encode::encode_instructions;
use super::instruction::{decode_instruction, ByteRange, ControlInstruction, Instruction, InstructionKind};
use super::limits;
use super::opcode;
use super::reader::Reader;
use crate::error::{CompileError, Result};
use std::fmt;
use tracing::{debug, trace};

/// How the end of a body is recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyKind {
    /// A whole function: ends with the `end` that closes no block, and nothing
    /// may follow it.
    #[default]
    Function,
    /// One arm of a split body: an `else` with no open block also ends it,
    /// leaving the reader at the start of the next segment.
    Segment,
}

/// A decoded body. Instructions are in input order and never change after
/// decode.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionBody {
    instructions: Vec<Instruction>,
    blocks: Vec<BlockInfo>,
    param_count: u32,
    else_terminated: bool,
}

impl FunctionBody {
    /// Replace the parameter count, usually once the signature is known.
    pub fn with_param_count(mut self, param_count: u32) -> FunctionBody {
        self.param_count = param_count;
        self
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn block(&self, label: LabelId) -> Option<&BlockInfo> {
        self.blocks.get(label.index())
    }

    pub fn blocks(&self) -> &[BlockInfo] {
        &self.blocks
    }

    pub fn param_count(&self) -> u32 {
        self.param_count
    }

    /// Whether decoding stopped at an `else` rather than a final `end`.
    pub fn else_terminated(&self) -> bool {
        self.else_terminated
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Re-encode the instructions.
    pub fn encode(&self) -> Vec<u8> {
        encode_instructions(&self.instructions)
    }
}

impl fmt::Display for FunctionBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nesting: usize = 0;
        for instruction in &self.instructions {
            let indent = match &instruction.kind {
                InstructionKind::Control(ControlInstruction::End { target: Some(_) }) => {
                    nesting = nesting.saturating_sub(1);
                    nesting
                }
                InstructionKind::Control(ControlInstruction::Else { .. }) => nesting.saturating_sub(1),
                _ => nesting,
            };
            writeln!(f, "{:>6}  {}{}", instruction.position.offset, "  ".repeat(indent), instruction)?;
            if let InstructionKind::Control(control) = &instruction.kind {
                if control.opens().is_some() {
                    nesting += 1;
                }
            }
        }
        Ok(())
    }
}

/// Decode one complete function body. The reader must hold exactly that body.
pub fn decode_function_body(reader: &mut Reader, param_count: u32) -> Result<FunctionBody> {
    decode_body(reader, BodyKind::Function, param_count)
}

pub fn decode_body(reader: &mut Reader, kind: BodyKind, param_count: u32) -> Result<FunctionBody> {
    let start = reader.pos();
    let mut control = ControlStack::new();
    let mut instructions: Vec<Instruction> = Vec::new();
    let mut else_terminated = false;

    loop {
        let offset = reader.pos();
        if offset - start > limits::MAX_FUNCTION_SIZE as usize {
            return Err(CompileError::malformed(format!(
                "function body exceeds {} bytes",
                limits::MAX_FUNCTION_SIZE
            )));
        }
        if !reader.has_at_least(1) {
            return Err(CompileError::malformed(format!(
                "function body ended with {} block(s) still open",
                control.open_count()
            )));
        }
        let byte = reader.read_byte()?;

        if byte == opcode::OP_ELSE && kind == BodyKind::Segment && control.is_empty() {
            else_terminated = true;
            break;
        }

        let index = instructions.len();
        let decoded = decode_instruction(byte, reader, &mut control, index)?;
        let instruction = Instruction { kind: decoded, position: ByteRange { offset, length: reader.pos() - offset } };
        trace!(index, offset, depth = control.depth(), "{instruction}");

        let terminal = matches!(instruction.kind, InstructionKind::Control(ControlInstruction::End { target: None }));
        instructions.push(instruction);
        if terminal {
            // the closing end of the function is the only one that takes the depth below zero
            debug_assert_eq!(control.depth(), -1);
            break;
        }
    }

    if kind == BodyKind::Function && reader.remaining() > 0 {
        return Err(CompileError::malformed(format!(
            "{} trailing byte(s) after end of function",
            reader.remaining()
        )));
    }

    let blocks = control.into_blocks();
    debug!(
        instructions = instructions.len(),
        labels = blocks.len(),
        param_count,
        else_terminated,
        "decoded function body"
    );

    Ok(FunctionBody { instructions, blocks, param_count, else_terminated })
}
