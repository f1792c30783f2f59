//! Assembler for a line-oriented text form of a function body.
//!
//! One instruction per line: the mnemonic, then its immediates separated by
//! whitespace. `;;` starts a comment, so the `Instruction` display form of a
//! decoded body (labels are shown as comments) assembles back unchanged.
//!
//! ```text
//! block i32      ;; optional value type, or type[N]
//!   get_local 0
//!   br_if 0
//!   i32.const -7
//! end
//! br_table 0 1 2 ;; the last depth is the default
//! i32.load 2 16  ;; align (log2) then offset
//! ```

use super::encoding;
use super::instruction::{MemoryOp, NumericOp, ParametricOp, VariableOp};
use super::opcode::{self, Family};
use fhex::FromHex;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssembleError {
    #[error("line {line}: unknown mnemonic '{mnemonic}'")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("line {line}: {message}")]
    InvalidOperand { line: usize, message: String },
}

const CONTROL_MNEMONICS: [(&str, u8); 13] = [
    ("unreachable", opcode::OP_UNREACHABLE),
    ("nop", opcode::OP_NOP),
    ("block", opcode::OP_BLOCK),
    ("loop", opcode::OP_LOOP),
    ("if", opcode::OP_IF),
    ("else", opcode::OP_ELSE),
    ("end", opcode::OP_END),
    ("br", opcode::OP_BR),
    ("br_if", opcode::OP_BR_IF),
    ("br_table", opcode::OP_BR_TABLE),
    ("return", opcode::OP_RETURN),
    ("call", opcode::OP_CALL),
    ("call_indirect", opcode::OP_CALL_INDIRECT),
];

const OTHER_MNEMONICS: [(&str, u8); 6] = [
    ("current_memory", opcode::OP_CURRENT_MEMORY),
    ("grow_memory", opcode::OP_GROW_MEMORY),
    ("i32.const", opcode::OP_I32_CONST),
    ("i64.const", opcode::OP_I64_CONST),
    ("f32.const", opcode::OP_F32_CONST),
    ("f64.const", opcode::OP_F64_CONST),
];

static OPCODES: Lazy<HashMap<&'static str, u8>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, u8> = CONTROL_MNEMONICS.into_iter().chain(OTHER_MNEMONICS).collect();
    map.extend(ParametricOp::ALL.iter().map(|op| (op.mnemonic(), op.opcode())));
    map.extend(VariableOp::ALL.iter().map(|op| (op.mnemonic(), op.opcode())));
    map.extend(MemoryOp::ALL.iter().map(|op| (op.mnemonic(), op.opcode())));
    map.extend(NumericOp::ALL.iter().map(|op| (op.mnemonic(), op.opcode())));
    map
});

/// Look up the opcode byte for a mnemonic.
pub fn opcode_for(mnemonic: &str) -> Option<u8> {
    OPCODES.get(mnemonic).copied()
}

struct Line<'a> {
    number: usize,
    mnemonic: &'a str,
    operands: Vec<&'a str>,
}

impl<'a> Line<'a> {
    fn error(&self, message: impl Into<String>) -> AssembleError {
        AssembleError::InvalidOperand { line: self.number, message: message.into() }
    }

    fn expect_operands(&self, min: usize, max: usize) -> Result<(), AssembleError> {
        let count = self.operands.len();
        if count < min || count > max {
            let wanted = if min == max { format!("{min}") } else { format!("{min} to {max}") };
            return Err(self.error(format!("{} takes {wanted} operand(s), got {count}", self.mnemonic)));
        }
        Ok(())
    }

    fn u32_at(&self, index: usize) -> Result<u32, AssembleError> {
        let text = self.operands[index];
        parse_unsigned(text)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| self.error(format!("'{text}' is not an unsigned 32-bit integer")))
    }
}

fn parse_unsigned(text: &str) -> Option<u64> {
    match text.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

// Accepts the signed range and, for hex input, the unsigned bit pattern.
fn parse_signed(text: &str, bits: u32) -> Option<i64> {
    let (negative, magnitude) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let value = parse_unsigned(magnitude)?;
    let min_magnitude = 1u64 << (bits - 1);
    if negative {
        return (value <= min_magnitude).then(|| (value as i64).wrapping_neg());
    }
    if value < min_magnitude {
        Some(value as i64)
    } else if magnitude.starts_with("0x") && (bits == 64 || value < 1u64 << bits) {
        // reinterpret as two's complement of the given width
        Some(((value << (64 - bits)) as i64) >> (64 - bits))
    } else {
        None
    }
}

// hex floats, `inf` and `nan[:0x...]` as printed by `ToHex`, else decimal
fn parse_f32(text: &str) -> Option<f32> {
    f32::from_hex(text).or_else(|| text.parse().ok())
}

fn parse_f64(text: &str) -> Option<f64> {
    f64::from_hex(text).or_else(|| text.parse().ok())
}

fn block_type(line: &Line, bytes: &mut Vec<u8>) -> Result<(), AssembleError> {
    line.expect_operands(0, 1)?;
    let value = match line.operands.first() {
        None => opcode::BLOCK_TYPE_EMPTY,
        Some(&"i32") => -0x01,
        Some(&"i64") => -0x02,
        Some(&"f32") => -0x03,
        Some(&"f64") => -0x04,
        Some(other) => {
            let index = other
                .strip_prefix("type[")
                .and_then(|rest| rest.strip_suffix(']'))
                .and_then(|idx| idx.parse::<u32>().ok())
                .ok_or_else(|| line.error(format!("invalid block type '{other}'")))?;
            index as i64
        }
    };
    encoding::write_vs33(bytes, value);
    Ok(())
}

fn operands(line: &Line, op: u8, bytes: &mut Vec<u8>) -> Result<(), AssembleError> {
    match op {
        opcode::OP_BLOCK | opcode::OP_LOOP | opcode::OP_IF => block_type(line, bytes)?,
        opcode::OP_BR | opcode::OP_BR_IF | opcode::OP_CALL => {
            line.expect_operands(1, 1)?;
            encoding::write_vu32(bytes, line.u32_at(0)?);
        }
        opcode::OP_CALL_INDIRECT => {
            line.expect_operands(1, 1)?;
            encoding::write_vu32(bytes, line.u32_at(0)?);
            bytes.push(0x00);
        }
        opcode::OP_BR_TABLE => {
            line.expect_operands(1, usize::MAX)?;
            let depths = (0..line.operands.len()).map(|i| line.u32_at(i)).collect::<Result<Vec<_>, _>>()?;
            let (default, targets) = depths.split_last().ok_or_else(|| line.error("br_table needs a default"))?;
            encoding::write_vu32_vec(bytes, targets);
            encoding::write_vu32(bytes, *default);
        }
        opcode::OP_CURRENT_MEMORY | opcode::OP_GROW_MEMORY => {
            line.expect_operands(0, 0)?;
            bytes.push(0x00);
        }
        opcode::OP_I32_CONST | opcode::OP_I64_CONST => {
            line.expect_operands(1, 1)?;
            let text = line.operands[0];
            if op == opcode::OP_I32_CONST {
                let value = parse_signed(text, 32).ok_or_else(|| line.error(format!("'{text}' is not an i32")))?;
                encoding::write_vs32(bytes, value as i32);
            } else {
                let value = parse_signed(text, 64).ok_or_else(|| line.error(format!("'{text}' is not an i64")))?;
                encoding::write_vs64(bytes, value);
            }
        }
        opcode::OP_F32_CONST => {
            line.expect_operands(1, 1)?;
            let text = line.operands[0];
            let value = parse_f32(text).ok_or_else(|| line.error(format!("'{text}' is not an f32")))?;
            encoding::write_f32(bytes, value);
        }
        opcode::OP_F64_CONST => {
            line.expect_operands(1, 1)?;
            let text = line.operands[0];
            let value = parse_f64(text).ok_or_else(|| line.error(format!("'{text}' is not an f64")))?;
            encoding::write_f64(bytes, value);
        }
        _ => match opcode::classify(op) {
            Ok(Family::Variable) => {
                line.expect_operands(1, 1)?;
                encoding::write_vu32(bytes, line.u32_at(0)?);
            }
            Ok(Family::Memory) => {
                line.expect_operands(2, 2)?;
                encoding::write_vu32(bytes, line.u32_at(0)?);
                encoding::write_vu32(bytes, line.u32_at(1)?);
            }
            _ => line.expect_operands(0, 0)?,
        },
    }
    Ok(())
}

/// Assemble a text listing into body bytes.
pub fn assemble(text: &str) -> Result<Vec<u8>, AssembleError> {
    let mut bytes = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let code = raw.split(";;").next().unwrap_or_default();
        let mut tokens = code.split_whitespace();
        let Some(mnemonic) = tokens.next() else {
            continue;
        };
        let line = Line { number: index + 1, mnemonic, operands: tokens.collect() };
        let op = opcode_for(mnemonic).ok_or_else(|| AssembleError::UnknownMnemonic {
            line: line.number,
            mnemonic: mnemonic.to_string(),
        })?;
        bytes.push(op);
        operands(&line, op, &mut bytes)?;
    }
    Ok(bytes)
}
