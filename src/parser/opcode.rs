//! Opcode bytes and their grouping into instruction families.

use crate::error::{CompileError, Result};
use std::fmt;

// Control opcodes
pub const OP_UNREACHABLE: u8 = 0x00;
pub const OP_NOP: u8 = 0x01;
pub const OP_BLOCK: u8 = 0x02;
pub const OP_LOOP: u8 = 0x03;
pub const OP_IF: u8 = 0x04;
pub const OP_ELSE: u8 = 0x05;
pub const OP_END: u8 = 0x0B;
pub const OP_BR: u8 = 0x0C;
pub const OP_BR_IF: u8 = 0x0D;
pub const OP_BR_TABLE: u8 = 0x0E;
pub const OP_RETURN: u8 = 0x0F;
pub const OP_CALL: u8 = 0x10;
pub const OP_CALL_INDIRECT: u8 = 0x11;

// Memory opcodes without a memarg
pub const OP_CURRENT_MEMORY: u8 = 0x3F;
pub const OP_GROW_MEMORY: u8 = 0x40;

// Constants
pub const OP_I32_CONST: u8 = 0x41;
pub const OP_I64_CONST: u8 = 0x42;
pub const OP_F32_CONST: u8 = 0x43;
pub const OP_F64_CONST: u8 = 0x44;

// Block type: empty, as the single byte 0x40 (-64 as signed LEB128)
pub const BLOCK_TYPE_EMPTY: i64 = -0x40;

/// The five disjoint instruction families of the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Control,
    Parametric,
    Variable,
    Memory,
    Numeric,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::Control => "control",
            Family::Parametric => "parametric",
            Family::Variable => "variable",
            Family::Memory => "memory",
            Family::Numeric => "numeric",
        };
        write!(f, "{name}")
    }
}

/// Inclusive opcode range covered by each family, ordered by upper bound.
pub const FAMILY_RANGES: [(u8, u8, Family); 5] = [
    (0x00, 0x11, Family::Control),
    (0x1A, 0x1B, Family::Parametric),
    (0x20, 0x24, Family::Variable),
    (0x28, 0x40, Family::Memory),
    (0x41, 0xBF, Family::Numeric),
];

/// Map an opcode byte onto its family.
///
/// The first range whose upper bound reaches the byte decides; a byte below
/// that range's lower bound sits in a gap and is illegal, as is anything
/// above the last range.
pub fn classify(opcode: u8) -> Result<Family> {
    FAMILY_RANGES
        .iter()
        .find(|(_, upper, _)| *upper >= opcode)
        .filter(|(lower, _, _)| *lower <= opcode)
        .map(|(_, _, family)| *family)
        .ok_or(CompileError::IllegalOpcode(opcode))
}
