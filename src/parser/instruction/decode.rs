//! Per-family instruction decoders.
//!
//! Each decoder reads the immediates for one opcode. Control opcodes also
//! drive the resolver so that branches come out already bound to a label.

use super::{
    BlockType, ControlInstruction, InstructionKind, MemArg, MemoryInstruction, MemoryOp, NumericInstruction, NumericOp,
    ParametricOp, ValueType, VariableInstruction, VariableOp,
};
use crate::error::{CompileError, Result};
use crate::parser::control::{BlockKind, ControlStack};
use crate::parser::opcode::{self, Family};
use crate::parser::reader::Reader;

impl BlockType {
    /// Block types are a signed 33-bit LEB128: small negatives name a value
    /// type, non-negative values a type index.
    pub fn decode(reader: &mut Reader) -> Result<BlockType> {
        let value = reader.read_vs33()?;
        match value {
            opcode::BLOCK_TYPE_EMPTY => Ok(BlockType::Empty),
            -0x01 => Ok(BlockType::Value(ValueType::I32)),
            -0x02 => Ok(BlockType::Value(ValueType::I64)),
            -0x03 => Ok(BlockType::Value(ValueType::F32)),
            -0x04 => Ok(BlockType::Value(ValueType::F64)),
            idx if idx >= 0 => Ok(BlockType::FuncType(idx as u32)),
            _ => Err(CompileError::malformed(format!("invalid block type {value}"))),
        }
    }
}

impl MemArg {
    pub fn decode(reader: &mut Reader) -> Result<MemArg> {
        let align = reader.read_vu32()?;
        let offset = reader.read_vu32()?;
        Ok(MemArg { align, offset })
    }
}

fn read_reserved_zero(reader: &mut Reader, what: &str) -> Result<()> {
    match reader.read_byte()? {
        0x00 => Ok(()),
        byte => Err(CompileError::malformed(format!("{what}: reserved byte must be zero, got {byte:#04x}"))),
    }
}

/// Decode the instruction introduced by `opcode`, which has already been
/// consumed. `index` is the position the instruction will take in the body.
pub fn decode_instruction(
    opcode: u8,
    reader: &mut Reader,
    control: &mut ControlStack,
    index: usize,
) -> Result<InstructionKind> {
    match opcode::classify(opcode)? {
        Family::Control => decode_control(opcode, reader, control, index).map(InstructionKind::Control),
        Family::Parametric => decode_parametric(opcode).map(InstructionKind::Parametric),
        Family::Variable => decode_variable(opcode, reader).map(InstructionKind::Variable),
        Family::Memory => decode_memory(opcode, reader).map(InstructionKind::Memory),
        Family::Numeric => decode_numeric(opcode, reader).map(InstructionKind::Numeric),
    }
}

pub fn decode_control(
    opcode: u8,
    reader: &mut Reader,
    control: &mut ControlStack,
    index: usize,
) -> Result<ControlInstruction> {
    let instruction = match opcode {
        opcode::OP_UNREACHABLE => ControlInstruction::Unreachable,
        opcode::OP_NOP => ControlInstruction::Nop,
        opcode::OP_BLOCK => {
            let block_type = BlockType::decode(reader)?;
            let label = control.open(BlockKind::Block, block_type, index)?;
            ControlInstruction::Block { block_type, label }
        }
        opcode::OP_LOOP => {
            let block_type = BlockType::decode(reader)?;
            let label = control.open(BlockKind::Loop, block_type, index)?;
            ControlInstruction::Loop { block_type, label }
        }
        opcode::OP_IF => {
            let block_type = BlockType::decode(reader)?;
            let label = control.open(BlockKind::If, block_type, index)?;
            ControlInstruction::If { block_type, label }
        }
        opcode::OP_ELSE => ControlInstruction::Else { target: control.mark_else(index)? },
        opcode::OP_END => ControlInstruction::End { target: control.close(index) },
        opcode::OP_BR => ControlInstruction::Br { target: control.resolve(reader.read_vu32()?)? },
        opcode::OP_BR_IF => ControlInstruction::BrIf { target: control.resolve(reader.read_vu32()?)? },
        opcode::OP_BR_TABLE => {
            let depths = reader.read_vu32_vec()?;
            let default_depth = reader.read_vu32()?;
            let targets = depths.into_iter().map(|depth| control.resolve(depth)).collect::<Result<Vec<_>>>()?;
            let default = control.resolve(default_depth)?;
            ControlInstruction::BrTable { targets, default }
        }
        opcode::OP_RETURN => ControlInstruction::Return,
        opcode::OP_CALL => ControlInstruction::Call { func_idx: reader.read_vu32()? },
        opcode::OP_CALL_INDIRECT => {
            let type_idx = reader.read_vu32()?;
            read_reserved_zero(reader, "call_indirect")?;
            ControlInstruction::CallIndirect { type_idx }
        }
        _ => return Err(CompileError::IllegalOpcode(opcode)),
    };
    Ok(instruction)
}

pub fn decode_parametric(opcode: u8) -> Result<ParametricOp> {
    ParametricOp::from_opcode(opcode).ok_or(CompileError::IllegalOpcode(opcode))
}

pub fn decode_variable(opcode: u8, reader: &mut Reader) -> Result<VariableInstruction> {
    let op = VariableOp::from_opcode(opcode).ok_or(CompileError::IllegalOpcode(opcode))?;
    let index = reader.read_vu32()?;
    Ok(VariableInstruction { op, index })
}

pub fn decode_memory(opcode: u8, reader: &mut Reader) -> Result<MemoryInstruction> {
    match opcode {
        opcode::OP_CURRENT_MEMORY => {
            read_reserved_zero(reader, "current_memory")?;
            Ok(MemoryInstruction::CurrentMemory)
        }
        opcode::OP_GROW_MEMORY => {
            read_reserved_zero(reader, "grow_memory")?;
            Ok(MemoryInstruction::GrowMemory)
        }
        _ => {
            let op = MemoryOp::from_opcode(opcode).ok_or(CompileError::IllegalOpcode(opcode))?;
            let memarg = MemArg::decode(reader)?;
            Ok(MemoryInstruction::Access { op, memarg })
        }
    }
}

pub fn decode_numeric(opcode: u8, reader: &mut Reader) -> Result<NumericInstruction> {
    let instruction = match opcode {
        opcode::OP_I32_CONST => NumericInstruction::I32Const { value: reader.read_vs32()? },
        opcode::OP_I64_CONST => NumericInstruction::I64Const { value: reader.read_vs64()? },
        opcode::OP_F32_CONST => NumericInstruction::F32Const { value: reader.read_f32()? },
        opcode::OP_F64_CONST => NumericInstruction::F64Const { value: reader.read_f64()? },
        _ => NumericInstruction::Op(NumericOp::from_opcode(opcode).ok_or(CompileError::IllegalOpcode(opcode))?),
    };
    Ok(instruction)
}
