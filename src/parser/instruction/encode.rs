//! Instruction encoding to binary format

use super::{BlockType, ControlInstruction, Instruction, InstructionKind, MemoryInstruction, NumericInstruction, ValueType};
use crate::parser::encoding;
use crate::parser::opcode;

impl InstructionKind {
    /// Encode this instruction to bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = vec![self.opcode()];

        match self {
            InstructionKind::Control(control) => encode_control(&mut bytes, control),
            InstructionKind::Parametric(_) => {}
            InstructionKind::Variable(var) => encoding::write_vu32(&mut bytes, var.index),
            InstructionKind::Memory(MemoryInstruction::Access { memarg, .. }) => {
                encoding::write_vu32(&mut bytes, memarg.align);
                encoding::write_vu32(&mut bytes, memarg.offset);
            }
            // reserved memory index
            InstructionKind::Memory(_) => bytes.push(0x00),
            InstructionKind::Numeric(numeric) => match numeric {
                NumericInstruction::I32Const { value } => encoding::write_vs32(&mut bytes, *value),
                NumericInstruction::I64Const { value } => encoding::write_vs64(&mut bytes, *value),
                NumericInstruction::F32Const { value } => encoding::write_f32(&mut bytes, *value),
                NumericInstruction::F64Const { value } => encoding::write_f64(&mut bytes, *value),
                NumericInstruction::Op(_) => {}
            },
        }

        bytes
    }
}

fn encode_control(bytes: &mut Vec<u8>, control: &ControlInstruction) {
    match control {
        ControlInstruction::Block { block_type, .. }
        | ControlInstruction::Loop { block_type, .. }
        | ControlInstruction::If { block_type, .. } => encode_block_type(bytes, block_type),
        ControlInstruction::Br { target } | ControlInstruction::BrIf { target } => {
            encoding::write_vu32(bytes, target.depth);
        }
        ControlInstruction::BrTable { targets, default } => {
            let depths: Vec<u32> = targets.iter().map(|t| t.depth).collect();
            encoding::write_vu32_vec(bytes, &depths);
            encoding::write_vu32(bytes, default.depth);
        }
        ControlInstruction::Call { func_idx } => encoding::write_vu32(bytes, *func_idx),
        ControlInstruction::CallIndirect { type_idx } => {
            encoding::write_vu32(bytes, *type_idx);
            bytes.push(0x00);
        }
        _ => {}
    }
}

fn encode_block_type(bytes: &mut Vec<u8>, block_type: &BlockType) {
    let value = match block_type {
        BlockType::Empty => opcode::BLOCK_TYPE_EMPTY,
        BlockType::Value(ValueType::I32) => -0x01,
        BlockType::Value(ValueType::I64) => -0x02,
        BlockType::Value(ValueType::F32) => -0x03,
        BlockType::Value(ValueType::F64) => -0x04,
        BlockType::FuncType(idx) => *idx as i64,
    };
    encoding::write_vs33(bytes, value);
}

/// Encode a sequence of instructions back into a body's byte stream.
pub fn encode_instructions(instructions: &[Instruction]) -> Vec<u8> {
    instructions.iter().flat_map(|i| i.kind.encode()).collect()
}
