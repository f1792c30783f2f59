//! Instruction representation for decoded function bodies.
//!
//! An instruction is a closed variant over the five opcode families. Control
//! instructions carry the labels the resolver assigned at decode time, so
//! nothing downstream needs to track nesting again.

pub mod decode;
pub mod encode;
pub mod ops;

pub use decode::decode_instruction;
pub use ops::{MemoryOp, NumericOp, ParametricOp, VariableOp};

use super::control::{BlockKind, BranchTarget, LabelId};
use super::opcode::{self, Family};
use fhex::ToHex;
use std::fmt;

/// Number types of the MVP format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    I32,
    I64,
    F32,
    F64,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::F32 => "f32",
            ValueType::F64 => "f64",
        })
    }
}

/// Block type for structured control instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    /// Empty block type (no parameters or results)
    Empty,
    /// Single value type result
    Value(ValueType),
    /// Function type index for multi-value blocks
    FuncType(u32),
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockType::Empty => Ok(()),
            BlockType::Value(vt) => write!(f, " {vt}"),
            BlockType::FuncType(idx) => write!(f, " type[{idx}]"),
        }
    }
}

/// Memory argument for memory access instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemArg {
    /// Memory alignment (as power of 2)
    pub align: u32,
    /// Memory offset
    pub offset: u32,
}

/// Position information for an instruction in the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub offset: usize,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub position: ByteRange,
}

impl Instruction {
    pub fn family(&self) -> Family {
        self.kind.family()
    }

    pub fn opcode(&self) -> u8 {
        self.kind.opcode()
    }

    pub fn mnemonic(&self) -> &'static str {
        self.kind.mnemonic()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// One decoded instruction, tagged by family.
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionKind {
    Control(ControlInstruction),
    Parametric(ParametricOp),
    Variable(VariableInstruction),
    Memory(MemoryInstruction),
    Numeric(NumericInstruction),
}

impl InstructionKind {
    pub fn family(&self) -> Family {
        match self {
            InstructionKind::Control(_) => Family::Control,
            InstructionKind::Parametric(_) => Family::Parametric,
            InstructionKind::Variable(_) => Family::Variable,
            InstructionKind::Memory(_) => Family::Memory,
            InstructionKind::Numeric(_) => Family::Numeric,
        }
    }

    pub fn opcode(&self) -> u8 {
        match self {
            InstructionKind::Control(c) => c.opcode(),
            InstructionKind::Parametric(op) => op.opcode(),
            InstructionKind::Variable(v) => v.op.opcode(),
            InstructionKind::Memory(m) => m.opcode(),
            InstructionKind::Numeric(n) => n.opcode(),
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            InstructionKind::Control(c) => c.mnemonic(),
            InstructionKind::Parametric(op) => op.mnemonic(),
            InstructionKind::Variable(v) => v.op.mnemonic(),
            InstructionKind::Memory(m) => m.mnemonic(),
            InstructionKind::Numeric(n) => n.mnemonic(),
        }
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructionKind::Control(c) => write!(f, "{c}"),
            InstructionKind::Parametric(op) => write!(f, "{op}"),
            InstructionKind::Variable(v) => write!(f, "{v}"),
            InstructionKind::Memory(m) => write!(f, "{m}"),
            InstructionKind::Numeric(n) => write!(f, "{n}"),
        }
    }
}

/// Control instructions. Everything that names a block carries the label
/// resolved for it when the body was decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlInstruction {
    Unreachable,
    Nop,
    Block { block_type: BlockType, label: LabelId },
    Loop { block_type: BlockType, label: LabelId },
    If { block_type: BlockType, label: LabelId },
    Else { target: LabelId },
    /// `target` is `None` only for the end that closes the function itself.
    End { target: Option<LabelId> },
    Br { target: BranchTarget },
    BrIf { target: BranchTarget },
    BrTable { targets: Vec<BranchTarget>, default: BranchTarget },
    Return,
    Call { func_idx: u32 },
    CallIndirect { type_idx: u32 },
}

impl ControlInstruction {
    pub fn opcode(&self) -> u8 {
        match self {
            ControlInstruction::Unreachable => opcode::OP_UNREACHABLE,
            ControlInstruction::Nop => opcode::OP_NOP,
            ControlInstruction::Block { .. } => opcode::OP_BLOCK,
            ControlInstruction::Loop { .. } => opcode::OP_LOOP,
            ControlInstruction::If { .. } => opcode::OP_IF,
            ControlInstruction::Else { .. } => opcode::OP_ELSE,
            ControlInstruction::End { .. } => opcode::OP_END,
            ControlInstruction::Br { .. } => opcode::OP_BR,
            ControlInstruction::BrIf { .. } => opcode::OP_BR_IF,
            ControlInstruction::BrTable { .. } => opcode::OP_BR_TABLE,
            ControlInstruction::Return => opcode::OP_RETURN,
            ControlInstruction::Call { .. } => opcode::OP_CALL,
            ControlInstruction::CallIndirect { .. } => opcode::OP_CALL_INDIRECT,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            ControlInstruction::Unreachable => "unreachable",
            ControlInstruction::Nop => "nop",
            ControlInstruction::Block { .. } => "block",
            ControlInstruction::Loop { .. } => "loop",
            ControlInstruction::If { .. } => "if",
            ControlInstruction::Else { .. } => "else",
            ControlInstruction::End { .. } => "end",
            ControlInstruction::Br { .. } => "br",
            ControlInstruction::BrIf { .. } => "br_if",
            ControlInstruction::BrTable { .. } => "br_table",
            ControlInstruction::Return => "return",
            ControlInstruction::Call { .. } => "call",
            ControlInstruction::CallIndirect { .. } => "call_indirect",
        }
    }

    /// The kind of block this instruction opens, if any.
    pub fn opens(&self) -> Option<(BlockKind, LabelId)> {
        match self {
            ControlInstruction::Block { label, .. } => Some((BlockKind::Block, *label)),
            ControlInstruction::Loop { label, .. } => Some((BlockKind::Loop, *label)),
            ControlInstruction::If { label, .. } => Some((BlockKind::If, *label)),
            _ => None,
        }
    }
}

// Operands come first so the text form can be assembled back; resolved
// labels follow as a `;;` comment.
impl fmt::Display for ControlInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())?;
        match self {
            ControlInstruction::Block { block_type, label }
            | ControlInstruction::Loop { block_type, label }
            | ControlInstruction::If { block_type, label } => write!(f, "{block_type} ;; {label}"),
            ControlInstruction::Else { target } => write!(f, " ;; {target}"),
            ControlInstruction::End { target: Some(target) } => write!(f, " ;; {target}"),
            ControlInstruction::Br { target } | ControlInstruction::BrIf { target } => {
                write!(f, " {} ;; {}", target.depth, target.label)
            }
            ControlInstruction::BrTable { targets, default } => {
                for target in targets {
                    write!(f, " {}", target.depth)?;
                }
                write!(f, " {} ;;", default.depth)?;
                for target in targets {
                    write!(f, " {}", target.label)?;
                }
                write!(f, " {}", default.label)
            }
            ControlInstruction::Call { func_idx } => write!(f, " {func_idx}"),
            ControlInstruction::CallIndirect { type_idx } => write!(f, " {type_idx}"),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableInstruction {
    pub op: VariableOp,
    pub index: u32,
}

impl fmt::Display for VariableInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryInstruction {
    Access { op: MemoryOp, memarg: MemArg },
    CurrentMemory,
    GrowMemory,
}

impl MemoryInstruction {
    pub fn opcode(&self) -> u8 {
        match self {
            MemoryInstruction::Access { op, .. } => op.opcode(),
            MemoryInstruction::CurrentMemory => opcode::OP_CURRENT_MEMORY,
            MemoryInstruction::GrowMemory => opcode::OP_GROW_MEMORY,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            MemoryInstruction::Access { op, .. } => op.mnemonic(),
            MemoryInstruction::CurrentMemory => "current_memory",
            MemoryInstruction::GrowMemory => "grow_memory",
        }
    }
}

impl fmt::Display for MemoryInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // align is shown as its log2 exponent, as encoded
            MemoryInstruction::Access { op, memarg } => write!(f, "{op} {} {}", memarg.align, memarg.offset),
            _ => f.write_str(self.mnemonic()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericInstruction {
    I32Const { value: i32 },
    I64Const { value: i64 },
    F32Const { value: f32 },
    F64Const { value: f64 },
    Op(NumericOp),
}

impl NumericInstruction {
    pub fn opcode(&self) -> u8 {
        match self {
            NumericInstruction::I32Const { .. } => opcode::OP_I32_CONST,
            NumericInstruction::I64Const { .. } => opcode::OP_I64_CONST,
            NumericInstruction::F32Const { .. } => opcode::OP_F32_CONST,
            NumericInstruction::F64Const { .. } => opcode::OP_F64_CONST,
            NumericInstruction::Op(op) => op.opcode(),
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            NumericInstruction::I32Const { .. } => "i32.const",
            NumericInstruction::I64Const { .. } => "i64.const",
            NumericInstruction::F32Const { .. } => "f32.const",
            NumericInstruction::F64Const { .. } => "f64.const",
            NumericInstruction::Op(op) => op.mnemonic(),
        }
    }
}

impl fmt::Display for NumericInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())?;
        match self {
            NumericInstruction::I32Const { value } => write!(f, " {value}"),
            NumericInstruction::I64Const { value } => write!(f, " {value}"),
            NumericInstruction::F32Const { value } => write!(f, " {}", value.to_hex()),
            NumericInstruction::F64Const { value } => write!(f, " {}", value.to_hex()),
            NumericInstruction::Op(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(depth: u32, label: u32) -> BranchTarget {
        BranchTarget { depth, label: LabelId(label) }
    }

    #[test]
    fn control_display() {
        let block = ControlInstruction::Block { block_type: BlockType::Empty, label: LabelId(0) };
        assert_eq!(block.to_string(), "block ;; L0");
        let lp = ControlInstruction::Loop { block_type: BlockType::Value(ValueType::I64), label: LabelId(3) };
        assert_eq!(lp.to_string(), "loop i64 ;; L3");
        assert_eq!(ControlInstruction::End { target: None }.to_string(), "end");
        assert_eq!(ControlInstruction::End { target: Some(LabelId(2)) }.to_string(), "end ;; L2");
        assert_eq!(ControlInstruction::BrIf { target: target(1, 0) }.to_string(), "br_if 1 ;; L0");
        let table = ControlInstruction::BrTable { targets: vec![target(0, 1), target(1, 0)], default: target(1, 0) };
        assert_eq!(table.to_string(), "br_table 0 1 1 ;; L1 L0 L0");
    }

    #[test]
    fn other_family_display() {
        let var = InstructionKind::Variable(VariableInstruction { op: VariableOp::SetLocal, index: 4 });
        assert_eq!(var.to_string(), "set_local 4");
        let mem = InstructionKind::Memory(MemoryInstruction::Access {
            op: MemoryOp::I32Load,
            memarg: MemArg { align: 2, offset: 16 },
        });
        assert_eq!(mem.to_string(), "i32.load 2 16");
        assert_eq!(InstructionKind::Memory(MemoryInstruction::GrowMemory).to_string(), "grow_memory");
        assert_eq!(InstructionKind::Numeric(NumericInstruction::I32Const { value: -5 }).to_string(), "i32.const -5");
        assert_eq!(InstructionKind::Parametric(ParametricOp::Select).to_string(), "select");
    }

    #[test]
    fn family_and_opcode() {
        let kind = InstructionKind::Numeric(NumericInstruction::Op(NumericOp::I32Add));
        assert_eq!(kind.family(), Family::Numeric);
        assert_eq!(kind.opcode(), 0x6A);
        let kind = InstructionKind::Control(ControlInstruction::CallIndirect { type_idx: 0 });
        assert_eq!(kind.family(), Family::Control);
        assert_eq!(kind.opcode(), 0x11);
        assert_eq!(kind.mnemonic(), "call_indirect");
    }
}
