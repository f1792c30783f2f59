//! Single forward pass from decoded instructions to builder calls.

use super::{CodeBuilder, Constant, Primitive};
use crate::error::{CompileError, Result};
use crate::parser::control::{BlockKind, LabelId};
use crate::parser::instruction::{
    ControlInstruction, InstructionKind, NumericInstruction, VariableInstruction, VariableOp,
};
use crate::parser::FunctionBody;
use tracing::{debug, trace};

enum Slot {
    Param(u32),
    Local(u32),
}

struct Emitter<'a, B: CodeBuilder> {
    body: &'a FunctionBody,
    builder: &'a mut B,
    labels: Vec<Option<B::Label>>,
}

impl<'a, B: CodeBuilder> Emitter<'a, B> {
    fn label(&self, id: LabelId) -> Result<B::Label> {
        self.labels
            .get(id.index())
            .and_then(Option::clone)
            .ok_or_else(|| CompileError::malformed(format!("label {id} referenced before its block was opened")))
    }

    fn bind(&mut self, id: LabelId, label: B::Label) -> Result<()> {
        let slot = self
            .labels
            .get_mut(id.index())
            .ok_or_else(|| CompileError::malformed(format!("no block recorded for {id}")))?;
        *slot = Some(label);
        Ok(())
    }

    fn block_kind(&self, id: LabelId) -> Result<BlockKind> {
        self.body
            .block(id)
            .map(|info| info.kind)
            .ok_or_else(|| CompileError::malformed(format!("no block recorded for {id}")))
    }

    fn slot(&self, index: u32) -> Slot {
        let params = self.body.param_count();
        if index < params {
            Slot::Param(index)
        } else {
            Slot::Local(index - params)
        }
    }

    fn load(&mut self, index: u32) {
        match self.slot(index) {
            Slot::Param(i) => self.builder.load_param(i),
            Slot::Local(i) => self.builder.load_local(i),
        }
    }

    fn store(&mut self, index: u32) {
        match self.slot(index) {
            Slot::Param(i) => self.builder.store_param(i),
            Slot::Local(i) => self.builder.store_local(i),
        }
    }

    fn control(&mut self, instruction: &ControlInstruction) -> Result<()> {
        match instruction {
            ControlInstruction::Unreachable => self.builder.emit_trap(),
            ControlInstruction::Nop => {}
            ControlInstruction::Block { label, .. } => {
                // bound at the matching end, where forward branches land
                let target = self.builder.define_label();
                self.bind(*label, target)?;
            }
            ControlInstruction::Loop { label, .. } => {
                let target = self.builder.create_label();
                self.bind(*label, target)?;
            }
            ControlInstruction::End { target: Some(id) } => {
                let label = self.label(*id)?;
                match self.block_kind(*id)? {
                    BlockKind::Loop => self.builder.branch(&label),
                    BlockKind::Block => self.builder.mark_label(&label),
                    BlockKind::If => return Err(CompileError::unsupported("end of if")),
                }
            }
            ControlInstruction::End { target: None } | ControlInstruction::Return => self.builder.emit_return(),
            ControlInstruction::Br { target } => {
                let label = self.label(target.label)?;
                self.builder.branch(&label);
            }
            ControlInstruction::BrIf { target } => {
                let label = self.label(target.label)?;
                self.builder.branch_if_nonzero(&label);
            }
            ControlInstruction::If { .. }
            | ControlInstruction::Else { .. }
            | ControlInstruction::BrTable { .. }
            | ControlInstruction::Call { .. }
            | ControlInstruction::CallIndirect { .. } => {
                return Err(CompileError::unsupported(instruction.mnemonic()));
            }
        }
        Ok(())
    }

    fn variable(&mut self, instruction: &VariableInstruction) -> Result<()> {
        match instruction.op {
            VariableOp::GetLocal => self.load(instruction.index),
            VariableOp::SetLocal => self.store(instruction.index),
            VariableOp::TeeLocal => {
                self.store(instruction.index);
                self.load(instruction.index);
            }
            VariableOp::GetGlobal | VariableOp::SetGlobal => {
                return Err(CompileError::unsupported(instruction.op.mnemonic()));
            }
        }
        Ok(())
    }

    fn numeric(&mut self, instruction: &NumericInstruction) -> Result<()> {
        let constant = match *instruction {
            NumericInstruction::I32Const { value } => Constant::I32(value),
            NumericInstruction::I64Const { value } => Constant::I64(value),
            NumericInstruction::F32Const { value } => Constant::F32(value),
            NumericInstruction::F64Const { value } => Constant::F64(value),
            NumericInstruction::Op(op) => {
                let primitive = Primitive::for_op(op).ok_or_else(|| CompileError::unsupported(op.mnemonic()))?;
                self.builder.primitive(primitive);
                return Ok(());
            }
        };
        self.builder.push_constant(constant);
        Ok(())
    }

    fn instruction(&mut self, kind: &InstructionKind) -> Result<()> {
        match kind {
            InstructionKind::Control(control) => self.control(control),
            InstructionKind::Variable(variable) => self.variable(variable),
            InstructionKind::Numeric(numeric) => self.numeric(numeric),
            InstructionKind::Parametric(op) => Err(CompileError::unsupported(op.mnemonic())),
            InstructionKind::Memory(memory) => Err(CompileError::unsupported(memory.mnemonic())),
        }
    }
}

/// Lower `body` onto `builder`. Stops at the first instruction that has no
/// lowering; the builder is then left partially written and should be
/// discarded.
pub fn emit_function<B: CodeBuilder>(body: &FunctionBody, builder: &mut B) -> Result<()> {
    debug!(instructions = body.len(), param_count = body.param_count(), "emitting function body");
    let mut emitter = Emitter { body, builder, labels: vec![None; body.blocks().len()] };
    for (index, instruction) in body.instructions().iter().enumerate() {
        trace!(index, "lowering {instruction}");
        emitter.instruction(&instruction.kind)?;
    }
    Ok(())
}
