//! Lowering of decoded bodies onto a target method builder.
//!
//! The target ISA needs every label created before a branch can name it, so
//! [`CodeBuilder`] separates creating a label from binding it to a position.
//! [`emit::emit_function`] walks a [`FunctionBody`](crate::parser::FunctionBody)
//! once and drives the builder.

pub mod emit;
pub mod listing;

pub use emit::emit_function;
pub use listing::{Listing, TargetOp};

use crate::parser::instruction::NumericOp;
use fhex::ToHex;
use std::fmt;

/// A literal pushed onto the target's operand stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constant {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::I32(v) => write!(f, "i32 {v}"),
            Constant::I64(v) => write!(f, "i64 {v}"),
            Constant::F32(v) => write!(f, "f32 {}", v.to_hex()),
            Constant::F64(v) => write!(f, "f64 {}", v.to_hex()),
        }
    }
}

/// Target primitives with a one-to-one source opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    EqualZero,
    Equal,
    NotEqual,
    LessThanSigned,
    LessThanUnsigned,
    GreaterThanSigned,
    GreaterThanUnsigned,
    Add,
    Subtract,
    Multiply,
    /// i32 to i64, sign extending
    ExtendSigned,
    /// i32 to i64, zero extending
    ExtendUnsigned,
}

impl Primitive {
    /// The primitive a numeric opcode lowers to, if it has one.
    pub fn for_op(op: NumericOp) -> Option<Primitive> {
        let primitive = match op {
            NumericOp::I32Eqz => Primitive::EqualZero,
            NumericOp::I32Eq => Primitive::Equal,
            NumericOp::I32Ne => Primitive::NotEqual,
            NumericOp::I32LtS => Primitive::LessThanSigned,
            NumericOp::I32LtU => Primitive::LessThanUnsigned,
            NumericOp::I32GtS => Primitive::GreaterThanSigned,
            NumericOp::I32GtU => Primitive::GreaterThanUnsigned,
            NumericOp::I32Add => Primitive::Add,
            NumericOp::I32Sub => Primitive::Subtract,
            NumericOp::I32Mul => Primitive::Multiply,
            NumericOp::I64ExtendI32S => Primitive::ExtendSigned,
            NumericOp::I64ExtendI32U => Primitive::ExtendUnsigned,
            _ => return None,
        };
        Some(primitive)
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::EqualZero => "eqz",
            Primitive::Equal => "eq",
            Primitive::NotEqual => "ne",
            Primitive::LessThanSigned => "lt_s",
            Primitive::LessThanUnsigned => "lt_u",
            Primitive::GreaterThanSigned => "gt_s",
            Primitive::GreaterThanUnsigned => "gt_u",
            Primitive::Add => "add",
            Primitive::Subtract => "sub",
            Primitive::Multiply => "mul",
            Primitive::ExtendSigned => "extend_s",
            Primitive::ExtendUnsigned => "extend_u",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The method builder of the target VM.
///
/// Slots are addressed separately for parameters and locals; the caller sizes
/// the local area from the function's declarations before emission starts.
pub trait CodeBuilder {
    type Label: Clone;

    /// Create a label that is not yet bound to a position.
    fn define_label(&mut self) -> Self::Label;

    /// Bind `label` to the current position.
    fn mark_label(&mut self, label: &Self::Label);

    /// Create a label bound to the current position.
    fn create_label(&mut self) -> Self::Label {
        let label = self.define_label();
        self.mark_label(&label);
        label
    }

    fn branch(&mut self, label: &Self::Label);

    /// Pop the top of the operand stack and branch if it is non-zero.
    fn branch_if_nonzero(&mut self, label: &Self::Label);

    fn emit_return(&mut self);
    fn emit_trap(&mut self);

    fn load_param(&mut self, index: u32);
    fn store_param(&mut self, index: u32);
    fn load_local(&mut self, index: u32);
    fn store_local(&mut self, index: u32);

    fn push_constant(&mut self, constant: Constant);
    fn primitive(&mut self, primitive: Primitive);
}
