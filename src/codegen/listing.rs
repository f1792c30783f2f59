//! A [`CodeBuilder`] that records target operations as a listing.

use super::{CodeBuilder, Constant, Primitive};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListingLabel(pub u32);

impl fmt::Display for ListingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "label_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetOp {
    /// Binds a label to this position; occupies no code.
    Mark(ListingLabel),
    Branch(ListingLabel),
    BranchIfNonZero(ListingLabel),
    Return,
    Trap,
    LoadParam(u32),
    StoreParam(u32),
    LoadLocal(u32),
    StoreLocal(u32),
    Push(Constant),
    Primitive(Primitive),
}

impl fmt::Display for TargetOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetOp::Mark(label) => write!(f, "{label}:"),
            TargetOp::Branch(label) => write!(f, "    goto {label}"),
            TargetOp::BranchIfNonZero(label) => write!(f, "    ifne {label}"),
            TargetOp::Return => write!(f, "    return"),
            TargetOp::Trap => write!(f, "    trap"),
            TargetOp::LoadParam(i) => write!(f, "    load param {i}"),
            TargetOp::StoreParam(i) => write!(f, "    store param {i}"),
            TargetOp::LoadLocal(i) => write!(f, "    load local {i}"),
            TargetOp::StoreLocal(i) => write!(f, "    store local {i}"),
            TargetOp::Push(constant) => write!(f, "    push {constant}"),
            TargetOp::Primitive(primitive) => write!(f, "    {primitive}"),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Listing {
    ops: Vec<TargetOp>,
    labels: u32,
}

impl Listing {
    pub fn new() -> Listing {
        Listing::default()
    }

    pub fn ops(&self) -> &[TargetOp] {
        &self.ops
    }

    /// Number of labels created so far.
    pub fn label_count(&self) -> u32 {
        self.labels
    }

    /// Labels that were created but never bound to a position.
    pub fn unbound_labels(&self) -> Vec<ListingLabel> {
        (0..self.labels)
            .map(ListingLabel)
            .filter(|label| !self.ops.contains(&TargetOp::Mark(*label)))
            .collect()
    }

    /// One line per operation, as printed by `Display`.
    pub fn lines(&self) -> Vec<String> {
        self.ops.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.ops {
            writeln!(f, "{op}")?;
        }
        Ok(())
    }
}

impl CodeBuilder for Listing {
    type Label = ListingLabel;

    fn define_label(&mut self) -> ListingLabel {
        let label = ListingLabel(self.labels);
        self.labels += 1;
        label
    }

    fn mark_label(&mut self, label: &ListingLabel) {
        self.ops.push(TargetOp::Mark(*label));
    }

    fn branch(&mut self, label: &ListingLabel) {
        self.ops.push(TargetOp::Branch(*label));
    }

    fn branch_if_nonzero(&mut self, label: &ListingLabel) {
        self.ops.push(TargetOp::BranchIfNonZero(*label));
    }

    fn emit_return(&mut self) {
        self.ops.push(TargetOp::Return);
    }

    fn emit_trap(&mut self) {
        self.ops.push(TargetOp::Trap);
    }

    fn load_param(&mut self, index: u32) {
        self.ops.push(TargetOp::LoadParam(index));
    }

    fn store_param(&mut self, index: u32) {
        self.ops.push(TargetOp::StoreParam(index));
    }

    fn load_local(&mut self, index: u32) {
        self.ops.push(TargetOp::LoadLocal(index));
    }

    fn store_local(&mut self, index: u32) {
        self.ops.push(TargetOp::StoreLocal(index));
    }

    fn push_constant(&mut self, constant: Constant) {
        self.ops.push(TargetOp::Push(constant));
    }

    fn primitive(&mut self, primitive: Primitive) {
        self.ops.push(TargetOp::Primitive(primitive));
    }
}
