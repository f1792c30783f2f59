//! Control-flow resolution during decode.
//!
//! The stack of open blocks turns the relative depth carried by `br`, `br_if`
//! and `br_table` into the label of the block it names. Labels are handed out
//! in opening order and index the block arena, so a resolved target never
//! needs recomputing.

use super::instruction::BlockType;
use super::limits;
use crate::error::{CompileError, Result};
use std::fmt;

/// Identity of one block within a body. Also its index in the block arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub u32);

impl LabelId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Block,
    Loop,
    If,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BlockKind::Block => "block",
            BlockKind::Loop => "loop",
            BlockKind::If => "if",
        })
    }
}

/// A branch operand: the depth as encoded plus the block it resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchTarget {
    pub depth: u32,
    pub label: LabelId,
}

/// Entry on the open-block stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenBlock {
    pub label: LabelId,
    pub kind: BlockKind,
    pub has_else: bool,
}

/// Arena entry describing one block of the body, by instruction index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    pub kind: BlockKind,
    pub block_type: BlockType,
    pub start: usize,
    pub else_at: Option<usize>,
    /// Index of the matching `end`, once seen.
    pub end: Option<usize>,
}

#[derive(Debug, Default)]
pub struct ControlStack {
    open: Vec<OpenBlock>,
    blocks: Vec<BlockInfo>,
    depth: i64,
}

impl ControlStack {
    pub fn new() -> ControlStack {
        ControlStack::default()
    }

    /// Open a block at instruction `index`, assigning it the next label.
    pub fn open(&mut self, kind: BlockKind, block_type: BlockType, index: usize) -> Result<LabelId> {
        if self.open.len() >= limits::MAX_BLOCK_DEPTH {
            return Err(CompileError::malformed(format!(
                "blocks nested deeper than {}",
                limits::MAX_BLOCK_DEPTH
            )));
        }
        let label = LabelId(self.blocks.len() as u32);
        self.blocks.push(BlockInfo { kind, block_type, start: index, else_at: None, end: None });
        self.open.push(OpenBlock { label, kind, has_else: false });
        self.depth += 1;
        Ok(label)
    }

    /// Resolve a relative branch depth; 0 names the innermost open block.
    pub fn resolve(&self, depth: u32) -> Result<BranchTarget> {
        let open = self.open.len();
        if depth as usize >= open {
            return Err(CompileError::UnresolvedBranchTarget { depth, open });
        }
        let block = &self.open[open - 1 - depth as usize];
        Ok(BranchTarget { depth, label: block.label })
    }

    /// Attach an `else` at instruction `index` to the innermost block, which
    /// stays open.
    pub fn mark_else(&mut self, index: usize) -> Result<LabelId> {
        let Some(top) = self.open.last_mut() else {
            return Err(CompileError::UnresolvedBranchTarget { depth: 0, open: 0 });
        };
        if top.kind != BlockKind::If {
            return Err(CompileError::malformed(format!("else inside {} {}", top.kind, top.label)));
        }
        if top.has_else {
            return Err(CompileError::malformed(format!("second else for {}", top.label)));
        }
        top.has_else = true;
        self.blocks[top.label.index()].else_at = Some(index);
        Ok(top.label)
    }

    /// Close the innermost block with the `end` at instruction `index`.
    /// Returns `None` when nothing is open, meaning the end of the function.
    pub fn close(&mut self, index: usize) -> Option<LabelId> {
        self.depth -= 1;
        let block = self.open.pop()?;
        self.blocks[block.label.index()].end = Some(index);
        Some(block.label)
    }

    pub fn innermost(&self) -> Option<&OpenBlock> {
        self.open.last()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Opens minus ends so far. Negative only once the function's own end
    /// has been seen.
    pub fn depth(&self) -> i64 {
        self.depth
    }

    pub fn into_blocks(self) -> Vec<BlockInfo> {
        self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(stack: &mut ControlStack, kind: BlockKind) -> LabelId {
        let index = stack.blocks.len();
        stack.open(kind, BlockType::Empty, index).unwrap()
    }

    #[test]
    fn labels_are_assigned_in_opening_order() {
        let mut stack = ControlStack::new();
        assert_eq!(open(&mut stack, BlockKind::Block), LabelId(0));
        assert_eq!(open(&mut stack, BlockKind::Loop), LabelId(1));
        assert_eq!(stack.close(2), Some(LabelId(1)));
        assert_eq!(open(&mut stack, BlockKind::Block), LabelId(2));
        assert_eq!(stack.open_count(), 2);
    }

    #[test]
    fn resolve_counts_from_innermost() {
        let mut stack = ControlStack::new();
        let outer = open(&mut stack, BlockKind::Block);
        let inner = open(&mut stack, BlockKind::Loop);
        assert_eq!(stack.resolve(0).unwrap().label, inner);
        assert_eq!(stack.resolve(1).unwrap(), BranchTarget { depth: 1, label: outer });
        assert_eq!(stack.resolve(2), Err(CompileError::UnresolvedBranchTarget { depth: 2, open: 2 }));
    }

    #[test]
    fn resolve_on_empty_stack() {
        let stack = ControlStack::new();
        assert_eq!(stack.resolve(0), Err(CompileError::UnresolvedBranchTarget { depth: 0, open: 0 }));
    }

    #[test]
    fn close_records_end_and_tracks_depth() {
        let mut stack = ControlStack::new();
        let label = open(&mut stack, BlockKind::Block);
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.close(5), Some(label));
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.close(6), None);
        assert_eq!(stack.depth(), -1);
        let blocks = stack.into_blocks();
        assert_eq!(blocks[0].end, Some(5));
        assert_eq!(blocks[0].start, 0);
    }

    #[test]
    fn else_stays_on_top() {
        let mut stack = ControlStack::new();
        let label = open(&mut stack, BlockKind::If);
        assert_eq!(stack.mark_else(3), Ok(label));
        assert_eq!(stack.innermost().map(|b| b.has_else), Some(true));
        assert!(matches!(stack.mark_else(4), Err(CompileError::MalformedEncoding(_))));
        assert_eq!(stack.close(5), Some(label));
        assert_eq!(stack.into_blocks()[0].else_at, Some(3));
    }

    #[test]
    fn else_outside_if() {
        let mut stack = ControlStack::new();
        assert_eq!(stack.mark_else(0), Err(CompileError::UnresolvedBranchTarget { depth: 0, open: 0 }));
        open(&mut stack, BlockKind::Block);
        assert!(matches!(stack.mark_else(1), Err(CompileError::MalformedEncoding(_))));
    }

    #[test]
    fn nesting_limit() {
        let mut stack = ControlStack::new();
        for i in 0..limits::MAX_BLOCK_DEPTH {
            stack.open(BlockKind::Block, BlockType::Empty, i).unwrap();
        }
        let err = stack.open(BlockKind::Block, BlockType::Empty, limits::MAX_BLOCK_DEPTH);
        assert!(matches!(err, Err(CompileError::MalformedEncoding(_))));
    }
}
