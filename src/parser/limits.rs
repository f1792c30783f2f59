//! Implementation limits for function body decoding.
//!
//! Input that goes past any of these is rejected as malformed.

/// Maximum function body size in bytes
pub const MAX_FUNCTION_SIZE: u32 = 7_654_321;

/// Maximum number of labels in a br_table instruction
pub const MAX_BR_TABLE_LABELS: u32 = 65_536;

/// Maximum nesting of block, loop and if within one body
pub const MAX_BLOCK_DEPTH: usize = 10_000;
