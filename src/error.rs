//! Errors raised while decoding or lowering a function body.
//!
//! Every variant is fatal to the body being processed. Callers (typically a
//! module loader) decide whether to abort the module or skip the function.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Corrupt input: a LEB128 integer that never terminates within its
    /// width, a non-zero reserved byte, truncated input and the like.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    #[error("illegal opcode {0:#04x}")]
    IllegalOpcode(u8),

    /// A branch, `else`, or `end` reached past the outermost open block.
    #[error("unresolved branch target: depth {depth} with {open} open block(s)")]
    UnresolvedBranchTarget { depth: u32, open: usize },

    /// Decoded fine, but there is no lowering for it.
    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),
}

impl CompileError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        CompileError::MalformedEncoding(message.into())
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        CompileError::UnsupportedConstruct(message.into())
    }

    /// Short, stable name for the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::MalformedEncoding(_) => "malformed_encoding",
            CompileError::IllegalOpcode(_) => "illegal_opcode",
            CompileError::UnresolvedBranchTarget { .. } => "unresolved_branch_target",
            CompileError::UnsupportedConstruct(_) => "unsupported_construct",
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(CompileError::IllegalOpcode(0x12).to_string(), "illegal opcode 0x12");
        assert_eq!(
            CompileError::UnresolvedBranchTarget { depth: 3, open: 1 }.to_string(),
            "unresolved branch target: depth 3 with 1 open block(s)"
        );
        assert_eq!(
            CompileError::malformed("integer too large").to_string(),
            "malformed encoding: integer too large"
        );
    }

    #[test]
    fn error_kind() {
        assert_eq!(CompileError::unsupported("call").kind(), "unsupported_construct");
        assert_eq!(CompileError::IllegalOpcode(0xff).kind(), "illegal_opcode");
    }
}
