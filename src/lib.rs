//! Decoding and lowering of WebAssembly MVP function bodies.
//!
//! lowasm reads the binary instruction stream of one function body, resolves
//! its structured control flow into labels, and lowers the result onto the
//! method builder of a label-based target VM.
//!
//! # Modules
//!
//! - [`parser`] -- Body decoder. Reads bytes into a [`parser::FunctionBody`].
//! - [`codegen`] -- Lowering onto a [`codegen::CodeBuilder`], plus a recording builder.
//! - [`error`] -- The error taxonomy shared by both stages.
//!
//! # Example
//!
//! Assemble a small loop, decode it, and lower it onto a recording builder:
//!
//! ```
//! use lowasm::codegen::{emit_function, Listing};
//! use lowasm::parser::{self, text};
//!
//! let bytes = text::assemble("
//!     loop
//!       get_local 0
//!       br_if 0
//!     end
//!     end
//! ").unwrap();
//!
//! let body = parser::decode(&bytes, 1).unwrap();
//! let mut listing = Listing::new();
//! emit_function(&body, &mut listing).unwrap();
//! assert_eq!(
//!     listing.to_string(),
//!     "label_0:\n    load param 0\n    ifne label_0\n    goto label_0\n    return\n"
//! );
//! ```

pub mod codegen;
pub mod error;
pub mod parser;

pub use error::{CompileError, Result};
