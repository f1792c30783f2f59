//! Binary decoding of function bodies.
//!
//! [`reader::Reader`] supplies bytes and LEB128 integers, [`opcode::classify`]
//! picks the family for each opcode, [`instruction::decode`] reads the
//! immediates and [`body`] drives the loop while [`control`] resolves branch
//! depths to labels.

pub mod body;
pub mod control;
pub mod encoding;
pub mod instruction;
pub mod limits;
pub mod opcode;
pub mod reader;
pub mod text;

pub use body::{decode_body, decode_function_body, BodyKind, FunctionBody};

use crate::error::Result;

/// Decode a complete function body from its bytes.
pub fn decode(bytes: &[u8], param_count: u32) -> Result<FunctionBody> {
    let mut reader = reader::Reader::new(bytes.to_vec());
    decode_function_body(&mut reader, param_count)
}
