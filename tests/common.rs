//! Common test utilities shared between integration tests

use serde::Deserialize;
use std::fs;

/// A fixture file: a list of bodies with their expected decode and lowering.
#[derive(Deserialize, Debug)]
pub struct Fixture {
    pub cases: Vec<Case>,
}

#[derive(Deserialize, Debug)]
pub struct Case {
    pub name: String,
    /// Body as text listing lines, assembled before decoding.
    #[serde(default)]
    pub text: Vec<String>,
    /// Body as hex bytes; takes precedence over `text`.
    #[serde(default)]
    pub hex: Option<String>,
    #[serde(default)]
    pub params: u32,
    /// Expected instruction lines of the decoded body.
    #[serde(default)]
    pub decoded: Option<Vec<String>>,
    /// Expected lines of the lowered listing.
    #[serde(default)]
    pub lowered: Option<Vec<String>>,
    /// Expected error kind, with the stage that raises it.
    #[serde(default)]
    pub error: Option<ExpectedError>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Decode,
    Emit,
}

#[derive(Deserialize, Debug)]
pub struct ExpectedError {
    pub stage: Stage,
    pub kind: String,
}

impl Case {
    pub fn bytes(&self) -> Vec<u8> {
        match &self.hex {
            Some(digits) => hex::decode(digits).unwrap_or_else(|e| panic!("{}: bad hex: {e}", self.name)),
            None => lowasm::parser::text::assemble(&self.text.join("\n"))
                .unwrap_or_else(|e| panic!("{}: {e}", self.name)),
        }
    }
}

pub fn load_fixture(path: &str) -> Fixture {
    let json = fs::read_to_string(path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"));
    serde_json::from_str(&json).unwrap_or_else(|e| panic!("failed to parse {path}: {e}"))
}
