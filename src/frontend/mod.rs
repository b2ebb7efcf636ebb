//! Frontend module - normalization, line splitting, extraction, parsing

pub mod expected;
pub mod extract;
pub mod lines;
pub mod method;
pub mod normalize;
pub mod parser;
