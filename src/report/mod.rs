//! Report composition and rendering.

pub mod assembler;
pub mod composer;
pub mod generator;

pub use generator::{generate_json_report, generate_markdown_report};
