//! # bindscope (library half of the binary)
//!
//! Exposes the CLI and its report types so they can be tested directly.

pub mod cli;
pub mod report;
