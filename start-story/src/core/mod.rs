//! Deterministic, pure logic for the story workflow.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data and return `Result`s; nothing here exits the process.

pub mod branch_name;
pub mod eligibility;
pub mod identifier;
pub mod types;
