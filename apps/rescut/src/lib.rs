//! # rescut application library
//!
//! CLI surface of the rescut binary, exposed as a library so the command
//! implementations are testable without spawning a process.

pub mod cli;
