// src/commands/mod.rs
//! Command handlers for the rdiff2restic CLI

mod convert;
mod repair;

pub use convert::{cmd_convert, cmd_pending, ConvertOverrides};
pub use repair::cmd_repair;
