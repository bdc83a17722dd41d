//! cdbcheck CLI library.
//!
//! Command implementations and logging setup for the `cdbcheck` binary.

pub mod commands;
pub mod logging;
