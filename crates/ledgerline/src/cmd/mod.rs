//! Command implementations for CLI tools.
//!
//! Each module contains the full implementation for a command,
//! which can be invoked by a thin wrapper binary.

pub mod report_cmd;
