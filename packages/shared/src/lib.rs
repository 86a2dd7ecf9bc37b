//! Shared utilities for the Tsunagi chat client binaries.

pub mod logger;
pub mod time;
