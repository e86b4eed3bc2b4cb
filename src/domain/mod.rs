//! Domain layer - Core types and port definitions
//!
//! This module defines the desired/observed state types and the command
//! runner trait that adapters implement.

pub mod ports;

pub use ports::*;
