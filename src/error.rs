//! Error types for the logical volume reconciler
//!
//! Every error is terminal for a run: nothing is retried and nothing is
//! rolled back. Command failures carry the exit code and captured output
//! of the command that triggered them so the caller can surface them.

use thiserror::Error;

/// Unified error type for the reconciler
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Size Errors
    // =========================================================================
    #[error("No valid size unit specified.")]
    InvalidSizeUnit { size: String },

    #[error("Invalid size: {size}")]
    InvalidSize { size: String },

    #[error("No size given.")]
    MissingSize { volume: String },

    // =========================================================================
    // Reconciliation Errors
    // =========================================================================
    #[error("Not enough free space in volume group {group}: {free} MB free.")]
    InsufficientSpace {
        group: String,
        requested: u64,
        free: u64,
    },

    #[error("Logical volume {volume} already exist in volume group {group}")]
    GroupMismatch { volume: String, group: String },

    #[error("No shrinking of Logical Volume {volume} permitted. Current size: {current} MB")]
    ShrinkNotPermitted {
        volume: String,
        current: u64,
        requested: u64,
    },

    // =========================================================================
    // External Command Errors
    // =========================================================================
    #[error("{message}")]
    ExternalCommand {
        message: String,
        rc: i32,
        stdout: String,
        stderr: String,
    },

    #[error("Failed to find required executable \"{name}\"")]
    BinaryNotFound { name: String },

    #[error("Incomplete {report} report for {name}: missing {field}")]
    IncompleteReport {
        report: &'static str,
        name: String,
        field: &'static str,
    },

    #[error("Invalid {report} report for {name}: {field} out of range")]
    InvalidReport {
        report: &'static str,
        name: String,
        field: &'static str,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Exit code and captured output of a failed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDiagnostics<'a> {
    pub rc: i32,
    pub stdout: &'a str,
    pub stderr: &'a str,
}

impl Error {
    /// Diagnostics of the command behind this error, if one was involved
    pub fn diagnostics(&self) -> Option<CommandDiagnostics<'_>> {
        match self {
            Error::ExternalCommand {
                rc, stdout, stderr, ..
            } => Some(CommandDiagnostics {
                rc: *rc,
                stdout,
                stderr,
            }),
            _ => None,
        }
    }
}

/// Result type alias for the reconciler
pub type Result<T> = std::result::Result<T, Error>;
