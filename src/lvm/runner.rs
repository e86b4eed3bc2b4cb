//! System Command Runner
//!
//! Runs the AIX LVM binaries with `std::process::Command`, locating them
//! on `PATH` (or an extra directory) with the `which` crate.

use crate::domain::ports::{CommandOutput, CommandRunner};
use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// [`CommandRunner`] backed by real processes
#[derive(Debug, Clone, Default)]
pub struct SystemCommandRunner {
    /// Directory searched before `PATH`
    bin_dir: Option<PathBuf>,
}

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also look for binaries in `dir` (searched first)
    pub fn with_bin_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: Some(dir.into()),
        }
    }

    fn search_path(&self) -> Option<OsString> {
        let dir = self.bin_dir.as_ref()?;
        let mut paths = vec![dir.clone()];
        if let Some(path) = std::env::var_os("PATH") {
            paths.extend(std::env::split_paths(&path));
        }
        std::env::join_paths(paths).ok()
    }
}

impl CommandRunner for SystemCommandRunner {
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        let found = match self.search_path() {
            Some(paths) => {
                let cwd = std::env::current_dir()?;
                which::which_in(name, Some(paths), cwd)
            }
            None => which::which(name),
        };

        found.map_err(|_| Error::BinaryNotFound {
            name: name.to_string(),
        })
    }

    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        debug!(program, ?args, "running command");

        let output = Command::new(program).args(args).output()?;

        Ok(CommandOutput {
            // killed by a signal
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
