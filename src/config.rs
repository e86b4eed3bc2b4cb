//! Configuration
//!
//! Reconciler settings and loading of desired-state documents.

use crate::domain::ports::DesiredState;
use crate::error::{Error, Result};
use crate::lvm::LvmBinaries;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for the reconciler
#[derive(Debug, Clone, Default)]
pub struct ReconcilerConfig {
    /// Display mutating commands through `echo` instead of running them
    pub dry_run: bool,
    /// Names of the management binaries
    pub binaries: LvmBinaries,
    /// Extra directory searched for the binaries
    pub bin_dir: Option<PathBuf>,
}

/// Load a desired state from a YAML document.
///
/// Accepts both the long field names (`group_name`, `volume_name`, ...) and
/// the short ones (`vg`, `lv`, `size`, `pvs`, `state`, ...).
pub fn load_desired_state(path: &Path) -> Result<DesiredState> {
    if !path.is_file() {
        return Err(Error::Configuration(format!(
            "desired state file not found: {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    let desired: DesiredState = serde_yaml::from_str(&content)?;
    desired.validate()?;
    debug!(path = %path.display(), ?desired, "loaded desired state");
    Ok(desired)
}

/// Split comma separated physical volume lists and drop empty entries
pub fn split_physical_volumes<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.as_ref().split(','))
        .map(str::trim)
        .filter(|pv| !pv.is_empty())
        .map(String::from)
        .collect()
}
