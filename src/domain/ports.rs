//! Domain Ports - Core types and the command runner boundary
//!
//! The reconciliation logic only ever sees the types defined here. Running
//! the AIX management binaries is delegated to a [`CommandRunner`] so the
//! engine itself performs no I/O.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

// =============================================================================
// Policy and Presence
// =============================================================================

/// Inter-physical volume allocation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementPolicy {
    /// Spread partitions across as many physical volumes as possible
    #[default]
    Maximum,
    /// Keep partitions on as few physical volumes as possible
    Minimum,
}

impl PlacementPolicy {
    /// Letter passed to `mklv -e` / `chlv -e`
    pub fn flag(&self) -> &'static str {
        match self {
            PlacementPolicy::Maximum => "x",
            PlacementPolicy::Minimum => "m",
        }
    }
}

impl std::fmt::Display for PlacementPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacementPolicy::Maximum => write!(f, "maximum"),
            PlacementPolicy::Minimum => write!(f, "minimum"),
        }
    }
}

impl FromStr for PlacementPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "maximum" => Ok(PlacementPolicy::Maximum),
            "minimum" => Ok(PlacementPolicy::Minimum),
            other => Err(Error::Configuration(format!(
                "unknown placement policy: {}",
                other
            ))),
        }
    }
}

/// Whether the logical volume should exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    #[default]
    Present,
    Absent,
}

impl std::fmt::Display for Presence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Presence::Present => write!(f, "present"),
            Presence::Absent => write!(f, "absent"),
        }
    }
}

impl FromStr for Presence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "present" => Ok(Presence::Present),
            "absent" => Ok(Presence::Absent),
            other => Err(Error::Configuration(format!("unknown state: {}", other))),
        }
    }
}

// =============================================================================
// Desired State
// =============================================================================

/// Declared state of one logical volume, supplied once per run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesiredState {
    /// Volume group the logical volume belongs to
    #[serde(alias = "vg")]
    pub group_name: String,
    /// Logical volume name
    #[serde(alias = "lv")]
    pub volume_name: String,
    /// Logical volume type passed to `mklv -t`
    #[serde(default = "default_volume_type", alias = "lv_type")]
    pub volume_type: String,
    /// Size with an M/G/T suffix; required to create the volume
    #[serde(default)]
    pub size: Option<String>,
    /// Number of copies (1-3)
    #[serde(default = "default_copies")]
    pub copies: u8,
    /// Inter-physical volume allocation policy
    #[serde(default)]
    pub policy: PlacementPolicy,
    /// Free-form options forwarded to `mklv` untouched
    #[serde(default, alias = "opts")]
    pub extra_options: String,
    /// Physical volumes to allocate from, in order
    #[serde(default, alias = "pvs")]
    pub physical_volumes: Vec<String>,
    /// Whether the volume should exist
    #[serde(default, alias = "state")]
    pub presence: Presence,
}

fn default_volume_type() -> String {
    "jfs2".to_string()
}

fn default_copies() -> u8 {
    1
}

impl DesiredState {
    /// Desired state with every optional field at its default
    pub fn new(group_name: impl Into<String>, volume_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            volume_name: volume_name.into(),
            volume_type: default_volume_type(),
            size: None,
            copies: default_copies(),
            policy: PlacementPolicy::default(),
            extra_options: String::new(),
            physical_volumes: Vec::new(),
            presence: Presence::default(),
        }
    }

    /// Reject states no command could express
    pub fn validate(&self) -> Result<()> {
        if self.group_name.trim().is_empty() {
            return Err(Error::Configuration("volume group name is required".into()));
        }
        if self.volume_name.trim().is_empty() {
            return Err(Error::Configuration(
                "logical volume name is required".into(),
            ));
        }
        if !(1..=3).contains(&self.copies) {
            return Err(Error::Configuration(format!(
                "copies must be between 1 and 3, got {}",
                self.copies
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Observed Facts
// =============================================================================

/// Volume group facts parsed from an `lsvg` report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeGroupFacts {
    pub name: String,
    /// Parenthesized TOTAL PPs figure (megabytes)
    pub total_capacity: u64,
    /// Parenthesized FREE PPs figure (megabytes)
    pub free_capacity: u64,
    /// Physical partition size in megabytes, always > 0
    pub allocation_unit_size: u64,
}

/// Logical volume facts parsed from an `lslv` report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalVolumeFacts {
    pub name: String,
    pub group_name: String,
    /// Logical partitions times partition size, in megabytes
    pub size: u64,
    pub policy: PlacementPolicy,
}

// =============================================================================
// Action
// =============================================================================

/// The single corrective step chosen for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Nothing to do
    NoOp { reason: NoOpReason },
    /// Create the logical volume
    Create(VolumeLayout),
    /// Remove the logical volume
    Delete,
    /// Grow the logical volume; shrinking is never planned
    Resize {
        delta_megabytes: u64,
        target_megabytes: u64,
    },
    /// Switch the allocation policy
    ChangePolicy { policy: PlacementPolicy },
}

/// Everything `mklv` needs besides the group and volume names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeLayout {
    /// Size aligned to the group's partition size
    pub size_megabytes: u64,
    pub volume_type: String,
    pub copies: u8,
    pub policy: PlacementPolicy,
    /// Opaque options forwarded to `mklv`
    pub options: String,
    pub physical_volumes: Vec<String>,
}

/// Why nothing needs to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "why", rename_all = "snake_case")]
pub enum NoOpReason {
    AlreadyAbsent,
    AlreadyExists,
    SizeMatches { size_megabytes: u64 },
}

// =============================================================================
// Command Runner Port
// =============================================================================

/// Exit code and captured streams of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Port for executing management binaries
pub trait CommandRunner: Send + Sync {
    /// Locate a management binary, failing when it is not installed
    fn resolve(&self, name: &str) -> Result<PathBuf>;

    /// Run a program to completion and capture its output
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;
}

pub type CommandRunnerRef = Arc<dyn CommandRunner>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_display_and_flag() {
        assert_eq!(format!("{}", PlacementPolicy::Maximum), "maximum");
        assert_eq!(format!("{}", PlacementPolicy::Minimum), "minimum");
        assert_eq!(PlacementPolicy::Maximum.flag(), "x");
        assert_eq!(PlacementPolicy::Minimum.flag(), "m");
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("maximum".parse::<PlacementPolicy>().unwrap(), PlacementPolicy::Maximum);
        assert_eq!("Minimum".parse::<PlacementPolicy>().unwrap(), PlacementPolicy::Minimum);
        assert!("striped".parse::<PlacementPolicy>().is_err());
        assert_eq!("absent".parse::<Presence>().unwrap(), Presence::Absent);
        assert!("gone".parse::<Presence>().is_err());
    }

    #[test]
    fn test_desired_state_defaults() {
        let state: DesiredState = serde_yaml::from_str("vg: testvg\nlv: testlv\n").unwrap();
        assert_eq!(state, DesiredState::new("testvg", "testlv"));
        assert_eq!(state.volume_type, "jfs2");
        assert_eq!(state.copies, 1);
        assert_eq!(state.presence, Presence::Present);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_desired_state_validation() {
        let mut state = DesiredState::new("testvg", "testlv");
        state.copies = 4;
        assert!(state.validate().is_err());

        let state = DesiredState::new("", "testlv");
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_value(Action::ChangePolicy {
            policy: PlacementPolicy::Minimum,
        })
        .unwrap();
        assert_eq!(json["kind"], "change_policy");
        assert_eq!(json["policy"], "minimum");
    }
}
