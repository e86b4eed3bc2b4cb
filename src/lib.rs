//! Logical Volume Reconciler
//!
//! Brings one AIX logical volume to a declared state (present with a given
//! size, copies and allocation policy, or absent) by reading `lsvg`/`lslv`
//! reports and issuing at most one LVM command per run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                               Reconciler                                    │
//! │        read reports ──► plan one action ──► issue one command               │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────────┐  │
//! │  │  Report Parser  │  │ Size Converter  │  │   Reconciliation Engine     │  │
//! │  │  (lsvg / lslv)  │  │  (M/G/T → PPs)  │  │ (create/delete/extend/chlv) │  │
//! │  └────────┬────────┘  └────────┬────────┘  └─────────────┬───────────────┘  │
//! │           │                    │                         │                  │
//! │           └────────────────────┼─────────────────────────┘                  │
//! │                                │                                            │
//! │                    ┌───────────┴───────────┐                                │
//! │                    │    Command Runner     │                                │
//! │                    │  (AIX LVM binaries)   │                                │
//! │                    └───────────────────────┘                                │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`reconcile`]: Reconciliation engine and the run driver
//! - [`lvm`]: Size conversion, report parsing and LVM command lines
//! - [`domain`]: Core domain types and the command runner port
//! - [`config`]: Reconciler configuration and desired-state loading
//! - [`error`]: Error types and handling

pub mod config;
pub mod domain;
pub mod error;
pub mod lvm;
pub mod reconcile;

// Re-export commonly used types
pub use config::{load_desired_state, ReconcilerConfig};

pub use domain::ports::{
    Action, CommandOutput, CommandRunner, CommandRunnerRef, DesiredState, LogicalVolumeFacts,
    NoOpReason, PlacementPolicy, Presence, VolumeGroupFacts, VolumeLayout,
};

pub use error::{CommandDiagnostics, Error, Result};

pub use lvm::{
    convert_size, parse_logical_volume, parse_volume_group, round_to_allocation_unit,
    LvmBinaries, SystemCommandRunner,
};

pub use reconcile::{plan, Reconciler, RunOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
