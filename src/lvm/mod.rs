//! AIX LVM Module
//!
//! Size conversion, report parsing and command construction for the AIX
//! logical volume manager binaries (`lsvg`, `lslv`, `mklv`, `rmlv`,
//! `extendlv`, `chlv`).

pub mod commands;
pub mod report;
pub mod runner;
pub mod size;

pub use commands::{CommandLine, LvmBinaries};
pub use report::{parse_logical_volume, parse_volume_group, LogicalVolumeReport, VolumeGroupReport};
pub use runner::SystemCommandRunner;
pub use size::{convert_size, round_to_allocation_unit, target_size};
