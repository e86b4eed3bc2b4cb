//! Reconciler
//!
//! Drives one run end to end: read the volume group and logical volume
//! reports, plan a single action, issue at most one mutating command and
//! describe what happened.
//!
//! Reports are read fresh on every run. Nothing is cached and nothing is
//! locked, so concurrent runs against the same volume must be serialized
//! by the caller.

pub mod engine;

pub use engine::plan;

use crate::config::ReconcilerConfig;
use crate::domain::ports::{
    Action, CommandOutput, CommandRunnerRef, DesiredState, LogicalVolumeFacts, NoOpReason,
    Presence, VolumeGroupFacts,
};
use crate::error::{Error, Result};
use crate::lvm::commands::{self, CommandLine};
use crate::lvm::report::{parse_logical_volume, parse_volume_group};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

// =============================================================================
// Run Outcome
// =============================================================================

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub changed: bool,
    pub msg: String,
    /// Planned action; `None` when the volume group itself is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
}

impl RunOutcome {
    fn unchanged(msg: String, action: Option<Action>) -> Self {
        Self {
            changed: false,
            msg,
            action,
        }
    }
}

// =============================================================================
// Reconciler
// =============================================================================

/// Reconciles one logical volume per call to [`Reconciler::run`]
pub struct Reconciler {
    config: ReconcilerConfig,
    runner: CommandRunnerRef,
}

impl Reconciler {
    pub fn new(config: ReconcilerConfig, runner: CommandRunnerRef) -> Self {
        Self { config, runner }
    }

    /// Bring the logical volume to `desired`
    pub fn run(&self, desired: &DesiredState) -> Result<RunOutcome> {
        desired.validate()?;
        let volume_name = desired.volume_name.as_str();

        let lsvg = self.runner.resolve(&self.config.binaries.lsvg)?;
        let lslv = self.runner.resolve(&self.config.binaries.lslv)?;

        let Some(group) = self.read_group(&lsvg, desired)? else {
            return Ok(RunOutcome::unchanged(
                format!("Volume group {} does not exist.", desired.group_name),
                None,
            ));
        };

        let observed = self.read_volume(&lslv, volume_name)?;

        let action = plan(desired, &group, observed.as_ref())?;
        info!(
            volume = volume_name,
            group = %group.name,
            ?action,
            "planned action"
        );

        match &action {
            Action::NoOp { reason } => {
                let msg = noop_message(volume_name, reason);
                Ok(RunOutcome::unchanged(msg, Some(action)))
            }
            _ => self.apply(desired, action),
        }
    }

    /// Read the group report; `None` when the group is absent and may stay so
    fn read_group(&self, lsvg: &Path, desired: &DesiredState) -> Result<Option<VolumeGroupFacts>> {
        let cmd = commands::report_group(&lsvg.to_string_lossy(), &desired.group_name);
        let output = self.execute(&cmd)?;

        let group = if output.success() {
            parse_volume_group(&output.stdout)?
        } else {
            None
        };

        match (group, desired.presence) {
            (Some(group), _) => Ok(Some(group)),
            (None, Presence::Absent) => {
                warn!(group = %desired.group_name, rc = output.exit_code, "volume group not found");
                Ok(None)
            }
            (None, Presence::Present) => Err(Error::ExternalCommand {
                message: format!("Volume group {} does not exist.", desired.group_name),
                rc: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            }),
        }
    }

    /// Read the volume report; a failing report means the volume is absent
    fn read_volume(&self, lslv: &Path, volume: &str) -> Result<Option<LogicalVolumeFacts>> {
        let cmd = commands::report_volume(&lslv.to_string_lossy(), volume);
        let output = self.execute(&cmd)?;

        if !output.success() {
            debug!(volume, rc = output.exit_code, stderr = %output.stderr.trim(), "logical volume not found");
            return Ok(None);
        }
        parse_logical_volume(&output.stdout)
    }

    /// Issue the one mutating command for `action`
    fn apply(&self, desired: &DesiredState, action: Action) -> Result<RunOutcome> {
        let volume = desired.volume_name.as_str();
        let (done, failed) = action_messages(volume, &action);

        let Some(binary) = commands::binary_for(&self.config.binaries, &action) else {
            return Ok(RunOutcome::unchanged(done, Some(action)));
        };
        let program = self.runner.resolve(binary)?;

        let Some(mut cmd) = commands::for_action(&program.to_string_lossy(), desired, &action)
        else {
            return Ok(RunOutcome::unchanged(done, Some(action)));
        };
        if self.config.dry_run {
            cmd = cmd.echoed(&self.config.binaries.echo);
        }

        info!(command = %cmd, dry_run = self.config.dry_run, "applying action");
        let output = self.execute(&cmd)?;

        if !output.success() {
            return Err(Error::ExternalCommand {
                message: failed,
                rc: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        Ok(RunOutcome {
            changed: true,
            msg: done,
            action: Some(action),
        })
    }

    fn execute(&self, cmd: &CommandLine) -> Result<CommandOutput> {
        let output = self.runner.run(&cmd.program, &cmd.args)?;
        debug!(command = %cmd, rc = output.exit_code, "command finished");
        Ok(output)
    }
}

fn noop_message(volume: &str, reason: &NoOpReason) -> String {
    match reason {
        NoOpReason::AlreadyAbsent => format!("Logical Volume {} does not exist.", volume),
        NoOpReason::AlreadyExists => format!("Logical volume {} already exist.", volume),
        NoOpReason::SizeMatches { size_megabytes } => {
            format!("Logical volume {} size is already {}MB.", volume, size_megabytes)
        }
    }
}

/// Success and failure messages for a mutating action
fn action_messages(volume: &str, action: &Action) -> (String, String) {
    match action {
        Action::NoOp { reason } => (noop_message(volume, reason), String::new()),
        Action::Create(_) => (
            format!("Logical volume {} created.", volume),
            format!("Creating logical volume {} failed.", volume),
        ),
        Action::Delete => (
            format!("Logical volume {} deleted.", volume),
            format!("Failed to remove logical volume {}.", volume),
        ),
        Action::Resize {
            target_megabytes, ..
        } => (
            format!(
                "Logical volume {} size extended to {}MB.",
                volume, target_megabytes
            ),
            format!("Unable to resize {} to {}MB.", volume, target_megabytes),
        ),
        Action::ChangePolicy { policy } => (
            format!("Logical volume {} policy changed: {}.", volume, policy),
            format!("Failed to change logical volume {} policy.", volume),
        ),
    }
}
