//! Command Lines
//!
//! Builds the argument vectors for the AIX LVM binaries. Report commands
//! are always run as-is; mutating commands are wrapped in `echo` when the
//! run is a dry run.

use crate::domain::ports::{Action, DesiredState, PlacementPolicy, VolumeLayout};

/// Names of the management binaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LvmBinaries {
    pub lsvg: String,
    pub lslv: String,
    pub mklv: String,
    pub rmlv: String,
    pub extendlv: String,
    pub chlv: String,
    /// Program used to display mutating commands on a dry run
    pub echo: String,
}

impl Default for LvmBinaries {
    fn default() -> Self {
        Self {
            lsvg: "lsvg".into(),
            lslv: "lslv".into(),
            mklv: "mklv".into(),
            rmlv: "rmlv".into(),
            extendlv: "extendlv".into(),
            chlv: "chlv".into(),
            echo: "echo".into(),
        }
    }
}

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Turn the command into arguments of `echo` so it is only displayed
    pub fn echoed(self, echo: &str) -> Self {
        CommandLine::new(echo).arg(self.program).args(self.args)
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// `lsvg <vg>`
pub fn report_group(lsvg: &str, group: &str) -> CommandLine {
    CommandLine::new(lsvg).arg(group)
}

/// `lslv <lv>`
pub fn report_volume(lslv: &str, volume: &str) -> CommandLine {
    CommandLine::new(lslv).arg(volume)
}

/// `mklv -t <type> -y <lv> -c <copies> -e <x|m> [opts] <vg> <N>M [pvs]`
///
/// The free-form options are split on whitespace and passed through in
/// order without being interpreted.
pub fn create_volume(mklv: &str, group: &str, volume: &str, layout: &VolumeLayout) -> CommandLine {
    CommandLine::new(mklv)
        .args(["-t", layout.volume_type.as_str()])
        .args(["-y", volume])
        .arg("-c")
        .arg(layout.copies.to_string())
        .args(["-e", layout.policy.flag()])
        .args(layout.options.split_whitespace())
        .arg(group)
        .arg(format!("{}M", layout.size_megabytes))
        .args(layout.physical_volumes.iter().map(String::as_str))
}

/// `rmlv -f <lv>`
pub fn remove_volume(rmlv: &str, volume: &str) -> CommandLine {
    CommandLine::new(rmlv).arg("-f").arg(volume)
}

/// `extendlv <lv> <delta>M`
pub fn extend_volume(extendlv: &str, volume: &str, delta_megabytes: u64) -> CommandLine {
    CommandLine::new(extendlv)
        .arg(volume)
        .arg(format!("{}M", delta_megabytes))
}

/// `chlv -e <x|m> <lv>`
pub fn change_policy(chlv: &str, volume: &str, policy: PlacementPolicy) -> CommandLine {
    CommandLine::new(chlv).args(["-e", policy.flag()]).arg(volume)
}

/// Command line carrying out `action` with `program`, or `None` for a no-op
pub fn for_action(program: &str, desired: &DesiredState, action: &Action) -> Option<CommandLine> {
    let volume = desired.volume_name.as_str();
    match action {
        Action::NoOp { .. } => None,
        Action::Create(layout) => Some(create_volume(
            program,
            &desired.group_name,
            volume,
            layout,
        )),
        Action::Delete => Some(remove_volume(program, volume)),
        Action::Resize {
            delta_megabytes, ..
        } => Some(extend_volume(program, volume, *delta_megabytes)),
        Action::ChangePolicy { policy } => Some(change_policy(program, volume, *policy)),
    }
}

/// Binary needed to carry out `action`
pub fn binary_for<'a>(binaries: &'a LvmBinaries, action: &Action) -> Option<&'a str> {
    match action {
        Action::NoOp { .. } => None,
        Action::Create(_) => Some(&binaries.mklv),
        Action::Delete => Some(&binaries.rmlv),
        Action::Resize { .. } => Some(&binaries.extendlv),
        Action::ChangePolicy { .. } => Some(&binaries.chlv),
    }
}
