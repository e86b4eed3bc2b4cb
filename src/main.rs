//! Logical Volume Reconciler
//!
//! Reconciles one AIX logical volume against the state given on the
//! command line (or in a YAML document) and prints a JSON result on
//! stdout. Logs go to stderr.

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lvol_reconciler::config::split_physical_volumes;
use lvol_reconciler::{
    load_desired_state, DesiredState, Error, PlacementPolicy, Presence, Reconciler,
    ReconcilerConfig, Result, RunOutcome, SystemCommandRunner,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Logical Volume Reconciler - create, remove or extend an AIX logical volume
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Volume group the logical volume is part of
    #[arg(long, env = "LVOL_VG", required_unless_present = "desired_state")]
    vg: Option<String>,

    /// Name of the logical volume
    #[arg(long, env = "LVOL_LV", required_unless_present = "desired_state")]
    lv: Option<String>,

    /// Type of the logical volume
    #[arg(long, env = "LVOL_TYPE", default_value = "jfs2")]
    lv_type: String,

    /// Size with one of the M/G/T units; required to create the volume
    #[arg(long, env = "LVOL_SIZE")]
    size: Option<String>,

    /// Number of copies of the logical volume
    #[arg(long, env = "LVOL_COPIES", default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=3))]
    copies: u8,

    /// Inter-physical volume allocation policy (maximum, minimum)
    #[arg(long, env = "LVOL_POLICY", default_value = "maximum")]
    policy: PlacementPolicy,

    /// Free-form options passed to mklv
    #[arg(long, env = "LVOL_OPTS", default_value = "", allow_hyphen_values = true)]
    opts: String,

    /// Physical volumes to allocate from, e.g. hdisk1,hdisk2
    #[arg(long, env = "LVOL_PVS", value_delimiter = ',')]
    pvs: Vec<String>,

    /// Whether the logical volume should exist (present, absent)
    #[arg(long, env = "LVOL_STATE", default_value = "present")]
    state: Presence,

    /// Only display the command that would change the system
    #[arg(long, env = "LVOL_CHECK")]
    check: bool,

    /// YAML document describing the desired state; other state flags are ignored
    #[arg(long, env = "LVOL_DESIRED_STATE")]
    desired_state: Option<PathBuf>,

    /// Extra directory searched for the LVM binaries
    #[arg(long, env = "LVOL_BIN_DIR")]
    bin_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

impl Args {
    fn desired(&self) -> Result<DesiredState> {
        if let Some(path) = &self.desired_state {
            return load_desired_state(path);
        }

        let (Some(vg), Some(lv)) = (&self.vg, &self.lv) else {
            return Err(Error::Configuration(
                "--vg and --lv are required without --desired-state".into(),
            ));
        };

        let desired = DesiredState {
            group_name: vg.clone(),
            volume_name: lv.clone(),
            volume_type: self.lv_type.clone(),
            size: self.size.clone(),
            copies: self.copies,
            policy: self.policy,
            extra_options: self.opts.clone(),
            physical_volumes: split_physical_volumes(&self.pvs),
            presence: self.state,
        };
        desired.validate()?;
        Ok(desired)
    }

    fn config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            dry_run: self.check,
            bin_dir: self.bin_dir.clone(),
            ..Default::default()
        }
    }
}

// =============================================================================
// Result Documents
// =============================================================================

#[derive(Serialize)]
struct FailureReport<'a> {
    failed: bool,
    msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rc: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    out: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    err: Option<&'a str>,
}

impl<'a> From<&'a Error> for FailureReport<'a> {
    fn from(e: &'a Error) -> Self {
        let diag = e.diagnostics();
        Self {
            failed: true,
            msg: e.to_string(),
            rc: diag.map(|d| d.rc),
            out: diag.map(|d| d.stdout),
            err: diag.map(|d| d.stderr),
        }
    }
}

fn emit<T: Serialize>(document: &T) -> Result<()> {
    println!("{}", serde_json::to_string(document)?);
    Ok(())
}

// =============================================================================
// Main
// =============================================================================

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args);

    info!("Starting Logical Volume Reconciler");
    info!("  Version: {}", lvol_reconciler::VERSION);
    info!("  Check mode: {}", args.check);

    match run(&args) {
        Ok(outcome) => {
            info!(changed = outcome.changed, "{}", outcome.msg);
            if let Err(e) = emit(&outcome) {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            if let Err(emit_err) = emit(&FailureReport::from(&e)) {
                eprintln!("{}", emit_err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<RunOutcome> {
    let desired = args.desired()?;
    let config = args.config();

    let runner = match &config.bin_dir {
        Some(dir) => SystemCommandRunner::with_bin_dir(dir),
        None => SystemCommandRunner::new(),
    };

    info!(
        vg = %desired.group_name,
        lv = %desired.volume_name,
        state = %desired.presence,
        "Reconciling logical volume"
    );

    Reconciler::new(config, Arc::new(runner)).run(&desired)
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
