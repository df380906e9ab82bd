use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// retarget - move compiled .NET modules onto split engine libraries
#[derive(Debug, Parser)]
#[command(name = "retarget", version, about, long_about = None)]
pub struct Cli {
    /// Module files or directories (scanned recursively for .dll/.exe files).
    #[arg(value_name = "PATH", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory. Must already exist; directory inputs are mirrored below it.
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Rewrite modules but do not write any output.
    #[arg(long)]
    pub dry_run: bool,

    /// Replace existing output files.
    #[arg(long)]
    pub overwrite: bool,

    /// Replace native-interop stubs with accessor and dummy bodies.
    #[arg(
        long = "stripinternal",
        value_name = "BOOL",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true"
    )]
    pub strip_internal: bool,

    /// Remove the TargetFrameworkAttribute.
    #[arg(
        long = "striptarget",
        value_name = "BOOL",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true"
    )]
    pub strip_target: bool,

    /// JSON mapping table to use instead of the built-in one.
    #[arg(long, value_name = "FILE")]
    pub mapping: Option<PathBuf>,

    /// Print the run summary as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}
