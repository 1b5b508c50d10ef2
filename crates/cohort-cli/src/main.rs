mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use cohort_resolver::PreferredPolicy;

use commands::{buckets, expand, verify, GlobalOptions};
use output::Verbosity;

#[derive(Parser, Debug)]
#[command(name = "cohort")]
#[command(about = "Resolve singleton feature catalogs into installable feature sets")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// How the preferred flag is settled for a family reached twice
    /// (first-declared or any-preferred)
    #[arg(long, global = true)]
    policy: Option<PreferredPolicy>,

    /// Directory to start the cohort.toml search from
    #[arg(short = 'd', long, default_value = ".", global = true)]
    working_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every resolution of a feature
    Expand(expand::ExpandArgs),

    /// Group the catalog into installable feature sets
    Buckets(buckets::BucketsArgs),

    /// Check that every feature resolves and every dependency exists
    Verify(verify::VerifyArgs),
}

fn run() -> Result<i32> {
    let args = Args::parse();

    let verbosity = Verbosity::from_count(args.verbose);
    env_logger::Builder::new()
        .filter_level(verbosity.log_filter())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let global = GlobalOptions {
        working_dir: args.working_dir,
        policy: args.policy,
    };

    match args.command {
        Commands::Expand(cmd) => expand::execute(cmd, &global),
        Commands::Buckets(cmd) => buckets::execute(cmd, &global),
        Commands::Verify(cmd) => verify::execute(cmd, &global),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}
