//! Verify command - check that every catalog feature can be resolved.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use cohort_resolver::Resolver;

use super::{GlobalOptions, OutputFormat, Session};
use crate::output::Output;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Catalog file or directory (defaults to `catalog` in cohort.toml)
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn execute(args: VerifyArgs, global: &GlobalOptions) -> Result<i32> {
    let output = Output::new(args.format == OutputFormat::Json);
    let session = Session::open(global, args.catalog.as_deref(), false)?;
    let report = Resolver::new(&session.catalog, session.config.clone()).report();
    let code = if report.is_clean() { 0 } else { 1 };

    if output.is_json() {
        output.json(&report)?;
        return Ok(code);
    }

    output.writeln(&format!(
        "{} features, {} resolutions, {} buckets",
        report.feature_count,
        report.resolution_count,
        report.buckets.len()
    ));

    if !report.unresolvable.is_empty() {
        output.section("Features without a consistent resolution");
        for name in &report.unresolvable {
            output.list_item("x", name);
        }
    }

    if !report.dangling.is_empty() {
        output.section("Dependencies missing from the catalog");
        for reference in &report.dangling {
            output.list_item("x", &format!("{} -> {}", reference.feature, reference.dependency));
        }
    }

    for rcf in &report.unplaced {
        output.warning(&format!("{} fits no bucket", rcf));
    }

    output.writeln("");
    if code == 0 {
        output.success("Catalog resolves cleanly");
    } else {
        output.error("Catalog has unresolvable features or missing dependencies");
    }

    Ok(code)
}
