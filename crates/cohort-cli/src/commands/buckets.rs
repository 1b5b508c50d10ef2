//! Buckets command - group the whole catalog into installable feature sets.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use cohort_resolver::Resolver;

use super::{GlobalOptions, OutputFormat, Session};
use crate::output::Output;

#[derive(Args, Debug)]
pub struct BucketsArgs {
    /// Catalog file or directory (defaults to `catalog` in cohort.toml)
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Expand catalog roots in parallel
    #[arg(long)]
    pub parallel: bool,
}

pub fn execute(args: BucketsArgs, global: &GlobalOptions) -> Result<i32> {
    let output = Output::new(args.format == OutputFormat::Json);
    let session = Session::open(global, args.catalog.as_deref(), args.parallel)?;
    let resolver = Resolver::new(&session.catalog, session.config.clone());

    let report = resolver.buckets();

    if output.is_json() {
        output.json(&report)?;
        return Ok(0);
    }

    for (index, bucket) in report.buckets.iter().enumerate() {
        output.section(&format!("Bucket {} ({} features)", index + 1, bucket.feature_names().len()));
        for (id, choice) in bucket.chosen_singletons() {
            output.list_item("=", &format!("{} -> {}", id, choice));
        }
        for name in bucket.feature_names() {
            output.list_item("-", name);
        }
    }

    if !report.unplaced.is_empty() {
        output.section("Tolerated resolutions outside every bucket");
        for rcf in &report.unplaced {
            output.list_item("~", &rcf.to_string());
        }
    }

    output.writeln("");
    output.success(&format!(
        "{} features grouped into {} buckets",
        session.catalog.len(),
        report.buckets.len()
    ));

    Ok(0)
}
