//! Expand command - list every resolution of one feature.

use anyhow::Result;
use clap::Args;
use console::style;
use std::path::PathBuf;

use cohort_resolver::Resolver;

use super::{GlobalOptions, OutputFormat, Session};
use crate::output::Output;

#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Symbolic or short name of the feature to expand
    pub feature: String,

    /// Catalog file or directory (defaults to `catalog` in cohort.toml)
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn execute(args: ExpandArgs, global: &GlobalOptions) -> Result<i32> {
    let output = Output::new(args.format == OutputFormat::Json);
    let session = Session::open(global, args.catalog.as_deref(), false)?;
    let resolver = Resolver::new(&session.catalog, session.config.clone());

    let resolved = resolver.expand(&args.feature)?;

    if output.is_json() {
        output.json(&resolved)?;
        return Ok(if resolved.is_empty() { 1 } else { 0 });
    }

    if resolved.is_empty() {
        output.error(&format!(
            "{} has no consistent resolution: every branch selects two members of a singleton family",
            args.feature
        ));
        return Ok(1);
    }

    output.section(&format!("Resolutions of {} ({})", args.feature, resolved.len()));
    for rcf in &resolved {
        let marker = if rcf.is_preferred() { "*" } else { "~" };
        if rcf.choices.is_empty() {
            output.list_item(marker, &style(rcf.name()).bold().to_string());
        } else {
            let choices: Vec<String> = rcf
                .choices
                .iter()
                .map(|(id, choice)| format!("{}={}", id, choice))
                .collect();
            output.list_item(
                marker,
                &format!("{} {}", style(rcf.name()).bold(), style(choices.join(", ")).dim()),
            );
        }
    }
    output.writeln("");
    output.writeln("* preferred versions only, ~ relies on a tolerated version");

    Ok(0)
}
