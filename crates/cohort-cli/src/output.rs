//! Output formatting for the CLI.

use console::{style, Term};
use serde::Serialize;
use std::io::Write;

/// Verbosity levels, driven by repeated `-v`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    #[default]
    Normal,
    Verbose,
    VeryVerbose,
    Debug,
}

impl Verbosity {
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            2 => Verbosity::VeryVerbose,
            _ => Verbosity::Debug,
        }
    }

    pub fn log_filter(&self) -> log::LevelFilter {
        match self {
            Verbosity::Normal => log::LevelFilter::Warn,
            Verbosity::Verbose => log::LevelFilter::Info,
            Verbosity::VeryVerbose => log::LevelFilter::Debug,
            Verbosity::Debug => log::LevelFilter::Trace,
        }
    }
}

/// Result printer. Results go to stdout, diagnostics to stderr.
pub struct Output {
    out: Term,
    err: Term,
    json_mode: bool,
}

impl Output {
    pub fn new(json_mode: bool) -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            json_mode,
        }
    }

    pub fn is_json(&self) -> bool {
        self.json_mode
    }

    pub fn writeln(&self, message: &str) {
        if !self.json_mode {
            let _ = writeln!(&self.out, "{}", message);
        }
    }

    pub fn section(&self, title: &str) {
        if !self.json_mode {
            let _ = writeln!(&self.out, "\n{}", style(title).bold().underlined());
        }
    }

    pub fn list_item(&self, prefix: &str, message: &str) {
        if !self.json_mode {
            let _ = writeln!(&self.out, "  {} {}", style(prefix).green(), message);
        }
    }

    pub fn success(&self, message: &str) {
        if !self.json_mode {
            let _ = writeln!(&self.out, "{}", style(message).green());
        }
    }

    pub fn warning(&self, message: &str) {
        let _ = writeln!(&self.err, "{} {}", style("Warning:").yellow().bold(), message);
    }

    pub fn error(&self, message: &str) {
        let _ = writeln!(&self.err, "{} {}", style("Error:").red().bold(), message);
    }

    /// Pretty printed JSON on stdout, only in JSON mode.
    pub fn json<T: Serialize>(&self, data: &T) -> anyhow::Result<()> {
        if self.json_mode {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_from_count() {
        assert_eq!(Verbosity::from_count(0), Verbosity::Normal);
        assert_eq!(Verbosity::from_count(2), Verbosity::VeryVerbose);
        assert_eq!(Verbosity::from_count(7), Verbosity::Debug);
        assert!(Verbosity::Debug > Verbosity::Verbose);
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(Verbosity::Normal.log_filter(), log::LevelFilter::Warn);
        assert_eq!(Verbosity::Verbose.log_filter(), log::LevelFilter::Info);
        assert_eq!(Verbosity::Debug.log_filter(), log::LevelFilter::Trace);
    }
}
