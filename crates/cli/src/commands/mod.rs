pub mod crawl;
pub mod info;
pub mod list;
pub mod search;

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
pub use crawl::CrawlArgs;
pub use info::InfoArgs;
pub use list::ListArgs;
pub use search::SearchArgs;
use trawl_fs::ExtensionSet;
use trawl_runtime::default_extensions;

use crate::printer::{ColorChoice, OutputFormat, PrinterConfig};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Crawl a directory tree and record archives and installers.
    ///
    /// Example:
    ///   trawl crawl ~/Downloads
    ///   trawl crawl --full --ext zip,7z --min-size 1048576 /data
    Crawl(CrawlArgs),

    /// Search recorded files. Every word must appear in the path.
    ///
    /// Example:
    ///   trawl search steam setup
    ///   trawl search -n 10 --ext exe,msi 'office'
    Search(SearchArgs),

    /// List every recorded file, newest first.
    List(ListArgs),

    /// Show where the store lives and how much it holds.
    Info(InfoArgs),
}

#[derive(Debug, Args)]
pub struct OutputOptions {
    /// Output results as NDJSON (one JSON object per line)
    #[arg(long)]
    pub json: bool,

    /// When to use colors: auto, always, never
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: String,

    /// Suppress timing statistics
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl OutputOptions {
    pub fn printer_config(&self, limit: usize) -> PrinterConfig {
        PrinterConfig {
            format: if self.json {
                OutputFormat::Json
            } else {
                OutputFormat::Human
            },
            color: ColorChoice::parse(&self.color),
            limit,
            show_timing: !self.quiet,
        }
    }
}

/// Extensions from `--ext`, or `None` when the flag was not given.
pub fn extension_filter(raw: &[String]) -> Option<ExtensionSet> {
    if raw.is_empty() {
        None
    } else {
        Some(ExtensionSet::new(raw))
    }
}

/// Crawl extensions: `--ext` if given, the defaults otherwise.
pub fn crawl_extensions(raw: &[String]) -> ExtensionSet {
    extension_filter(raw).unwrap_or_else(|| ExtensionSet::new(default_extensions()))
}

/// Absolute form of `path` without requiring it to exist.
pub fn absolute(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
