use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Args;
use log::error;
use trawl_engine::ReadyPolicy;
use trawl_fs::{CrawlMode, CrawlOptions};
use trawl_indexer::{CrawlReport, crawl_and_persist, create_scan_filter};
use trawl_runtime::{DEFAULT_MAX_DEPTH, DEFAULT_MIN_SIZE, default_scan_root};

use super::{absolute, crawl_extensions};

#[derive(Debug, Args)]
pub struct CrawlArgs {
    /// Directory to crawl (defaults to the home directory)
    pub root: Option<PathBuf>,

    /// Stat every entry instead of skipping names that are clearly unwanted
    #[arg(long)]
    pub full: bool,

    /// Extensions to record, comma separated (defaults to archives and installers)
    #[arg(long, value_delimiter = ',', value_name = "EXT")]
    pub ext: Vec<String>,

    /// Only record files strictly larger than this many bytes
    #[arg(long, default_value_t = DEFAULT_MIN_SIZE)]
    pub min_size: u64,

    /// Do not list directories nested deeper than this
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Additional subtree to skip; may be repeated
    #[arg(long, value_name = "PATH")]
    pub exclude: Vec<PathBuf>,

    /// Crawl system and dependency directories too
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Print the crawl summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl CrawlArgs {
    pub fn mode(&self) -> CrawlMode {
        if self.full {
            CrawlMode::Full
        } else {
            CrawlMode::Quick
        }
    }

    pub fn options(&self, root: &Path) -> Result<CrawlOptions> {
        let filter = create_scan_filter(root, !self.no_default_excludes, self.exclude.clone())?;

        Ok(CrawlOptions::new(self.mode(), crawl_extensions(&self.ext))
            .with_min_size(self.min_size)
            .with_max_depth(self.max_depth)
            .with_filter(filter))
    }
}

pub async fn run(args: CrawlArgs, store: &Path) -> ExitCode {
    match execute(args, store).await {
        Ok(code) => code,
        Err(e) => {
            error!("[error] {e:#}");
            eprintln!("[crawl] {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn execute(args: CrawlArgs, store: &Path) -> Result<ExitCode> {
    let root = absolute(&args.root.clone().unwrap_or_else(default_scan_root));
    if !root.is_dir() {
        eprintln!("[crawl] {} is not a directory", root.display());
        return Ok(ExitCode::from(1));
    }

    let options = args
        .options(&root)
        .with_context(|| format!("Invalid crawl options for {}", root.display()))?;

    let report = crawl_and_persist(&root, store, options, ReadyPolicy::default()).await?;

    if args.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        print_report(&report);
    }

    Ok(ExitCode::SUCCESS)
}

fn print_report(report: &CrawlReport) {
    let s = &report.summary;
    let c = &s.counters;

    eprintln!("[crawl] root:      {}", s.root.display());
    eprintln!("[crawl] mode:      {}", s.mode);
    eprintln!("[crawl] files:     {}", c.files_scanned);
    eprintln!("[crawl] dirs:      {}", c.dirs_scanned);
    eprintln!("[crawl] recorded:  {}", c.recorded);
    eprintln!("[crawl] skipped:   {}", c.skipped);
    if c.errors > 0 {
        eprintln!("[crawl] errors:    {}", c.errors);
    }
    if c.depth_limited > 0 {
        eprintln!("[crawl] too deep:  {}", c.depth_limited);
    }
    eprintln!("[crawl] elapsed:   {:.2}s", s.elapsed().as_secs_f64());
    if let Some(path) = &report.store {
        eprintln!("[crawl] stored:    {} records in {}", report.persisted, path.display());
    }
}
