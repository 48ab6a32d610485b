use std::{path::Path, process::ExitCode};

use anyhow::Result;
use clap::Args;
use log::error;
use trawl_engine::{ReadyPolicy, SearchEngine};
use trawl_indexer::open_store;
use trawl_runtime::DEFAULT_SEARCH_LIMIT;

use super::{OutputOptions, extension_filter};
use crate::printer::{PrintContext, print_records, stdout_printer};

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Words to look for; all of them must match
    pub words: Vec<String>,

    /// Maximum number of results to display
    #[arg(long, short = 'n', default_value_t = DEFAULT_SEARCH_LIMIT)]
    pub limit: usize,

    /// Only return these extensions, comma separated
    #[arg(long, value_delimiter = ',', value_name = "EXT")]
    pub ext: Vec<String>,

    #[command(flatten)]
    pub output: OutputOptions,
}

impl SearchArgs {
    pub fn query(&self) -> String {
        self.words.join(" ")
    }
}

pub async fn run(args: SearchArgs, store: &Path) -> ExitCode {
    match execute(args, store).await {
        Ok(code) => code,
        Err(e) => {
            error!("[error] {e:#}");
            eprintln!("[error] {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn execute(args: SearchArgs, store_path: &Path) -> Result<ExitCode> {
    if !store_path.exists() {
        eprintln!(
            "[search] no records at {}; run `trawl crawl` first",
            store_path.display()
        );
        return Ok(ExitCode::from(1));
    }

    let store = open_store(store_path, ReadyPolicy::default()).await;
    let engine = SearchEngine::new(store);

    let query = args.query();
    let extensions = extension_filter(&args.ext);
    let result = engine
        .search_detailed(&query, extensions.as_ref(), args.limit)
        .await;

    let ctx = PrintContext {
        kind: "search",
        query: Some(&query),
        total: result.records.len(),
        truncated: args.limit > 0 && result.records.len() == args.limit,
        metrics: Some(&result.metrics),
    };

    let mut printer = stdout_printer(args.output.printer_config(args.limit));
    print_records(printer.as_mut(), &result.records, &ctx)?;

    Ok(ExitCode::SUCCESS)
}
