use std::{path::Path, process::ExitCode};

use anyhow::{Context, Result};
use clap::Args;
use log::error;
use trawl_engine::{IndexStore, ReadyPolicy};
use trawl_indexer::open_store;

use super::OutputOptions;
use crate::printer::{PrintContext, print_records, stdout_printer};

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Show at most this many records
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub output: OutputOptions,
}

pub async fn run(args: ListArgs, store: &Path) -> ExitCode {
    match execute(args, store).await {
        Ok(code) => code,
        Err(e) => {
            error!("[error] {e:#}");
            eprintln!("[list] {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn execute(args: ListArgs, store_path: &Path) -> Result<ExitCode> {
    if !store_path.exists() {
        eprintln!("[list] no records at {}", store_path.display());
        return Ok(ExitCode::from(1));
    }

    let store = open_store(store_path, ReadyPolicy::default()).await;
    let mut records = store
        .find_all()
        .await
        .with_context(|| format!("Failed to read records from {}", store_path.display()))?;

    let total = records.len();
    if let Some(limit) = args.limit {
        records.truncate(limit);
    }

    let ctx = PrintContext {
        kind: "list",
        query: None,
        total: records.len(),
        truncated: records.len() < total,
        metrics: None,
    };

    let mut printer = stdout_printer(args.output.printer_config(records.len()));
    print_records(printer.as_mut(), &records, &ctx)?;

    Ok(ExitCode::SUCCESS)
}
