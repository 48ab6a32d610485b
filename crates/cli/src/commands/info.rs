use std::{fs, path::Path, process::ExitCode};

use anyhow::{Context, Result};
use clap::Args;
use log::error;
use trawl_engine::SnapshotStore;

use crate::printer::format_size;

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: InfoArgs, store: &Path) -> ExitCode {
    match execute(args, store).await {
        Ok(code) => code,
        Err(e) => {
            error!("[error] {e:#}");
            eprintln!("[info] {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn execute(args: InfoArgs, store_path: &Path) -> Result<ExitCode> {
    if !store_path.exists() {
        eprintln!("[info] no store found at {}", store_path.display());
        // Treat absence as a "soft" failure with non-zero exit
        return Ok(ExitCode::from(1));
    }

    let store = SnapshotStore::load(store_path).await?;
    let records = store.len()?;
    let size_bytes = fs::metadata(store_path)
        .with_context(|| format!("Failed to stat {}", store_path.display()))?
        .len();

    if args.json {
        let obj = serde_json::json!({
            "location": store_path,
            "records": records,
            "size_bytes": size_bytes,
        });
        println!("{obj}");
    } else {
        eprintln!("[info] location: {}", store_path.display());
        eprintln!("[info] records:  {records}");
        eprintln!("[info] size:     {}", format_size(size_bytes));
    }

    Ok(ExitCode::SUCCESS)
}
