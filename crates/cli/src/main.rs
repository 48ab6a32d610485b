use std::{path::PathBuf, process::ExitCode};

use clap::Parser;

mod commands;
mod printer;

use commands::Command;
use trawl_runtime::{default_store_path, logging};

#[derive(Debug, Parser)]
#[command(
    name = "trawl",
    version,
    about = "Find archives and installers on disk",
    propagate_version = true
)]
pub struct Cli {
    /// Record store location (defaults to $TRAWL_STORE, then the cache directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

fn main() -> ExitCode {
    logging::init().ok();

    let cli = Cli::parse();
    let store = cli.store.unwrap_or_else(default_store_path);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("[error] failed to start async runtime: {e}");
            return ExitCode::from(2);
        }
    };

    runtime.block_on(async move {
        match cli.command {
            Command::Crawl(args) => commands::crawl::run(args, &store).await,
            Command::Search(args) => commands::search::run(args, &store).await,
            Command::List(args) => commands::list::run(args, &store).await,
            Command::Info(args) => commands::info::run(args, &store).await,
        }
    })
}
