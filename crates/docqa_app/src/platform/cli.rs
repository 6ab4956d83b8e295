use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

/// Console client for a document question-answering backend.
#[derive(Debug, Parser)]
#[command(name = "docqa", version, about)]
pub struct Args {
    /// Backend base URL, e.g. http://localhost:8000
    #[arg(long, env = "DOCQA_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// RON config file. Defaults to ./docqa.ron when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Also write log lines to the terminal.
    #[arg(long)]
    pub log_to_terminal: bool,

    #[arg(long, default_value = "docqa.log")]
    pub log_file: PathBuf,

    #[arg(long)]
    pub debug: bool,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}
