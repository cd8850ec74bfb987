use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "logview")]
#[command(about = "Inspect LLM gateway request logs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: ./logview.toml, then ./config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where a detail record comes from: the backend by id, or a saved JSON file.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct DetailSource {
    /// Log id to fetch from the backend
    pub id: Option<String>,

    /// Read a saved detail JSON instead of fetching
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List request logs
    List {
        #[arg(long, value_parser = ["running", "succeeded", "failed", "cancelled"])]
        status: Option<String>,

        #[arg(long)]
        provider: Option<String>,

        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        request_type: Option<String>,

        /// Free-text search over question and answer previews
        #[arg(long)]
        keyword: Option<String>,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long, default_value = "20")]
        page_size: u32,
    },

    /// Show one request log
    Show {
        id: String,

        /// Keep refreshing while the request is running
        #[arg(long)]
        watch: bool,
    },

    /// Print a curl command replaying the request with placeholder credentials
    Curl {
        #[command(flatten)]
        source: DetailSource,
    },

    /// Parse the recorded SSE stream
    Transcript {
        #[command(flatten)]
        source: DetailSource,

        /// Print only the visible answer text
        #[arg(long)]
        text: bool,
    },

    /// Validate that a file holds exactly one strict JSON document
    CheckJson { file: PathBuf },
}
