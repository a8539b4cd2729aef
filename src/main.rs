use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pagesmith::telemetry::{LogFormat, init_logging};

mod cmd;

#[derive(Parser)]
#[command(name = "pagesmith")]
#[command(version, about = "Turn task briefs into published GitHub Pages sites")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the webhook server
    Serve {
        /// Address to bind
        #[arg(long, env = "PAGESMITH_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Port to serve on
        #[arg(short, long, env = "PAGESMITH_PORT", default_value = "8000")]
        port: u16,
    },
    /// Print the processed-request log
    Processed {
        /// Show only the entry with this key (email::task::roundN)
        #[arg(short, long)]
        key: Option<String>,

        /// Log file to read (defaults to PROCESSED_PATH or the temp directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_logging(cli.verbose, format)?;

    match cli.command {
        Commands::Serve { host, port } => cmd::cmd_serve(host, port).await?,
        Commands::Processed { key, path } => cmd::cmd_processed(path, key.as_deref())?,
    }

    Ok(())
}
