//! Mediarelay CLI: command-line client for the relay's HTTP API.
//!
//! Set MEDIARELAY_URL to the server address.

use anyhow::Context;
use clap::{Parser, Subcommand};
use mediarelay_cli::{init_tracing, RelayClient};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "mediarelay", about = "Media relay CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a local file through the relay
    Upload {
        /// Path to the file to upload
        file: std::path::PathBuf,
        /// `me` or a numeric chat id
        #[arg(long, default_value = "me")]
        chat_id: String,
        /// Caption; defaults to the file name
        #[arg(long)]
        caption: Option<String>,
    },
    /// Upload a file that already exists on the relay host
    UploadPath {
        /// Absolute path on the relay host
        file_path: String,
        /// `me` or a numeric chat id
        #[arg(long, default_value = "me")]
        chat_id: String,
        /// Caption; defaults to the file name
        #[arg(long)]
        caption: Option<String>,
    },
    /// Show the account the relay is authenticated as
    Me,
    /// List conversations reachable by the relay's account
    Dialogs,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let client = RelayClient::from_env()?;

    match cli.command {
        Commands::Upload {
            file,
            chat_id,
            caption,
        } => {
            let response = client
                .upload_file(&file, &chat_id, caption.as_deref())
                .await?;
            print_json(&response)?;
        }
        Commands::UploadPath {
            file_path,
            chat_id,
            caption,
        } => {
            let response = client
                .upload_by_path(&file_path, &chat_id, caption.as_deref())
                .await?;
            print_json(&response)?;
        }
        Commands::Me => {
            let identity = client.get_me().await?;
            println!("{}", identity);
        }
        Commands::Dialogs => {
            let response = client.list_dialogs().await?;
            print_json(&response)?;
        }
    }

    Ok(())
}
