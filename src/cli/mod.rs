use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod init;
pub mod serve;

use crate::core::AppConfig;

#[derive(Subcommand)]
enum Command {
    /// Create the storage directories and database
    Init {},
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Chat with the assistant through a running server
    Chat {
        /// User ID to chat as
        #[arg(long)]
        uid: String,

        /// Resume an existing session
        #[arg(long)]
        session: Option<String>,

        /// Base URL of the server
        #[arg(long, default_value = "http://127.0.0.1:2222")]
        url: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Init {}) => {
            init::run(&AppConfig::default()).await?;
        }
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        Some(Command::Chat { uid, session, url }) => {
            chat::run(&url, &uid, session).await?;
        }
        None => {}
    }

    Ok(())
}
