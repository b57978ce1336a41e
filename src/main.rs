//! Main entry point for the Lara CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lara_sdk::cli::commands::{self, Commands};
use lara_sdk::{ClientConfig, Credentials, Translator};

/// Lara - translate text, documents and manage memories and glossaries
#[derive(Parser, Debug)]
#[command(name = "lara", version, about, long_about = None)]
struct Args {
    /// Access key ID (defaults to LARA_ACCESS_KEY_ID or the credentials file)
    #[arg(long, requires = "access_key_secret")]
    access_key_id: Option<String>,

    /// Access key secret
    #[arg(long, requires = "access_key_id")]
    access_key_secret: Option<String>,

    /// Profile of ~/.lara/credentials to use
    #[arg(long)]
    profile: Option<String>,

    /// Credentials file (default: ~/.lara/credentials)
    #[arg(long)]
    credentials_file: Option<PathBuf>,

    /// Client configuration file (JSON, TOML, YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// API server URL
    #[arg(long)]
    server_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("lara={log_level},lara_sdk={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Some(command) = args.command else {
        println!("Please specify a command. Use --help for more information.");
        return Ok(());
    };

    let credentials = match (args.access_key_id, args.access_key_secret) {
        (Some(id), Some(secret)) => Credentials::new(id, secret),
        _ => match args.credentials_file {
            Some(path) => Credentials::from_file(path, args.profile.as_deref())?,
            None => Credentials::load(args.profile.as_deref())?,
        },
    };

    let mut config = match args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::from_env()?,
    };
    if let Some(server_url) = args.server_url {
        config = config.with_server_url(server_url);
    }

    let translator = Translator::new(credentials, config)?;
    commands::run(&translator, command).await
}
