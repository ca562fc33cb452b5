// Copyright 2026 Launch Scout Contributors
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use launch_scout::{scan, Profile, ResponseBody};
use launch_scout_server::chromium::ChromiumSource;
use launch_scout_server::rest::{self, AppState};
use launch_scout_server::settings;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "launch-scout",
    about = "Launch Scout: newly-launched items from the storefront, as JSON",
    version,
    after_help = "Run 'launch-scout <command> --help' for details on each command.\nRun 'launch-scout' with no command to start the HTTP server."
)]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on (defaults to $PORT, then 3000)
        #[arg(long)]
        port: Option<u16>,
        /// Address to bind
        #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
        host: IpAddr,
        /// Timing profile (standard, brisk, patient)
        #[arg(long)]
        profile: Option<Profile>,
    },
    /// Run one extraction and print the response body
    Scan {
        /// Timing profile (standard, brisk, patient)
        #[arg(long)]
        profile: Option<Profile>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

fn init_tracing(verbose: bool, json: bool) {
    let default = if verbose {
        "launch_scout=debug,launch_scout_server=debug,tower_http=debug"
    } else {
        "launch_scout=info,launch_scout_server=info,tower_http=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "launch-scout", &mut std::io::stdout());
        return Ok(());
    }

    init_tracing(cli.verbose, cli.json_logs);

    match cli.command {
        None => serve(None, IpAddr::V4(Ipv4Addr::UNSPECIFIED), None).await,
        Some(Commands::Serve {
            port,
            host,
            profile,
        }) => serve(port, host, profile).await,
        Some(Commands::Scan { profile }) => scan_once(profile).await,
        Some(Commands::Completions { .. }) => Ok(()),
    }
}

async fn serve(port: Option<u16>, host: IpAddr, profile: Option<Profile>) -> Result<()> {
    let config = settings::resolve_scan_config(profile)?;
    let port = settings::resolve_port(port)?;
    info!(
        "starting Launch Scout v{} (profile {})",
        env!("CARGO_PKG_VERSION"),
        config.profile
    );

    let source = Arc::new(ChromiumSource::launch(&config).await?);
    let state = Arc::new(AppState::new(source.clone(), config));

    let result = rest::start(SocketAddr::new(host, port), state).await;

    match Arc::try_unwrap(source) {
        Ok(source) => source.shutdown().await,
        Err(_) => tracing::warn!("documents still open at shutdown; leaving browser to exit"),
    }
    result
}

async fn scan_once(profile: Option<Profile>) -> Result<()> {
    let config = settings::resolve_scan_config(profile)?;
    let source = ChromiumSource::launch(&config).await?;

    let resp = ResponseBody::from(scan(&source, &config).await);
    source.shutdown().await;

    let body = serde_json::to_string_pretty(&resp.body).context("failed to encode response")?;
    println!("{body}");

    if resp.status != 200 {
        std::process::exit(1);
    }
    Ok(())
}
