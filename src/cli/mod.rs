//! Command-line interface.
//!
//! Without a subcommand the binary serves the dashboard. Subcommands:
//! - `config check` - Validate the configuration file
//! - `ping` - Check that the ticket backend answers

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::gateway::{HttpGateway, TicketGateway};
use crate::views::StatisticsView;

#[derive(Parser, Debug)]
#[command(name = "ticketdesk")]
#[command(author, version, about = "Web dashboard for the IT support ticket service", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "ticketdesk.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Override the ticket API base URL
    #[arg(long, env = "TICKETDESK_API_URL")]
    pub api_url: Option<String>,

    /// Subcommand to run (if none, starts the server)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Check that the ticket API is reachable
    Ping,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

impl Cli {
    /// Configuration file merged with command-line overrides
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(&self.config)?;
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

/// Run a CLI subcommand
pub async fn run_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::Config(ConfigCommands::Check)) => cmd_config_check(cli),
        Some(Commands::Ping) => cmd_ping(cli).await,
        // Serving is handled in main.rs
        None => Ok(()),
    }
}

fn cmd_config_check(cli: &Cli) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("A default configuration will be used when starting the server.");
    }

    match cli.load_config() {
        Ok(config) => {
            println!("[OK] Configuration is valid");
            println!();
            println!("=== Effective configuration ===");
            println!();
            print!("{}", config.to_toml()?);

            if !config.session.secure_cookie {
                println!();
                println!("Warnings:");
                println!("  [!] session.secure_cookie is off; enable it when serving over HTTPS");
            }
            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration is invalid!");
            println!();
            println!("Error: {:#}", e);
            anyhow::bail!("Invalid configuration file");
        }
    }
}

async fn cmd_ping(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    let gateway = HttpGateway::new(&config.api)?;

    println!("Connecting to {}...", gateway.base_url());

    let stats = gateway
        .statistics()
        .await
        .context("Ticket API is not reachable")?;
    let view = StatisticsView::from_payload(&stats);

    println!("[OK] Ticket API answered");
    println!();
    for card in &view.cards {
        println!("  {:12} {}", card.label, card.value);
    }
    println!("  {:12} {}", "Total", view.total);
    Ok(())
}
