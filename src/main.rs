//! `agentplan` - run agent plans from the command line
//!
//! Thin front end over `agentplan-core`: loads configuration, installs the
//! tracing subscriber and drives the demonstration plans.

use anyhow::{Context, Result};
use clap::Parser;
use console::Style;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ConfigCommand};
use agentplan_core::{Config, ExecutionContext, PlanOutputs};

mod cli;
mod demo;

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Demo { input, flaky } => {
            handle_demo(&config, input.clone(), *flaky).await?;
        }

        Commands::ValidateDemo => match demo::cyclic_plan() {
            Ok(_) => anyhow::bail!("cyclic plan was accepted"),
            Err(e) => {
                let yellow = Style::new().yellow();
                println!("{} {}", yellow.apply_to("rejected:"), e.user_message());
            }
        },

        Commands::Config { cmd } => match cmd {
            None | Some(ConfigCommand::Show) => {
                print!("{}", config.to_toml()?);
            }
            Some(ConfigCommand::Path) => match config_path(&cli) {
                Some(path) => println!("{}", path.display()),
                None => println!("No config directory available"),
            },
            Some(ConfigCommand::Init { force }) => {
                let path = config_path(&cli).context("No config directory available")?;
                if path.exists() && !force {
                    anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
                }
                Config::default().save(&path)?;
                println!("Wrote default configuration to {}", path.display());
            }
        },
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn config_path(cli: &Cli) -> Option<std::path::PathBuf> {
    cli.config.clone().or_else(Config::default_path)
}

/// An explicit `--config` must load; the default location is best effort
fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            Config::load(path).context("Failed to load configuration")
        }
        None => Ok(Config::load_or_default()),
    }
}

/// Ctrl-C cancels the run context, which aborts every in-flight node
async fn handle_demo(config: &Config, input: String, flaky: u32) -> Result<()> {
    let ctx = ExecutionContext::new();
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling run");
            interrupt.cancel();
        }
    });

    let outputs = demo::run_pipeline(config, &ctx, input, flaky).await?;
    print_outputs(&outputs);
    Ok(())
}

fn print_outputs(outputs: &PlanOutputs) {
    let bold = Style::new().bold();
    let green = Style::new().green();
    for id in demo::PIPELINE {
        if let Some(value) = outputs.get::<String>(id) {
            println!("{} {}", green.apply_to(format!("{:>10}", id)), bold.apply_to(value));
        }
    }
}
