use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use learning_ui::check::CheckRunner;
use learning_ui::config::Config;
use learning_ui::remote::executor_from_config;
use learning_ui::steps::{Catalog, CatalogStatus};
use learning_ui::{env_vars, logging, rest};

#[derive(Parser)]
#[command(name = "learning-ui")]
#[command(about = "Guided tutorial steps and an in-browser terminal for hands-on labs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the API, the terminal socket and the web UI (default)
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List the steps found in the scenario directory
    Steps,

    /// Run one step's check script against the target
    Check {
        /// 1-based step number
        number: usize,
    },

    /// List supported environment variables
    Env,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let _logging_handle = logging::init_logging(&config, cli.debug)?;

    match cli.command {
        Some(Commands::Serve { port }) => cmd_serve(config, port).await?,
        Some(Commands::Steps) => cmd_steps(&config)?,
        Some(Commands::Check { number }) => cmd_check(&config, number).await?,
        Some(Commands::Env) => cmd_env(),
        None => cmd_serve(config, None).await?,
    }

    Ok(())
}

async fn cmd_serve(config: Config, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.server.port);

    tracing::info!(
        scenario = %config.scenario.path,
        target_kind = ?config.target.kind,
        pod = %config.target.pod,
        namespace = %config.target.namespace,
        "Starting learning UI"
    );
    if config.editor.enabled {
        tracing::info!("Editor tab enabled (routed via ingress to the shell pod)");
    }

    let state = rest::ApiState::new(config);
    tracing::info!(steps = state.catalog.len(), "Loaded steps");

    rest::serve(state, port).await
}

fn cmd_steps(config: &Config) -> Result<()> {
    let catalog = Catalog::load(&config.scenario_path());

    if let CatalogStatus::Degraded { reason } = catalog.status() {
        bail!("Scenario could not be loaded: {}", reason);
    }

    if catalog.is_empty() {
        println!("No steps in {}", config.scenario.path);
        return Ok(());
    }

    println!("Steps ({})", catalog.len());
    println!("{}", "─".repeat(60));
    for step in catalog.list() {
        let marker = if step.has_check { " [check]" } else { "" };
        println!("{:>3}. {}{}", step.number, step.title, marker);
    }

    if !catalog.issues().is_empty() {
        println!();
        println!("Issues:");
        for issue in catalog.issues() {
            println!("  - {}", issue);
        }
    }

    Ok(())
}

async fn cmd_check(config: &Config, number: usize) -> Result<()> {
    let catalog = Catalog::load(&config.scenario_path());
    let script = catalog
        .check_script_for(number)
        .with_context(|| format!("Cannot check step {}", number))?;

    let runner = CheckRunner::new(executor_from_config(config), &config.check);
    let outcome = runner.run(script).await;

    println!("{}", if outcome.success { "PASS" } else { "FAIL" });
    if !outcome.message.is_empty() {
        println!("{}", outcome.message);
    }

    if !outcome.success {
        bail!("Step {} check failed", number);
    }
    Ok(())
}

fn cmd_env() {
    for var in env_vars::ENV_VARS {
        let default = var.default.unwrap_or("-");
        println!("{:<32} {:<24} {}", var.name, default, var.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_is_serve() {
        let cli = Cli::parse_from(["learning-ui"]);
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_serve_port() {
        let cli = Cli::parse_from(["learning-ui", "--debug", "serve", "--port", "9000"]);
        assert!(cli.debug);
        assert!(matches!(
            cli.command,
            Some(Commands::Serve { port: Some(9000) })
        ));
    }

    #[test]
    fn test_check_number() {
        let cli = Cli::parse_from(["learning-ui", "-c", "lab.toml", "check", "2"]);
        assert_eq!(cli.config.as_deref(), Some("lab.toml"));
        assert!(matches!(cli.command, Some(Commands::Check { number: 2 })));
    }

    #[test]
    fn test_check_rejects_non_numeric() {
        assert!(Cli::try_parse_from(["learning-ui", "check", "two"]).is_err());
    }
}
