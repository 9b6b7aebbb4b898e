use clap::{Parser, Subcommand};
use eyre::{Context, Result};
use std::fs;
use std::io;
use std::path::PathBuf;
use tasklist::view::run_session;
use tasklist::{Config, Priority, TaskFilter};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "tasklist - In-memory task list with priorities, filters and live counts")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to a YAML config file (default: <config dir>/tasklist/config.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Priority selected at startup (low, medium, high)
    #[arg(short, long, value_parser = parse_priority)]
    priority: Option<Priority>,

    /// Filter tab selected at startup (all, active, completed)
    #[arg(short, long, value_parser = parse_filter)]
    filter: Option<TaskFilter>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session on stdin/stdout (default)
    Shell,

    /// Run commands from a file, one per line
    Run {
        /// Script path; blank lines and lines starting with # are skipped
        script: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    s.parse()
}

fn parse_filter(s: &str) -> Result<TaskFilter, String> {
    s.parse()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing; stdout belongs to the view
    let level = match cli.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(priority) = cli.priority {
        config.default_priority = priority;
    }
    if let Some(filter) = cli.filter {
        config.default_filter = filter;
    }
    if cli.no_color {
        config.color = false;
    }
    if !config.color {
        colored::control::set_override(false);
    }

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let stdin = io::stdin();
            run_session(&config, stdin.lock(), &mut io::stdout(), true)?;
        }
        Commands::Run { script } => {
            let content =
                fs::read_to_string(&script).with_context(|| format!("Failed to read script {}", script.display()))?;
            run_session(&config, content.as_bytes(), &mut io::stdout(), false)?;
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
    }

    Ok(())
}
