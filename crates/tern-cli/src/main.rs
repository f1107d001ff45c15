//! The `tern` binary: a project-local command runner.
//!
//! A single executable placed at a repository root next to `tern.toml`.
//! Every developer and CI job runs the same vetted commands in the same
//! environments, on the host or inside docker containers.

use std::io::IsTerminal;
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tern_core::{constants, engine, HostSpawner, Invocation, Model};

mod init;
mod listing;
mod styles;

#[derive(Debug, Parser)]
#[command(name = "tern", version, disable_version_flag = true)]
#[command(about = "Project-local command runner: one config file, the same commands everywhere")]
#[command(styles = styles::get_clap_styles())]
struct Cli {
    /// Exact command to be executed, plus options passed through to it
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    command: Vec<String>,

    /// Force the command to run in specific container(s); "*" selects all
    #[arg(short = 'c', long = "container", value_name = "CONTAINER")]
    containers: Vec<String>,

    /// Verbose output
    #[arg(short, long)]
    debug: bool,

    /// Path to the actual config file
    #[arg(long, default_value = constants::CONFIG_FILE)]
    config: String,

    /// Show all containers, present in the config file
    #[arg(long = "containers")]
    list_containers: bool,

    /// Create and initialize the config file
    #[arg(long)]
    init: bool,

    /// Show the actual version of tern
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    if cli.debug {
        println!("[DEBUG] debug logging enabled");
    }

    if cli.init {
        std::process::exit(init::run(&cli.config)?);
    }

    if !Path::new(&cli.config).exists() {
        // A missing default config just means the project is not set up yet;
        // a missing explicit --config path is the user's mistake.
        if cli.config == constants::CONFIG_FILE {
            println!("Config is not created yet.");
            println!("Please initialize it with './tern --init'");
            std::process::exit(constants::EXIT_OK);
        }
        eprintln!(
            "file, which you tried to use as config, doesn't exist: '{}'",
            cli.config
        );
        std::process::exit(constants::EXIT_UNAVAILABLE);
    }

    let model = Model::load_from_file(&cli.config)?;
    info!(
        target: "tern",
        "loaded {} commands and {} containers from {}",
        model.commands.len(),
        model.containers.len(),
        cli.config
    );

    if cli.list_containers {
        std::process::exit(listing::containers(&model));
    }

    let Some((name, extra_args)) = cli.command.split_first() else {
        std::process::exit(listing::commands(&model));
    };

    let invocation = Invocation {
        command: name.clone(),
        extra_args: extra_args.to_vec(),
        containers: cli.containers.clone(),
        debug: cli.debug,
    };
    let stdin_is_tty = std::io::stdin().is_terminal();
    let code = engine::run(&model, &invocation, stdin_is_tty, &mut HostSpawner)?;
    std::process::exit(code);
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
