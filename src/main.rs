mod classifier;
mod cli;
mod config;
mod error;
mod export;
mod fmt;
mod locator;
mod models;
mod normalizer;
mod pipeline;
mod reader;
mod report;

use clap::Parser;

use cli::{Cli, Commands, ConfigCommands, ReportArgs, RulesCommands};

fn init_logging(verbose: bool) {
    let default = if verbose { "ccc=debug" } else { "ccc=info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config_path = config::resolve_path(cli.config.as_deref());

    let result = match cli.command.unwrap_or(Commands::Report(ReportArgs::default())) {
        Commands::Report(args) => cli::report::run(&config_path, args),
        Commands::Files { dir } => cli::files::run(&config_path, dir),
        Commands::Init { force } => cli::init::run(&config_path, force),
        Commands::Rules { command } => match command {
            RulesCommands::List => cli::rules::list(&config_path),
            RulesCommands::Add {
                pattern,
                key,
                qualified,
            } => cli::rules::add(&config_path, &pattern, key, qualified),
        },
        Commands::Config { command } => match command {
            ConfigCommands::Path => cli::config::path(&config_path),
            ConfigCommands::Show => cli::config::show(&config_path),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
