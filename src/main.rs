use anyhow::Result;

use tournament_standings::cli::Command;
use tournament_standings::config::AppConfig;
use tournament_standings::{handle_rank, handle_record, handle_setup, interpret, load_config};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let cli = interpret();
    let config = load_config(&cli);
    execute_command(&cli.command, config)
}

fn execute_command(command: &Command, config: AppConfig) -> Result<()> {
    match command {
        Command::Setup => handle_setup(config),
        Command::Record(args) => handle_record(config, args),
        Command::Rank(args) => handle_rank(config, args),
    }
}
