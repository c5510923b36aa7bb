pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod output;
pub mod ranking;
pub mod services;
pub mod store;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

use crate::cli::{Command, OutputFormat, RankArgs, RecordArgs};
use crate::config::settings::AppConfig;
use crate::ranking::{RankingOptions, RankingRequest, RoundWindow, WindowLabels};
use crate::services::recording::ScoreEntry;
use crate::services::{RankingService, RecordingService, SetupService};

pub fn interpret() -> Cli {
    Cli::parse()
}

/// Environment-derived configuration with the global CLI overrides applied
pub fn load_config(cli: &Cli) -> AppConfig {
    let mut config = AppConfig::new();
    if let Some(path) = &cli.database {
        config.store.database_path = path.clone();
    }
    config
}

pub fn handle_setup(config: AppConfig) -> Result<()> {
    SetupService::new(config).run()
}

pub fn handle_record(config: AppConfig, args: &RecordArgs) -> Result<()> {
    let service = RecordingService::new(&config)?;
    service.record(&ScoreEntry {
        group_id: args.group,
        group_name: args.group_name.clone(),
        login: args.login.clone(),
        round: args.round,
        points: args.points,
    })
}

pub fn handle_rank(mut config: AppConfig, args: &RankArgs) -> Result<()> {
    if let Some(dir) = &args.cache_dir {
        config.cache.dir = dir.clone();
    }
    let service = RankingService::new(&config)?;
    let groups = service.resolve_groups(&args.groups)?;
    let request = RankingRequest::new(groups, window_from_args(args))
        .with_options(options_from_args(&config, args));

    let outcome = service.rank(&request);
    match args.format {
        OutputFormat::Json => {
            println!("{:#}", output::render_json(outcome.as_ref()));
        }
        OutputFormat::Table => {
            if let Ok(result) = &outcome {
                println!("{}", output::render_table(result));
            }
        }
    }

    outcome?;
    Ok(())
}

fn window_from_args(args: &RankArgs) -> RoundWindow {
    RoundWindow::from_bounds(
        args.from,
        args.to.unwrap_or(args.from),
        args.from_prev,
        args.to_prev,
    )
}

fn options_from_args(config: &AppConfig, args: &RankArgs) -> RankingOptions {
    let mut options = RankingOptions::from_settings(config);
    if let Some(namespace) = &args.namespace {
        options.namespace = namespace.clone();
    }
    if let Some(login) = &args.substitute {
        options.substitute_login = login.clone();
    }
    if let Some(points_max) = args.points_max {
        options.points_max = points_max;
    }
    options.cache_enabled = options.cache_enabled && !args.no_cache;
    options.labels = WindowLabels {
        current: args.label.clone(),
        previous: args.label_prev.clone(),
    };
    options
}
