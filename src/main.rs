mod cli;
mod config;
mod core;

use crate::cli::{Cli, Commands};
use crate::core::{Engine, analysis, report};
use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let exit_code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RANKGATE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => init_config(cli.config.is_some()),
        command => {
            let cwd = std::env::current_dir()?;
            let loaded = config::load_config(cli.config.as_deref(), &cwd)?;
            if let Some(source) = &loaded.source {
                tracing::info!(path = %source.display(), "loaded config");
            }
            let engine = Engine::from_config(&loaded.config)?;
            let json = cli.json || loaded.config.general.json;
            run_command(&engine, command, json)
        }
    }
}

fn run_command(engine: &Engine, command: Commands, json: bool) -> Result<i32> {
    match command {
        Commands::Classify { score } => {
            emit(json, &engine.classify(score), report::print_classification)?;
        }
        Commands::Tier { name } => {
            emit(json, &engine.describe_tier(&name), report::print_tier)?;
        }
        Commands::Ladder => {
            emit(json, &engine.ladder_report(), report::print_ladder)?;
        }
        Commands::Plans => {
            emit(json, engine.plans.plans(), report::print_plans)?;
        }
        Commands::Quota(usage) => {
            let quota = engine.quota(&usage.plan, usage.lifetime_used, usage.monthly_used);
            emit(json, &quota, report::print_quota)?;
            if !quota.can_scan {
                return Ok(1);
            }
        }
        Commands::Markers { plan, total } => {
            let markers = engine.markers(&plan, total.unwrap_or(engine.total_markers));
            emit(json, &markers, report::print_markers)?;
        }
        Commands::Card {
            analysis: path,
            usage,
        } => {
            let analysis = analysis::read_analysis(&path)?;
            let card = engine.card(
                &analysis,
                &usage.plan,
                usage.lifetime_used,
                usage.monthly_used,
            );
            emit(json, &card, report::print_card)?;
        }
        Commands::Init => return init_config(false),
    }

    Ok(0)
}

fn init_config(config_flag: bool) -> Result<i32> {
    if config_flag {
        eprintln!("warning: --config is ignored by `rankgate init`; writing ./rankgate.toml");
    }

    let path = std::env::current_dir()?.join(config::CONFIG_FILE_NAME);
    config::write_default_config(&path)?;
    println!("created {}", path.display());
    Ok(0)
}

fn emit<T: Serialize + ?Sized>(
    json: bool,
    value: &T,
    print_human: fn(&T),
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print_human(value);
    }
    Ok(())
}
