//! CLI entry point for the van-tutor service.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{debug, info};
use van_tutor_core::config::{self, ServeOverrides, ServiceSettings, VerbositySetting};
use van_tutor_core::rate_limit::{RequestLimiter, spawn_sweeper};
use van_tutor_core::server::{self, AppState};
use van_tutor_core::text::normalize;
use van_tutor_core::topics::{TopicCatalog, TopicResolution, is_meaningful_topic};

mod cli;

use cli::{CheckArgs, Cli, Command, MatchArgs, ServeArgs};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();
    let loaded = config::load_config(cli.config.as_deref())?;

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config file > default (info)
    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => loaded
                .config
                .as_ref()
                .and_then(|cfg| cfg.verbosity)
                .map_or("info", VerbositySetting::filter_directive),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?cli, config_path = ?loaded.path, "CLI arguments parsed");

    match cli.command {
        Command::Serve(args) => run_serve(args, loaded.config.as_ref()).await,
        Command::Match(args) => run_match(&args, loaded.config.as_ref()),
        Command::Check(args) => Ok(run_check(&args)),
    }
}

async fn run_serve(args: ServeArgs, file: Option<&config::FileConfig>) -> Result<ExitCode> {
    let overrides = ServeOverrides {
        bind: args.bind,
        topics_file: args.topics_file,
        window_ms: args.window_ms,
        window_max: args.window_max,
        daily_max: args.daily_max,
        trust_proxy_headers: args.trust_proxy_headers.then_some(true),
    };
    let settings = ServiceSettings::resolve(file, &overrides)?;
    info!(
        bind = %settings.bind,
        window_ms = settings.policy.window.as_millis(),
        window_max = settings.policy.window_max,
        daily_max = settings.policy.daily_max,
        trust_proxy_headers = settings.trust_proxy_headers,
        "van-tutor starting"
    );

    let catalog = load_catalog(settings.topics_file.as_deref())?;
    let state = AppState::new(catalog, RequestLimiter::new(settings.policy))
        .with_trusted_proxy_headers(settings.trust_proxy_headers);
    let sweeper = spawn_sweeper(state.limiter.clone(), settings.sweep_interval);

    let listener = TcpListener::bind(settings.bind)
        .await
        .with_context(|| format!("Cannot bind to {}", settings.bind))?;
    let result = server::serve(listener, state).await;
    sweeper.abort();
    result.map(|()| ExitCode::SUCCESS)
}

fn run_match(args: &MatchArgs, file: Option<&config::FileConfig>) -> Result<ExitCode> {
    let topics_file = args
        .topics_file
        .as_deref()
        .or_else(|| file.and_then(|cfg| cfg.topics_file.as_deref()));
    let catalog = load_catalog(topics_file)?;
    let resolution = catalog.resolve(&args.query, args.effective_limit());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(exit_code_for(&resolution));
    }

    match &resolution {
        TopicResolution::Rejected { normalized } => {
            println!("Query '{normalized}' is too short or not meaningful.");
        }
        TopicResolution::Ranked {
            candidates,
            best_match,
            ..
        } => {
            if candidates.is_empty() {
                println!("No matching topics for '{}'.", resolution.normalized());
            }
            for candidate in candidates {
                println!("{:.2}  {}", candidate.score, candidate.topic);
            }
            if let Some(best) = best_match {
                println!("Best match: {}", best.topic);
            }
        }
    }
    Ok(exit_code_for(&resolution))
}

fn run_check(args: &CheckArgs) -> ExitCode {
    let normalized = normalize(&args.query);
    if is_meaningful_topic(&args.query) {
        println!("normalized: {normalized}");
        println!("meaningful: yes");
        ExitCode::SUCCESS
    } else {
        println!("normalized: {normalized}");
        println!("meaningful: no");
        ExitCode::FAILURE
    }
}

fn load_catalog(path: Option<&std::path::Path>) -> Result<TopicCatalog> {
    match path {
        Some(path) => TopicCatalog::from_file(path),
        None => {
            debug!("using built-in curriculum topics");
            Ok(TopicCatalog::curriculum())
        }
    }
}

fn exit_code_for(resolution: &TopicResolution) -> ExitCode {
    if resolution.is_rejected() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
