//! CLI argument definitions using clap derive macros.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use van_tutor_core::server::MAX_MATCH_LIMIT;
use van_tutor_core::topics::DEFAULT_TOP_K;

/// Topic matching and request throttling for the literature tutor backend.
#[derive(Parser, Debug)]
#[command(name = "van-tutor")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/van-tutor/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Rank catalog topics against a query
    Match(MatchArgs),
    /// Show the normalized form of a query and whether it is meaningful
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Listen address
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Topics file, one topic per line
    #[arg(long)]
    pub topics_file: Option<PathBuf>,

    /// Short rate-limit window in milliseconds (1-3600000)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3_600_000))]
    pub window_ms: Option<u64>,

    /// Requests allowed per short window (1-100000)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100_000))]
    pub window_max: Option<u32>,

    /// Requests allowed per client per day (1-1000000)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=1_000_000))]
    pub daily_max: Option<u32>,

    /// Key clients by x-user-id / x-forwarded-for from a fronting proxy
    #[arg(long)]
    pub trust_proxy_headers: bool,
}

#[derive(Args, Debug, Clone)]
pub struct MatchArgs {
    /// Free-text topic query
    pub query: String,

    /// Topics file, one topic per line (defaults to the built-in curriculum)
    #[arg(long)]
    pub topics_file: Option<PathBuf>,

    /// Maximum candidates to print
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_K)]
    pub limit: usize,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Free-text topic query
    pub query: String,
}

impl MatchArgs {
    /// Limit clamped to the same range the HTTP API accepts.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_MATCH_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_serve_defaults() {
        let cli = Cli::try_parse_from(["van-tutor", "serve"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert!(args.bind.is_none());
        assert!(args.window_max.is_none());
        assert!(!args.trust_proxy_headers);
    }

    #[test]
    fn test_cli_serve_flags() {
        let cli = Cli::try_parse_from([
            "van-tutor",
            "serve",
            "--bind",
            "0.0.0.0:3000",
            "--window-ms",
            "1000",
            "--window-max",
            "2",
            "--daily-max",
            "50",
            "--trust-proxy-headers",
        ])
        .unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.bind, Some("0.0.0.0:3000".parse().unwrap()));
        assert_eq!(args.window_ms, Some(1000));
        assert_eq!(args.window_max, Some(2));
        assert_eq!(args.daily_max, Some(50));
        assert!(args.trust_proxy_headers);
    }

    #[test]
    fn test_cli_serve_zero_window_max_rejected() {
        let result = Cli::try_parse_from(["van-tutor", "serve", "--window-max", "0"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_verbose_is_global() {
        let cli = Cli::try_parse_from(["van-tutor", "check", "dam san", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_match_defaults_limit() {
        let cli = Cli::try_parse_from(["van-tutor", "match", "chu nguoi tu tu"]).unwrap();
        let Command::Match(args) = cli.command else {
            panic!("expected match");
        };
        assert_eq!(args.query, "chu nguoi tu tu");
        assert_eq!(args.limit, DEFAULT_TOP_K);
        assert!(!args.json);
    }

    #[test]
    fn test_match_effective_limit_is_clamped() {
        let cli = Cli::try_parse_from(["van-tutor", "match", "song", "-n", "500"]).unwrap();
        let Command::Match(args) = cli.command else {
            panic!("expected match");
        };
        assert_eq!(args.effective_limit(), MAX_MATCH_LIMIT);
    }

    #[test]
    fn test_cli_requires_subcommand() {
        let result = Cli::try_parse_from(["van-tutor"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Cli::try_parse_from(["van-tutor", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
