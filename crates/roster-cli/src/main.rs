//! # roster
//!
//! Replays an IRC transcript into a presence store and prints the resulting
//! channel membership and identities as JSON.
//!
//! ## Usage
//!
//! ```bash
//! # Replay a capture file
//! roster session.log
//!
//! # Replay from stdin with a custom config
//! roster --config /path/to/roster.toml < session.log
//!
//! # Run with environment variables
//! ROSTER_NICK=mybot ROSTER_CASEMAPPING=rfc1459 roster session.log
//! ```

mod config;
mod metrics;
mod replay;

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parsed command line.
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    config: Option<PathBuf>,
    input: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut parsed = Args::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args.next().context("--config requires a path")?;
                    parsed.config = Some(PathBuf::from(path));
                }
                flag if flag.starts_with('-') && flag != "-" => bail!("Unknown option: {flag}"),
                "-" => parsed.input = None,
                path => parsed.input = Some(PathBuf::from(path)),
            }
        }
        Ok(parsed)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster=info,roster_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse(std::env::args().skip(1))?;

    // Load configuration
    let config = match &args.config {
        Some(path) => config::Config::from_file(path)?,
        None => config::Config::load()?,
    };

    tracing::info!(nick = %config.nick, casemapping = %config.casemapping, "Starting roster");

    let snapshot = replay::run_replay(config, args.input.as_deref()).await?;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args> {
        Args::parse(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn test_args() {
        assert_eq!(parse(&[]).unwrap(), Args::default());

        let args = parse(&["--config", "roster.toml", "session.log"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("roster.toml")));
        assert_eq!(args.input, Some(PathBuf::from("session.log")));

        assert_eq!(parse(&["-"]).unwrap().input, None);
        assert!(parse(&["--config"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
    }
}
