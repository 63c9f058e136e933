use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use identity_lib::{build_engine, config::Settings, policy::validate_password_strength, HashingEngine};
use std::io::{self, BufRead};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

/// Operator tooling for identity password hashes.
#[derive(Parser, Debug)]
#[command(name = "identity", version, about)]
struct Cli {
    /// TOML configuration file. Defaults to config.{toml,yaml,json} plus IDENTITY_* variables.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hash a password read from stdin with the configured default engine.
    Hash {
        /// Override the configured default engine (scrypt or argon2).
        #[arg(long)]
        engine: Option<String>,
    },
    /// Check a password read from stdin against a stored hash.
    Verify {
        /// Hash as stored, with or without an engine tag.
        hash: String,
    },
    /// Check a password read from stdin against the configured requirements.
    CheckPolicy,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Hash { engine } => {
            if let Some(engine) = engine {
                settings.hashing.default_engine = engine;
            }
            let engine = build_engine(&settings.hashing)?;
            let password = read_password()?;
            println!("{}", engine.hash(&password)?);
        },
        Command::Verify { hash } => {
            let engine = build_engine(&settings.hashing)?;
            let password = read_password()?;
            match engine.validate(&password, &hash) {
                Ok(()) => println!("ok"),
                Err(err) => {
                    tracing::debug!(error = %err, "verification failed");
                    bail!("password does not match");
                },
            }
        },
        Command::CheckPolicy => {
            let password = read_password()?;
            if !validate_password_strength(&password, &settings.password_requirements) {
                bail!(
                    "password does not meet the requirements (min length {})",
                    settings.password_requirements.min_length
                );
            }
            println!("ok");
        },
    }
    Ok(())
}

/// First line of stdin, without the line terminator.
fn read_password() -> Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading password from stdin")?;
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(line)
}
