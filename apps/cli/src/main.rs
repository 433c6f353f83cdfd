//! # PageTurner CLI
//!
//! Command-line front-end for the PageTurner bookstore.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Command Startup                                   │
//! │                                                                         │
//! │  1. Parse arguments (clap)                                              │
//! │  2. Initialize logging ── tracing-subscriber, RUST_LOG or default       │
//! │  3. Load configuration ── defaults → client.toml → PAGETURNER_* env     │
//! │                           → --api-url / --data-dir flags                │
//! │  4. Open the store ────── data_dir on disk, shared with other           │
//! │                           `pageturner` processes                        │
//! │  5. Route guard ───────── Redirect → print route, exit 2                │
//! │  6. Run the command ───── errors → user message, non-zero exit          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod commands;
mod error;
mod state;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use pageturner_sync::ClientConfig;

use commands::Command;
use error::CliError;
use state::AppState;

#[derive(Debug, Parser)]
#[command(name = "pageturner", version, about = "PageTurner bookstore client")]
struct Cli {
    /// Config file (defaults to the platform config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, e.g. http://localhost:3000/api.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Where the cart and credential are kept.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<CliError>() {
            Some(cli_error) => {
                eprintln!("{}", cli_error.user_message());
                cli_error.exit_code()
            }
            None => {
                error!(error = ?e, "Command failed");
                eprintln!("error: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    info!(
        api = %config.api.base_url,
        auth_scheme = %config.api.auth_scheme,
        role_source = ?config.api.role_source,
        "Configuration loaded"
    );

    let state = AppState::open(config).context("failed to open local store")?;
    commands::dispatch(&state, cli.command, cli.json).await?;
    Ok(())
}

/// File and environment first, then command-line flags on top.
fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::load(cli.config.clone()).context("failed to load config")?;
    cli.apply_flags(&mut config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

impl Cli {
    fn apply_flags(&self, config: &mut ClientConfig) {
        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.storage.data_dir = Some(dir.clone());
        }
    }
}

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "warn,pageturner=info";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=pageturner_sync=trace` - Trace the REST client only
/// - Default: WARN, INFO for the pageturner crates
///
/// Logs go to stderr so `--json` output on stdout stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    subscriber(filter, std::io::stderr).init();
}

/// The fmt subscriber, with `filter` as its only level gate.
fn subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .finish()
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use tracing::Level;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_book_admin_flags() {
        let cli = Cli::try_parse_from([
            "pageturner",
            "books",
            "add",
            "--title",
            "Dune",
            "--author",
            "Frank Herbert",
            "--isbn",
            "9780441013593",
            "--price",
            "9.99",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Command::Books(commands::books::BooksCommand::Add(fields)) => {
                assert_eq!(fields.price, pageturner_core::Money::from_cents(999));
                assert_eq!(fields.stock, 0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parses_negative_cart_quantity() {
        let cli = Cli::try_parse_from(["pageturner", "cart", "set", "b1", "-1"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Cart(commands::cart::CartCommand::Set { quantity: -1, .. })
        ));
    }

    #[test]
    fn test_bad_price_is_rejected() {
        let result = Cli::try_parse_from([
            "pageturner",
            "books",
            "add",
            "--title",
            "t",
            "--author",
            "a",
            "--isbn",
            "i",
            "--price",
            "free",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_log_filter_is_applied() {
        let quiet = subscriber(EnvFilter::new(DEFAULT_LOG_FILTER), std::io::sink);
        tracing::subscriber::with_default(quiet, || {
            assert!(!tracing::enabled!(target: "hyper::proto", Level::TRACE));
            assert!(!tracing::enabled!(target: "reqwest::connect", Level::DEBUG));
            assert!(tracing::enabled!(target: "hyper::proto", Level::WARN));

            assert!(!tracing::enabled!(target: "pageturner_sync::client", Level::DEBUG));
            assert!(tracing::enabled!(target: "pageturner_sync::client", Level::INFO));
        });
    }

    #[test]
    fn test_log_filter_directives_are_honored() {
        let verbose = subscriber(EnvFilter::new("pageturner_sync=trace"), std::io::sink);
        tracing::subscriber::with_default(verbose, || {
            assert!(tracing::enabled!(target: "pageturner_sync::client", Level::TRACE));
            assert!(!tracing::enabled!(target: "hyper::proto", Level::WARN));
        });
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "pageturner",
            "--api-url",
            "https://books.example.com/api",
            "logout",
            "--data-dir",
            "/tmp/pageturner-test",
        ])
        .unwrap();

        let mut config = ClientConfig::default();
        cli.apply_flags(&mut config);
        assert_eq!(config.api.base_url, "https://books.example.com/api");
        assert_eq!(config.storage.data_dir, Some(PathBuf::from("/tmp/pageturner-test")));
        assert!(config.validate().is_ok());
    }
}
