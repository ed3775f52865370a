//! Process bootstrap for suiact.
//!
//! Loads env files before configuration resolves and installs the tracing
//! subscriber.
//!
//! File: `~/.suiact/.env` (standard dotenvy format)

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Path to the user-level env file.
pub fn suiact_env_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".suiact")
        .join(".env")
}

/// Load `./.env` and then `~/.suiact/.env`.
///
/// dotenvy never overwrites existing env vars, so the effective priority is:
///
///   explicit env vars > `./.env` > `~/.suiact/.env`
pub fn load_suiact_env() {
    let _ = dotenvy::dotenv();

    let path = suiact_env_path();
    if path.exists()
        && let Err(e) = dotenvy::from_path(&path)
    {
        eprintln!("warning: failed to load {}: {}", path.display(), e);
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "suiact=info,warn";

/// Install the global subscriber. Logs go to stderr so stdout stays free for
/// command output.
pub fn init_tracing(format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = match format {
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
        LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
        LogFormat::Json => registry.with(layer.json()).try_init(),
    };
    if let Err(e) = result {
        eprintln!("warning: tracing already initialised: {e}");
    }
}
