//! Census ingest binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store and loads the census CSV into it. Per-row problems are logged and do
//! not change the exit status.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use recensement_ingest::{Importer, IngestConfig};
use recensement_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Load the census CSV into the store")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Census file to ingest; overrides `input` from the configuration.
  #[arg(short, long)]
  input: Option<PathBuf>,

  /// SQLite database; overrides `store_path` from the configuration.
  #[arg(short, long)]
  store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("RECENSEMENT"))
    .build()
    .context("failed to read config file")?;

  let mut ingest_cfg: IngestConfig = settings
    .try_deserialize()
    .context("failed to deserialise IngestConfig")?;
  if let Some(input) = cli.input {
    ingest_cfg.input = Some(input);
  }
  if let Some(store) = cli.store {
    ingest_cfg.store_path = store;
  }

  let input = ingest_cfg
    .input
    .as_deref()
    .map(expand_tilde)
    .context("no census file: pass --input or set `input` in the config")?;
  let store_path = expand_tilde(&ingest_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let report = Importer::new(&store, ingest_cfg.dedup)
    .run(&input)
    .await
    .with_context(|| format!("failed to ingest {input:?}"))?;

  tracing::info!(
    inserted = report.cities_inserted,
    rejected = report.parse_rejects + report.inconsistent_rejects + report.store_failures,
    "done"
  );
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
