//! # Community Forum Binary
//!
//! Assembles the forum store from settings and compile-time storage
//! features, runs one command against it, and saves before exiting.

mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use cf_configs::{LogFormat, LogSettings, Settings, StorageBackend, StorageSettings};
use cf_core::store::ForumStateStore;
use cf_core::traits::KvStore;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "storage-local")]
use cf_storage_local::LocalKvStore;

#[cfg(feature = "storage-memory")]
use cf_storage_memory::MemoryKvStore;

/// Community forum: browse, post, reply and vote from the terminal.
#[derive(Parser, Debug)]
#[command(name = "community-forum", version, about)]
struct Cli {
    /// Settings file (default: ./forum.toml when present).
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    init_tracing(&settings.log);

    let kv = open_storage(&settings.storage)?;
    let store = ForumStateStore::open(kv, settings.store_options()).await;

    let outcome = commands::run(&store, cli.command)?;
    print!("{}", outcome.text);

    if outcome.mutated {
        store.save().await.context("saving forum posts")?;
    }
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match log.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn open_storage(storage: &StorageSettings) -> anyhow::Result<Arc<dyn KvStore>> {
    match storage.backend {
        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            tracing::info!(data_dir = %storage.data_dir.display(), "using local storage");
            Ok(Arc::new(LocalKvStore::new(&storage.data_dir)))
        }
        #[cfg(feature = "storage-memory")]
        StorageBackend::Memory => {
            tracing::info!("using in-memory storage, posts will not outlive this run");
            Ok(Arc::new(MemoryKvStore::new()))
        }
        #[allow(unreachable_patterns)]
        other => anyhow::bail!("storage backend {other:?} is not compiled into this build"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_vote_on_comment() {
        let cli = Cli::try_parse_from([
            "community-forum",
            "--config",
            "alt.toml",
            "vote",
            "p1",
            "down",
            "--comment",
            "c2",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        assert!(matches!(
            cli.command,
            commands::Command::Vote { ref post, direction: cf_core::VoteDirection::Down, comment: Some(ref c) }
                if post == "p1" && c == "c2"
        ));
    }

    #[test]
    fn test_rejects_bad_direction() {
        assert!(Cli::try_parse_from(["community-forum", "vote", "p1", "sideways"]).is_err());
    }

    #[test]
    fn test_parses_feed_options() {
        let cli = Cli::try_parse_from([
            "community-forum",
            "posts",
            "newborn",
            "--tag",
            "mental-health",
            "--sort",
            "most-commented",
        ])
        .unwrap();
        match cli.command {
            commands::Command::Posts { community, tag, content, sort } => {
                assert_eq!(community, "newborn");
                assert_eq!(tag, Some(cf_core::PostTag::MentalHealth));
                assert_eq!(content, cf_core::ContentFilter::All);
                assert_eq!(sort, cf_core::PostSort::MostCommented);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
