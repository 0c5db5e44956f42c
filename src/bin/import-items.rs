use anyhow::Context;
use clap::Parser;
use openrpg::config::{self, StoreKind};
use openrpg::db::Db;
use openrpg::db::repo::{ItemFlatStore, ItemRepo, ItemRepository, ItemTreeStore};
use std::path::PathBuf;
use std::sync::Arc;

// cargo run --bin import-items -- --source data/items --layout tree

#[derive(Debug, Parser)]
#[command(
    name = "import-items",
    version,
    about = "Import a file based item catalog into the document store"
)]
struct Args {
    /// Directory holding the catalog (defaults to ITEMS_DIR)
    #[arg(long)]
    source: Option<PathBuf>,

    /// Layout of the source directory: "tree" or "flat"
    #[arg(long, default_value = "tree")]
    layout: StoreKind,

    /// DB URL (defaults to $DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cfg = config::Config::from_env()?;

    let source = args.source.unwrap_or_else(|| cfg.items_dir.clone());
    let reader: Box<dyn ItemRepo> = match args.layout {
        StoreKind::Tree => Box::new(ItemTreeStore::new(&source)),
        StoreKind::Flat => Box::new(ItemFlatStore::new(&source)),
        StoreKind::Document => anyhow::bail!("--layout must be tree or flat"),
    };

    let database_url = args
        .database_url
        .or(cfg.database_url)
        .context("no database url: pass --database-url or set DATABASE_URL")?;

    let db = Arc::new(Db::new(&database_url)?);
    db.init().await?;
    let target = ItemRepository::new(db.clone());

    let scan = reader
        .scan()
        .await
        .with_context(|| format!("cannot read catalog at {}", source.display()))?;

    for item in &scan.items {
        target
            .upsert(item)
            .await
            .with_context(|| format!("failed to store item {}", item.id))?;
    }

    db.close();

    println!("✓ Imported {} items from {}", scan.items.len(), source.display());
    if !scan.skipped.is_empty() {
        println!("  skipped {} records:", scan.skipped.len());
        for s in &scan.skipped {
            println!("    {}: {}", s.source, s.reason);
        }
    }

    Ok(())
}
