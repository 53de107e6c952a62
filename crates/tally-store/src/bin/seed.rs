//! Seeds a local store with the demo dataset.
//!
//! Usage: `cargo run -p tally-store --bin seed [path/to/tally.db]`
//!
//! Without an argument the platform default data directory is used.
//! Existing expense data is left untouched unless `--force` is passed.

use std::path::PathBuf;

use tracing::{error, info};

use tally_store::config::StoreConfig;
use tally_store::local::LocalStore;
use tally_store::seed::{load_demo_data, should_load_demo_data};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let mut path: Option<PathBuf> = None;
    let mut force = false;
    for arg in &mut args {
        if arg == "--force" {
            force = true;
        } else {
            path = Some(PathBuf::from(arg));
        }
    }

    let path = match path.or_else(StoreConfig::default_path) {
        Some(path) => path,
        None => {
            error!("No store path given and no default data directory available");
            std::process::exit(1);
        }
    };

    info!(path = %path.display(), "Seeding local store");
    let store = LocalStore::open(StoreConfig::new(&path)).await;
    if !store.is_available() {
        error!(path = %path.display(), "Could not open store");
        std::process::exit(1);
    }

    if !force && !should_load_demo_data(&store).await {
        info!("Store already has expenses; pass --force to overwrite");
        return;
    }

    if load_demo_data(&store).await {
        let data = store.load().await;
        info!(
            expenses = data.expenses.len(),
            categories = data.categories.len(),
            budgets = data.budgets.len(),
            "Demo data loaded"
        );
    } else {
        error!("Failed to write demo data");
        std::process::exit(1);
    }
}
