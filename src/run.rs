mod cli;
mod tui;

pub(crate) use cli::as_cli;
pub(crate) use tui::as_tui;

use anyhow::{Context, Result};

use crate::config::{DbLocation, Settings};
use crate::db::{PersistenceAdapter, SqliteStore};
use crate::proxy::{self, ProxyHandler};
use crate::session::Session;

/// Open the session on the configured store. A database that cannot be
/// opened degrades to memory-only storage.
pub(crate) fn open_session(settings: &Settings) -> Session {
    let adapter = match &settings.db {
        DbLocation::Volatile => PersistenceAdapter::volatile(),
        DbLocation::File(path) => match open_store(path) {
            Ok(store) => PersistenceAdapter::new(Box::new(store)),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    "storage unavailable, changes will not be saved: {e:#}"
                );
                PersistenceAdapter::volatile()
            }
        },
    };
    Session::open(adapter)
}

fn open_store(path: &std::path::Path) -> Result<SqliteStore> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
    }
    SqliteStore::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

/// Run the relay server until SIGINT/SIGTERM.
pub(crate) fn serve(settings: &Settings) -> Result<()> {
    let bind = settings.bind_addr()?;
    let handler = ProxyHandler::new(settings.gemini_key.clone(), settings.gemini_model.clone())?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(proxy::run_server(handler, bind))
}
