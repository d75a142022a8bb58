pub mod config;
pub mod dnd;
pub mod onboard;
pub mod run;
pub mod settings;
pub mod stats;

use std::sync::Arc;

use zoneclock_core::{Config, SessionManager, SqliteStore, SystemClock};

/// Open the database named in the config, inside the data directory.
pub fn open_store(config: &Config) -> Result<Arc<SqliteStore>, Box<dyn std::error::Error>> {
    Ok(Arc::new(SqliteStore::open(&config.storage.database_file)?))
}

/// Session manager over the configured store, on the system clock.
pub fn open_session(config: &Config) -> Result<SessionManager, Box<dyn std::error::Error>> {
    Ok(SessionManager::new(open_store(config)?, Arc::new(SystemClock)))
}
