use anyhow::Result;
use log::info;

use crate::config::AppConfig;
use crate::database;

pub struct SetupService {
    config: AppConfig,
}

impl SetupService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Recreates the score database from scratch. Existing data is lost.
    pub fn run(&self) -> Result<()> {
        let db_path = &self.config.store.database_path;
        info!("=== Resetting score database at {} ===", db_path);

        let pool = database::create_pool(db_path)?;
        let mut conn = database::get_connection(&pool)?;
        database::setup::reset_database(&mut conn)?;

        info!("=== Setup Complete ===");
        Ok(())
    }
}
