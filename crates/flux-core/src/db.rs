use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::DbConfig;
use crate::error::Result;

/// Open a connection pool from an explicitly constructed config.
///
/// Call once at process start and pass the handle down; close with
/// [`close`] at shutdown.
pub async fn connect(cfg: &DbConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(cfg.url.clone());

    options.max_connections(cfg.max_connections);
    options.min_connections(cfg.min_connections);
    options.connect_timeout(cfg.connect_timeout);
    options.acquire_timeout(cfg.acquire_timeout);
    options.idle_timeout(cfg.idle_timeout);
    options.sqlx_logging(cfg.sqlx_logging);

    Ok(Database::connect(options).await?)
}

pub async fn close(db: DatabaseConnection) -> Result<()> {
    db.close().await?;
    Ok(())
}
