use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

/// Maps a driver error onto the repository taxonomy. A unique violation on
/// the reference column is a recoverable conflict, anything else is fatal.
pub(crate) fn map_sqlx_error(err: sqlx::Error, pnr: &str) -> aerobook_core::RepositoryError {
    use aerobook_core::RepositoryError;

    let unique_violation = match &err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    };
    if unique_violation {
        RepositoryError::DuplicateReference(pnr.to_string())
    } else {
        RepositoryError::Unavailable(err.to_string())
    }
}
