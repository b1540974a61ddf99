use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use tracing::{debug, info};

use crate::Result;
use crate::configuration::DatabaseSettings;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<PgConnection>>;

/// Builds a connection pool from the loaded database settings:
/// `POSTGRES_MAX_OPEN_CONN` bounds the pool size, `POSTGRES_MAX_IDLE_TIME`
/// bounds how long an idle connection is kept open.
pub fn create_pool_from_settings(settings: &DatabaseSettings) -> Result<DbPool> {
    let database_url = settings.connection_string();
    info!(host = %settings.host, database = %settings.database_name, "connecting to database");

    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .test_on_check_out(true)
        .max_size(settings.postgres_max_open_conn)
        .idle_timeout(Some(settings.postgres_max_idle_time))
        .build(manager)?;

    debug!("connection pool created: {:#?}", pool.state());
    Ok(pool)
}
