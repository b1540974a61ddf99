//! Repository for the single-row `config` table.

use diesel::prelude::*;
use std::time::Duration;

use crate::db::DbPool;
use crate::domain::config::{RssConfig, duration_to_pg_interval, pg_interval_to_duration};
use crate::schema::config::dsl as c;
use crate::{Error, ErrorKind, Result};

#[derive(Clone)]
pub struct ConfigRepo {
    pool: DbPool,
}

impl ConfigRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn get(&self) -> Result<RssConfig> {
        let mut conn = self.pool.get()?;
        c::config
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| Error::new(ErrorKind::ConfigNotFound, "config row not found"))
    }

    pub fn update_run_status(&self, run: bool) -> Result<()> {
        let mut conn = self.pool.get()?;
        diesel::update(c::config).set(c::run.eq(run)).execute(&mut conn)?;
        Ok(())
    }

    /// Persists `n` as the desired worker count and returns the value it
    /// replaced.
    pub fn update_worker_count(&self, n: i32) -> Result<i32> {
        let mut conn = self.pool.get()?;
        conn.transaction(|conn| -> diesel::result::QueryResult<i32> {
            let old: i32 = c::config.select(c::worker_count).first(conn)?;
            diesel::update(c::config)
                .set(c::worker_count.eq(n))
                .execute(conn)?;
            Ok(old)
        })
        .map_err(Into::into)
    }

    /// Persists `d` as the desired timer interval and returns the value it
    /// replaced.
    pub fn update_timer_interval(&self, d: Duration) -> Result<Duration> {
        let mut conn = self.pool.get()?;
        let new_interval = duration_to_pg_interval(d);
        conn.transaction(|conn| -> diesel::result::QueryResult<Duration> {
            let old = c::config.select(c::timer_interval).first(conn)?;
            diesel::update(c::config)
                .set(c::timer_interval.eq(new_interval))
                .execute(conn)?;
            Ok(pg_interval_to_duration(&old))
        })
        .map_err(Into::into)
    }
}
