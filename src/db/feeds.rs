//! Repository for the `feeds` table.

use chrono::Utc;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::feed::{Feed, NewFeed};
use crate::schema::feeds::dsl as f;
use crate::{Error, ErrorKind, Result};

#[derive(Clone)]
pub struct FeedRepo {
    pool: DbPool,
}

impl FeedRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn create(&self, new_feed: NewFeed) -> Result<Feed> {
        let mut conn = self.pool.get()?;
        diesel::insert_into(f::feeds)
            .values(&new_feed)
            .get_result(&mut conn)
            .map_err(Into::into)
    }

    /// Deletes the feed named `name`. Cascades to its articles. Fails with
    /// `FeedNotFound` if no such feed exists.
    pub fn delete(&self, name: &str) -> Result<()> {
        let mut conn = self.pool.get()?;
        let affected = diesel::delete(f::feeds.filter(f::name.eq(name))).execute(&mut conn)?;
        if affected == 0 {
            return Err(Error::new(ErrorKind::FeedNotFound, "feed is not exist"));
        }
        Ok(())
    }

    /// `limit == 0` returns every feed; otherwise the `limit` most recently
    /// created ones.
    pub fn list(&self, limit: i64) -> Result<Vec<Feed>> {
        let mut conn = self.pool.get()?;
        let mut query = f::feeds.order_by(f::created_at.desc()).into_boxed();
        if limit > 0 {
            query = query.limit(limit);
        }
        query.load(&mut conn).map_err(Into::into)
    }

    pub fn list_all(&self) -> Result<Vec<Feed>> {
        self.list(0)
    }

    pub fn exist(&self, name: &str) -> Result<bool> {
        let mut conn = self.pool.get()?;
        let count: i64 = f::feeds
            .filter(f::name.eq(name))
            .count()
            .get_result(&mut conn)?;
        Ok(count > 0)
    }

    /// Feeds whose `updated_at` is null, or older than `now - period`.
    pub fn get_stale_feeds(&self, period: chrono::Duration) -> Result<Vec<Feed>> {
        let mut conn = self.pool.get()?;
        let threshold = Utc::now() - period;
        f::feeds
            .filter(f::updated_at.is_null().or(f::updated_at.lt(threshold)))
            .load(&mut conn)
            .map_err(Into::into)
    }

    pub fn update_updated_at(&self, name: &str) -> Result<()> {
        let mut conn = self.pool.get()?;
        diesel::update(f::feeds.filter(f::name.eq(name)))
            .set(f::updated_at.eq(Some(Utc::now())))
            .execute(&mut conn)?;
        Ok(())
    }
}
