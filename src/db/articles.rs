//! Repository for the `articles` table.

use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::article::{Article, NewArticle};
use crate::schema::articles::dsl as a;
use crate::schema::feeds::dsl as f;
use crate::Result;

#[derive(Clone)]
pub struct ArticleRepo {
    pool: DbPool,
}

impl ArticleRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Upserts a batch of articles for `feed_id` in one transaction.
    /// Re-running with identical inputs is idempotent: conflicting `link`s
    /// are updated in place rather than duplicated.
    pub fn create_or_update(&self, feed_id: Uuid, items: Vec<NewArticle>) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get()?;
        conn.transaction(|conn| -> diesel::result::QueryResult<()> {
            for item in &items {
                debug_assert_eq!(item.feed_id, feed_id);
                diesel::insert_into(a::articles)
                    .values(item)
                    .on_conflict(a::link)
                    .do_update()
                    .set((
                        a::title.eq(&item.title),
                        a::description.eq(&item.description),
                        a::published_at.eq(&item.published_at),
                        a::updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(conn)?;
            }
            Ok(())
        })?;
        Ok(())
    }

    /// `limit == 0` returns every article for the named feed; otherwise the
    /// `limit` most recent by `published_at`.
    pub fn list(&self, feed_name: &str, limit: i64) -> Result<Vec<Article>> {
        let mut conn = self.pool.get()?;
        let mut query = a::articles
            .inner_join(f::feeds.on(a::feed_id.eq(f::id)))
            .filter(f::name.eq(feed_name))
            .select(Article::as_select())
            .order_by(a::published_at.desc())
            .into_boxed();
        if limit > 0 {
            query = query.limit(limit);
        }
        query.load(&mut conn).map_err(Into::into)
    }
}
