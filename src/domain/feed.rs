//! The `Feed` domain type: a registered RSS source.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::feeds;

pub type FeedKey = Uuid;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = feeds)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Feed {
    pub id: FeedKey,
    pub name: String,
    pub description: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Feed {
    /// A feed is stale once it has never been updated, or its last update
    /// falls outside the polling period.
    pub fn is_stale(&self, period: chrono::Duration, now: DateTime<Utc>) -> bool {
        match self.updated_at {
            None => true,
            Some(updated_at) => updated_at < now - period,
        }
    }
}

#[derive(Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = feeds)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewFeed {
    pub name: String,
    pub description: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_with_updated_at(updated_at: Option<DateTime<Utc>>) -> Feed {
        Feed {
            id: Uuid::new_v4(),
            name: "test".into(),
            description: "".into(),
            url: "http://example.com/rss".into(),
            created_at: Utc::now(),
            updated_at,
        }
    }

    #[test]
    fn never_updated_feed_is_stale() {
        let feed = feed_with_updated_at(None);
        assert!(feed.is_stale(chrono::Duration::minutes(5), Utc::now()));
    }

    #[test]
    fn recently_updated_feed_is_not_stale() {
        let feed = feed_with_updated_at(Some(Utc::now()));
        assert!(!feed.is_stale(chrono::Duration::minutes(5), Utc::now()));
    }

    #[test]
    fn old_update_makes_feed_stale() {
        let now = Utc::now();
        let feed = feed_with_updated_at(Some(now - chrono::Duration::minutes(10)));
        assert!(feed.is_stale(chrono::Duration::minutes(5), now));
    }

    /// `get_stale_feeds(p)` at wall-clock `t` must return exactly the feeds
    /// with `updated_at IS NULL OR updated_at < t - p`; `is_stale` is the
    /// in-memory half of that same predicate, so it should hold for any
    /// period and any age offset, not just the handful of cases above.
    #[quickcheck_macros::quickcheck]
    fn is_stale_matches_the_get_stale_feeds_predicate(period_secs: u32, age_offset_secs: i32) -> bool {
        let period = chrono::Duration::seconds(i64::from(period_secs));
        let now = Utc::now();
        let updated_at = now - chrono::Duration::seconds(i64::from(age_offset_secs));
        let feed = feed_with_updated_at(Some(updated_at));

        let expected = updated_at < now - period;
        feed.is_stale(period, now) == expected
    }
}
