//! The `Article` domain type: one item pulled from a feed's fetched document.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::articles;

pub type ArticleKey = Uuid;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Article {
    pub id: ArticleKey,
    pub title: String,
    pub link: String,
    pub description: String,
    pub published_at: String,
    pub feed_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An article as carried between the fetcher and the repository, before it
/// has been assigned an id or upserted. `link` is the natural key a feed's
/// articles are deduplicated on.
#[derive(Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewArticle {
    pub title: String,
    pub link: String,
    pub description: String,
    pub published_at: String,
    pub feed_id: Uuid,
}
