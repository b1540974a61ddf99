//! Transient shapes the fetcher deserializes an RSS 2.0 document into.
//!
//! Nothing here is persisted directly; the engine maps `RssItem` into
//! [`crate::domain::article::NewArticle`] once a feed's row id is known.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename = "rss")]
pub struct RssDocument {
    pub channel: Channel,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "item", default)]
    pub items: Vec<RssItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RssItem {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "pubDate", default)]
    pub pub_date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_rss_document() {
        let xml = r#"
            <rss version="2.0">
              <channel>
                <title>Example Feed</title>
                <description>An example</description>
                <item>
                  <title>First post</title>
                  <link>http://example.com/1</link>
                  <description>Hello</description>
                  <pubDate>Mon, 01 Jan 2026 00:00:00 GMT</pubDate>
                </item>
              </channel>
            </rss>
        "#;
        let doc: RssDocument = quick_xml::de::from_str(xml).expect("valid rss document");
        assert_eq!(doc.channel.title, "Example Feed");
        assert_eq!(doc.channel.items.len(), 1);
        assert_eq!(doc.channel.items[0].link, "http://example.com/1");
    }

    #[test]
    fn missing_item_list_is_empty() {
        let xml = r#"
            <rss version="2.0">
              <channel>
                <title>Empty Feed</title>
              </channel>
            </rss>
        "#;
        let doc: RssDocument = quick_xml::de::from_str(xml).expect("valid rss document");
        assert!(doc.channel.items.is_empty());
    }
}
