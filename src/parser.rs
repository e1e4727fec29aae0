use crate::post::{Entities, LinkEntity, Mention, Post, Tag};
use chrono::DateTime;
use serde::Deserialize;

/// Twitter's legacy timestamp format, e.g. "Wed Oct 10 20:19:24 +0000 2018".
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(Debug, Deserialize)]
struct RawPost {
    id_str: Option<String>,
    full_text: Option<String>,
    text: Option<String>,
    created_at: Option<String>,
    user: Option<RawUser>,
    #[serde(default)]
    entities: RawEntities,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    screen_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEntities {
    #[serde(default)]
    hashtags: Vec<RawHashtag>,
    #[serde(default)]
    user_mentions: Vec<RawMention>,
    #[serde(default)]
    urls: Vec<RawUrl>,
}

#[derive(Debug, Deserialize)]
struct RawHashtag {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMention {
    screen_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawUrl {
    url: Option<String>,
    expanded_url: Option<String>,
    display_url: Option<String>,
}

/// Parse a raw feed response body into posts.
///
/// The long and short text variants collapse into one field (`full_text`
/// wins). An unparseable `created_at` is treated as absent so the post still
/// renders, just without a date link.
pub fn parse_posts(body: &str) -> Result<Vec<Post>, serde_json::Error> {
    let raw: Vec<RawPost> = serde_json::from_str(body)?;
    Ok(raw.into_iter().map(convert).collect())
}

fn convert(raw: RawPost) -> Post {
    let raw_text = raw.full_text.or(raw.text).unwrap_or_default();

    let created_at = raw
        .created_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_str(s, CREATED_AT_FORMAT).ok());

    Post {
        id: raw.id_str,
        author_handle: raw.user.and_then(|u| u.screen_name),
        created_at,
        raw_text,
        entities: Entities {
            tags: raw
                .entities
                .hashtags
                .into_iter()
                .map(|h| Tag { label: h.text })
                .collect(),
            mentions: raw
                .entities
                .user_mentions
                .into_iter()
                .map(|m| Mention {
                    handle: m.screen_name,
                })
                .collect(),
            links: raw
                .entities
                .urls
                .into_iter()
                .map(|u| LinkEntity {
                    short_url: u.url,
                    expanded_url: u.expanded_url,
                    display_url: u.display_url,
                })
                .collect(),
        },
    }
}
