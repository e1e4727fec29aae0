use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// One social-media post as used by the pipeline.
///
/// `id` and `author_handle` are optional because the wire format does not
/// guarantee them; posts missing either are dropped at the template boundary
/// rather than rejected up front.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Post {
    pub id: Option<String>,
    pub author_handle: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub raw_text: String,
    #[serde(default)]
    pub entities: Entities,
}

/// Structured annotations pointing at substrings of `raw_text`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub mentions: Vec<Mention>,
    #[serde(default)]
    pub links: Vec<LinkEntity>,
}

/// A hashtag annotation. The label is the tag text without the `#`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tag {
    pub label: Option<String>,
}

/// A user-mention annotation. The handle is stored without the `@`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mention {
    pub handle: Option<String>,
}

/// A link annotation: the shortened URL as it appears in the text, the
/// expanded target, and the human-readable display form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkEntity {
    pub short_url: Option<String>,
    pub expanded_url: Option<String>,
    pub display_url: Option<String>,
}

/// One complete retrieved batch of posts plus its retrieval time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub posts: Vec<Post>,
    pub retrieved_at: i64,
}

impl Snapshot {
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            posts,
            retrieved_at: Utc::now().timestamp(),
        }
    }
}
