use crate::post::Post;

/// Turn a post's raw text into linkified markup.
///
/// Three ordered passes over the evolving string: hashtags, then mentions,
/// then links. Each pass replaces only the first literal occurrence of its
/// entity's substring, so later passes see the already-substituted text.
/// Entities missing a required field are skipped; substrings that never
/// occur in the text (truncation, encoding drift) are left alone.
pub fn normalize_text(post: &Post) -> String {
    let mut text = post.raw_text.clone();
    if text.is_empty() {
        return text;
    }

    for tag in &post.entities.tags {
        let Some(label) = tag.label.as_deref() else {
            continue;
        };
        if label.is_empty() {
            continue;
        }
        let token = format!("#{label}");
        let url = format!(
            "https://twitter.com/search?q={}",
            urlencoding::encode(&label.to_lowercase())
        );
        let markup = format!(r#"<a href="{url}">{token}</a>"#);
        text = text.replacen(&token, &markup, 1);
    }

    for mention in &post.entities.mentions {
        let Some(handle) = mention.handle.as_deref() else {
            continue;
        };
        if handle.is_empty() {
            continue;
        }
        let token = format!("@{handle}");
        let markup = format!(r#"<a href="https://twitter.com/{handle}">{token}</a>"#);
        text = text.replacen(&token, &markup, 1);
    }

    for link in &post.entities.links {
        let (Some(short), Some(expanded), Some(display)) = (
            link.short_url.as_deref(),
            link.expanded_url.as_deref(),
            link.display_url.as_deref(),
        ) else {
            continue;
        };
        if short.is_empty() {
            continue;
        }
        let markup = format!(r#"<a href="{expanded}">{display}</a>"#);
        text = text.replacen(short, &markup, 1);
    }

    text
}
