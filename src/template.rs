use crate::normalize::normalize_text;
use crate::post::Post;
use chrono::{Datelike, Local, Timelike};

/// Class on the container holding the rendered post list.
pub const POSTS_CLASS: &str = "wpc-tweets__tweets";
/// Class on each rendered post.
pub const POST_CLASS: &str = "wpc-tweets__tweet";
/// Class on the normalized-text paragraph.
pub const TEXT_CLASS: &str = "wpc-tweets__text";
/// Class on the permalink anchor.
pub const LINK_CLASS: &str = "wpc-tweets__link";

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Format a date as "{Month} {day}, {year}" with the month spelled out.
pub fn format_date<T: Datelike>(date: &T) -> String {
    format!(
        "{} {}, {}",
        MONTH_NAMES[date.month0() as usize],
        date.day(),
        date.year()
    )
}

/// Date plus ", {hour}:{minute}". No zero padding, matching the raw
/// numeric hour and minute.
pub fn format_date_time<T: Datelike + Timelike>(date: &T) -> String {
    format!("{}, {}:{}", format_date(date), date.hour(), date.minute())
}

/// Build the markup fragment for one post.
///
/// Returns an empty string when the post is unrenderable: empty normalized
/// text, missing id, or missing author handle. When `created_at` is present
/// the fragment ends with a permalink anchor showing the date, labeled with
/// the full date and time in the viewer's local timezone.
pub fn build_post_markup(post: &Post) -> String {
    let text = normalize_text(post);
    if text.is_empty() {
        return String::new();
    }

    let Some(id) = post.id.as_deref().filter(|s| !s.is_empty()) else {
        return String::new();
    };
    let Some(handle) = post.author_handle.as_deref().filter(|s| !s.is_empty()) else {
        return String::new();
    };

    let mut template = format!(r#"<p class="{TEXT_CLASS}">{text}</p>"#);

    if let Some(created_at) = &post.created_at {
        let local = created_at.with_timezone(&Local);
        let date = format_date(&local);
        let date_time = format_date_time(&local);
        let href = format!("https://twitter.com/{handle}/status/{id}");
        let aria_label = format!("Tweet from {date_time}");
        template.push_str(&format!(
            r#"<a class="{LINK_CLASS}" href="{href}" aria-label="{aria_label}">{date}</a>"#
        ));
    }

    format!(r#"<div class="{POST_CLASS}">{template}</div>"#)
}

/// Concatenate post markup, in order, for at most `limit` posts.
///
/// The limit bounds attempts, not successes: an unrenderable post inside the
/// window contributes nothing and is not replaced by a later one. `None` or
/// zero means no limit. Returns `None` when nothing rendered.
pub fn build_content_block(posts: &[Post], limit: Option<usize>) -> Option<String> {
    let attempt_count = match limit {
        Some(n) if n > 0 => n.min(posts.len()),
        _ => posts.len(),
    };

    let block: String = posts[..attempt_count]
        .iter()
        .map(build_post_markup)
        .collect();

    if block.is_empty() {
        None
    } else {
        Some(block)
    }
}
