use crate::template::POSTS_CLASS;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Class carried by the wrapper while the first paint settles.
pub const LOADING_CLASS: &str = "wpc-tweets--loading";
/// Class marking the terminal error display.
pub const ERROR_CLASS: &str = "wpc-tweets--error";
/// Fixed message shown when there is nothing to render at all.
pub const ERROR_MESSAGE: &str =
    r#"<p class="wpc-component__error-message">There was a problem loading the tweets.</p>"#;

/// How long the loading class stays on after the first paint.
const LOADING_CLEAR_DELAY: Duration = Duration::from_millis(200);

/// The display-tree primitives the reconciler drives. Provided by the
/// widget host; the crate ships [`crate::surface::TextSurface`] for hosts
/// without a real display tree.
#[async_trait]
pub trait DisplaySurface: Send {
    /// Current full markup, empty before the first paint.
    fn inner_markup(&self) -> String;
    fn set_inner_markup(&mut self, markup: &str);
    fn add_class(&mut self, class: &str);
    fn remove_class(&mut self, class: &str);
    fn set_attribute(&mut self, name: &str, value: &str);
    /// Embed content into the host's generic wrapper markup.
    fn wrap_template(&self, inner: &str) -> String;
    async fn fade_out(&mut self);
    async fn fade_in(&mut self);
}

/// Whether a render pass carries freshly fetched content or a cached
/// fallback forced through after a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPass {
    Fresh,
    CacheFallback,
}

/// Decides whether newly built content differs from what is displayed and
/// performs the matching transition.
pub struct Reconciler {
    surface: Box<dyn DisplaySurface>,
    error_mode: bool,
}

impl Reconciler {
    pub fn new(surface: Box<dyn DisplaySurface>) -> Self {
        Self {
            surface,
            error_mode: false,
        }
    }

    /// One-time host setup when the widget attaches.
    pub fn attach(&mut self) {
        self.surface.set_attribute("role", "complementary");
        self.surface.set_attribute("aria-live", "polite");
        self.surface.set_attribute("aria-label", "Tweets");
    }

    /// Update the display from a content block. Returns whether the display
    /// actually changed.
    ///
    /// No content is a no-op. The first paint writes markup directly and
    /// holds a loading class for a short delay; later passes compare the
    /// posts-container content by string equality and only on a difference
    /// fade out, swap, and fade back in. The result resolves only after the
    /// fade-in finishes.
    pub async fn reconcile(&mut self, block: Option<&str>, loading: bool, pass: RenderPass) -> bool {
        let Some(block) = block else {
            debug!(?pass, "no content to render");
            return false;
        };

        let wrapped = format!(r#"<div class="{POSTS_CLASS}">{block}</div>"#);
        let markup = self.surface.wrap_template(&wrapped);
        let current = self.surface.inner_markup();

        if current.is_empty() {
            self.surface.set_inner_markup(&markup);
            if loading {
                self.surface.add_class(LOADING_CLASS);
                tokio::time::sleep(LOADING_CLEAR_DELAY).await;
                self.surface.remove_class(LOADING_CLASS);
            }
            return true;
        }

        if extract_content_block(&current).as_deref() == Some(block) {
            debug!(?pass, "content unchanged, skipping render");
            return false;
        }

        self.surface.fade_out().await;
        self.surface.set_inner_markup(&markup);
        self.surface.fade_in().await;
        true
    }

    /// Switch to the terminal error display. Stays until the widget is
    /// reinitialized.
    pub fn show_error(&mut self) {
        self.error_mode = true;
        self.surface.add_class(ERROR_CLASS);
        let markup = self.surface.wrap_template(ERROR_MESSAGE);
        self.surface.set_inner_markup(&markup);
    }

    pub fn in_error_mode(&self) -> bool {
        self.error_mode
    }

    /// True before anything has been painted.
    pub fn display_is_empty(&self) -> bool {
        self.surface.inner_markup().is_empty()
    }
}

/// Pull the posts-container's inner content out of full wrapper markup.
/// This is the string the equality check runs against.
pub fn extract_content_block(markup: &str) -> Option<String> {
    let open_tag = format!(r#"<div class="{POSTS_CLASS}">"#);
    let start = markup.find(&open_tag)? + open_tag.len();
    let rest = &markup[start..];

    // Walk forward matching nested divs until the container closes.
    let mut pos = 0;
    let mut depth = 1;
    loop {
        let close = rest[pos..].find("</div>")?;
        match rest[pos..].find("<div") {
            Some(open) if open < close => {
                depth += 1;
                pos += open + 4;
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some(rest[..pos + close].to_string());
                }
                pos += close + 6;
            }
        }
    }
}
