use crate::render::DisplaySurface;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

const FADE_DURATION: Duration = Duration::from_millis(200);

/// In-memory display surface for hosts without a real display tree.
///
/// Holds the markup, class list, and attributes as plain strings; fades are
/// timed no-ops so transition pacing still matches a real host. With `echo`
/// on, every markup swap is written to stdout, which is what the bundled
/// binary uses as its "display".
pub struct TextSurface {
    markup: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    echo: bool,
}

impl TextSurface {
    pub fn new(echo: bool) -> Self {
        Self {
            markup: String::new(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            echo,
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

impl Default for TextSurface {
    fn default() -> Self {
        Self::new(false)
    }
}

#[async_trait]
impl DisplaySurface for TextSurface {
    fn inner_markup(&self) -> String {
        self.markup.clone()
    }

    fn set_inner_markup(&mut self, markup: &str) {
        self.markup = markup.to_string();
        if self.echo {
            println!("{markup}");
        }
    }

    fn add_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    fn wrap_template(&self, inner: &str) -> String {
        format!(
            r#"<div class="wpc-component wpc-component--tweets"><div class="wpc-component__area">{inner}</div></div>"#
        )
    }

    async fn fade_out(&mut self) {
        tokio::time::sleep(FADE_DURATION).await;
    }

    async fn fade_in(&mut self) {
        tokio::time::sleep(FADE_DURATION).await;
    }
}
