//! Script and stylesheet aggregation.

use crate::module::Module;
use apanel_domain::config::PanelSettings;
use html_escape::encode_double_quoted_attribute as attr;
use std::fmt::Write;

/// Ordered, de-duplicated script and stylesheet references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resources {
    pub js: Vec<String>,
    pub css: Vec<String>,
}

impl Resources {
    /// The overlay's own script and stylesheet.
    #[must_use]
    pub fn core(settings: &PanelSettings) -> Self {
        Self { js: vec![settings.script.clone()], css: vec![settings.stylesheet.clone()] }
    }

    /// Resources of every resource-providing module in the tree, depth first.
    #[must_use]
    pub fn for_modules(modules: &[Box<dyn Module>]) -> Self {
        modules.iter().fold(Self::default(), |acc, module| {
            let own = module.as_resource_provider().map_or_else(Self::default, |provider| Self {
                js: provider.javascript_files(),
                css: provider.css_files(),
            });
            let children = module
                .as_submodule_provider()
                .map_or_else(Self::default, |provider| Self::for_modules(provider.submodules()));
            acc.merge(own).merge(children)
        })
    }

    /// Appends `other`, skipping references already present.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for js in other.js {
            if !self.js.contains(&js) {
                self.js.push(js);
            }
        }
        for css in other.css {
            if !self.css.contains(&css) {
                self.css.push(css);
            }
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.js.is_empty() && self.css.is_empty()
    }

    /// `<link>` and `<script>` tags, each carrying the CSP nonce.
    #[must_use]
    pub fn to_html(&self, nonce: &str) -> String {
        let nonce = attr(nonce);
        let mut html = String::new();
        for css in &self.css {
            let _ = write!(html, r#"<link rel="stylesheet" href="{}" nonce="{nonce}">"#, attr(css));
        }
        for js in &self.js {
            let _ = write!(html, r#"<script src="{}" nonce="{nonce}"></script>"#, attr(js));
        }
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_first_occurrence() {
        let a = Resources { js: vec!["a.js".into(), "b.js".into()], css: vec!["a.css".into()] };
        let b = Resources { js: vec!["b.js".into(), "c.js".into()], css: vec!["a.css".into()] };

        let merged = a.merge(b);
        assert_eq!(merged.js, ["a.js", "b.js", "c.js"]);
        assert_eq!(merged.css, ["a.css"]);
    }

    #[test]
    fn tags_carry_nonce_and_escape() {
        let resources = Resources { js: vec!["/x.js?a=1&b=\"2\"".into()], css: vec!["/x.css".into()] };
        let html = resources.to_html("abc");

        assert!(html.starts_with(r#"<link rel="stylesheet" href="/x.css" nonce="abc">"#));
        assert!(html.contains(r#"<script src="/x.js?a=1&amp;b=&quot;2&quot;" nonce="abc"></script>"#));
    }

    #[test]
    fn core_resources_follow_settings() {
        let core = Resources::core(&PanelSettings::default());
        assert_eq!(core.js.len(), 1);
        assert_eq!(core.css.len(), 1);
        assert!(!core.is_empty());
    }
}
