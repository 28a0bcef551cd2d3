//! HTML building blocks for module panes and the overlay itself.
//!
//! Everything user-controlled goes through `html-escape`.

use crate::module::{Module, ModuleData, ModuleDataStorageCollection, module_path};
use apanel_domain::capabilities::Capabilities;
use crate::resources::Resources;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write;

/// A labelled checkbox bound to the module option `<module>_<option>`.
#[must_use]
pub fn checkbox(module: &str, option: &str, label: &str, checked: bool) -> String {
    let name = format!("{module}_{option}");
    format!(
        r#"<label class="apanel-field"><input type="hidden" name="{name}" value="0"><input type="checkbox" name="{name}" value="1"{}> {}</label>"#,
        if checked { " checked" } else { "" },
        text(label),
        name = attr(&name),
    )
}

/// A labelled text input bound to the module option `<module>_<option>`.
#[must_use]
pub fn text_input(module: &str, option: &str, label: &str, value: &str) -> String {
    let name = format!("{module}_{option}");
    format!(
        r#"<label class="apanel-field">{} <input type="text" name="{}" value="{}"></label>"#,
        text(label),
        attr(&name),
        attr(value),
    )
}

/// A `<dl>` of label/value pairs.
#[must_use]
pub fn definition_list<'a, I>(rows: I) -> String
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    let mut html = String::from(r#"<dl class="apanel-list">"#);
    for (label, value) in rows {
        let _ = write!(html, "<dt>{}</dt><dd>{}</dd>", text(label), text(&value));
    }
    html.push_str("</dl>");
    html
}

/// Everything the overlay template needs.
#[derive(Debug)]
pub struct PanelView<'a> {
    pub request_id: &'a str,
    pub nonce: &'a str,
    pub toggle_url: String,
    pub save_url: String,
    pub open: bool,
    pub core_resources: Resources,
    pub module_resources: Resources,
    pub modules: &'a [Box<dyn Module>],
    pub data: &'a ModuleDataStorageCollection,
    pub backend_link: Option<String>,
}

impl PanelView<'_> {
    /// Renders the overlay.
    ///
    /// The collapsed panel only carries the toggle and core resources; modules,
    /// settings and module resources appear once the panel is open.
    #[must_use]
    pub fn render(&self) -> String {
        let mut html = self.core_resources.to_html(self.nonce);
        let state = if self.open { "open" } else { "closed" };

        let _ = write!(
            html,
            r#"<div id="apanel" class="apanel apanel-{state}" data-request-id="{}">"#,
            attr(self.request_id)
        );
        let _ = write!(
            html,
            r#"<form class="apanel-toggle" method="post" action="{}"><button type="submit">Admin Panel</button></form>"#,
            attr(&self.toggle_url)
        );

        if self.open {
            html.push_str(&self.module_resources.to_html(self.nonce));
            html.push_str(r#"<div class="apanel-modules">"#);
            for module in self.modules.iter().filter(|m| m.as_main().is_some_and(|main| main.is_shown())) {
                self.render_module(&mut html, module.as_ref());
            }
            html.push_str("</div>");
            self.render_settings(&mut html);
            if let Some(link) = &self.backend_link {
                let _ = write!(
                    html,
                    r#"<a class="apanel-backend-link" href="{}" target="_blank">Edit in backend</a>"#,
                    attr(link)
                );
            }
        }

        html.push_str("</div>");
        html
    }

    fn render_module(&self, html: &mut String, module: &dyn Module) {
        let open = module.as_main().is_some_and(|main| main.is_open());
        let icon = module.as_main().map_or("", |main| main.icon_identifier());
        let _ = write!(
            html,
            r#"<section class="apanel-module{}" data-module="{}" data-icon="{}"><h2>{}</h2>"#,
            if open { " is-open" } else { "" },
            attr(module.identifier()),
            attr(icon),
            text(module.label()),
        );

        // Display parents get the captured data of the whole request.
        if module.capabilities().contains(Capabilities::DISPLAY_PARENT)
            && let Some(info) = module.as_short_info_provider()
        {
            let _ = write!(html, r#"<span class="apanel-short-info">{}</span>"#, text(&info.short_info(self.data)));
        }

        let path = module_path(None, module.identifier());
        self.render_content(html, module, &path);
        if let Some(provider) = module.as_submodule_provider() {
            for sub in provider.submodules() {
                let _ = write!(
                    html,
                    r#"<article class="apanel-submodule" data-module="{}"><h3>{}</h3>"#,
                    attr(sub.identifier()),
                    text(sub.label()),
                );
                self.render_content(html, sub.as_ref(), &module_path(Some(&path), sub.identifier()));
                html.push_str("</article>");
            }
        }
        html.push_str("</section>");
    }

    fn render_content(&self, html: &mut String, module: &dyn Module, path: &str) {
        if let Some(content) = module.as_content_provider() {
            let empty = ModuleData::new();
            let data = self.data.get(path).unwrap_or(&empty);
            html.push_str(&content.content(data));
        }
    }

    fn render_settings(&self, html: &mut String) {
        let settings: Vec<_> = self
            .modules
            .iter()
            .filter_map(|module| module.as_settings_provider().map(|s| (module, s)))
            .collect();
        if settings.is_empty() {
            return;
        }

        let _ = write!(html, r#"<form class="apanel-settings" method="post" action="{}">"#, attr(&self.save_url));
        for (module, provider) in settings {
            let _ = write!(
                html,
                r#"<fieldset data-module="{}"><legend>{}</legend>{}</fieldset>"#,
                attr(module.identifier()),
                text(module.label()),
                provider.page_settings(),
            );
        }
        html.push_str(r#"<button type="submit">Save</button></form>"#);
    }
}

/// Splices `markup` in front of the last `</body>` (matched case-insensitively).
///
/// Returns `None` when the document has no closing body tag.
#[must_use]
pub fn inject_before_body(document: &str, markup: &str) -> Option<String> {
    let position = document.to_ascii_lowercase().rfind("</body>")?;
    let mut html = String::with_capacity(document.len() + markup.len());
    html.push_str(&document[..position]);
    html.push_str(markup);
    html.push_str(&document[position..]);
    Some(html)
}
