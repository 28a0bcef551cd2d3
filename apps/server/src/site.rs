//! A tiny stand-in for a CMS frontend.
//!
//! Pages and records carry visibility and start dates, so the preview settings of the
//! admin panel have something to act on. Every page publishes its [`PageContext`].

use apanel::kernel::request::{PageContext, RequestContext};
use axum::Extension;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::{DateTime, Utc};
use html_escape::encode_text;
use std::fmt::Write;

/// Frontend group that may see members-only records.
pub const MEMBERS_GROUP: u32 = 2;

#[derive(Debug)]
struct Record {
    title: &'static str,
    hidden: bool,
    group: Option<u32>,
}

#[derive(Debug)]
struct Page {
    id: u64,
    title: &'static str,
    hidden: bool,
    /// UNIX timestamp from which the page is published.
    starts_at: Option<i64>,
    records: &'static [Record],
}

const PAGES: &[Page] = &[
    Page {
        id: 1,
        title: "Home",
        hidden: false,
        starts_at: None,
        records: &[
            Record { title: "Welcome", hidden: false, group: None },
            Record { title: "Draft announcement", hidden: true, group: None },
            Record { title: "Members lounge", hidden: false, group: Some(MEMBERS_GROUP) },
        ],
    },
    Page {
        id: 2,
        title: "About",
        hidden: false,
        starts_at: None,
        records: &[Record { title: "Our team", hidden: false, group: None }],
    },
    Page {
        id: 3,
        title: "Unreleased product",
        hidden: true,
        starts_at: None,
        records: &[Record { title: "Specs", hidden: false, group: None }],
    },
    Page {
        id: 4,
        title: "New year sale",
        hidden: false,
        // 2030-01-01T00:00:00Z
        starts_at: Some(1_893_456_000),
        records: &[Record { title: "Everything half price", hidden: false, group: None }],
    },
];

/// What the visitor of this request may see.
#[derive(Debug, Clone)]
struct Visibility {
    now: DateTime<Utc>,
    hidden_pages: bool,
    hidden_records: bool,
    group: Option<u32>,
}

impl Visibility {
    fn from_context(context: Option<&RequestContext>) -> Self {
        context.map_or_else(
            || Self { now: Utc::now(), hidden_pages: false, hidden_records: false, group: None },
            |context| Self {
                now: context.access_time,
                hidden_pages: context.show_hidden_pages,
                hidden_records: context.show_hidden_records,
                group: context.simulated_user_group,
            },
        )
    }

    fn page(&self, page: &Page) -> bool {
        (!page.hidden || self.hidden_pages) && page.starts_at.is_none_or(|start| self.now.timestamp() >= start)
    }

    fn record(&self, record: &Record) -> bool {
        (!record.hidden || self.hidden_records) && record.group.is_none_or(|group| self.group == Some(group))
    }
}

pub async fn home(context: Option<Extension<RequestContext>>) -> Response {
    render(1, context.map(|Extension(context)| context))
}

pub async fn page(Path(id): Path<u64>, context: Option<Extension<RequestContext>>) -> Response {
    render(id, context.map(|Extension(context)| context))
}

fn render(id: u64, context: Option<RequestContext>) -> Response {
    let visibility = Visibility::from_context(context.as_ref());
    let Some(page) = PAGES.iter().find(|page| page.id == id && visibility.page(page)) else {
        return (StatusCode::NOT_FOUND, Html(document("Not found", "<p>Page not found.</p>"))).into_response();
    };

    let mut body = String::from("<nav><ul>");
    for entry in PAGES.iter().filter(|entry| visibility.page(entry)) {
        let _ = write!(body, r#"<li><a href="/page/{}">{}</a></li>"#, entry.id, encode_text(entry.title));
    }
    body.push_str("</ul></nav><main>");
    for record in page.records.iter().filter(|record| visibility.record(record)) {
        let _ = write!(body, "<article>{}</article>", encode_text(record.title));
    }
    body.push_str("</main>");

    if context.as_ref().is_some_and(|context| context.preview) {
        body.push_str(r#"<p class="preview-notice">Preview</p>"#);
    }

    let mut response = Html(document(page.title, &body)).into_response();
    response.extensions_mut().insert(PageContext::new(page.id));
    response
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{body}</body></html>",
        encode_text(title)
    )
}
