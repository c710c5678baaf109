use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;
use std::path::Path as FsPath;

use crate::server::routes::not_found;

#[derive(Embed)]
#[folder = "web/static"]
struct StaticAssets;

#[derive(Embed)]
#[folder = "web/templates"]
struct Templates;

const DEMO_TEMPLATE: &str = "demo.html";

/// Serve an embedded stylesheet or script under `/assets/`
pub async fn serve_static(Path(path): Path<String>) -> Response {
    let path = path.trim_start_matches('/');

    match <StaticAssets as Embed>::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => not_found().await.into_response(),
    }
}

/// Human-readable rendering of a label for the demo page
pub fn display_label(label: &str) -> &'static str {
    if label.eq_ignore_ascii_case("FAKE") {
        "Fake News"
    } else if label.eq_ignore_ascii_case("REAL") {
        "Real News"
    } else {
        "Unknown"
    }
}

/// Everything the demo page shows
#[derive(Debug, Clone, Copy)]
pub struct DemoPage<'a> {
    pub model_loaded: bool,
    pub model_path: &'a FsPath,
    pub prediction: Option<&'a str>,
    pub error: Option<&'a str>,
}

impl<'a> DemoPage<'a> {
    pub fn new(model_loaded: bool, model_path: &'a FsPath) -> Self {
        Self {
            model_loaded,
            model_path,
            prediction: None,
            error: None,
        }
    }

    pub fn with_prediction(mut self, label: &'a str) -> Self {
        self.prediction = Some(label);
        self
    }

    pub fn with_error(mut self, message: &'a str) -> Self {
        self.error = Some(message);
        self
    }

    /// Fill the embedded template. Every dynamic value is HTML-escaped.
    pub fn render(&self) -> String {
        let template = <Templates as Embed>::get(DEMO_TEMPLATE)
            .map(|file| String::from_utf8_lossy(&file.data).into_owned())
            .unwrap_or_else(|| FALLBACK_HTML.to_string());

        let status = if self.model_loaded {
            "Loaded"
        } else {
            "Not loaded"
        };

        template
            .replace("{{model_status_class}}", if self.model_loaded { "ok" } else { "pending" })
            .replace("{{model_status}}", status)
            .replace("{{model_path}}", &escape_html(&self.model_path.display().to_string()))
            .replace("{{result}}", &self.result_html())
    }

    fn result_html(&self) -> String {
        let mut html = String::new();

        if let Some(label) = self.prediction {
            html.push_str(&format!(
                r#"<div class="prediction" data-label="{}">Prediction: {}</div>"#,
                escape_html(label),
                display_label(label)
            ));
        }

        if let Some(error) = self.error {
            html.push_str(&format!(
                r#"<div class="error">Error: {}</div>"#,
                escape_html(error)
            ));
        }

        html
    }
}

/// Escape text for use in HTML element content and quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

// Used only when the template is missing from the build
const FALLBACK_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Fake News Detector Demo</title>
</head>
<body>
    <h1>Fake News Detection Demo</h1>
    <p>Model: <span class="{{model_status_class}}">{{model_status}}</span> ({{model_path}})</p>
    <form method="post" action="/predict-form">
        <input type="text" name="message" placeholder="Enter a news headline...">
        <button type="submit">Predict</button>
    </form>
    <div id="result">{{result}}</div>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_label_is_case_insensitive() {
        assert_eq!(display_label("FAKE"), "Fake News");
        assert_eq!(display_label("real"), "Real News");
        assert_eq!(display_label("satire"), "Unknown");
        assert_eq!(display_label(""), "Unknown");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#x27;y&#x27;&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_render_escapes_dynamic_values() {
        let path = FsPath::new("/srv/<models>/basic_classifier.json");
        let html = DemoPage::new(false, path)
            .with_prediction("<b>FAKE</b>")
            .with_error("bad & worse")
            .render();

        assert!(html.contains("Not loaded"));
        assert!(html.contains("/srv/&lt;models&gt;/basic_classifier.json"));
        assert!(html.contains("Prediction: Unknown"));
        assert!(html.contains("&lt;b&gt;FAKE&lt;/b&gt;"));
        assert!(html.contains("Error: bad &amp; worse"));
        assert!(!html.contains("<b>FAKE</b>"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_render_prediction() {
        let html = DemoPage::new(true, FsPath::new("model.json"))
            .with_prediction("REAL")
            .render();

        assert!(html.contains("Loaded"));
        assert!(html.contains("Prediction: Real News"));
        assert!(!html.contains(r#"class="error""#));
    }
}
