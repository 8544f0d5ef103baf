//! HTML rendering of the conversation variables panel.

use std::fmt::Write as _;

use serde_json::Value;

use crate::upstream::ConversationVariable;

/// Panel heading.
const TITLE: &str = "Conversation Variables";

/// What the panel should show.
#[derive(Clone, Copy, Debug)]
pub enum PanelState<'a> {
    /// Variables are still being fetched.
    Loading,
    /// Fetch finished; `None` when the upstream sent no list at all.
    Ready(Option<&'a [ConversationVariable]>),
    /// Fetch failed with the given message.
    Failed(&'a str),
}

/// Render the panel as an HTML fragment.
#[must_use]
pub fn render_panel(state: PanelState<'_>) -> String {
    match state {
        PanelState::Loading => String::from(
            r#"<div class="convars-panel flex items-center justify-center h-full p-4 text-sm text-gray-500 bg-gray-50 border border-gray-200 rounded-lg shadow-sm"><div class="spin-loading" role="status" aria-label="Loading"></div></div>"#,
        ),
        PanelState::Ready(None) => render_empty(),
        PanelState::Ready(Some(variables)) if variables.is_empty() => render_empty(),
        PanelState::Ready(Some(variables)) => render_list(variables),
        PanelState::Failed(message) => format!(
            r#"<div class="convars-panel p-4 text-sm text-red-600 bg-gray-50 border border-gray-200 rounded-lg shadow-sm h-full"><h3 class="text-lg font-semibold mb-3 text-gray-700">{TITLE}</h3><p role="alert">{}</p></div>"#,
            html_escape(message)
        ),
    }
}

fn render_empty() -> String {
    format!(
        r#"<div class="convars-panel p-4 text-sm text-gray-500 bg-gray-50 border border-gray-200 rounded-lg shadow-sm h-full"><h3 class="text-lg font-semibold mb-3 text-gray-700">{TITLE}</h3><p>No variables available for this conversation.</p></div>"#
    )
}

fn render_list(variables: &[ConversationVariable]) -> String {
    let mut html = format!(
        r#"<div class="convars-panel p-4 bg-gray-50 border border-gray-200 rounded-lg shadow-sm h-full overflow-y-auto"><h3 class="text-lg font-semibold mb-3 text-gray-700">{TITLE}</h3><ul class="space-y-3">"#
    );

    for variable in variables {
        let name = if variable.name.is_empty() {
            "N/A"
        } else {
            variable.name.as_str()
        };

        let _ = write!(
            html,
            r#"<li data-id="{}" class="p-3 bg-white border border-gray-200 rounded-md shadow-sm"><div class="flex justify-between items-start"><span class="font-medium text-gray-800 break-all">{}</span>"#,
            html_escape(&variable.id),
            html_escape(name)
        );

        if !variable.value_type.is_empty() {
            let _ = write!(
                html,
                r#"<span class="text-xs text-gray-400 bg-gray-100 px-2 py-0.5 rounded-full">{}</span>"#,
                html_escape(&variable.value_type)
            );
        }

        let _ = write!(
            html,
            r#"</div><div class="mt-1 text-sm text-gray-600 break-all">{}</div>"#,
            html_escape(&display_value(&variable.value))
        );

        if let Some(description) = variable.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = write!(
                html,
                r#"<p class="text-xs text-gray-500 mt-2 italic border-t border-gray-100 pt-2">{}</p>"#,
                html_escape(description)
            );
        }

        html.push_str("</li>");
    }

    html.push_str("</ul></div>");
    html
}

/// Render a full page showing the loading panel, then swap in `fragment_url`.
#[must_use]
pub fn render_page(conversation_id: &str, fragment_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{TITLE} - {conversation}</title>
</head>
<body>
<div id="convars-root" data-fragment="{fragment}">{loading}</div>
<script>
(function () {{
  var root = document.getElementById("convars-root");
  fetch(root.dataset.fragment, {{ credentials: "same-origin" }})
    .then(function (res) {{ return res.text(); }})
    .then(function (html) {{ root.innerHTML = html; }})
    .catch(function (err) {{ root.textContent = String(err); }});
}})();
</script>
</body>
</html>
"#,
        conversation = html_escape(conversation_id),
        fragment = html_escape(fragment_url),
        loading = render_panel(PanelState::Loading),
    )
}

/// Stringify a JSON value the way a browser's `String(value)` would.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), js_number),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Format a finite number like JavaScript's `Number.prototype.toString()`.
fn js_number(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    if x < 0.0 {
        return format!("-{}", js_number(-x));
    }

    // Shortest round-trip digits, e.g. "1.2345e3".
    let sci = format!("{x:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let k = i64::try_from(digits.len()).unwrap_or(i64::MAX);
    let n = exp.parse::<i64>().unwrap_or(0) + 1;

    if k <= n && n <= 21 {
        let zeros = usize::try_from(n - k).unwrap_or(0);
        format!("{digits}{}", "0".repeat(zeros))
    } else if 0 < n && n <= 21 {
        let split = usize::try_from(n).unwrap_or(0);
        format!("{}.{}", &digits[..split], &digits[split..])
    } else if -6 < n && n <= 0 {
        let zeros = usize::try_from(-n).unwrap_or(0);
        format!("0.{}{digits}", "0".repeat(zeros))
    } else {
        let e = n - 1;
        let sign = if e < 0 { '-' } else { '+' };
        let (head, tail) = digits.split_at(1);
        if tail.is_empty() {
            format!("{head}e{sign}{}", e.abs())
        } else {
            format!("{head}.{tail}e{sign}{}", e.abs())
        }
    }
}

/// Escape text for HTML element content and quoted attributes.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
