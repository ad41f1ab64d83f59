//! Rendering of structured minutes into editable markdown.
//!
//! The generation pipeline may store an artifact as a JSON object
//! (`title`, `summary`, `key_points`, `action_items`). The editor only
//! deals in markdown, so fetched content goes through [`to_markdown`] first.

use serde_json::Value;

const DEFAULT_TITLE: &str = "Minutes";

/// Markdown for fetched artifact content. JSON objects are rendered as
/// minutes; anything else is already markdown and is returned verbatim.
pub fn to_markdown(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => render(&Value::Object(map)),
        _ => raw.to_string(),
    }
}

pub fn render(content: &Value) -> String {
    let title = text_field(content, "title").unwrap_or(DEFAULT_TITLE);
    let summary = text_field(content, "summary").unwrap_or_default();

    let key_points = list_field(content, "key_points")
        .map(|p| format!("- {p}"))
        .collect::<Vec<_>>()
        .join("\n");
    let action_items = list_field(content, "action_items")
        .map(|p| format!("- [ ] {p}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!("# {title}\n\n{summary}\n\n## Key Points\n{key_points}\n\n## Action Items\n{action_items}\n")
}

fn text_field<'a>(content: &'a Value, key: &str) -> Option<&'a str> {
    content
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn list_field<'a>(content: &'a Value, key: &str) -> impl Iterator<Item = String> + 'a {
    content
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_structured_minutes() {
        let raw = r#"{
            "title": "Weekly sync",
            "summary": "Shipped the editor.",
            "key_points": ["autosave works", "undo is bounded"],
            "action_items": ["write docs", 42]
        }"#;
        insta::assert_snapshot!(to_markdown(raw).trim_end(), @r"
        # Weekly sync

        Shipped the editor.

        ## Key Points
        - autosave works
        - undo is bounded

        ## Action Items
        - [ ] write docs
        - [ ] 42
        ");
    }

    #[test]
    fn missing_fields_fall_back() {
        let md = to_markdown(r#"{"key_points": "not a list"}"#);
        assert!(md.starts_with("# Minutes\n"));
        assert!(md.contains("## Key Points\n\n"));
    }

    #[test]
    fn markdown_passes_through() {
        assert_eq!(to_markdown("# Already markdown"), "# Already markdown");
        assert_eq!(to_markdown("[1, 2]"), "[1, 2]");
    }
}
