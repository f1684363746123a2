//! Voice content rendering
//!
//! Produces the XML document the voice provider fetches when a call
//! connects. The spoken text is derived from the alert context labels.

use std::collections::HashMap;

/// Build the spoken announcement for an alert
///
/// Underscores in identifiers are read out awkwardly by speech engines,
/// so they are replaced with spaces.
pub fn spoken_message(context: &HashMap<String, String>) -> String {
    let dag_id = label(context, "dag_id", "unknown pipeline");
    let task_id = label(context, "task_id", "unknown task");
    let state = label(context, "state", "failed");
    format!(
        "Attention. This is an automated alert. The task {} in pipeline {} has {}. \
         Please acknowledge this call and investigate immediately.",
        task_id, dag_id, state
    )
}

/// Render the full voice response document
pub fn voice_document(context: &HashMap<String, String>) -> String {
    let message = spoken_message(context);
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>",
            "<Response>",
            "<Say voice=\"alice\" language=\"en-US\">{msg}</Say>",
            "<Pause length=\"1\"/>",
            "<Say voice=\"alice\" language=\"en-US\">{msg}</Say>",
            "</Response>"
        ),
        msg = escape_xml(&message)
    )
}

fn label(context: &HashMap<String, String>, key: &str, fallback: &str) -> String {
    context
        .get(key)
        .filter(|v| !v.is_empty())
        .map_or_else(|| fallback.to_string(), |v| v.replace('_', " "))
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn context(dag: &str, task: &str, state: &str) -> HashMap<String, String> {
        HashMap::from([
            ("dag_id".to_string(), dag.to_string()),
            ("task_id".to_string(), task.to_string()),
            ("state".to_string(), state.to_string()),
        ])
    }

    #[test]
    fn test_spoken_message_replaces_underscores() {
        let msg = spoken_message(&context("etl_daily", "load_orders", "failed"));
        assert!(msg.contains("load orders"));
        assert!(msg.contains("etl daily"));
        assert!(!msg.contains('_'));
    }

    #[test]
    fn test_spoken_message_falls_back_on_missing_labels() {
        let msg = spoken_message(&HashMap::new());
        assert!(msg.contains("unknown pipeline"));
        assert!(msg.contains("unknown task"));
    }

    #[test]
    fn test_voice_document_says_twice_with_pause() {
        let doc = voice_document(&context("etl", "load", "failed"));
        assert!(doc.starts_with("<?xml"));
        assert_eq!(doc.matches("<Say").count(), 2);
        assert!(doc.contains("<Pause length=\"1\"/>"));
        assert!(doc.ends_with("</Response>"));
    }

    #[test]
    fn test_voice_document_escapes_markup() {
        let doc = voice_document(&context("a<b", "c&d", "failed"));
        assert!(doc.contains("a&lt;b"));
        assert!(doc.contains("c&amp;d"));
        assert!(!doc.contains("a<b"));
    }
}
