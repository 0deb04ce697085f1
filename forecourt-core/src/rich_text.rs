//! Helpers for the CMS rich-text document format.

use serde_json::{json, Value};

/// The document a renderer receives when a rich-text field is empty.
pub fn empty_document() -> Value {
    json!({
        "nodeType": "document",
        "data": {},
        "content": []
    })
}

pub fn is_document(value: &Value) -> bool {
    value.get("nodeType").and_then(Value::as_str) == Some("document")
}

/// The field as a document, or the empty document.
pub fn document_or_empty(value: Option<&Value>) -> Value {
    match value {
        Some(v) if is_document(v) => v.clone(),
        _ => empty_document(),
    }
}

/// Every text node concatenated in document order.
pub fn plain_text(value: &Value) -> String {
    let mut out = String::new();
    collect_text(value, &mut out);
    out
}

fn collect_text(value: &Value, out: &mut String) {
    if value.get("nodeType").and_then(Value::as_str) == Some("text") {
        if let Some(text) = value.get("value").and_then(Value::as_str) {
            out.push_str(text);
        }
        return;
    }
    if let Some(Value::Array(children)) = value.get("content") {
        for child in children {
            collect_text(child, out);
        }
    }
}

/// First non-empty text node, used where a label may be authored as rich text.
pub fn first_text(value: &Value) -> Option<String> {
    if value.get("nodeType").and_then(Value::as_str) == Some("text") {
        return value
            .get("value")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
    }
    match value.get("content") {
        Some(Value::Array(children)) => children.iter().find_map(first_text),
        _ => None,
    }
}

/// A plain string, or the first text of a rich-text document.
pub fn label_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(v) if is_document(v) => first_text(v).unwrap_or_default(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> Value {
        json!({
            "nodeType": "paragraph",
            "data": {},
            "content": [{ "nodeType": "text", "value": text, "marks": [], "data": {} }]
        })
    }

    #[test]
    fn label_from_rich_text_takes_first_text() {
        let doc = json!({
            "nodeType": "document",
            "data": {},
            "content": [paragraph(" "), paragraph("Book a service"), paragraph("ignored")]
        });
        assert_eq!(label_text(Some(&doc)), "Book a service");
        assert_eq!(plain_text(&doc), " Book a serviceignored");
    }

    #[test]
    fn non_document_falls_back_to_empty() {
        assert_eq!(document_or_empty(Some(&json!("text"))), empty_document());
        assert_eq!(label_text(None), "");
    }
}
