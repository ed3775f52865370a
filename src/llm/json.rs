//! Pull a JSON object out of free-form model output.

/// Return the JSON object text embedded in `response`.
///
/// Models wrap objects in markdown fences or surrounding prose; a fenced
/// block wins, otherwise the span from the first `{` to the last `}`.
pub fn extract_json_object(response: &str) -> Option<&str> {
    if let Some(fenced) = fenced_block(response) {
        let fenced = fenced.trim();
        if fenced.starts_with('{') && fenced.ends_with('}') {
            return Some(fenced);
        }
    }

    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}

fn fenced_block(response: &str) -> Option<&str> {
    let open = response.find("```")?;
    let after_open = &response[open + 3..];
    // Skip an info string such as `json`.
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_open[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_object_is_returned_as_is() {
        assert_eq!(extract_json_object(r#"{"a":1}"#), Some(r#"{"a":1}"#));
    }

    #[test]
    fn fenced_block_is_preferred() {
        let response = "Here you go:\n```json\n{\"name\": \"Sunset\"}\n```\nAnything else? {x}";
        assert_eq!(extract_json_object(response), Some("{\"name\": \"Sunset\"}"));
    }

    #[test]
    fn prose_wrapped_object_uses_outer_braces() {
        let response = "Sure! {\"amount\": 1, \"inner\": {\"k\": 2}} hope that helps";
        assert_eq!(
            extract_json_object(response),
            Some("{\"amount\": 1, \"inner\": {\"k\": 2}}")
        );
    }

    #[test]
    fn no_object_yields_none() {
        assert_eq!(extract_json_object("I could not find any parameters."), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }
}
