//! Utilities for extracting structured data from generated responses.
//!
//! Responses often wrap JSON in markdown code fences or surround it with
//! explanatory text even when JSON output was requested.

use retell_error::JsonError;

/// Extract JSON from a response that may contain markdown or extra text.
///
/// Strategies, in order:
/// 1. Markdown code blocks: ```json ... ``` (or an unlabelled fence)
/// 2. Whichever balanced structure (`{ ... }` or `[ ... ]`) opens first
///
/// # Errors
///
/// Returns a [`JsonError`] if no JSON structure is found.
///
/// # Examples
///
/// ```
/// use retell_narrative::extract_json;
///
/// let response = "Here is the mapping:\n```json\n{\"characters\": {}}\n```\n";
/// assert_eq!(extract_json(response).unwrap(), "{\"characters\": {}}");
/// ```
pub fn extract_json(response: &str) -> Result<String, JsonError> {
    if let Some(json) = extract_from_code_block(response) {
        return Ok(json);
    }

    let bracket_pos = response.find('[');
    let brace_pos = response.find('{');

    let found = match (bracket_pos, brace_pos) {
        (Some(b_pos), Some(c_pos)) if b_pos < c_pos => extract_balanced(response, '[', ']')
            .or_else(|| extract_balanced(response, '{', '}')),
        (Some(_), None) => extract_balanced(response, '[', ']'),
        _ => extract_balanced(response, '{', '}')
            .or_else(|| extract_balanced(response, '[', ']')),
    };

    found.ok_or_else(|| {
        tracing::warn!(
            response_length = response.len(),
            "No JSON found in generated response"
        );
        JsonError::new(format!(
            "No JSON found in response (length: {})",
            response.len()
        ))
    })
}

/// Content of the first markdown code block, with any language tag skipped.
///
/// A missing closing fence (truncated response) yields everything after the
/// opening fence.
fn extract_from_code_block(response: &str) -> Option<String> {
    let start = response.find("```")?;
    let content_start = start + 3;
    let skip_to = response[content_start..]
        .find('\n')
        .map(|n| content_start + n + 1)
        .unwrap_or(content_start);

    let body = match response[skip_to..].find("```") {
        Some(end) => &response[skip_to..skip_to + end],
        None => &response[skip_to..],
    };
    let body = body.trim();
    (!body.is_empty()).then(|| body.to_string())
}

/// Extract content between balanced delimiters, ignoring delimiters inside
/// string literals.
fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(response[start..start + i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse a JSON string into `T`.
///
/// # Errors
///
/// Returns a [`JsonError`] carrying the parser message and a short preview.
///
/// # Examples
///
/// ```
/// use retell_narrative::parse_json;
///
/// let terms: Vec<String> = parse_json(r#"["sword", "castle"]"#).unwrap();
/// assert_eq!(terms.len(), 2);
/// ```
pub fn parse_json<T>(json_str: &str) -> Result<T, JsonError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(json_str).map_err(|e| {
        let preview = json_str.chars().take(100).collect::<String>();
        tracing::debug!(error = %e, json_preview = %preview, "JSON parsing failed");
        JsonError::new(format!("Failed to parse JSON: {} (JSON: {}...)", e, preview))
    })
}

/// Extract the first JSON structure from a response and parse it.
pub fn extract_and_parse<T>(response: &str) -> Result<T, JsonError>
where
    T: serde::de::DeserializeOwned,
{
    parse_json(&extract_json(response)?)
}
