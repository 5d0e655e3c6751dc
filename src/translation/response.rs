/*!
 * Response sanitation.
 *
 * The service is asked for a bare JSON array of strings, but models sometimes
 * wrap it in markdown code fences or a sentence of prose. This module strips
 * such wrappers, parses the array leniently, and aligns the result with the
 * batch it answers.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use log::warn;

use crate::errors::ProviderError;
use crate::subtitle_processor::normalize_cue_text;

// @const: ```json ... ``` (language tag optional)
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\n?(.*?)\n?[ \t]*```$").expect("code fence regex is valid")
});

/// Remove markdown fences and surrounding prose from a model reply
///
/// Returns the trimmed text between the outermost `[` and `]` when the reply
/// is not already bare JSON.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();

    let unfenced = match CODE_FENCE.captures(trimmed).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    };

    if unfenced.starts_with('[') || unfenced.starts_with('{') {
        return unfenced;
    }

    match (unfenced.find('['), unfenced.rfind(']')) {
        (Some(start), Some(end)) if start < end => &unfenced[start..=end],
        _ => unfenced,
    }
}

/// Parse a model reply into an ordered list of translations
///
/// Accepts a JSON array (or an object holding one under `translations`).
/// Numbers and booleans are converted to text and `null` becomes an empty
/// string, which the caller treats as a missing translation.
pub fn parse_translations(raw: &str) -> Result<Vec<String>, ProviderError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(ProviderError::ParseError("Empty response text".to_string()));
    }

    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| ProviderError::ParseError(format!("Response is not valid JSON: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("translations") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ProviderError::ParseError(
                    "Expected a JSON array of strings, got an object".to_string(),
                ));
            }
        },
        other => {
            return Err(ProviderError::ParseError(format!(
                "Expected a JSON array of strings, got: {}",
                other
            )));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) => Ok(s),
            Value::Null => Ok(String::new()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            _ => Err(ProviderError::ParseError(format!(
                "Item {} of the response is not a string",
                i
            ))),
        })
        .collect()
}

/// Line up translations with their source texts
///
/// The result always has the same length as `sources`. Each translation goes
/// through `normalize_cue_text` so it cannot break the cue it lands in.
/// Missing or blank positions keep the source text; surplus translations are
/// ignored.
pub fn align_translations(sources: &[String], translations: Vec<String>) -> Vec<String> {
    if translations.len() != sources.len() {
        warn!(
            "Translation count mismatch: expected {}, got {}",
            sources.len(),
            translations.len()
        );
    }

    let mut translations = translations.into_iter();
    sources
        .iter()
        .map(|source| {
            let translated = translations.next().map(|t| normalize_cue_text(&t)).unwrap_or_default();
            if translated.is_empty() { source.clone() } else { translated }
        })
        .collect()
}
