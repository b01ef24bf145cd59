//! The extraction result record.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::FieldLimits;

/// Summary of a page, ready to pre-fill a project card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Page title, at most `max_title_chars` characters.
    pub title: String,
    /// Page description, at most `max_description_chars` characters.
    pub description: String,
    /// Absolute preview image URL.
    pub image_url: Option<String>,
    /// Absolute favicon URL.
    pub favicon: Option<String>,
    /// Detected technologies, without duplicates.
    pub technologies: Vec<String>,
    /// The normalized requested URL.
    pub source_url: String,
}

impl ExtractionResult {
    /// Converts to dictionary.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut dict = HashMap::new();
        dict.insert("title".to_string(), serde_json::json!(self.title));
        dict.insert("description".to_string(), serde_json::json!(self.description));
        dict.insert("imageUrl".to_string(), serde_json::json!(self.image_url));
        dict.insert("favicon".to_string(), serde_json::json!(self.favicon));
        dict.insert("technologies".to_string(), serde_json::json!(self.technologies));
        dict.insert("sourceUrl".to_string(), serde_json::json!(self.source_url));
        dict
    }
}

/// Raw extractor outputs before bounding.
#[derive(Debug, Clone, Default)]
pub struct ExtractedFields {
    /// Resolved title.
    pub title: String,
    /// Resolved description.
    pub description: String,
    /// Resolved image URL.
    pub image_url: Option<String>,
    /// Resolved favicon URL.
    pub favicon: Option<String>,
    /// Detected technologies.
    pub technologies: Vec<String>,
}

/// Merges extractor outputs into the final record.
///
/// Text fields are cut at a character count, not at a word boundary. Empty
/// URL fields become `None`.
#[must_use]
pub fn assemble(fields: ExtractedFields, source_url: &str, limits: FieldLimits) -> ExtractionResult {
    let mut technologies: Vec<String> = Vec::with_capacity(fields.technologies.len());
    for tech in fields.technologies {
        if !technologies.contains(&tech) {
            technologies.push(tech);
        }
    }

    ExtractionResult {
        title: truncate_chars(&fields.title, limits.max_title_chars),
        description: truncate_chars(&fields.description, limits.max_description_chars),
        image_url: fields.image_url.filter(|u| !u.is_empty()),
        favicon: fields.favicon.filter(|u| !u.is_empty()),
        technologies,
        source_url: source_url.to_string(),
    }
}

/// First `max` characters of `text`.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_truncates_description_to_limit() {
        let fields = ExtractedFields {
            description: "d".repeat(1000),
            ..Default::default()
        };
        let result = assemble(fields, "https://example.com/", FieldLimits::default());
        assert_eq!(result.description.chars().count(), 500);
    }

    #[test]
    fn test_truncates_title_by_characters() {
        let fields = ExtractedFields {
            title: "é".repeat(300),
            ..Default::default()
        };
        let result = assemble(fields, "https://example.com/", FieldLimits::default());
        assert_eq!(result.title.chars().count(), 200);
        assert_eq!(result.title.len(), 400);
    }

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(truncate_chars("short", 200), "short");
        assert_eq!(truncate_chars("", 5), "");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_empty_urls_become_none_and_dupes_collapse() {
        let fields = ExtractedFields {
            title: "T".to_string(),
            image_url: Some(String::new()),
            favicon: Some("https://example.com/favicon.ico".to_string()),
            technologies: vec!["React".into(), "Next.js".into(), "React".into()],
            ..Default::default()
        };
        let result = assemble(fields, "https://example.com/", FieldLimits::default());

        assert_eq!(result.image_url, None);
        assert_eq!(result.favicon.as_deref(), Some("https://example.com/favicon.ico"));
        assert_eq!(result.technologies, vec!["React", "Next.js"]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let result = ExtractionResult {
            title: "T".into(),
            source_url: "https://example.com/".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["sourceUrl"], "https://example.com/");
        assert_eq!(json["imageUrl"], serde_json::Value::Null);
        assert_eq!(result.to_dict().get("title"), Some(&serde_json::json!("T")));
    }
}
