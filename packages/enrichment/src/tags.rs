//! Tag extraction from free-form language-model output.
//!
//! Models asked for a JSON array of tags routinely wrap it in prose or
//! code fences, so extraction is a best-effort scan for the first
//! bracketed substring followed by a tolerant parse. Every failure path
//! returns [`EnrichError::Unparseable`]; nothing here can panic on
//! malformed input.

use serde::{Deserialize, Serialize};

use crate::error::{EnrichError, Result};

/// An ordered, de-duplicated set of short lowercase labels.
///
/// Entries are normalized on insert: trimmed, lowercased, never empty,
/// first occurrence wins ordering. Lowercasing makes the case-insensitive
/// dedup rule total; callers that need display casing re-style downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet {
    entries: Vec<String>,
}

impl TagSet {
    /// Create an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw labels, keeping at most `cap` entries.
    pub fn from_labels<I, S>(labels: I, cap: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for label in labels {
            if set.len() >= cap {
                break;
            }
            set.insert(label.as_ref());
        }
        set
    }

    /// Insert a label, normalizing it first.
    ///
    /// Returns false when the label normalizes to empty or is already
    /// present (case-insensitively).
    pub fn insert(&mut self, label: &str) -> bool {
        let normalized = label.trim().to_lowercase();
        if normalized.is_empty() || self.entries.contains(&normalized) {
            return false;
        }
        self.entries.push(normalized);
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        let needle = label.trim().to_lowercase();
        self.entries.contains(&needle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<String> {
        self.entries
    }
}

impl FromIterator<String> for TagSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::new();
        for label in iter {
            set.insert(&label);
        }
        set
    }
}

/// Extract a tag set from raw model output, keeping at most `cap` entries.
///
/// Single bounded scan for the first `[...]` substring, then a JSON parse
/// of just that slice. Non-string array elements are skipped rather than
/// failing the whole extraction.
pub fn extract_tags(raw: &str, cap: usize) -> Result<TagSet> {
    let slice = first_bracketed(raw).ok_or(EnrichError::Unparseable)?;

    let values: Vec<serde_json::Value> =
        serde_json::from_str(slice).map_err(|_| EnrichError::Unparseable)?;
    if values.is_empty() {
        return Err(EnrichError::Unparseable);
    }

    let set = TagSet::from_labels(
        values.iter().filter_map(|v| v.as_str()),
        cap,
    );
    if set.is_empty() {
        return Err(EnrichError::Unparseable);
    }
    Ok(set)
}

/// Locate the first balanced `[...]` substring in one pass.
fn first_bracketed(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_array_wrapped_in_prose() {
        let raw = r#"Here are tags: ["drones","dji","review"]"#;
        let tags = extract_tags(raw, 10).unwrap();
        assert_eq!(tags.as_slice(), &["drones", "dji", "review"]);
    }

    #[test]
    fn test_no_brackets_is_unparseable() {
        let err = extract_tags("I could not find any tags.", 10).unwrap_err();
        assert!(matches!(err, EnrichError::Unparseable));
    }

    #[test]
    fn test_case_insensitive_dedup_lowercases() {
        let tags = extract_tags(r#"["Drone","drone","DJI"]"#, 10).unwrap();
        assert_eq!(tags.as_slice(), &["drone", "dji"]);
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_empty_array_is_unparseable() {
        assert!(matches!(
            extract_tags("Result: []", 10),
            Err(EnrichError::Unparseable)
        ));
    }

    #[test]
    fn test_whitespace_and_empty_entries_dropped() {
        let tags = extract_tags(r#"["  gopro  ", "", "   "]"#, 10).unwrap();
        assert_eq!(tags.as_slice(), &["gopro"]);
    }

    #[test]
    fn test_non_string_elements_skipped() {
        let tags = extract_tags(r#"[1, "camera", null, {"x": 1}]"#, 10).unwrap();
        assert_eq!(tags.as_slice(), &["camera"]);
    }

    #[test]
    fn test_cap_applies() {
        let raw = r#"["a","b","c","d","e","f","g","h","i","j","k","l"]"#;
        let tags = extract_tags(raw, 10).unwrap();
        assert_eq!(tags.len(), 10);
    }

    #[test]
    fn test_code_fenced_array() {
        let raw = "```json\n[\"fpv\", \"racing\"]\n```";
        let tags = extract_tags(raw, 10).unwrap();
        assert_eq!(tags.as_slice(), &["fpv", "racing"]);
    }

    #[test]
    fn test_brackets_inside_strings_ignored() {
        let raw = r#"["open[claw]", "other"]"#;
        let tags = extract_tags(raw, 10).unwrap();
        assert_eq!(tags.as_slice(), &["open[claw]", "other"]);
    }

    #[test]
    fn test_malformed_json_is_unparseable() {
        assert!(matches!(
            extract_tags(r#"["unterminated"#, 10),
            Err(EnrichError::Unparseable)
        ));
    }

    #[test]
    fn test_non_list_is_unparseable() {
        // An object is not an array; the scan only accepts [...] slices,
        // and a bare scalar inside prose has no brackets at all.
        assert!(matches!(
            extract_tags(r#"{"tags": "none"}"#, 10),
            Err(EnrichError::Unparseable)
        ));
    }
}
