//! Prompt templates and builders.
//!
//! Prompts are deterministic: the same item and config always produce the
//! same text, so a retried call hits the provider with an identical request.

use crate::types::config::EnrichConfig;
use crate::types::item::{ArtifactKind, ContentItem};

/// Template for featured-image prompts.
pub const FEATURED_IMAGE_PROMPT: &str = "Featured image for: {title}. {summary} \
Professional news article illustration, editorial style, no text overlays.";

/// Template for OG preview-image prompts.
pub const OG_IMAGE_PROMPT: &str = "Social media preview image for: {title}. {summary} \
Wide banner composition suitable for link previews, bold and legible at small sizes.";

/// Template for the tag-extraction completion call.
pub const TAG_PROMPT: &str = r#"Suggest topic tags for this news article.

Title: {title}
Article:
{body}

Return 5-10 short lowercase tags as a JSON array of strings, for example:
["tag one", "tag two", "tag three"]

Return only the array."#;

/// Clean and truncate to at most `n` characters.
///
/// Collapses runs of whitespace first so HTML-ish bodies don't waste the
/// budget on newlines and indentation.
pub fn clamp(s: &str, n: usize) -> String {
    let mut out = String::with_capacity(s.len().min(n));
    let mut count = 0usize;
    let mut last_space = true;
    for ch in s.chars() {
        if count >= n {
            break;
        }
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
                count += 1;
                last_space = true;
            }
        } else {
            out.push(ch);
            count += 1;
            last_space = false;
        }
    }
    out.trim_end().to_string()
}

/// Build the image-generation prompt for an item and artifact kind.
///
/// Uses the editorial excerpt when one exists, otherwise the body
/// truncated to the configured length.
pub fn build_image_prompt(item: &ContentItem, kind: ArtifactKind, config: &EnrichConfig) -> String {
    let summary = if item.excerpt.trim().is_empty() {
        clamp(&item.body, config.excerpt_len)
    } else {
        clamp(&item.excerpt, config.excerpt_len)
    };
    let template = match kind {
        ArtifactKind::Featured => FEATURED_IMAGE_PROMPT,
        ArtifactKind::Og => OG_IMAGE_PROMPT,
    };
    template
        .replace("{title}", &clamp(&item.title, 140))
        .replace("{summary}", &summary)
}

/// Build the tag-extraction prompt for an item.
pub fn build_tag_prompt(item: &ContentItem, config: &EnrichConfig) -> String {
    TAG_PROMPT
        .replace("{title}", &clamp(&item.title, 140))
        .replace("{body}", &clamp(&item.body, config.tag_body_len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_collapses_whitespace() {
        assert_eq!(clamp("  a \n\n b\tc  ", 100), "a b c");
    }

    #[test]
    fn test_clamp_truncates_to_char_count() {
        assert_eq!(clamp("abcdef", 3), "abc");
        // Multi-byte characters count as one.
        assert_eq!(clamp("ééééé", 2), "éé");
    }

    #[test]
    fn test_image_prompt_prefers_excerpt() {
        let config = EnrichConfig::default();
        let item = ContentItem::new(1, "DJI ships new drone")
            .with_body("Long body text that should not appear")
            .with_excerpt("Short editorial excerpt");
        let prompt = build_image_prompt(&item, ArtifactKind::Featured, &config);
        assert!(prompt.contains("Short editorial excerpt"));
        assert!(!prompt.contains("Long body text"));
    }

    #[test]
    fn test_image_prompt_falls_back_to_truncated_body() {
        let config = EnrichConfig::default();
        let body = "word ".repeat(200);
        let item = ContentItem::new(1, "Title").with_body(body);
        let prompt = build_image_prompt(&item, ArtifactKind::Og, &config);
        // 250-char budget, so nowhere near the full 1000-char body.
        assert!(prompt.len() < OG_IMAGE_PROMPT.len() + 140 + 260);
    }

    #[test]
    fn test_prompts_are_deterministic() {
        let config = EnrichConfig::default();
        let item = ContentItem::new(1, "Title").with_body("Body text");
        assert_eq!(
            build_image_prompt(&item, ArtifactKind::Featured, &config),
            build_image_prompt(&item, ArtifactKind::Featured, &config)
        );
        assert_eq!(
            build_tag_prompt(&item, &config),
            build_tag_prompt(&item, &config)
        );
    }

    #[test]
    fn test_tag_prompt_includes_title_and_body() {
        let config = EnrichConfig::default();
        let item = ContentItem::new(1, "GoPro earnings").with_body("Quarterly results...");
        let prompt = build_tag_prompt(&item, &config);
        assert!(prompt.contains("GoPro earnings"));
        assert!(prompt.contains("Quarterly results"));
        assert!(prompt.contains("JSON array"));
    }
}
