//! WordPress REST implementation of [`ContentStore`].
//!
//! Talks to `wp-json/wp/v2` with application-password basic auth. Posts
//! are the content items; generated images land in the media library and
//! are attached via `featured_media` or OG meta keys.
//!
//! The OG slot is written to two meta keys (the Yoast-specific one and a
//! generic one) because the downstream feed consumer reads both
//! conventions.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::error::{EnrichError, Result};
use crate::security::SecretString;
use crate::traits::store::ContentStore;
use crate::types::item::{ArtifactKind, ArtifactRef, ContentItem, EnrichmentStatus};

/// Generic OG image meta key.
const META_OG_IMAGE: &str = "og_image";
/// Media id backing the OG image, so reads can rebuild the ArtifactRef.
const META_OG_IMAGE_ID: &str = "og_image_id";
/// Yoast's OG image convention, kept in sync with the generic key.
const META_OG_IMAGE_YOAST: &str = "_yoast_wpseo_opengraph-image";

/// WordPress REST content store.
pub struct WordPressStore {
    client: Client,
    /// REST root, e.g. `https://example.com/wp-json`.
    api_base: String,
    user: String,
    app_password: SecretString,
}

#[derive(Deserialize)]
struct Rendered {
    #[serde(default)]
    rendered: String,
}

#[derive(Deserialize)]
struct WpPost {
    id: u64,
    title: Rendered,
    #[serde(default)]
    content: Option<Rendered>,
    #[serde(default)]
    excerpt: Option<Rendered>,
    #[serde(default)]
    featured_media: u64,
    #[serde(default)]
    meta: serde_json::Value,
}

#[derive(Deserialize)]
struct WpPostSlim {
    id: u64,
    #[serde(default)]
    featured_media: u64,
    #[serde(default)]
    meta: serde_json::Value,
}

#[derive(Deserialize)]
struct WpMedia {
    id: u64,
    source_url: String,
}

#[derive(Deserialize)]
struct WpTerm {
    id: u64,
    name: String,
}

fn store_err(context: &str, err: impl std::fmt::Display) -> EnrichError {
    EnrichError::Store(format!("{context}: {err}").into())
}

fn meta_str(meta: &serde_json::Value, key: &str) -> Option<String> {
    meta.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

impl WordPressStore {
    pub fn new(
        api_base: impl Into<String>,
        user: impl Into<String>,
        app_password: impl Into<SecretString>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            user: user.into(),
            app_password: app_password.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/wp/v2/{path}", self.api_base)
    }

    async fn update_post(&self, id: u64, body: serde_json::Value) -> Result<()> {
        let response = self
            .client
            .post(self.url(&format!("posts/{id}")))
            .basic_auth(&self.user, Some(self.app_password.expose()))
            .json(&body)
            .send()
            .await
            .map_err(|e| store_err("post update failed", e))?;
        if !response.status().is_success() {
            return Err(store_err(
                "post update rejected",
                response.status(),
            ));
        }
        Ok(())
    }

    /// Names of the tags currently attached to a post.
    async fn post_tag_names(&self, id: u64) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.url("tags"))
            .basic_auth(&self.user, Some(self.app_password.expose()))
            .query(&[("post", id.to_string()), ("per_page", "100".to_string())])
            .send()
            .await
            .map_err(|e| store_err("tag listing failed", e))?;
        if !response.status().is_success() {
            return Err(store_err("tag listing rejected", response.status()));
        }
        let terms: Vec<WpTerm> = response
            .json()
            .await
            .map_err(|e| store_err("tag listing parse failed", e))?;
        Ok(terms.into_iter().map(|t| t.name).collect())
    }

    /// Find or create a tag term, returning its id.
    async fn ensure_tag(&self, name: &str) -> Result<u64> {
        let response = self
            .client
            .get(self.url("tags"))
            .basic_auth(&self.user, Some(self.app_password.expose()))
            .query(&[("search", name)])
            .send()
            .await
            .map_err(|e| store_err("tag search failed", e))?;
        if response.status().is_success() {
            let terms: Vec<WpTerm> = response
                .json()
                .await
                .map_err(|e| store_err("tag search parse failed", e))?;
            if let Some(term) = terms
                .iter()
                .find(|t| t.name.eq_ignore_ascii_case(name))
            {
                return Ok(term.id);
            }
        }

        let response = self
            .client
            .post(self.url("tags"))
            .basic_auth(&self.user, Some(self.app_password.expose()))
            .json(&json!({ "name": name }))
            .send()
            .await
            .map_err(|e| store_err("tag creation failed", e))?;
        if !response.status().is_success() {
            return Err(store_err("tag creation rejected", response.status()));
        }
        let term: WpTerm = response
            .json()
            .await
            .map_err(|e| store_err("tag creation parse failed", e))?;
        Ok(term.id)
    }

    async fn list_slim_posts(&self) -> Result<Vec<WpPostSlim>> {
        let response = self
            .client
            .get(self.url("posts"))
            .basic_auth(&self.user, Some(self.app_password.expose()))
            .query(&[
                ("context", "edit"),
                ("per_page", "100"),
                ("_fields", "id,featured_media,meta"),
            ])
            .send()
            .await
            .map_err(|e| store_err("post listing failed", e))?;
        if !response.status().is_success() {
            return Err(store_err("post listing rejected", response.status()));
        }
        response
            .json()
            .await
            .map_err(|e| store_err("post listing parse failed", e))
    }

    fn slim_missing(post: &WpPostSlim, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::Featured => post.featured_media == 0,
            ArtifactKind::Og => meta_str(&post.meta, META_OG_IMAGE).is_none(),
        }
    }

    fn status_meta_key(kind: ArtifactKind) -> String {
        format!("enrich_status_{kind}")
    }
}

#[async_trait]
impl ContentStore for WordPressStore {
    async fn get_item(&self, id: u64) -> Result<Option<ContentItem>> {
        let response = self
            .client
            .get(self.url(&format!("posts/{id}")))
            .basic_auth(&self.user, Some(self.app_password.expose()))
            // Edit context exposes meta fields hidden from anonymous reads.
            .query(&[("context", "edit")])
            .send()
            .await
            .map_err(|e| store_err("post fetch failed", e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(store_err("post fetch rejected", response.status()));
        }
        let post: WpPost = response
            .json()
            .await
            .map_err(|e| store_err("post parse failed", e))?;

        let featured = (post.featured_media != 0).then(|| ArtifactRef {
            id: post.featured_media,
            // Resolving the media URL takes a second request; the
            // orchestrator only needs presence and id here.
            url: String::new(),
        });
        let og = meta_str(&post.meta, META_OG_IMAGE).map(|url| ArtifactRef {
            id: post
                .meta
                .get(META_OG_IMAGE_ID)
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
            url,
        });
        let tags = self.post_tag_names(id).await?;

        Ok(Some(ContentItem {
            id: post.id,
            title: post.title.rendered,
            body: post.content.map(|c| c.rendered).unwrap_or_default(),
            excerpt: post.excerpt.map(|e| e.rendered).unwrap_or_default(),
            featured,
            og,
            tags,
        }))
    }

    async fn store_media(
        &self,
        item_id: u64,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<ArtifactRef> {
        let filename = format!(
            "enriched-{item_id}.{}",
            extension_for(content_type)
        );
        let response = self
            .client
            .post(self.url("media"))
            .basic_auth(&self.user, Some(self.app_password.expose()))
            .header(
                "Content-Disposition",
                format!("attachment; filename=\"{filename}\""),
            )
            .header("Content-Type", content_type)
            .query(&[("post", item_id.to_string())])
            .body(bytes)
            .send()
            .await
            .map_err(|e| store_err("media upload failed", e))?;
        if !response.status().is_success() {
            return Err(store_err("media upload rejected", response.status()));
        }
        let media: WpMedia = response
            .json()
            .await
            .map_err(|e| store_err("media parse failed", e))?;

        tracing::debug!(item_id, media_id = media.id, "media registered");

        Ok(ArtifactRef {
            id: media.id,
            url: media.source_url,
        })
    }

    async fn set_featured_artifact(&self, id: u64, artifact: &ArtifactRef) -> Result<()> {
        self.update_post(id, json!({ "featured_media": artifact.id }))
            .await
    }

    async fn set_og_artifact(&self, id: u64, artifact: &ArtifactRef) -> Result<()> {
        // Dual write: Yoast convention plus the generic key.
        self.update_post(
            id,
            json!({
                "meta": {
                    (META_OG_IMAGE): artifact.url,
                    (META_OG_IMAGE_ID): artifact.id,
                    (META_OG_IMAGE_YOAST): artifact.url,
                }
            }),
        )
        .await
    }

    async fn get_status(&self, id: u64, kind: ArtifactKind) -> Result<EnrichmentStatus> {
        let response = self
            .client
            .get(self.url(&format!("posts/{id}")))
            .basic_auth(&self.user, Some(self.app_password.expose()))
            .query(&[("context", "edit"), ("_fields", "id,meta")])
            .send()
            .await
            .map_err(|e| store_err("status fetch failed", e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(EnrichError::NotFound { item_id: id });
        }
        if !response.status().is_success() {
            return Err(store_err("status fetch rejected", response.status()));
        }
        let post: WpPostSlim = response
            .json()
            .await
            .map_err(|e| store_err("status parse failed", e))?;
        let raw = meta_str(&post.meta, &Self::status_meta_key(kind)).unwrap_or_default();
        raw.parse()
            .map_err(|e: String| store_err("status value invalid", e))
    }

    async fn set_status(
        &self,
        id: u64,
        kind: ArtifactKind,
        status: EnrichmentStatus,
    ) -> Result<()> {
        self.update_post(
            id,
            json!({ "meta": { (Self::status_meta_key(kind)): status.as_str() } }),
        )
        .await
    }

    async fn merge_tags(&self, id: u64, tags: &[String]) -> Result<Vec<String>> {
        let mut merged = self.post_tag_names(id).await?;
        let mut seen: Vec<String> = merged.iter().map(|t| t.to_lowercase()).collect();
        for tag in tags {
            let lowered = tag.to_lowercase();
            if !seen.contains(&lowered) {
                merged.push(tag.clone());
                seen.push(lowered);
            }
        }

        let mut term_ids = Vec::with_capacity(merged.len());
        for name in &merged {
            term_ids.push(self.ensure_tag(name).await?);
        }
        self.update_post(id, json!({ "tags": term_ids })).await?;
        Ok(merged)
    }

    async fn count_missing(&self, kind: ArtifactKind) -> Result<usize> {
        let posts = self.list_slim_posts().await?;
        Ok(posts.iter().filter(|p| Self::slim_missing(p, kind)).count())
    }

    async fn items_missing(&self, kind: ArtifactKind, limit: usize) -> Result<Vec<u64>> {
        let posts = self.list_slim_posts().await?;
        Ok(posts
            .iter()
            .filter(|p| Self::slim_missing(p, kind))
            .map(|p| p.id)
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_mapping() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("application/octet-stream"), "jpg");
    }

    #[test]
    fn test_status_meta_keys_are_per_kind() {
        assert_eq!(
            WordPressStore::status_meta_key(ArtifactKind::Featured),
            "enrich_status_featured"
        );
        assert_eq!(
            WordPressStore::status_meta_key(ArtifactKind::Og),
            "enrich_status_og"
        );
    }

    #[test]
    fn test_meta_str_ignores_empty() {
        let meta = json!({ "og_image": "", "other": "x" });
        assert_eq!(meta_str(&meta, "og_image"), None);
        assert_eq!(meta_str(&meta, "other"), Some("x".to_string()));
    }
}
