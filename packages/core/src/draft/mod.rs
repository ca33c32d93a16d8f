//! Post Drafts
//!
//! The save-side surface of the editor: a draft snapshot of the document
//! plus its publishing metadata, and the async collaborator traits the
//! session talks to when saving, publishing, and pulling memos into a
//! post. Storage itself lives behind those traits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::Category;
use crate::utils::derive_title;

/// Lifecycle of a post
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftStatus {
    #[default]
    Draft,
    Published,
}

/// A saved snapshot of a post being written.
///
/// `content` is the serialized Markdown of the document; unresolved upload
/// placeholders are never part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub status: DraftStatus,
    pub updated_at: DateTime<Utc>,
}

impl PostDraft {
    /// Build a draft from serialized content, deriving title and slug from
    /// the first content line
    pub fn from_content(content: impl Into<String>, category: Category) -> Self {
        let content = content.into();
        let title = derive_title(&content);
        let slug = slugify(&title);
        Self {
            title,
            slug,
            content,
            category,
            tags: Vec::new(),
            status: DraftStatus::Draft,
            updated_at: Utc::now(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self.slug = slugify(&self.title);
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// URL slug from a title: lowercase, alphanumerics kept, runs of anything
/// else collapsed to single hyphens
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.to_lowercase().chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Failures from the persistence collaborators
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Draft has no content")]
    EmptyDraft,

    #[error("Store rejected the draft: {0}")]
    StoreRejected(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Saves and publishes drafts
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    /// Persist a draft, returning its storage identifier
    async fn save(&self, draft: &PostDraft) -> Result<String, PublishError>;

    /// Flip a saved draft to published
    async fn publish(&self, slug: &str) -> Result<(), PublishError>;
}

/// A memo captured outside the editor, insertable into a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    pub id: String,
    /// Markdown body, parsed on insertion
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Supplies saved memos to the editor's memo panel
#[async_trait::async_trait]
pub trait MemoSource: Send + Sync {
    async fn list(&self) -> Result<Vec<Memo>, PublishError>;
    async fn fetch(&self, id: &str) -> Result<Option<Memo>, PublishError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_content_derives_title_and_slug() {
        let draft = PostDraft::from_content("# My First Post\n\nbody", Category::Daily);
        assert_eq!(draft.title, "My First Post");
        assert_eq!(draft.slug, "my-first-post");
        assert_eq!(draft.status, DraftStatus::Draft);
    }

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(slugify("Hello,   World!"), "hello-world");
        assert_eq!(slugify("--edge--"), "edge");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slugify_keeps_unicode_alphanumerics() {
        assert_eq!(slugify("오늘의 기록 3"), "오늘의-기록-3");
    }

    #[test]
    fn test_draft_serialization_shape() {
        let draft = PostDraft::from_content("# T\n\nb", Category::Dev);
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["category"], "dev");
        assert_eq!(json["status"], "draft");
        assert!(json.get("tags").is_none());
    }
}
