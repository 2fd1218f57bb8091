//! Blog posts: payload validation and storage.
//!
//! Relational persistence lives outside this crate.  [`PostStore`] is the
//! seam; [`InMemoryPostStore`] is the implementation the server runs with.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Maximum title length, in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// A stored blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    /// Identifier, assigned on creation.
    pub id: u64,
    /// Title as written.
    pub title: String,
    /// URL slug derived from the title, unique across posts.
    pub slug: String,
    /// Markdown body.
    pub body: String,
    /// Normalised tags (lowercase, unique, original order).
    pub tags: Vec<String>,
    /// Whether the post is visible on the public site.
    pub published: bool,
    /// Series the post belongs to, if any.
    pub series_id: Option<u64>,
    /// Creation time.
    pub inserted_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a post.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPost {
    /// Title (required).
    #[serde(default)]
    pub title: String,
    /// Body (required).
    #[serde(default)]
    pub body: String,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Publish immediately.
    #[serde(default)]
    pub published: bool,
    /// Series membership.
    #[serde(default)]
    pub series_id: Option<u64>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostChanges {
    /// New title.
    pub title: Option<String>,
    /// New body.
    pub body: Option<String>,
    /// Replacement tag list.
    pub tags: Option<Vec<String>>,
    /// New publication state.
    pub published: Option<bool>,
    /// New series membership; an explicit `null` removes the post from its series.
    #[serde(default, deserialize_with = "present_or_null")]
    pub series_id: Option<Option<u64>>,
}

/// Keep "field absent" (`None`) apart from "field set to null" (`Some(None)`).
fn present_or_null<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Field-level validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, Vec<String>>);

impl ValidationErrors {
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    /// `true` when no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages for one field.
    #[must_use]
    pub fn field(&self, name: &str) -> &[String] {
        self.0.get(name).map_or(&[], Vec::as_slice)
    }

    fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

/// Listing options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Only posts carrying this tag (exact, case-insensitive).
    pub tag: Option<String>,
    /// Only posts with this publication state.
    pub published: Option<bool>,
    /// Page size.
    pub limit: usize,
    /// Number of posts to skip.
    pub offset: usize,
}

/// Storage for posts.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Posts matching `filter`, newest first.
    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>>;

    /// One post by id.
    async fn get(&self, id: u64) -> Result<Post>;

    /// Validate and insert a post.
    async fn create(&self, new: NewPost) -> Result<Post>;

    /// Validate and apply a partial update.
    async fn update(&self, id: u64, changes: PostChanges) -> Result<Post>;

    /// Remove a post.
    async fn delete(&self, id: u64) -> Result<()>;
}

#[derive(Debug, Default)]
struct Inner {
    posts: BTreeMap<u64, Post>,
    last_id: u64,
}

impl Inner {
    fn slug_taken(&self, slug: &str, except: Option<u64>) -> bool {
        self.posts
            .values()
            .any(|p| p.slug == slug && Some(p.id) != except)
    }

    fn unique_slug(&self, title: &str, except: Option<u64>) -> String {
        let base = slugify(title);
        if !self.slug_taken(&base, except) {
            return base;
        }
        (2..)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| !self.slug_taken(candidate, except))
            .unwrap_or(base)
    }
}

/// Process-local post store.
#[derive(Debug, Default)]
pub struct InMemoryPostStore {
    inner: RwLock<Inner>,
}

impl InMemoryPostStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        let tag = filter.tag.as_deref().map(str::to_lowercase);
        let inner = self.inner.read();
        Ok(inner
            .posts
            .values()
            .rev()
            .filter(|p| filter.published.is_none_or(|want| p.published == want))
            .filter(|p| tag.as_ref().is_none_or(|t| p.tags.contains(t)))
            .skip(filter.offset)
            .take(filter.limit)
            .cloned()
            .collect())
    }

    async fn get(&self, id: u64) -> Result<Post> {
        self.inner
            .read()
            .posts
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound(id))
    }

    async fn create(&self, new: NewPost) -> Result<Post> {
        let mut errors = ValidationErrors::default();
        validate_title(&new.title, &mut errors);
        validate_body(&new.body, &mut errors);
        errors.into_result()?;

        let mut inner = self.inner.write();
        inner.last_id += 1;
        let now = Utc::now();
        let post = Post {
            id: inner.last_id,
            slug: inner.unique_slug(&new.title, None),
            title: new.title.trim().to_owned(),
            body: new.body,
            tags: normalize_tags(&new.tags),
            published: new.published,
            series_id: new.series_id,
            inserted_at: now,
            updated_at: now,
        };
        inner.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: u64, changes: PostChanges) -> Result<Post> {
        let mut errors = ValidationErrors::default();
        if let Some(title) = &changes.title {
            validate_title(title, &mut errors);
        }
        if let Some(body) = &changes.body {
            validate_body(body, &mut errors);
        }
        errors.into_result()?;

        let mut inner = self.inner.write();
        let mut post = inner.posts.get(&id).cloned().ok_or(Error::NotFound(id))?;

        if let Some(title) = changes.title {
            let title = title.trim().to_owned();
            if title != post.title {
                post.slug = inner.unique_slug(&title, Some(id));
                post.title = title;
            }
        }
        if let Some(body) = changes.body {
            post.body = body;
        }
        if let Some(tags) = changes.tags {
            post.tags = normalize_tags(&tags);
        }
        if let Some(published) = changes.published {
            post.published = published;
        }
        if let Some(series_id) = changes.series_id {
            post.series_id = series_id;
        }
        post.updated_at = Utc::now();

        inner.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: u64) -> Result<()> {
        self.inner
            .write()
            .posts
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::NotFound(id))
    }
}

fn validate_title(title: &str, errors: &mut ValidationErrors) {
    let title = title.trim();
    if title.is_empty() {
        errors.add("title", "can't be blank");
    } else if title.chars().count() > MAX_TITLE_LEN {
        errors.add(
            "title",
            format!("should be at most {MAX_TITLE_LEN} character(s)"),
        );
    }
}

fn validate_body(body: &str, errors: &mut ValidationErrors) {
    if body.trim().is_empty() {
        errors.add("body", "can't be blank");
    }
}

/// Lowercase ASCII alphanumerics; every other run becomes a single `-`.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("post");
    }
    slug
}

/// Trim, lowercase, drop empties and duplicates, keep first-seen order.
#[must_use]
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
