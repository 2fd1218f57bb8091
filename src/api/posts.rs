//! Posts JSON handlers
//!
//! Reads are public.  Writes sit behind [`super::auth::require_client_cert`],
//! which guarantees a [`CertIdentity`] extension is present.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::router::AppState;
use crate::Result;
use crate::mtls::CertIdentity;
use crate::posts::{NewPost, PostChanges, PostFilter};

/// Query string of `GET /api/posts`
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Exact tag filter
    pub tag: Option<String>,
    /// Publication state filter
    pub published: Option<bool>,
    /// Page size (clamped to the configured maximum)
    pub limit: Option<usize>,
    /// Number of posts to skip
    pub offset: Option<usize>,
}

/// GET /api/posts
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>> {
    let limit = params
        .limit
        .unwrap_or(state.posts_config.default_page_size)
        .min(state.posts_config.max_page_size)
        .max(1);

    let filter = PostFilter {
        tag: params.tag,
        published: params.published,
        limit,
        offset: params.offset.unwrap_or(0),
    };
    let posts = state.posts.list(&filter).await?;
    Ok(Json(json!({ "data": posts })))
}

/// GET /api/posts/{id}
pub async fn show_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Value>> {
    let post = state.posts.get(id).await?;
    Ok(Json(json!({ "data": post })))
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<CertIdentity>,
    Json(new): Json<NewPost>,
) -> Result<impl IntoResponse> {
    let post = state.posts.create(new).await?;
    info!(client = %client.display_name, post_id = post.id, slug = %post.slug, "Post created");
    Ok((StatusCode::CREATED, Json(json!({ "data": post }))))
}

/// PUT / PATCH /api/posts/{id}
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<CertIdentity>,
    Path(id): Path<u64>,
    Json(changes): Json<PostChanges>,
) -> Result<Json<Value>> {
    let post = state.posts.update(id, changes).await?;
    info!(client = %client.display_name, post_id = post.id, "Post updated");
    Ok(Json(json!({ "data": post })))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<CertIdentity>,
    Path(id): Path<u64>,
) -> Result<StatusCode> {
    state.posts.delete(id).await?;
    info!(client = %client.display_name, post_id = id, "Post deleted");
    Ok(StatusCode::NO_CONTENT)
}
