// src/services/blog.rs

//! Posts, comments and tags.
//!
//! Any authenticated user may write; only the author may change or delete
//! what they wrote. Post bodies are sanitized before storage; comments are
//! plain text and stored as typed, minus surrounding whitespace.

use chrono::Utc;
use validator::Validate;

use super::not_found;
use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentRequest, NewComment},
        post::{CreatePostRequest, NewPost, Post, PostChanges, UpdatePostRequest},
        tag::Tag,
        user::CurrentUser,
    },
    policy,
    query::ListQuery,
    repository::{CommentRepository, PostRepository, TagRepository},
    utils::{html::clean_body, validation::parse_tag_names},
};

const MAX_TAG_LEN: usize = 50;

/// Parses the comma separated list, rejecting over-long names.
fn tag_names(input: &str) -> Result<Vec<String>, AppError> {
    let names = parse_tag_names(input);
    if let Some(name) = names.iter().find(|n| n.chars().count() > MAX_TAG_LEN) {
        return Err(AppError::BadRequest(format!(
            "Tag '{name}' is longer than {MAX_TAG_LEN} characters."
        )));
    }
    Ok(names)
}

/// Sanitizes a body; markup-only input counts as empty.
fn sanitized(content: &str, field: &str) -> Result<String, AppError> {
    let cleaned = clean_body(content);
    if cleaned.is_empty() {
        return Err(AppError::BadRequest(format!("{field} cannot be empty.")));
    }
    Ok(cleaned)
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

pub async fn list_posts<R>(repo: &R, query: &ListQuery) -> Result<Vec<Post>, AppError>
where
    R: PostRepository + ?Sized,
{
    Ok(repo.list_posts(query).await?)
}

pub async fn get_post<R>(repo: &R, id: i64) -> Result<Post, AppError>
where
    R: PostRepository + ?Sized,
{
    repo.find_post(id).await?.ok_or_else(|| not_found("Post", id))
}

/// The caller becomes the author.
pub async fn create_post<R>(
    repo: &R,
    actor: &CurrentUser,
    req: CreatePostRequest,
) -> Result<Post, AppError>
where
    R: PostRepository + ?Sized,
{
    req.validate()?;

    let title = req.title.trim().to_string();
    let content = sanitized(&req.content, "Content")?;
    let tags = tag_names(&req.tags)?;

    let post = repo
        .insert_post(&NewPost {
            title,
            content,
            author_id: actor.id,
            published_date: Utc::now(),
            tags,
        })
        .await?;

    tracing::info!(post_id = post.id, author_id = actor.id, "post created");
    Ok(post)
}

pub async fn update_post<R>(
    repo: &R,
    actor: &CurrentUser,
    id: i64,
    req: UpdatePostRequest,
) -> Result<Post, AppError>
where
    R: PostRepository + ?Sized,
{
    let post = repo.find_post(id).await?.ok_or_else(|| not_found("Post", id))?;
    policy::require_owner(actor, &post)?;
    req.validate()?;

    let title = match req.title.as_deref().map(str::trim) {
        Some("") => return Err(AppError::BadRequest("Title cannot be blank.".to_string())),
        other => other.map(str::to_string),
    };
    let content = req
        .content
        .as_deref()
        .map(|c| sanitized(c, "Content"))
        .transpose()?;
    let tags = req.tags.as_deref().map(tag_names).transpose()?;

    let changes = PostChanges {
        title,
        content,
        tags,
    };

    repo.update_post(id, &changes)
        .await?
        .ok_or_else(|| not_found("Post", id))
}

/// Deletes the post with its comments and tag links.
pub async fn delete_post<R>(repo: &R, actor: &CurrentUser, id: i64) -> Result<(), AppError>
where
    R: PostRepository + ?Sized,
{
    let post = repo.find_post(id).await?.ok_or_else(|| not_found("Post", id))?;
    policy::require_owner(actor, &post)?;

    if !repo.delete_post(id).await? {
        return Err(not_found("Post", id));
    }
    tracing::info!(post_id = id, "post deleted");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

pub async fn list_tags<R>(repo: &R) -> Result<Vec<Tag>, AppError>
where
    R: TagRepository + ?Sized,
{
    Ok(repo.list_tags().await?)
}

/// Posts carrying exactly this tag, newest first. Unknown tag is a 404.
pub async fn posts_by_tag<R>(repo: &R, name: &str) -> Result<Vec<Post>, AppError>
where
    R: PostRepository + TagRepository + ?Sized,
{
    if repo.find_tag(name).await?.is_none() {
        return Err(AppError::NotFound(format!("Tag '{name}' not found")));
    }
    Ok(repo.list_posts_by_tag(name).await?)
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

pub async fn list_comments<R>(
    repo: &R,
    post_id: i64,
    query: &ListQuery,
) -> Result<Vec<Comment>, AppError>
where
    R: PostRepository + CommentRepository + ?Sized,
{
    repo.find_post(post_id).await?.ok_or_else(|| not_found("Post", post_id))?;
    Ok(repo.list_comments(post_id, query).await?)
}

pub async fn get_comment<R>(repo: &R, id: i64) -> Result<Comment, AppError>
where
    R: CommentRepository + ?Sized,
{
    repo.find_comment(id).await?.ok_or_else(|| not_found("Comment", id))
}

/// Comments are plain text: validated, then trimmed.
fn comment_body(req: &CommentRequest) -> Result<String, AppError> {
    req.validate()?;
    Ok(req.content.trim().to_string())
}

pub async fn create_comment<R>(
    repo: &R,
    actor: &CurrentUser,
    post_id: i64,
    req: CommentRequest,
) -> Result<Comment, AppError>
where
    R: PostRepository + CommentRepository + ?Sized,
{
    let content = comment_body(&req)?;
    repo.find_post(post_id).await?.ok_or_else(|| not_found("Post", post_id))?;

    let comment = repo
        .insert_comment(&NewComment {
            post_id,
            author_id: actor.id,
            content,
            created_at: Utc::now(),
        })
        .await?;

    tracing::debug!(comment_id = comment.id, post_id, "comment created");
    Ok(comment)
}

/// Replaces the content and refreshes `updated_at`.
pub async fn update_comment<R>(
    repo: &R,
    actor: &CurrentUser,
    id: i64,
    req: CommentRequest,
) -> Result<Comment, AppError>
where
    R: CommentRepository + ?Sized,
{
    let comment = repo.find_comment(id).await?.ok_or_else(|| not_found("Comment", id))?;
    policy::require_owner(actor, &comment)?;
    let content = comment_body(&req)?;

    repo.update_comment(id, &content, Utc::now())
        .await?
        .ok_or_else(|| not_found("Comment", id))
}

pub async fn delete_comment<R>(repo: &R, actor: &CurrentUser, id: i64) -> Result<(), AppError>
where
    R: CommentRepository + ?Sized,
{
    let comment = repo.find_comment(id).await?.ok_or_else(|| not_found("Comment", id))?;
    policy::require_owner(actor, &comment)?;

    if !repo.delete_comment(id).await? {
        return Err(not_found("Comment", id));
    }
    Ok(())
}
