// src/repository/blog.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::{CommentRepository, PostRepository, RepoResult, SqliteStore, TagRepository};
use crate::{
    models::{
        comment::{Comment, NewComment},
        post::{NewPost, Post, PostChanges},
        tag::Tag,
    },
    query::{FieldKind, FilterField, ListQuery, ListSpec, SearchField},
};

pub static POST_LIST: ListSpec = ListSpec {
    filters: &[
        FilterField { name: "author_id", column: "p.author_id", kind: FieldKind::Integer },
        FilterField { name: "author", column: "p.author_id", kind: FieldKind::Integer },
        FilterField { name: "title", column: "p.title", kind: FieldKind::Text },
    ],
    search: &[
        SearchField::plain("p.title"),
        SearchField::html("p.content"),
        SearchField::via(
            "EXISTS (SELECT 1 FROM post_tags pt JOIN tags t ON t.id = pt.tag_id \
             WHERE pt.post_id = p.id AND ",
            "t.name",
        ),
    ],
    ordering: &[("id", "p.id"), ("title", "p.title"), ("published_date", "p.published_date")],
    default_ordering: "-published_date",
    tiebreak: "p.id",
};

pub static COMMENT_LIST: ListSpec = ListSpec {
    filters: &[
        FilterField { name: "author_id", column: "c.author_id", kind: FieldKind::Integer },
        FilterField { name: "author", column: "c.author_id", kind: FieldKind::Integer },
    ],
    search: &[SearchField::plain("c.content")],
    ordering: &[("id", "c.id"), ("created_at", "c.created_at"), ("updated_at", "c.updated_at")],
    default_ordering: "created_at",
    tiebreak: "c.id",
};

const POST_COLUMNS: &str = "p.id, p.title, p.content, p.published_date, p.author_id";
const COMMENT_COLUMNS: &str = "c.id, c.post_id, c.author_id, c.content, c.created_at, c.updated_at";

/// Exact-name lookup that inserts the tag when missing.
async fn get_or_insert_tag(conn: &mut SqliteConnection, name: &str) -> RepoResult<Tag> {
    sqlx::query("INSERT INTO tags (name) VALUES (?) ON CONFLICT (name) DO NOTHING")
        .bind(name)
        .execute(&mut *conn)
        .await?;

    sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name = ?")
        .bind(name)
        .fetch_one(&mut *conn)
        .await
}

/// Makes `names` the exact tag set of the post, dropping previous links.
async fn replace_post_tags(
    conn: &mut SqliteConnection,
    post_id: i64,
    names: &[String],
) -> RepoResult<()> {
    sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
        .bind(post_id)
        .execute(&mut *conn)
        .await?;

    for name in names {
        let tag = get_or_insert_tag(conn, name).await?;
        sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
            .bind(post_id)
            .bind(tag.id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Fills `tags` on every post with one query.
async fn attach_tags(conn: &mut SqliteConnection, posts: &mut [Post]) -> RepoResult<()> {
    if posts.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT pt.post_id, t.name FROM post_tags pt JOIN tags t ON t.id = pt.tag_id WHERE pt.post_id IN (",
    );
    let mut ids = builder.separated(", ");
    for post in posts.iter() {
        ids.push_bind(post.id);
    }
    builder.push(") ORDER BY t.name");

    let rows: Vec<(i64, String)> = builder.build_query_as().fetch_all(&mut *conn).await?;

    let mut by_post: HashMap<i64, Vec<String>> = HashMap::new();
    for (post_id, name) in rows {
        by_post.entry(post_id).or_default().push(name);
    }
    for post in posts.iter_mut() {
        post.tags = by_post.remove(&post.id).unwrap_or_default();
    }

    Ok(())
}

#[async_trait]
impl PostRepository for SqliteStore {
    async fn find_post(&self, id: i64) -> RepoResult<Option<Post>> {
        let mut conn = self.pool.acquire().await?;

        let post = sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        let Some(post) = post else {
            return Ok(None);
        };

        let mut posts = [post];
        attach_tags(&mut conn, &mut posts).await?;
        let [post] = posts;
        Ok(Some(post))
    }

    async fn list_posts(&self, query: &ListQuery) -> RepoResult<Vec<Post>> {
        let mut conn = self.pool.acquire().await?;

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts p"));
        query.push_conditions(&mut builder, false);
        query.push_order_by(&mut builder);

        let mut posts: Vec<Post> = builder.build_query_as().fetch_all(&mut *conn).await?;
        attach_tags(&mut conn, &mut posts).await?;
        Ok(posts)
    }

    async fn list_posts_by_tag(&self, tag_name: &str) -> RepoResult<Vec<Post>> {
        let mut conn = self.pool.acquire().await?;

        let mut posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN post_tags pt ON pt.post_id = p.id
            JOIN tags t ON t.id = pt.tag_id
            WHERE t.name = ?
            ORDER BY p.published_date DESC, p.id DESC
            "#
        ))
        .bind(tag_name)
        .fetch_all(&mut *conn)
        .await?;

        attach_tags(&mut conn, &mut posts).await?;
        Ok(posts)
    }

    async fn insert_post(&self, new_post: &NewPost) -> RepoResult<Post> {
        let mut tx = self.pool.begin().await?;

        let mut post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, content, published_date, author_id)
            VALUES (?, ?, ?, ?)
            RETURNING id, title, content, published_date, author_id
            "#,
        )
        .bind(&new_post.title)
        .bind(&new_post.content)
        .bind(new_post.published_date)
        .bind(new_post.author_id)
        .fetch_one(&mut *tx)
        .await?;

        replace_post_tags(&mut tx, post.id, &new_post.tags).await?;
        attach_tags(&mut tx, std::slice::from_mut(&mut post)).await?;

        tx.commit().await?;
        Ok(post)
    }

    async fn update_post(&self, id: i64, changes: &PostChanges) -> RepoResult<Option<Post>> {
        let mut tx = self.pool.begin().await?;

        // published_date is write-once.
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = COALESCE(?, title),
                content = COALESCE(?, content)
            WHERE id = ?
            RETURNING id, title, content, published_date, author_id
            "#,
        )
        .bind(changes.title.as_deref())
        .bind(changes.content.as_deref())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut post) = post else {
            return Ok(None);
        };

        if let Some(tags) = &changes.tags {
            replace_post_tags(&mut tx, post.id, tags).await?;
        }
        attach_tags(&mut tx, std::slice::from_mut(&mut post)).await?;

        tx.commit().await?;
        Ok(Some(post))
    }

    async fn delete_post(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CommentRepository for SqliteStore {
    async fn find_comment(&self, id: i64) -> RepoResult<Option<Comment>> {
        sqlx::query_as::<_, Comment>(&format!("SELECT {COMMENT_COLUMNS} FROM comments c WHERE c.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_comments(&self, post_id: i64, query: &ListQuery) -> RepoResult<Vec<Comment>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {COMMENT_COLUMNS} FROM comments c WHERE c.post_id = "));
        builder.push_bind(post_id);
        query.push_conditions(&mut builder, true);
        query.push_order_by(&mut builder);

        builder.build_query_as::<Comment>().fetch_all(&self.pool).await
    }

    async fn insert_comment(&self, comment: &NewComment) -> RepoResult<Comment> {
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, author_id, content, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, post_id, author_id, content, created_at, updated_at
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .bind(comment.created_at)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_comment(
        &self,
        id: i64,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> RepoResult<Option<Comment>> {
        sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, post_id, author_id, content, created_at, updated_at
            "#,
        )
        .bind(content)
        .bind(updated_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_comment(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TagRepository for SqliteStore {
    async fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await
    }

    async fn find_tag(&self, name: &str) -> RepoResult<Option<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
    }
}
