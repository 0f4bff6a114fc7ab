// tests/blog_tests.rs

mod common;

use common::spawn_app;
use serde_json::{Value, json};

#[tokio::test]
async fn post_tags_are_deduplicated_and_idempotent() {
    let app = spawn_app().await;
    let (author_id, token) = app.user().await;

    let post = app.create_post(&token, "Tagged", "a, a, b").await;
    assert_eq!(post["author_id"], author_id);
    assert_eq!(post["tags"], json!(["a", "b"]));
    let id = post["id"].as_i64().unwrap();

    // Saving the same tags again changes nothing.
    let saved: Value = app
        .client
        .put(app.url(&format!("/posts/{}", id)))
        .bearer_auth(&token)
        .json(&json!({ "tags": "a, a, b" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(saved["tags"], json!(["a", "b"]));

    let tags: Value = app
        .client
        .get(app.url("/tags"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tags.as_array().unwrap().len(), 2);

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post_tags WHERE post_id = ?")
        .bind(id)
        .fetch_one(app.store.pool())
        .await
        .unwrap();
    assert_eq!(links, 2);
}

#[tokio::test]
async fn post_update_keeps_or_replaces_tags() {
    let app = spawn_app().await;
    let (_, token) = app.user().await;
    let post = app.create_post(&token, "Tagged", "rust, web").await;
    let path = format!("/posts/{}", post["id"]);

    let retitled: Value = app
        .client
        .patch(app.url(&path))
        .bearer_auth(&token)
        .json(&json!({ "title": "Retitled" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(retitled["title"], "Retitled");
    assert_eq!(retitled["tags"], json!(["rust", "web"]));
    assert_eq!(retitled["published_date"], post["published_date"]);

    let replaced: Value = app
        .client
        .put(app.url(&path))
        .bearer_auth(&token)
        .json(&json!({ "tags": "Rust" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(replaced["tags"], json!(["Rust"]));

    let cleared: Value = app
        .client
        .put(app.url(&path))
        .bearer_auth(&token)
        .json(&json!({ "tags": "" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cleared["tags"], json!([]));
}

#[tokio::test]
async fn posts_by_tag_and_search() {
    let app = spawn_app().await;
    let (_, token) = app.user().await;
    app.create_post(&token, "About Rust", "rust").await;
    app.create_post(&token, "About Go", "go").await;

    let rust: Value = app
        .client
        .get(app.url("/tags/rust/posts"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rust = rust.as_array().unwrap();
    assert_eq!(rust.len(), 1);
    assert_eq!(rust[0]["title"], "About Rust");

    let unknown = app.client.get(app.url("/tags/cobol/posts")).send().await.unwrap();
    assert_eq!(unknown.status().as_u16(), 404);

    // Search reaches tag names.
    let found: Value = app
        .client
        .get(app.url("/posts?search=go"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn post_content_is_sanitized() {
    let app = spawn_app().await;
    let (_, token) = app.user().await;

    let created: Value = app
        .client
        .post(app.url("/posts"))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Hello",
            "content": "<p onclick=\"steal()\">Hi</p><script>alert(1)</script>"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["content"], "<p>Hi</p>");

    let script_only = app
        .client
        .post(app.url("/posts"))
        .bearer_auth(&token)
        .json(&json!({ "title": "Empty", "content": "<script>alert(1)</script>" }))
        .send()
        .await
        .unwrap();
    assert_eq!(script_only.status().as_u16(), 400);
}

#[tokio::test]
async fn post_search_matches_escaped_text() {
    let app = spawn_app().await;
    let (_, token) = app.user().await;

    let created: Value = app
        .client
        .post(app.url("/posts"))
        .bearer_auth(&token)
        .json(&json!({ "title": "Cartoons", "content": "Tom & Jerry: 1 < 2" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["content"], "Tom &amp; Jerry: 1 &lt; 2");

    for term in ["Tom & Jerry", "1 < 2"] {
        let found: Value = app
            .client
            .get(app.url("/posts"))
            .query(&[("search", term)])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(found.as_array().unwrap().len(), 1, "search={term}");
    }
}

#[tokio::test]
async fn only_the_author_may_change_a_post() {
    let app = spawn_app().await;
    let (_, owner) = app.user().await;
    let (_, other) = app.staff().await;
    let post = app.create_post(&owner, "Mine", "").await;
    let path = format!("/posts/{}", post["id"]);

    // Staff status does not grant ownership.
    let update = app
        .client
        .put(app.url(&path))
        .bearer_auth(&other)
        .json(&json!({ "title": "Theirs" }))
        .send()
        .await
        .unwrap();
    assert_eq!(update.status().as_u16(), 403);

    let delete = app.client.delete(app.url(&path)).bearer_auth(&other).send().await.unwrap();
    assert_eq!(delete.status().as_u16(), 403);

    let anonymous = app
        .client
        .post(app.url("/posts"))
        .json(&json!({ "title": "Anon", "content": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status().as_u16(), 401);

    let delete = app.client.delete(app.url(&path)).bearer_auth(&owner).send().await.unwrap();
    assert_eq!(delete.status().as_u16(), 204);

    let again = app.client.delete(app.url(&path)).bearer_auth(&owner).send().await.unwrap();
    assert_eq!(again.status().as_u16(), 404);
}

#[tokio::test]
async fn comment_flow() {
    let app = spawn_app().await;
    let (_, author) = app.user().await;
    let (commenter_id, commenter) = app.user().await;
    let post = app.create_post(&author, "Discuss", "").await;
    let post_id = post["id"].as_i64().unwrap();

    let blank = app
        .client
        .post(app.url(&format!("/posts/{}/comments", post_id)))
        .bearer_auth(&commenter)
        .json(&json!({ "content": "   \n\t " }))
        .send()
        .await
        .unwrap();
    assert_eq!(blank.status().as_u16(), 400);

    let missing_post = app
        .client
        .post(app.url("/posts/9999/comments"))
        .bearer_auth(&commenter)
        .json(&json!({ "content": "Hello?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_post.status().as_u16(), 404);

    let created = app
        .client
        .post(app.url(&format!("/posts/{}/comments", post_id)))
        .bearer_auth(&commenter)
        .json(&json!({ "content": "  Great read!  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);
    let comment: Value = created.json().await.unwrap();
    assert_eq!(comment["content"], "Great read!");
    assert_eq!(comment["author_id"], commenter_id);

    // Comments are plain text and come back exactly as written.
    let plain: Value = app
        .client
        .post(app.url(&format!("/posts/{}/comments", post_id)))
        .bearer_auth(&commenter)
        .json(&json!({ "content": "R&D <3" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(plain["content"], "R&D <3");
    let searched: Value = app
        .client
        .get(app.url(&format!("/posts/{}/comments", post_id)))
        .query(&[("search", "r&d")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(searched[0]["content"], "R&D <3");
    let plain_path = format!("/comments/{}", plain["id"]);
    let removed = app.client.delete(app.url(&plain_path)).bearer_auth(&commenter).send().await.unwrap();
    assert_eq!(removed.status().as_u16(), 204);
    let path = format!("/comments/{}", comment["id"]);

    let list: Value = app
        .client
        .get(app.url(&format!("/posts/{}/comments", post_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);

    let no_post = app.client.get(app.url("/posts/9999/comments")).send().await.unwrap();
    assert_eq!(no_post.status().as_u16(), 404);

    // The post author does not own the comment.
    let foreign_edit = app
        .client
        .put(app.url(&path))
        .bearer_auth(&author)
        .json(&json!({ "content": "Edited" }))
        .send()
        .await
        .unwrap();
    assert_eq!(foreign_edit.status().as_u16(), 403);

    let edited: Value = app
        .client
        .patch(app.url(&path))
        .bearer_auth(&commenter)
        .json(&json!({ "content": "Edited" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(edited["content"], "Edited");
    assert_eq!(edited["created_at"], comment["created_at"]);

    let foreign_delete = app.client.delete(app.url(&path)).bearer_auth(&author).send().await.unwrap();
    assert_eq!(foreign_delete.status().as_u16(), 403);

    let deleted = app.client.delete(app.url(&path)).bearer_auth(&commenter).send().await.unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    let again = app.client.delete(app.url(&path)).bearer_auth(&commenter).send().await.unwrap();
    assert_eq!(again.status().as_u16(), 404);
}
