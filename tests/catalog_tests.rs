// tests/catalog_tests.rs

mod common;

use chrono::{Datelike, Utc};
use common::spawn_app;
use serde_json::{Value, json};

fn titles(books: &Value) -> Vec<&str> {
    books
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn book_lifecycle_respects_staff_permissions() {
    let app = spawn_app().await;
    let (_, staff) = app.staff().await;
    let (_, member) = app.user().await;

    let orwell = app.create_author(&staff, "George Orwell").await;
    let book_id = app.create_book(&staff, "1984", 1949, orwell).await;

    // Anyone can read.
    let list: Value = app
        .client
        .get(app.url("/books"))
        .bearer_auth(&member)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(titles(&list).contains(&"1984"));

    let anonymous = app.client.get(app.url("/books")).send().await.unwrap();
    assert_eq!(anonymous.status().as_u16(), 200);

    // Non-staff writes are forbidden.
    let denied = app
        .client
        .delete(app.url(&format!("/books/{}", book_id)))
        .bearer_auth(&member)
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status().as_u16(), 403);

    // Staff delete, then the book is gone.
    let deleted = app
        .client
        .delete(app.url(&format!("/books/{}", book_id)))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    let detail = app
        .client
        .get(app.url(&format!("/books/{}", book_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(detail.status().as_u16(), 404);

    let again = app
        .client
        .delete(app.url(&format!("/books/{}", book_id)))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap();
    assert_eq!(again.status().as_u16(), 404);
}

#[tokio::test]
async fn non_staff_cannot_write_any_catalog_resource() {
    let app = spawn_app().await;
    let (_, staff) = app.staff().await;
    let (_, member) = app.user().await;
    let author = app.create_author(&staff, "Ursula K. Le Guin").await;
    let book = app.create_book(&staff, "The Dispossessed", 1974, author).await;

    let create = app
        .client
        .post(app.url("/books"))
        .bearer_auth(&member)
        .json(&json!({ "title": "Nope", "publication_year": 2000, "author": author }))
        .send()
        .await
        .unwrap();
    assert_eq!(create.status().as_u16(), 403);

    let update = app
        .client
        .put(app.url(&format!("/books/{}", book)))
        .bearer_auth(&member)
        .json(&json!({ "title": "Changed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(update.status().as_u16(), 403);

    let patch = app
        .client
        .patch(app.url(&format!("/authors/{}", author)))
        .bearer_auth(&member)
        .json(&json!({ "name": "Changed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(patch.status().as_u16(), 403);

    let library = app
        .client
        .post(app.url("/libraries"))
        .bearer_auth(&member)
        .json(&json!({ "name": "Branch" }))
        .send()
        .await
        .unwrap();
    assert_eq!(library.status().as_u16(), 403);

    // No token at all is a 401, not a 403.
    let anonymous = app
        .client
        .post(app.url("/authors"))
        .json(&json!({ "name": "Anon" }))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status().as_u16(), 401);
}

#[tokio::test]
async fn ordering_and_search() {
    let app = spawn_app().await;
    let (_, staff) = app.staff().await;
    let orwell = app.create_author(&staff, "George Orwell").await;
    app.create_book(&staff, "1984", 1949, orwell).await;
    app.create_book(&staff, "Animal Farm", 1945, orwell).await;

    let by_year: Value = app
        .client
        .get(app.url("/books?ordering=publication_year"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let years: Vec<i64> = by_year
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["publication_year"].as_i64().unwrap())
        .collect();
    assert_eq!(years, vec![1945, 1949]);

    let descending: Value = app
        .client
        .get(app.url("/books?ordering=-publication_year"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(titles(&descending), vec!["1984", "Animal Farm"]);

    let found: Value = app
        .client
        .get(app.url("/books?q=1984"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(titles(&found), vec!["1984"]);

    // Search also covers the author's name, case-insensitively.
    let by_author: Value = app
        .client
        .get(app.url("/books?search=orwell"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_author.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn search_matches_accented_titles() {
    let app = spawn_app().await;
    let (_, staff) = app.staff().await;
    let rousseau = app.create_author(&staff, "Jean-Jacques Rousseau").await;
    app.create_book(&staff, "Émile", 1762, rousseau).await;
    app.create_book(&staff, "Julie", 1761, rousseau).await;

    // Only ASCII letters fold; the accented capital must match as typed.
    for term in ["Émile", "ÉMILE", "MILE"] {
        let found: Value = app
            .client
            .get(app.url("/books"))
            .query(&[("search", term)])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(titles(&found), vec!["Émile"], "search={term}");
    }
}

#[tokio::test]
async fn filters_and_bad_parameters() {
    let app = spawn_app().await;
    let (_, staff) = app.staff().await;
    let orwell = app.create_author(&staff, "George Orwell").await;
    let huxley = app.create_author(&staff, "Aldous Huxley").await;
    app.create_book(&staff, "1984", 1949, orwell).await;
    app.create_book(&staff, "Brave New World", 1932, huxley).await;

    let filtered: Value = app
        .client
        .get(app.url(&format!("/books?filter[author]={}", huxley)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(titles(&filtered), vec!["Brave New World"]);

    let bare: Value = app
        .client
        .get(app.url("/books?publication_year=1949"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(titles(&bare), vec!["1984"]);

    for query in [
        "/books?ordering=price",
        "/books?filter[price]=3",
        "/books?filter[publication_year]=soon",
    ] {
        let response = app.client.get(app.url(query)).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 400, "{}", query);
    }
}

#[tokio::test]
async fn publication_year_rules() {
    let app = spawn_app().await;
    let (_, staff) = app.staff().await;
    let orwell = app.create_author(&staff, "George Orwell").await;

    let next_year = Utc::now().year() + 1;
    let future = app
        .client
        .post(app.url("/books"))
        .bearer_auth(&staff)
        .json(&json!({ "title": "Later", "publication_year": next_year, "author": orwell }))
        .send()
        .await
        .unwrap();
    assert_eq!(future.status().as_u16(), 400);
    let body: Value = future.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("future"));

    let this_year = app
        .client
        .post(app.url("/books"))
        .bearer_auth(&staff)
        .json(&json!({ "title": "Now", "publication_year": next_year - 1, "author": orwell }))
        .send()
        .await
        .unwrap();
    assert_eq!(this_year.status().as_u16(), 201);

    let book = app.create_book(&staff, "1984", 1949, orwell).await;
    let path = format!("/books/{}", book);

    // Any presence of the year is rejected, even the stored value or null.
    for payload in [
        json!({ "title": "1984", "publication_year": 1949 }),
        json!({ "publication_year": 1950 }),
        json!({ "publication_year": null }),
    ] {
        let response = app
            .client
            .put(app.url(&path))
            .bearer_auth(&staff)
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400, "{}", payload);
    }

    let renamed: Value = app
        .client
        .patch(app.url(&path))
        .bearer_auth(&staff)
        .json(&json!({ "title": "Nineteen Eighty-Four" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(renamed["title"], "Nineteen Eighty-Four");
    assert_eq!(renamed["publication_year"], 1949);
}

#[tokio::test]
async fn unknown_author_is_rejected() {
    let app = spawn_app().await;
    let (_, staff) = app.staff().await;

    let response = app
        .client
        .post(app.url("/books"))
        .bearer_auth(&staff)
        .json(&json!({ "title": "Orphan", "publication_year": 2000, "author": 9999 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn author_detail_and_cascade() {
    let app = spawn_app().await;
    let (_, staff) = app.staff().await;
    let orwell = app.create_author(&staff, "George Orwell").await;
    let book = app.create_book(&staff, "Animal Farm", 1945, orwell).await;
    app.create_book(&staff, "1984", 1949, orwell).await;

    let detail: Value = app
        .client
        .get(app.url(&format!("/authors/{}", orwell)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["name"], "George Orwell");
    assert_eq!(titles(&detail["books"]), vec!["1984", "Animal Farm"]);

    let deleted = app
        .client
        .delete(app.url(&format!("/authors/{}", orwell)))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    let gone = app
        .client
        .get(app.url(&format!("/books/{}", book)))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status().as_u16(), 404);
}

#[tokio::test]
async fn library_holdings_and_librarian() {
    let app = spawn_app().await;
    let (_, staff) = app.staff().await;
    let orwell = app.create_author(&staff, "George Orwell").await;
    let farm = app.create_book(&staff, "Animal Farm", 1945, orwell).await;
    let novel = app.create_book(&staff, "1984", 1949, orwell).await;

    let created = app
        .client
        .post(app.url("/libraries"))
        .bearer_auth(&staff)
        .json(&json!({ "name": "Central", "book_ids": [farm] }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);
    let library: Value = created.json().await.unwrap();
    let id = library["id"].as_i64().unwrap();
    assert_eq!(titles(&library["books"]), vec!["Animal Farm"]);
    assert_eq!(library["librarian"], Value::Null);

    // Adding twice keeps a single holding.
    for _ in 0..2 {
        let added = app
            .client
            .post(app.url(&format!("/libraries/{}/books/{}", id, novel)))
            .bearer_auth(&staff)
            .send()
            .await
            .unwrap();
        assert_eq!(added.status().as_u16(), 200);
    }

    let assigned: Value = app
        .client
        .put(app.url(&format!("/libraries/{}/librarian", id)))
        .bearer_auth(&staff)
        .json(&json!({ "name": "Ada" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let librarian_id = assigned["id"].as_i64().unwrap();

    // Reassigning renames the same librarian.
    let renamed: Value = app
        .client
        .put(app.url(&format!("/libraries/{}/librarian", id)))
        .bearer_auth(&staff)
        .json(&json!({ "name": "Grace" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(renamed["id"], librarian_id);

    let detail: Value = app
        .client
        .get(app.url(&format!("/libraries/{}", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(titles(&detail["books"]), vec!["1984", "Animal Farm"]);
    assert_eq!(detail["librarian"]["name"], "Grace");

    let removed = app
        .client
        .delete(app.url(&format!("/libraries/{}/books/{}", id, farm)))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap();
    assert_eq!(removed.status().as_u16(), 204);

    let not_held = app
        .client
        .delete(app.url(&format!("/libraries/{}/books/{}", id, farm)))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap();
    assert_eq!(not_held.status().as_u16(), 404);

    let missing_book = app
        .client
        .post(app.url(&format!("/libraries/{}/books/9999", id)))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap();
    assert_eq!(missing_book.status().as_u16(), 404);

    // Deleting the library takes the librarian with it, books survive.
    let deleted = app
        .client
        .delete(app.url(&format!("/libraries/{}", id)))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    let librarians: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM librarians")
        .fetch_one(app.store.pool())
        .await
        .unwrap();
    assert_eq!(librarians, 0);

    let book = app
        .client
        .get(app.url(&format!("/books/{}", novel)))
        .send()
        .await
        .unwrap();
    assert_eq!(book.status().as_u16(), 200);
}
