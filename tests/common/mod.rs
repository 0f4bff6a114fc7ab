// tests/common/mod.rs

#![allow(dead_code)]

use bookshelf::{config::Config, repository::SqliteStore, routes, state::AppState};
use serde_json::{Value, json};

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub address: String,
    pub store: SqliteStore,
    pub config: Config,
    pub client: reqwest::Client,
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        admin_username: None,
        admin_password: None,
        admin_email: None,
    }
}

/// Spawns the app on a random port against a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    let store = SqliteStore::in_memory()
        .await
        .expect("Failed to open in-memory database");
    store.migrate().await.expect("Failed to migrate database");

    let config = test_config();
    let state = AppState {
        store: store.clone(),
        config: config.clone(),
    };
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        store,
        config,
        client: reqwest::Client::new(),
    }
}

pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..8])
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.address, path)
    }

    /// Registers a user and returns the response body.
    pub async fn register(&self, username: &str) -> Value {
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": PASSWORD
            }))
            .send()
            .await
            .expect("Register failed");
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.unwrap()
    }

    pub async fn login(&self, username: &str) -> String {
        let body: Value = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "username": username, "password": PASSWORD }))
            .send()
            .await
            .expect("Login failed")
            .json()
            .await
            .unwrap();
        body["token"].as_str().expect("Token not found").to_string()
    }

    /// A fresh regular user: (id, token).
    pub async fn user(&self) -> (i64, String) {
        let username = unique_name("u");
        let body = self.register(&username).await;
        let token = self.login(&username).await;
        (body["id"].as_i64().unwrap(), token)
    }

    /// A fresh staff user: (id, token).
    pub async fn staff(&self) -> (i64, String) {
        let (id, token) = self.user().await;
        sqlx::query("UPDATE users SET is_staff = 1 WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await
            .unwrap();
        (id, token)
    }

    pub async fn set_role(&self, user_id: i64, role: &str) {
        sqlx::query("UPDATE user_profiles SET role = ? WHERE user_id = ?")
            .bind(role)
            .bind(user_id)
            .execute(self.store.pool())
            .await
            .unwrap();
    }

    pub async fn create_author(&self, token: &str, name: &str) -> i64 {
        let body: Value = self
            .client
            .post(self.url("/authors"))
            .bearer_auth(token)
            .json(&json!({ "name": name }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        body["id"].as_i64().expect("author id")
    }

    pub async fn create_book(&self, token: &str, title: &str, year: i32, author_id: i64) -> i64 {
        let response = self
            .client
            .post(self.url("/books"))
            .bearer_auth(token)
            .json(&json!({
                "title": title,
                "publication_year": year,
                "author": author_id
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        body["id"].as_i64().expect("book id")
    }

    pub async fn create_post(&self, token: &str, title: &str, tags: &str) -> Value {
        let response = self
            .client
            .post(self.url("/posts"))
            .bearer_auth(token)
            .json(&json!({ "title": title, "content": "Some content", "tags": tags }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.unwrap()
    }
}
