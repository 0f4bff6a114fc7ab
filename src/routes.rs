// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, authors, books, comments, dashboards, libraries, posts, tags},
    state::AppState,
    utils::jwt::{auth_middleware, staff_middleware},
};

/// Assembles the main application router.
///
/// * Reads are public; writes go through `auth_middleware`.
/// * Catalog writes additionally go through `staff_middleware`.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store + config).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let authenticated = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/me", get(auth::get_me).put(auth::update_me))
                .route_layer(authenticated.clone()),
        );

    let catalog_public = Router::new()
        .route("/authors", get(authors::list_authors))
        .route("/authors/{id}", get(authors::get_author))
        .route("/books", get(books::list_books))
        .route("/books/{id}", get(books::get_book))
        .route("/libraries", get(libraries::list_libraries))
        .route("/libraries/{id}", get(libraries::get_library));

    let catalog_staff = Router::new()
        .route("/authors", post(authors::create_author))
        .route(
            "/authors/{id}",
            put(authors::update_author)
                .patch(authors::update_author)
                .delete(authors::delete_author),
        )
        .route("/books", post(books::create_book))
        .route(
            "/books/{id}",
            put(books::update_book)
                .patch(books::update_book)
                .delete(books::delete_book),
        )
        .route("/libraries", post(libraries::create_library))
        .route(
            "/libraries/{id}",
            put(libraries::update_library)
                .patch(libraries::update_library)
                .delete(libraries::delete_library),
        )
        .route(
            "/libraries/{id}/books/{book_id}",
            post(libraries::add_book).delete(libraries::remove_book),
        )
        .route(
            "/libraries/{id}/librarian",
            put(libraries::assign_librarian).delete(libraries::remove_librarian),
        )
        // Auth first, then the staff check
        .route_layer(middleware::from_fn(staff_middleware))
        .route_layer(authenticated.clone());

    let blog_public = Router::new()
        .route("/posts", get(posts::list_posts))
        .route("/posts/{id}", get(posts::get_post))
        .route("/posts/{id}/comments", get(comments::list_comments))
        .route("/comments/{id}", get(comments::get_comment))
        .route("/tags", get(tags::list_tags))
        .route("/tags/{name}/posts", get(tags::posts_by_tag));

    let blog_protected = Router::new()
        .route("/posts", post(posts::create_post))
        .route(
            "/posts/{id}",
            put(posts::update_post)
                .patch(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/posts/{id}/comments", post(comments::create_comment))
        .route(
            "/comments/{id}",
            put(comments::update_comment)
                .patch(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .route_layer(authenticated.clone());

    let dashboard_routes = Router::new()
        .route("/admin", get(dashboards::admin))
        .route("/librarian", get(dashboards::librarian))
        .route("/member", get(dashboards::member))
        .route_layer(authenticated.clone());

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}/role", put(admin::set_role))
        .route("/users/{id}", delete(admin::delete_user))
        .route_layer(authenticated);

    let api = Router::new()
        .merge(catalog_public)
        .merge(catalog_staff)
        .merge(blog_public)
        .merge(blog_protected)
        .nest("/auth", auth_routes)
        .nest("/dashboards", dashboard_routes)
        .nest("/admin", admin_routes);

    Router::new()
        .nest("/api", api)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{config::Config, repository::SqliteStore};

    async fn app() -> Router {
        let store = SqliteStore::in_memory().await.unwrap();
        store.migrate().await.unwrap();
        let config = Config {
            database_url: "sqlite::memory:".into(),
            jwt_secret: "secret".into(),
            jwt_expiration: 60,
            rust_log: "error".into(),
            bind_addr: "127.0.0.1:0".into(),
            admin_username: None,
            admin_password: None,
            admin_email: None,
        };
        create_router(AppState { store, config })
    }

    #[tokio::test]
    async fn reads_are_public() {
        let response = app()
            .await
            .oneshot(Request::get("/api/books").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn writes_need_a_token() {
        let request = Request::post("/api/books")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"title":"1984","publication_year":1949,"author":1}"#))
            .unwrap();
        let response = app().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_method_is_not_allowed() {
        let request = Request::delete("/api/tags").body(Body::empty()).unwrap();
        let response = app().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
