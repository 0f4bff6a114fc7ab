// src/repository/mod.rs

//! Persistence interface.
//!
//! One trait per entity; services are generic over these traits and never
//! build SQL themselves. [`SqliteStore`] implements all of them on top of a
//! `sqlx` connection pool. Multi-statement writes (post + tags, user +
//! profile, library + holdings) run in a single transaction.

pub mod accounts;
pub mod blog;
pub mod catalog;

use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{
    models::{
        author::Author,
        book::{Book, BookChanges, NewBook},
        comment::{Comment, NewComment},
        library::{Librarian, Library},
        post::{NewPost, Post, PostChanges},
        tag::Tag,
        user::{NewUser, ProfileChanges, Role, User, UserProfile, UserWithProfile},
    },
    query::ListQuery,
};

pub type RepoResult<T> = Result<T, sqlx::Error>;

#[async_trait]
pub trait AuthorRepository: Send + Sync {
    async fn find_author(&self, id: i64) -> RepoResult<Option<Author>>;
    async fn list_authors(&self, query: &ListQuery) -> RepoResult<Vec<Author>>;
    async fn insert_author(&self, name: &str) -> RepoResult<Author>;
    async fn update_author(&self, id: i64, name: Option<&str>) -> RepoResult<Option<Author>>;
    /// Cascades to the author's books.
    async fn delete_author(&self, id: i64) -> RepoResult<bool>;
}

#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn find_book(&self, id: i64) -> RepoResult<Option<Book>>;
    async fn list_books(&self, query: &ListQuery) -> RepoResult<Vec<Book>>;
    async fn list_books_by_author(&self, author_id: i64) -> RepoResult<Vec<Book>>;
    async fn insert_book(&self, book: &NewBook) -> RepoResult<Book>;
    async fn update_book(&self, id: i64, changes: &BookChanges) -> RepoResult<Option<Book>>;
    async fn delete_book(&self, id: i64) -> RepoResult<bool>;
    async fn count_books(&self) -> RepoResult<i64>;
}

#[async_trait]
pub trait LibraryRepository: Send + Sync {
    async fn find_library(&self, id: i64) -> RepoResult<Option<Library>>;
    async fn list_libraries(&self, query: &ListQuery) -> RepoResult<Vec<Library>>;
    async fn insert_library(&self, name: &str, book_ids: &[i64]) -> RepoResult<Library>;
    /// `book_ids`, when given, replaces the holdings.
    async fn update_library(
        &self,
        id: i64,
        name: Option<&str>,
        book_ids: Option<&[i64]>,
    ) -> RepoResult<Option<Library>>;
    async fn delete_library(&self, id: i64) -> RepoResult<bool>;
    async fn library_books(&self, library_id: i64) -> RepoResult<Vec<Book>>;
    /// Adding a book twice is a no-op.
    async fn add_library_book(&self, library_id: i64, book_id: i64) -> RepoResult<()>;
    async fn remove_library_book(&self, library_id: i64, book_id: i64) -> RepoResult<bool>;
    async fn find_librarian(&self, library_id: i64) -> RepoResult<Option<Librarian>>;
    /// Creates the librarian or renames the existing one.
    async fn assign_librarian(&self, library_id: i64, name: &str) -> RepoResult<Librarian>;
    async fn remove_librarian(&self, library_id: i64) -> RepoResult<bool>;
    async fn count_libraries(&self) -> RepoResult<i64>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user(&self, id: i64) -> RepoResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    async fn find_user_with_profile(&self, id: i64) -> RepoResult<Option<UserWithProfile>>;
    async fn list_users(&self) -> RepoResult<Vec<UserWithProfile>>;
    /// Inserts the user and its profile in one transaction.
    async fn insert_user(&self, user: &NewUser) -> RepoResult<UserWithProfile>;
    async fn update_user_details(&self, id: i64, changes: &ProfileChanges) -> RepoResult<Option<User>>;
    async fn set_role(&self, user_id: i64, role: Option<Role>) -> RepoResult<UserProfile>;
    /// Cascades to the profile, posts and comments.
    async fn delete_user(&self, id: i64) -> RepoResult<bool>;
    async fn count_users(&self) -> RepoResult<i64>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_post(&self, id: i64) -> RepoResult<Option<Post>>;
    async fn list_posts(&self, query: &ListQuery) -> RepoResult<Vec<Post>>;
    async fn list_posts_by_tag(&self, tag_name: &str) -> RepoResult<Vec<Post>>;
    /// Inserts the post and associates its tags in one transaction.
    async fn insert_post(&self, post: &NewPost) -> RepoResult<Post>;
    async fn update_post(&self, id: i64, changes: &PostChanges) -> RepoResult<Option<Post>>;
    async fn delete_post(&self, id: i64) -> RepoResult<bool>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_comment(&self, id: i64) -> RepoResult<Option<Comment>>;
    async fn list_comments(&self, post_id: i64, query: &ListQuery) -> RepoResult<Vec<Comment>>;
    async fn insert_comment(&self, comment: &NewComment) -> RepoResult<Comment>;
    async fn update_comment(
        &self,
        id: i64,
        content: &str,
        updated_at: chrono::DateTime<chrono::Utc>,
    ) -> RepoResult<Option<Comment>>;
    async fn delete_comment(&self, id: i64) -> RepoResult<bool>;
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn list_tags(&self) -> RepoResult<Vec<Tag>>;
    async fn find_tag(&self, name: &str) -> RepoResult<Option<Tag>>;
}

/// SQLite-backed implementation of every repository trait.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Opens (and creates if needed) the database at `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> RepoResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    /// A private in-memory database.
    ///
    /// Every SQLite memory connection is its own database, so the pool holds
    /// exactly one connection and never recycles it.
    pub async fn in_memory() -> RepoResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}
