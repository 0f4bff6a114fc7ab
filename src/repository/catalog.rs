// src/repository/catalog.rs

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::{AuthorRepository, BookRepository, LibraryRepository, RepoResult, SqliteStore};
use crate::{
    models::{
        author::Author,
        book::{Book, BookChanges, NewBook},
        library::{Librarian, Library},
    },
    query::{FieldKind, FilterField, ListQuery, ListSpec, SearchField},
};

pub static AUTHOR_LIST: ListSpec = ListSpec {
    filters: &[FilterField { name: "name", column: "a.name", kind: FieldKind::Text }],
    search: &[SearchField::plain("a.name")],
    ordering: &[("id", "a.id"), ("name", "a.name")],
    default_ordering: "name",
    tiebreak: "a.id",
};

pub static BOOK_LIST: ListSpec = ListSpec {
    filters: &[
        FilterField { name: "title", column: "b.title", kind: FieldKind::Text },
        FilterField { name: "publication_year", column: "b.publication_year", kind: FieldKind::Integer },
        FilterField { name: "author_id", column: "b.author_id", kind: FieldKind::Integer },
        FilterField { name: "author", column: "b.author_id", kind: FieldKind::Integer },
    ],
    search: &[
        SearchField::plain("b.title"),
        SearchField::plain("a.name"),
    ],
    ordering: &[
        ("id", "b.id"),
        ("title", "b.title"),
        ("publication_year", "b.publication_year"),
        ("author_id", "b.author_id"),
    ],
    default_ordering: "title",
    tiebreak: "b.id",
};

pub static LIBRARY_LIST: ListSpec = ListSpec {
    filters: &[FilterField { name: "name", column: "l.name", kind: FieldKind::Text }],
    search: &[SearchField::plain("l.name")],
    ordering: &[("id", "l.id"), ("name", "l.name")],
    default_ordering: "name",
    tiebreak: "l.id",
};

const BOOK_COLUMNS: &str = "b.id, b.title, b.publication_year, b.author_id";

#[async_trait]
impl AuthorRepository for SqliteStore {
    async fn find_author(&self, id: i64) -> RepoResult<Option<Author>> {
        sqlx::query_as::<_, Author>("SELECT id, name FROM authors WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_authors(&self, query: &ListQuery) -> RepoResult<Vec<Author>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT a.id, a.name FROM authors a");
        query.push_conditions(&mut builder, false);
        query.push_order_by(&mut builder);

        builder.build_query_as::<Author>().fetch_all(&self.pool).await
    }

    async fn insert_author(&self, name: &str) -> RepoResult<Author> {
        sqlx::query_as::<_, Author>("INSERT INTO authors (name) VALUES (?) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
    }

    async fn update_author(&self, id: i64, name: Option<&str>) -> RepoResult<Option<Author>> {
        sqlx::query_as::<_, Author>(
            "UPDATE authors SET name = COALESCE(?, name) WHERE id = ? RETURNING id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_author(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl BookRepository for SqliteStore {
    async fn find_book(&self, id: i64) -> RepoResult<Option<Book>> {
        sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books b WHERE b.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_books(&self, query: &ListQuery) -> RepoResult<Vec<Book>> {
        // Joined for searching by author name.
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {BOOK_COLUMNS} FROM books b JOIN authors a ON a.id = b.author_id"
        ));
        query.push_conditions(&mut builder, false);
        query.push_order_by(&mut builder);

        builder.build_query_as::<Book>().fetch_all(&self.pool).await
    }

    async fn list_books_by_author(&self, author_id: i64) -> RepoResult<Vec<Book>> {
        sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books b WHERE b.author_id = ? ORDER BY b.title, b.id"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn insert_book(&self, book: &NewBook) -> RepoResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, publication_year, author_id)
            VALUES (?, ?, ?)
            RETURNING id, title, publication_year, author_id
            "#,
        )
        .bind(&book.title)
        .bind(book.publication_year)
        .bind(book.author_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_book(&self, id: i64, changes: &BookChanges) -> RepoResult<Option<Book>> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE(?, title),
                author_id = COALESCE(?, author_id)
            WHERE id = ?
            RETURNING id, title, publication_year, author_id
            "#,
        )
        .bind(changes.title.as_deref())
        .bind(changes.author_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_book(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_books(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await
    }
}

/// Replaces the holdings of a library.
async fn replace_library_books(
    conn: &mut SqliteConnection,
    library_id: i64,
    book_ids: &[i64],
) -> RepoResult<()> {
    sqlx::query("DELETE FROM library_books WHERE library_id = ?")
        .bind(library_id)
        .execute(&mut *conn)
        .await?;

    for book_id in book_ids {
        sqlx::query("INSERT OR IGNORE INTO library_books (library_id, book_id) VALUES (?, ?)")
            .bind(library_id)
            .bind(*book_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

#[async_trait]
impl LibraryRepository for SqliteStore {
    async fn find_library(&self, id: i64) -> RepoResult<Option<Library>> {
        sqlx::query_as::<_, Library>("SELECT id, name FROM libraries WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_libraries(&self, query: &ListQuery) -> RepoResult<Vec<Library>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT l.id, l.name FROM libraries l");
        query.push_conditions(&mut builder, false);
        query.push_order_by(&mut builder);

        builder.build_query_as::<Library>().fetch_all(&self.pool).await
    }

    async fn insert_library(&self, name: &str, book_ids: &[i64]) -> RepoResult<Library> {
        let mut tx = self.pool.begin().await?;

        let library = sqlx::query_as::<_, Library>(
            "INSERT INTO libraries (name) VALUES (?) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        replace_library_books(&mut tx, library.id, book_ids).await?;

        tx.commit().await?;
        Ok(library)
    }

    async fn update_library(
        &self,
        id: i64,
        name: Option<&str>,
        book_ids: Option<&[i64]>,
    ) -> RepoResult<Option<Library>> {
        let mut tx = self.pool.begin().await?;

        let library = sqlx::query_as::<_, Library>(
            "UPDATE libraries SET name = COALESCE(?, name) WHERE id = ? RETURNING id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(library) = library else {
            return Ok(None);
        };

        if let Some(book_ids) = book_ids {
            replace_library_books(&mut tx, library.id, book_ids).await?;
        }

        tx.commit().await?;
        Ok(Some(library))
    }

    async fn delete_library(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM libraries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn library_books(&self, library_id: i64) -> RepoResult<Vec<Book>> {
        sqlx::query_as::<_, Book>(&format!(
            r#"
            SELECT {BOOK_COLUMNS}
            FROM books b
            JOIN library_books lb ON lb.book_id = b.id
            WHERE lb.library_id = ?
            ORDER BY b.title, b.id
            "#
        ))
        .bind(library_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn add_library_book(&self, library_id: i64, book_id: i64) -> RepoResult<()> {
        sqlx::query("INSERT OR IGNORE INTO library_books (library_id, book_id) VALUES (?, ?)")
            .bind(library_id)
            .bind(book_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_library_book(&self, library_id: i64, book_id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM library_books WHERE library_id = ? AND book_id = ?")
            .bind(library_id)
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_librarian(&self, library_id: i64) -> RepoResult<Option<Librarian>> {
        sqlx::query_as::<_, Librarian>(
            "SELECT id, name, library_id FROM librarians WHERE library_id = ?",
        )
        .bind(library_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn assign_librarian(&self, library_id: i64, name: &str) -> RepoResult<Librarian> {
        // The unique library_id keeps it to one librarian per library.
        sqlx::query_as::<_, Librarian>(
            r#"
            INSERT INTO librarians (name, library_id)
            VALUES (?, ?)
            ON CONFLICT (library_id) DO UPDATE SET name = excluded.name
            RETURNING id, name, library_id
            "#,
        )
        .bind(name)
        .bind(library_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn remove_librarian(&self, library_id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM librarians WHERE library_id = ?")
            .bind(library_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_libraries(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM libraries")
            .fetch_one(&self.pool)
            .await
    }
}
