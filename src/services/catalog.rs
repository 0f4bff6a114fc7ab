// src/services/catalog.rs

//! Authors, books, libraries and librarians.
//!
//! Everything here is readable by anyone; writes are staff-only.

use axum::http::Method;
use validator::Validate;

use super::not_found;
use crate::{
    error::AppError,
    models::{
        author::{Author, AuthorDetail, CreateAuthorRequest, UpdateAuthorRequest},
        book::{Book, BookChanges, CreateBookRequest, NewBook, UpdateBookRequest},
        library::{
            AssignLibrarianRequest, CreateLibraryRequest, Librarian, Library, LibraryDetail,
            UpdateLibraryRequest,
        },
        user::CurrentUser,
    },
    policy,
    query::ListQuery,
    repository::{AuthorRepository, BookRepository, LibraryRepository},
    utils::validation::validate_publication_year,
};

// ---------------------------------------------------------------------------
// Authors
// ---------------------------------------------------------------------------

pub async fn list_authors<R>(repo: &R, query: &ListQuery) -> Result<Vec<Author>, AppError>
where
    R: AuthorRepository + ?Sized,
{
    Ok(repo.list_authors(query).await?)
}

/// The author with their books, ordered by title.
pub async fn get_author<R>(repo: &R, id: i64) -> Result<AuthorDetail, AppError>
where
    R: AuthorRepository + BookRepository + ?Sized,
{
    let author = repo.find_author(id).await?.ok_or_else(|| not_found("Author", id))?;
    let books = repo.list_books_by_author(id).await?;
    Ok(AuthorDetail { author, books })
}

pub async fn create_author<R>(
    repo: &R,
    actor: &CurrentUser,
    req: CreateAuthorRequest,
) -> Result<Author, AppError>
where
    R: AuthorRepository + ?Sized,
{
    policy::require_write(&Method::POST, actor)?;
    req.validate()?;

    let author = repo.insert_author(req.name.trim()).await?;
    tracing::info!(author_id = author.id, "author created");
    Ok(author)
}

pub async fn update_author<R>(
    repo: &R,
    actor: &CurrentUser,
    id: i64,
    req: UpdateAuthorRequest,
) -> Result<Author, AppError>
where
    R: AuthorRepository + ?Sized,
{
    repo.find_author(id).await?.ok_or_else(|| not_found("Author", id))?;
    policy::require_write(&Method::PUT, actor)?;
    req.validate()?;

    let name = req.name.as_deref().map(str::trim);
    if name.is_some_and(str::is_empty) {
        return Err(AppError::BadRequest("Name cannot be blank.".to_string()));
    }

    repo.update_author(id, name)
        .await?
        .ok_or_else(|| not_found("Author", id))
}

/// Deletes the author and, through the cascade, their books.
pub async fn delete_author<R>(repo: &R, actor: &CurrentUser, id: i64) -> Result<(), AppError>
where
    R: AuthorRepository + ?Sized,
{
    repo.find_author(id).await?.ok_or_else(|| not_found("Author", id))?;
    policy::require_write(&Method::DELETE, actor)?;

    if !repo.delete_author(id).await? {
        return Err(not_found("Author", id));
    }
    tracing::info!(author_id = id, "author deleted");
    Ok(())
}

// ---------------------------------------------------------------------------
// Books
// ---------------------------------------------------------------------------

pub async fn list_books<R>(repo: &R, query: &ListQuery) -> Result<Vec<Book>, AppError>
where
    R: BookRepository + ?Sized,
{
    Ok(repo.list_books(query).await?)
}

pub async fn get_book<R>(repo: &R, id: i64) -> Result<Book, AppError>
where
    R: BookRepository + ?Sized,
{
    repo.find_book(id).await?.ok_or_else(|| not_found("Book", id))
}

async fn ensure_author<R>(repo: &R, author_id: i64) -> Result<(), AppError>
where
    R: AuthorRepository + ?Sized,
{
    if repo.find_author(author_id).await?.is_none() {
        return Err(AppError::BadRequest(format!(
            "Author {author_id} does not exist."
        )));
    }
    Ok(())
}

pub async fn create_book<R>(
    repo: &R,
    actor: &CurrentUser,
    req: CreateBookRequest,
) -> Result<Book, AppError>
where
    R: AuthorRepository + BookRepository + ?Sized,
{
    policy::require_write(&Method::POST, actor)?;
    req.validate()?;
    validate_publication_year(req.publication_year)?;
    ensure_author(repo, req.author_id).await?;

    let book = repo
        .insert_book(&NewBook {
            title: req.title.trim().to_string(),
            publication_year: req.publication_year,
            author_id: req.author_id,
        })
        .await?;

    tracing::info!(book_id = book.id, "book created");
    Ok(book)
}

/// Changes title and author. The publication year is write-once: any
/// payload carrying it, even with the stored value or `null`, is rejected.
pub async fn update_book<R>(
    repo: &R,
    actor: &CurrentUser,
    id: i64,
    req: UpdateBookRequest,
) -> Result<Book, AppError>
where
    R: AuthorRepository + BookRepository + ?Sized,
{
    repo.find_book(id).await?.ok_or_else(|| not_found("Book", id))?;
    policy::require_write(&Method::PUT, actor)?;

    if req.publication_year.is_some() {
        return Err(AppError::BadRequest(
            "Publication year cannot be modified after creation.".to_string(),
        ));
    }

    req.validate()?;

    let title = req.title.as_deref().map(str::trim);
    if title.is_some_and(str::is_empty) {
        return Err(AppError::BadRequest("Title cannot be blank.".to_string()));
    }
    if let Some(author_id) = req.author_id {
        ensure_author(repo, author_id).await?;
    }

    let changes = BookChanges {
        title: title.map(str::to_string),
        author_id: req.author_id,
    };

    repo.update_book(id, &changes)
        .await?
        .ok_or_else(|| not_found("Book", id))
}

pub async fn delete_book<R>(repo: &R, actor: &CurrentUser, id: i64) -> Result<(), AppError>
where
    R: BookRepository + ?Sized,
{
    repo.find_book(id).await?.ok_or_else(|| not_found("Book", id))?;
    policy::require_write(&Method::DELETE, actor)?;

    if !repo.delete_book(id).await? {
        return Err(not_found("Book", id));
    }
    tracing::info!(book_id = id, "book deleted");
    Ok(())
}

// ---------------------------------------------------------------------------
// Libraries
// ---------------------------------------------------------------------------

pub async fn list_libraries<R>(repo: &R, query: &ListQuery) -> Result<Vec<Library>, AppError>
where
    R: LibraryRepository + ?Sized,
{
    Ok(repo.list_libraries(query).await?)
}

async fn library_detail<R>(repo: &R, library: Library) -> Result<LibraryDetail, AppError>
where
    R: LibraryRepository + ?Sized,
{
    let books = repo.library_books(library.id).await?;
    let librarian = repo.find_librarian(library.id).await?;
    Ok(LibraryDetail {
        library,
        books,
        librarian,
    })
}

pub async fn get_library<R>(repo: &R, id: i64) -> Result<LibraryDetail, AppError>
where
    R: LibraryRepository + ?Sized,
{
    let library = repo.find_library(id).await?.ok_or_else(|| not_found("Library", id))?;
    library_detail(repo, library).await
}

async fn ensure_books<R>(repo: &R, book_ids: &[i64]) -> Result<(), AppError>
where
    R: BookRepository + ?Sized,
{
    for &book_id in book_ids {
        if repo.find_book(book_id).await?.is_none() {
            return Err(AppError::BadRequest(format!("Book {book_id} does not exist.")));
        }
    }
    Ok(())
}

pub async fn create_library<R>(
    repo: &R,
    actor: &CurrentUser,
    req: CreateLibraryRequest,
) -> Result<LibraryDetail, AppError>
where
    R: BookRepository + LibraryRepository + ?Sized,
{
    policy::require_write(&Method::POST, actor)?;
    req.validate()?;
    ensure_books(repo, &req.book_ids).await?;

    let library = repo.insert_library(req.name.trim(), &req.book_ids).await?;
    tracing::info!(library_id = library.id, "library created");
    library_detail(repo, library).await
}

pub async fn update_library<R>(
    repo: &R,
    actor: &CurrentUser,
    id: i64,
    req: UpdateLibraryRequest,
) -> Result<LibraryDetail, AppError>
where
    R: BookRepository + LibraryRepository + ?Sized,
{
    repo.find_library(id).await?.ok_or_else(|| not_found("Library", id))?;
    policy::require_write(&Method::PUT, actor)?;
    req.validate()?;

    let name = req.name.as_deref().map(str::trim);
    if name.is_some_and(str::is_empty) {
        return Err(AppError::BadRequest("Name cannot be blank.".to_string()));
    }
    if let Some(book_ids) = &req.book_ids {
        ensure_books(repo, book_ids).await?;
    }

    let library = repo
        .update_library(id, name, req.book_ids.as_deref())
        .await?
        .ok_or_else(|| not_found("Library", id))?;
    library_detail(repo, library).await
}

/// Deletes the library with its librarian and holdings; books survive.
pub async fn delete_library<R>(repo: &R, actor: &CurrentUser, id: i64) -> Result<(), AppError>
where
    R: LibraryRepository + ?Sized,
{
    repo.find_library(id).await?.ok_or_else(|| not_found("Library", id))?;
    policy::require_write(&Method::DELETE, actor)?;

    if !repo.delete_library(id).await? {
        return Err(not_found("Library", id));
    }
    tracing::info!(library_id = id, "library deleted");
    Ok(())
}

pub async fn add_library_book<R>(
    repo: &R,
    actor: &CurrentUser,
    library_id: i64,
    book_id: i64,
) -> Result<LibraryDetail, AppError>
where
    R: BookRepository + LibraryRepository + ?Sized,
{
    let library = repo
        .find_library(library_id)
        .await?
        .ok_or_else(|| not_found("Library", library_id))?;
    policy::require_write(&Method::POST, actor)?;
    repo.find_book(book_id).await?.ok_or_else(|| not_found("Book", book_id))?;

    repo.add_library_book(library_id, book_id).await?;
    library_detail(repo, library).await
}

pub async fn remove_library_book<R>(
    repo: &R,
    actor: &CurrentUser,
    library_id: i64,
    book_id: i64,
) -> Result<(), AppError>
where
    R: LibraryRepository + ?Sized,
{
    repo.find_library(library_id)
        .await?
        .ok_or_else(|| not_found("Library", library_id))?;
    policy::require_write(&Method::DELETE, actor)?;

    if !repo.remove_library_book(library_id, book_id).await? {
        return Err(AppError::NotFound(format!(
            "Book {book_id} is not held by library {library_id}"
        )));
    }
    Ok(())
}

/// Creates the librarian of a library, or renames the current one.
pub async fn assign_librarian<R>(
    repo: &R,
    actor: &CurrentUser,
    library_id: i64,
    req: AssignLibrarianRequest,
) -> Result<Librarian, AppError>
where
    R: LibraryRepository + ?Sized,
{
    repo.find_library(library_id)
        .await?
        .ok_or_else(|| not_found("Library", library_id))?;
    policy::require_write(&Method::PUT, actor)?;
    req.validate()?;

    let librarian = repo.assign_librarian(library_id, req.name.trim()).await?;
    tracing::info!(library_id, librarian_id = librarian.id, "librarian assigned");
    Ok(librarian)
}

pub async fn remove_librarian<R>(
    repo: &R,
    actor: &CurrentUser,
    library_id: i64,
) -> Result<(), AppError>
where
    R: LibraryRepository + ?Sized,
{
    repo.find_library(library_id)
        .await?
        .ok_or_else(|| not_found("Library", library_id))?;
    policy::require_write(&Method::DELETE, actor)?;

    if !repo.remove_librarian(library_id).await? {
        return Err(AppError::NotFound(format!(
            "Library {library_id} has no librarian"
        )));
    }
    Ok(())
}
