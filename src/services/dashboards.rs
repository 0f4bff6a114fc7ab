// src/services/dashboards.rs

//! One landing view per role. Callers without the role get a 403.

use crate::{
    error::AppError,
    models::{
        dashboard::{AdminDashboard, LibrarianDashboard, MemberDashboard, StaffedLibrary},
        user::{CurrentUser, Role},
    },
    policy,
    query::ListQuery,
    repository::{BookRepository, LibraryRepository, UserRepository, catalog::LIBRARY_LIST},
};

pub async fn admin<R>(repo: &R, actor: &CurrentUser) -> Result<AdminDashboard, AppError>
where
    R: UserRepository + ?Sized,
{
    policy::require_role(actor, Role::Admin)?;
    let users = repo.list_users().await?;
    Ok(AdminDashboard {
        total_users: repo.count_users().await?,
        users,
    })
}

pub async fn librarian<R>(repo: &R, actor: &CurrentUser) -> Result<LibrarianDashboard, AppError>
where
    R: LibraryRepository + ?Sized,
{
    policy::require_role(actor, Role::Librarian)?;

    let mut libraries = Vec::new();
    for library in repo.list_libraries(&ListQuery::unfiltered(&LIBRARY_LIST)).await? {
        let librarian = repo.find_librarian(library.id).await?;
        libraries.push(StaffedLibrary { library, librarian });
    }

    Ok(LibrarianDashboard { libraries })
}

pub async fn member<R>(repo: &R, actor: &CurrentUser) -> Result<MemberDashboard, AppError>
where
    R: BookRepository + LibraryRepository + ?Sized,
{
    policy::require_role(actor, Role::Member)?;

    Ok(MemberDashboard {
        message: format!("Welcome, {}!", actor.username),
        books: repo.count_books().await?,
        libraries: repo.count_libraries().await?,
    })
}
