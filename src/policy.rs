// src/policy.rs

//! Authorization predicates.
//!
//! Each check is a plain function over the caller. Services call them
//! explicitly; the `require_*` forms turn a denial into `AppError::Forbidden`.

use axum::http::Method;

use crate::{
    error::AppError,
    models::{comment::Comment, post::Post, user::{CurrentUser, Role}},
};

/// Anything with an authoring user.
pub trait Owned {
    fn author_id(&self) -> i64;
}

impl Owned for Post {
    fn author_id(&self) -> i64 {
        self.author_id
    }
}

impl Owned for Comment {
    fn author_id(&self) -> i64 {
        self.author_id
    }
}

/// GET, HEAD and OPTIONS never change state.
pub fn is_read_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Reads are open to everyone; every other method needs a staff user.
pub fn is_write_allowed(method: &Method, user: Option<&CurrentUser>) -> bool {
    is_read_method(method) || user.is_some_and(|u| u.is_staff)
}

pub fn is_owner<R: Owned + ?Sized>(user: &CurrentUser, resource: &R) -> bool {
    user.id == resource.author_id()
}

/// Denies when the profile is missing or carries no role.
pub fn has_role(user: &CurrentUser, role: Role) -> bool {
    user.profile
        .as_ref()
        .and_then(|profile| profile.role)
        .is_some_and(|r| r == role)
}

pub fn require_write(method: &Method, user: &CurrentUser) -> Result<(), AppError> {
    if is_write_allowed(method, Some(user)) {
        return Ok(());
    }
    tracing::debug!(user_id = user.id, %method, "write denied for non-staff user");
    Err(AppError::Forbidden(
        "You do not have permission to perform this action.".to_string(),
    ))
}

/// For staff-only reads such as the user administration list.
pub fn require_staff(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_staff {
        return Ok(());
    }
    Err(AppError::Forbidden("Staff access required.".to_string()))
}

pub fn require_owner<R: Owned + ?Sized>(user: &CurrentUser, resource: &R) -> Result<(), AppError> {
    if is_owner(user, resource) {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "Only the author can modify this resource.".to_string(),
    ))
}

pub fn require_role(user: &CurrentUser, role: Role) -> Result<(), AppError> {
    if has_role(user, role) {
        return Ok(());
    }
    Err(AppError::Forbidden(format!("This area is restricted to the {} role.", role)))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::user::UserProfile;

    fn user(id: i64, is_staff: bool, role: Option<Role>) -> CurrentUser {
        CurrentUser {
            id,
            username: format!("user{id}"),
            is_staff,
            profile: Some(UserProfile { id, user_id: id, role }),
        }
    }

    fn post_by(author_id: i64) -> Post {
        Post {
            id: 7,
            title: "t".into(),
            content: "c".into(),
            published_date: Utc::now(),
            author_id,
            tags: vec![],
        }
    }

    #[test]
    fn reads_are_always_allowed() {
        for method in [Method::GET, Method::HEAD, Method::OPTIONS] {
            assert!(is_write_allowed(&method, None));
            assert!(is_write_allowed(&method, Some(&user(1, false, None))));
        }
    }

    #[test]
    fn writes_need_staff() {
        let member = user(1, false, Some(Role::Member));
        let staff = user(2, true, None);
        for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            assert!(!is_write_allowed(&method, None));
            assert!(!is_write_allowed(&method, Some(&member)));
            assert!(is_write_allowed(&method, Some(&staff)));
        }
        assert!(matches!(
            require_write(&Method::DELETE, &member),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn ownership_compares_author_id() {
        let post = post_by(3);
        assert!(is_owner(&user(3, false, None), &post));
        assert!(!is_owner(&user(4, true, None), &post));
        assert!(require_owner(&user(4, true, None), &post).is_err());
    }

    #[test]
    fn roles_fail_closed() {
        let mut no_profile = user(5, true, None);
        no_profile.profile = None;
        assert!(!has_role(&no_profile, Role::Admin));

        let no_role = user(6, false, None);
        assert!(!has_role(&no_role, Role::Member));

        let librarian = user(7, false, Some(Role::Librarian));
        assert!(has_role(&librarian, Role::Librarian));
        assert!(!has_role(&librarian, Role::Admin));
        assert!(require_role(&librarian, Role::Admin).is_err());
    }
}
