// src/models/dashboard.rs

use serde::Serialize;

use crate::models::{
    library::{Librarian, Library},
    user::UserWithProfile,
};

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub total_users: i64,
    pub users: Vec<UserWithProfile>,
}

#[derive(Debug, Serialize)]
pub struct StaffedLibrary {
    #[serde(flatten)]
    pub library: Library,
    pub librarian: Option<Librarian>,
}

#[derive(Debug, Serialize)]
pub struct LibrarianDashboard {
    pub libraries: Vec<StaffedLibrary>,
}

#[derive(Debug, Serialize)]
pub struct MemberDashboard {
    pub message: String,
    pub books: i64,
    pub libraries: i64,
}
