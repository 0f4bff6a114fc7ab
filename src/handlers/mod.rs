// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod authors;
pub mod books;
pub mod comments;
pub mod dashboards;
pub mod libraries;
pub mod posts;
pub mod tags;
