// src/models/mod.rs

pub mod author;
pub mod book;
pub mod comment;
pub mod dashboard;
pub mod library;
pub mod post;
pub mod tag;
pub mod user;
