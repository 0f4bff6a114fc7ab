// src/services/mod.rs

//! Business rules.
//!
//! Services are generic over the repository traits and return `AppError`.
//! They validate input, apply the checks from [`crate::policy`] and turn
//! missing rows into `NotFound`. Handlers only translate HTTP to calls here.

pub mod accounts;
pub mod blog;
pub mod catalog;
pub mod dashboards;

use crate::error::AppError;

pub(crate) fn not_found(kind: &str, id: i64) -> AppError {
    AppError::NotFound(format!("{kind} {id} not found"))
}
