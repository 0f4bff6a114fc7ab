// src/query.rs

//! Filtering, search and ordering for list endpoints.
//!
//! A resource declares which fields may be filtered, searched and ordered in
//! a static [`ListSpec`]. Query parameters are parsed against it into a
//! [`ListQuery`], which the repository appends to its `SELECT`.
//!
//! Accepted parameters:
//! * `filter[field]=value` or `field=value`: exact match, AND-combined.
//! * `search=text` (alias `q`): case-insensitive substring match, OR-combined
//!   across the searchable fields.
//! * `ordering=field[,-field]`: ascending, `-` for descending.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite};

use crate::{error::AppError, utils::html::clean_html};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
}

#[derive(Debug)]
pub struct FilterField {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
}

/// A searchable text expression.
///
/// With `via` set, the match runs inside `via ... )`, e.g. an `EXISTS`
/// subquery over a join table.
#[derive(Debug)]
pub struct SearchField {
    pub column: &'static str,
    pub via: Option<&'static str>,
    /// The column holds sanitized HTML, so the term is encoded the same way
    /// before matching (`&` is stored as `&amp;`).
    pub html: bool,
}

impl SearchField {
    pub const fn plain(column: &'static str) -> Self {
        SearchField { column, via: None, html: false }
    }

    pub const fn html(column: &'static str) -> Self {
        SearchField { column, via: None, html: true }
    }

    pub const fn via(via: &'static str, column: &'static str) -> Self {
        SearchField { column, via: Some(via), html: false }
    }
}

#[derive(Debug)]
pub struct ListSpec {
    pub filters: &'static [FilterField],
    pub search: &'static [SearchField],
    /// (parameter name, column)
    pub ordering: &'static [(&'static str, &'static str)],
    /// Used when no `ordering` parameter is given, same syntax.
    pub default_ordering: &'static str,
    /// Appended last so equal keys come back in a stable order.
    pub tiebreak: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Integer(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderTerm {
    pub column: &'static str,
    pub descending: bool,
}

#[derive(Debug, Clone)]
pub struct ListQuery {
    pub filters: Vec<(&'static str, FilterValue)>,
    pub search: Option<String>,
    pub order: Vec<OrderTerm>,
    spec: &'static ListSpec,
}

impl ListQuery {
    /// Default listing: no filter, no search, default ordering.
    pub fn unfiltered(spec: &'static ListSpec) -> Self {
        let order = parse_ordering(spec, spec.default_ordering)
            .unwrap_or_default();
        ListQuery {
            filters: Vec::new(),
            search: None,
            order,
            spec,
        }
    }

    pub fn parse(spec: &'static ListSpec, params: &HashMap<String, String>) -> Result<Self, AppError> {
        let mut query = ListQuery::unfiltered(spec);

        // Sorted so that repeated requests build identical SQL.
        let mut keys: Vec<&String> = params.keys().collect();
        keys.sort();

        for key in keys {
            let value = &params[key];
            match key.as_str() {
                "search" | "q" => {
                    let term = value.trim();
                    if !term.is_empty() {
                        query.search = Some(term.to_string());
                    }
                }
                "ordering" => {
                    if !value.trim().is_empty() {
                        query.order = parse_ordering(spec, value)?;
                    }
                }
                _ => {
                    if let Some(name) = key.strip_prefix("filter[").and_then(|k| k.strip_suffix(']')) {
                        let field = find_filter(spec, name).ok_or_else(|| {
                            AppError::BadRequest(format!("Cannot filter on '{}'", name))
                        })?;
                        query.filters.push((field.column, parse_value(field, value)?));
                    } else if let Some(field) = find_filter(spec, key) {
                        query.filters.push((field.column, parse_value(field, value)?));
                    }
                    // Anything else is not ours to interpret.
                }
            }
        }

        Ok(query)
    }

    /// Appends `WHERE`/`AND` conditions. `has_where` tells whether the
    /// statement already carries a `WHERE` clause.
    pub fn push_conditions(&self, builder: &mut QueryBuilder<'_, Sqlite>, has_where: bool) {
        let mut first = !has_where;
        let mut keyword = |builder: &mut QueryBuilder<'_, Sqlite>| {
            builder.push(if first { " WHERE " } else { " AND " });
            first = false;
        };

        for (column, value) in &self.filters {
            keyword(builder);
            builder.push(*column).push(" = ");
            match value {
                FilterValue::Integer(v) => builder.push_bind(*v),
                FilterValue::Text(v) => builder.push_bind(v.clone()),
            };
        }

        if let Some(term) = &self.search {
            if !self.spec.search.is_empty() {
                keyword(builder);
                // SQLite's LOWER() folds ASCII only; fold the term the same way.
                let pattern = like_pattern(term);
                // Markup-only terms clean down to "" and would match everything.
                let encoded = clean_html(term);
                let html_pattern =
                    if encoded.is_empty() { pattern.clone() } else { like_pattern(&encoded) };
                builder.push("(");
                for (i, field) in self.spec.search.iter().enumerate() {
                    if i > 0 {
                        builder.push(" OR ");
                    }
                    if let Some(via) = field.via {
                        builder.push(via);
                    }
                    builder
                        .push("LOWER(")
                        .push(field.column)
                        .push(") LIKE ")
                        .push_bind(if field.html { html_pattern.clone() } else { pattern.clone() })
                        .push(" ESCAPE '\\'");
                    if field.via.is_some() {
                        builder.push(")");
                    }
                }
                builder.push(")");
            }
        }
    }

    pub fn push_order_by(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        builder.push(" ORDER BY ");
        for term in &self.order {
            builder
                .push(term.column)
                .push(if term.descending { " DESC, " } else { " ASC, " });
        }
        builder.push(self.spec.tiebreak).push(" ASC");
    }
}

fn find_filter(spec: &ListSpec, name: &str) -> Option<&'static FilterField> {
    let filters: &'static [FilterField] = spec.filters;
    filters.iter().find(|f| f.name == name)
}

fn parse_value(field: &FilterField, raw: &str) -> Result<FilterValue, AppError> {
    match field.kind {
        FieldKind::Integer => raw
            .trim()
            .parse::<i64>()
            .map(FilterValue::Integer)
            .map_err(|_| AppError::BadRequest(format!("'{}' expects an integer", field.name))),
        FieldKind::Text => Ok(FilterValue::Text(raw.to_string())),
    }
}

fn parse_ordering(spec: &ListSpec, raw: &str) -> Result<Vec<OrderTerm>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|term| {
            let (descending, name) = match term.strip_prefix('-') {
                Some(name) => (true, name),
                None => (false, term),
            };
            spec.ordering
                .iter()
                .find(|(n, _)| *n == name)
                .map(|&(_, column)| OrderTerm { column, descending })
                .ok_or_else(|| AppError::BadRequest(format!("Cannot order by '{}'", name)))
        })
        .collect()
}

fn like_pattern(term: &str) -> String {
    format!("%{}%", escape_like(&term.to_ascii_lowercase()))
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
