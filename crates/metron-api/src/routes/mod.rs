//! API route modules, plus the small helpers they share.

pub mod arcs;
pub mod auth;
pub mod characters;
pub mod collections;
pub mod creators;
pub mod credits;
pub mod genres;
pub mod health;
pub mod home;
pub mod imprints;
pub mod issues;
pub mod publishers;
pub mod reading_lists;
pub mod roles;
pub mod series;
pub mod series_types;
pub mod statistics;
pub mod teams;
pub mod universes;
pub mod users;
pub mod variants;

use metron_common::error::{MetronError, MetronResult};
use metron_common::models::IssueListItem;
use metron_common::pagination::{Page, PageRequest};
use metron_db::repository::{self, Link};
use serde::Deserialize;
use sqlx::PgPool;
use validator::ValidationError;

/// `?page=N` for endpoints without other filters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

/// Validated page request using the configured page size.
pub(crate) fn page_request(page: Option<u32>) -> MetronResult<PageRequest> {
    let api = &metron_common::config::get().api;
    PageRequest::new(page, api.page_size.min(api.max_page_size))
}

/// Wrap a page of rows in the list envelope, converting each row for output.
pub(crate) fn paginate<R, T: From<R>>(
    rows: Vec<R>,
    total: i64,
    request: &PageRequest,
) -> MetronResult<Page<T>> {
    request.ensure_in_range(total)?;
    Ok(Page::new(rows, total, request).map(T::from))
}

/// A cross-field rule failure checked outside `Validate`, as a 400.
pub(crate) fn rule_failed(error: ValidationError) -> MetronError {
    MetronError::validation(
        error
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("Invalid value for '{}'", error.code)),
    )
}

/// Turn a missing row into a 404 for `resource`.
pub(crate) fn found<T>(row: Option<T>, resource: &str) -> MetronResult<T> {
    row.ok_or_else(|| MetronError::not_found(resource))
}

/// The client's slug if given, otherwise the first free slug for `base`.
pub(crate) async fn resolve_slug(
    pool: &PgPool,
    table: &str,
    requested: Option<&str>,
    base: &str,
) -> MetronResult<String> {
    match requested {
        Some(slug) => Ok(slug.to_string()),
        None => Ok(repository::next_slug(pool, table, base).await?),
    }
}

/// Shared `issue_list` action: issues linked to one object, 404 if the object is missing.
pub(crate) async fn issue_list(
    pool: &PgPool,
    table: &str,
    resource: &str,
    link: Link,
    id: i64,
    page: Option<u32>,
) -> MetronResult<Page<IssueListItem>> {
    found(repository::named_ref(pool, table, id).await?, resource)?;
    let request = page_request(page)?;
    let (rows, total) = repository::issues::list_for_link(pool, link, id, &request).await?;
    paginate(rows, total, &request)
}
