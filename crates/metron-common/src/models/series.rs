//! Series model: a run of issues under one publisher, volume and format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::common::NamedRef;

/// Well-known series type ids. The table is seeded and these ids never change.
pub mod series_types {
    pub const ANNUAL: i64 = 6;
    pub const HARDCOVER: i64 = 8;
    pub const GRAPHIC_NOVEL: i64 = 9;
    pub const TRADE_PAPERBACK: i64 = 10;
    pub const DIGITAL_CHAPTER: i64 = 12;
    pub const OMNIBUS: i64 = 15;

    /// Formats that bundle previously published issues.
    pub const COLLECTIONS: [i64; 3] = [TRADE_PAPERBACK, OMNIBUS, HARDCOVER];

    pub fn is_collection(series_type_id: i64) -> bool {
        COLLECTIONS.contains(&series_type_id)
    }
}

/// Publication format (Ongoing Series, Trade Paperback, …).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SeriesType {
    pub id: i64,
    pub name: String,
    pub notes: String,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
pub enum SeriesStatus {
    Cancelled = 1,
    Completed = 2,
    Hiatus = 3,
    Ongoing = 4,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Series {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub sort_name: String,
    pub volume: i32,
    pub year_began: i32,
    pub year_end: Option<i32>,
    pub series_type_id: i64,
    pub status: SeriesStatus,
    pub publisher_id: i64,
    pub imprint_id: Option<i64>,
    /// Whether issues may carry a collection title.
    pub collection: bool,
    #[serde(rename = "desc")]
    pub description: String,
    pub cv_id: Option<i32>,
    pub gcd_id: Option<i32>,
    pub created_by: Option<i64>,
    pub edited_by: Option<i64>,
    pub created_on: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Human-readable series label, with the format called out for collected editions.
pub fn series_display(name: &str, year_began: i32, series_type_id: i64) -> String {
    match series_type_id {
        series_types::DIGITAL_CHAPTER => format!("{name} ({year_began}) Digital"),
        series_types::TRADE_PAPERBACK => format!("{name} TPB ({year_began})"),
        series_types::HARDCOVER => format!("{name} HC ({year_began})"),
        series_types::GRAPHIC_NOVEL => format!("{name} GN ({year_began})"),
        _ => format!("{name} ({year_began})"),
    }
}

impl Series {
    pub fn display(&self) -> String {
        series_display(&self.name, self.year_began, self.series_type_id)
    }
}

/// Query parameters for the series list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesFilter {
    /// Every whitespace-separated word must appear in the name.
    pub name: Option<String>,
    pub publisher_id: Option<i64>,
    pub series_type_id: Option<i64>,
    pub status: Option<SeriesStatus>,
    pub year_began: Option<i32>,
    pub volume: Option<i32>,
    pub modified_gt: Option<DateTime<Utc>>,
    pub cv_id: Option<i32>,
    pub gcd_id: Option<i32>,
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_create_series"))]
pub struct CreateSeriesRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub sort_name: Option<String>,

    #[validate(range(min = 1, max = 999, message = "Volume must be positive"))]
    pub volume: i32,

    #[validate(range(min = 1900, max = 2100, message = "Year began is out of range"))]
    pub year_began: i32,

    #[validate(range(min = 1900, max = 2100, message = "Year ended is out of range"))]
    pub year_end: Option<i32>,

    pub series_type: i64,

    pub status: Option<SeriesStatus>,

    pub publisher: i64,

    pub imprint: Option<i64>,

    pub collection: Option<bool>,

    #[serde(rename = "desc")]
    pub description: Option<String>,

    #[validate(range(min = 1))]
    pub cv_id: Option<i32>,

    #[validate(range(min = 1))]
    pub gcd_id: Option<i32>,

    #[serde(default)]
    pub genres: Vec<i64>,

    #[serde(default)]
    pub associated: Vec<i64>,
}

/// Partial update. `genres` and `associated`, when present, replace the stored sets.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSeriesRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub sort_name: Option<String>,

    #[validate(range(min = 1, max = 999, message = "Volume must be positive"))]
    pub volume: Option<i32>,

    #[validate(range(min = 1900, max = 2100, message = "Year began is out of range"))]
    pub year_began: Option<i32>,

    #[validate(range(min = 1900, max = 2100, message = "Year ended is out of range"))]
    pub year_end: Option<i32>,

    pub series_type: Option<i64>,

    pub status: Option<SeriesStatus>,

    pub publisher: Option<i64>,

    pub imprint: Option<i64>,

    pub collection: Option<bool>,

    #[serde(rename = "desc")]
    pub description: Option<String>,

    #[validate(range(min = 1))]
    pub cv_id: Option<i32>,

    #[validate(range(min = 1))]
    pub gcd_id: Option<i32>,

    pub genres: Option<Vec<i64>>,

    pub associated: Option<Vec<i64>>,
}

fn validate_create_series(req: &CreateSeriesRequest) -> Result<(), ValidationError> {
    check_series_rules(req.series_type, req.year_began, req.year_end, req.cv_id)
}

/// A series is never associated with itself.
pub fn check_associated(series_id: i64, associated: &[i64]) -> Result<(), ValidationError> {
    if associated.contains(&series_id) {
        return Err(ValidationError::new("associated")
            .with_message("A series cannot be associated with itself.".into()));
    }
    Ok(())
}

/// Cross-field rules, applied to the merged state of a create or an update.
pub fn check_series_rules(
    series_type_id: i64,
    year_began: i32,
    year_end: Option<i32>,
    cv_id: Option<i32>,
) -> Result<(), ValidationError> {
    if let Some(end) = year_end {
        if end < year_began {
            return Err(ValidationError::new("year_end")
                .with_message("Year ended cannot be before year began.".into()));
        }
    }
    if cv_id.is_some() && series_type_id == series_types::TRADE_PAPERBACK {
        return Err(ValidationError::new("cv_id").with_message(
            "Adding a Comic Vine ID is not allowed for Trade Paperbacks.".into(),
        ));
    }
    Ok(())
}

/// Row returned by the series list query.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SeriesListRow {
    pub id: i64,
    pub name: String,
    pub volume: i32,
    pub year_began: i32,
    pub series_type_id: i64,
    pub issue_count: i64,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SeriesListItem {
    pub id: i64,
    pub series: String,
    pub year_began: i32,
    pub volume: i32,
    pub issue_count: i64,
    pub modified: DateTime<Utc>,
}

impl From<SeriesListRow> for SeriesListItem {
    fn from(r: SeriesListRow) -> Self {
        Self {
            id: r.id,
            series: series_display(&r.name, r.year_began, r.series_type_id),
            year_began: r.year_began,
            volume: r.volume,
            issue_count: r.issue_count,
            modified: r.modified,
        }
    }
}

/// Another series shown by its display label.
#[derive(Debug, Clone, Serialize)]
pub struct AssociatedSeries {
    pub id: i64,
    pub series: String,
}

/// Row shape for [`AssociatedSeries`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SeriesLabelRow {
    pub id: i64,
    pub name: String,
    pub year_began: i32,
    pub series_type_id: i64,
}

impl From<SeriesLabelRow> for AssociatedSeries {
    fn from(r: SeriesLabelRow) -> Self {
        Self {
            id: r.id,
            series: series_display(&r.name, r.year_began, r.series_type_id),
        }
    }
}

/// Genres and associated series of one series.
#[derive(Debug, Clone, Default)]
pub struct SeriesRelations {
    pub genres: Vec<NamedRef>,
    pub associated: Vec<AssociatedSeries>,
}

#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub id: i64,
    pub name: String,
    pub sort_name: String,
    pub slug: String,
    pub volume: i32,
    pub series_type: NamedRef,
    pub status: SeriesStatus,
    pub publisher: NamedRef,
    pub imprint: Option<NamedRef>,
    pub year_began: i32,
    pub year_end: Option<i32>,
    pub collection: bool,
    #[serde(rename = "desc")]
    pub description: String,
    pub issue_count: i64,
    pub genres: Vec<NamedRef>,
    pub associated: Vec<AssociatedSeries>,
    pub cv_id: Option<i32>,
    pub gcd_id: Option<i32>,
    pub modified: DateTime<Utc>,
}

impl SeriesResponse {
    pub fn new(
        series: Series,
        series_type: NamedRef,
        publisher: NamedRef,
        imprint: Option<NamedRef>,
        issue_count: i64,
        relations: SeriesRelations,
    ) -> Self {
        Self {
            id: series.id,
            name: series.name,
            sort_name: series.sort_name,
            slug: series.slug,
            volume: series.volume,
            series_type,
            status: series.status,
            publisher,
            imprint,
            year_began: series.year_began,
            year_end: series.year_end,
            collection: series.collection,
            description: series.description,
            issue_count,
            genres: relations.genres,
            associated: relations.associated,
            cv_id: series.cv_id,
            gcd_id: series.gcd_id,
            modified: series.modified,
        }
    }
}

/// Derive the sort name by dropping a leading English article.
pub fn default_sort_name(name: &str) -> String {
    let trimmed = name.trim();
    for article in ["The ", "A ", "An "] {
        if let Some(rest) = trimmed.strip_prefix(article) {
            return rest.to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_calls_out_collected_formats() {
        assert_eq!(series_display("Sandman", 1989, 1), "Sandman (1989)");
        assert_eq!(
            series_display("Deathstroke", 2015, series_types::TRADE_PAPERBACK),
            "Deathstroke TPB (2015)"
        );
        assert_eq!(
            series_display("Absolute Sandman", 2006, series_types::HARDCOVER),
            "Absolute Sandman HC (2006)"
        );
        assert_eq!(
            series_display("Batman", 2020, series_types::DIGITAL_CHAPTER),
            "Batman (2020) Digital"
        );
    }

    #[test]
    fn collection_types() {
        assert!(series_types::is_collection(series_types::OMNIBUS));
        assert!(series_types::is_collection(series_types::TRADE_PAPERBACK));
        assert!(!series_types::is_collection(series_types::ANNUAL));
    }

    #[test]
    fn series_rules() {
        assert!(check_series_rules(1, 2000, Some(1999), None).is_err());
        assert!(check_series_rules(1, 2000, Some(2004), Some(7)).is_ok());
        assert!(check_series_rules(series_types::TRADE_PAPERBACK, 2000, None, Some(7)).is_err());
    }

    #[test]
    fn no_self_association() {
        assert!(check_associated(7, &[3, 7]).is_err());
        assert!(check_associated(7, &[3, 9]).is_ok());
    }

    #[test]
    fn associated_series_use_display_label() {
        let row = SeriesLabelRow {
            id: 3,
            name: "Sandman".into(),
            year_began: 1989,
            series_type_id: series_types::TRADE_PAPERBACK,
        };
        assert_eq!(AssociatedSeries::from(row).series, "Sandman TPB (1989)");
    }

    #[test]
    fn relation_lists_default_to_empty_on_create() {
        let body = serde_json::json!({
            "name": "Saga",
            "volume": 1,
            "year_began": 2012,
            "series_type": 1,
            "publisher": 2
        });
        let req: CreateSeriesRequest = serde_json::from_value(body).unwrap();
        assert!(req.genres.is_empty());
        assert!(req.associated.is_empty());
    }

    #[test]
    fn sort_name_drops_article() {
        assert_eq!(default_sort_name("The Flash"), "Flash");
        assert_eq!(default_sort_name("Thor"), "Thor");
    }
}
