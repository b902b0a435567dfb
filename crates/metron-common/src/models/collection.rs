//! User collections: the issues a user owns, with grading, purchase and reading data.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::common::NamedRef;
use super::issue::{IssueListRow, IssueSeriesSummary};
use super::user::UserRef;
use crate::validation::{validate_date_year, validate_price};

/// CGC grading scale, best first.
pub const GRADES: [&str; 25] = [
    "10.0", "9.9", "9.8", "9.6", "9.4", "9.2", "9.0", "8.5", "8.0", "7.5", "7.0", "6.5", "6.0",
    "5.5", "5.0", "4.5", "4.0", "3.5", "3.0", "2.5", "2.0", "1.8", "1.5", "1.0", "0.5",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookFormat {
    #[default]
    Print,
    Digital,
    Both,
}

impl BookFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Print => "PRINT",
            Self::Digital => "DIGITAL",
            Self::Both => "BOTH",
        }
    }
}

/// Display label for a stored format code.
pub fn book_format_label(code: &str) -> String {
    match code {
        "PRINT" => "Print",
        "DIGITAL" => "Digital",
        "BOTH" => "Both",
        other => other,
    }
    .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GradingCompany {
    Cgc,
    Cbcs,
    Pgx,
}

impl GradingCompany {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cgc => "CGC",
            Self::Cbcs => "CBCS",
            Self::Pgx => "PGX",
        }
    }
}

/// Display label for a stored grading company; empty for a user-assessed grade.
pub fn grading_company_label(code: &str) -> String {
    match code {
        "CGC" => "CGC (Certified Guaranty Company)",
        "CBCS" => "CBCS (Comic Book Certification Service)",
        "PGX" => "PGX (Professional Grading Experts)",
        _ => "",
    }
    .to_string()
}

pub fn validate_grade(grade: &str) -> Result<(), ValidationError> {
    if GRADES.contains(&grade) {
        Ok(())
    } else {
        Err(ValidationError::new("grade")
            .with_message("Grade must be a value on the CGC scale, like 9.8.".into()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CollectionItem {
    pub id: i64,
    pub user_id: i64,
    pub issue_id: i64,
    pub quantity: i32,
    pub book_format: String,
    pub grade: Option<String>,
    pub grading_company: String,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<String>,
    pub purchase_price_currency: String,
    pub purchase_store: String,
    pub storage_location: String,
    pub notes: String,
    pub is_read: bool,
    pub date_read: Option<DateTime<Utc>>,
    pub rating: Option<i32>,
    pub created_on: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReadDate {
    pub id: i64,
    pub read_date: DateTime<Utc>,
    pub created_on: DateTime<Utc>,
}

/// Query parameters for the collection list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionFilter {
    pub book_format: Option<BookFormat>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_date_gt: Option<NaiveDate>,
    pub purchase_date_lt: Option<NaiveDate>,
    pub purchase_date_gte: Option<NaiveDate>,
    pub purchase_date_lte: Option<NaiveDate>,
    pub purchase_store: Option<String>,
    pub storage_location: Option<String>,
    pub series_id: Option<i64>,
    pub is_read: Option<bool>,
    pub rating: Option<i32>,
    pub grade: Option<String>,
    pub grading_company: Option<GradingCompany>,
    pub modified_gt: Option<DateTime<Utc>>,
    pub page: Option<u32>,
}

/// An owned issue as shown in collection responses.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionIssue {
    pub id: i64,
    pub series: IssueSeriesSummary,
    pub number: String,
    pub cover_date: NaiveDate,
    pub store_date: Option<NaiveDate>,
    pub modified: DateTime<Utc>,
}

impl From<IssueListRow> for CollectionIssue {
    fn from(r: IssueListRow) -> Self {
        Self {
            id: r.id,
            series: IssueSeriesSummary {
                name: r.series_name,
                volume: r.series_volume,
                year_began: r.series_year_began,
            },
            number: r.number,
            cover_date: r.cover_date,
            store_date: r.store_date,
            modified: r.modified,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CollectionListRow {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub quantity: i32,
    pub book_format: String,
    pub grade: Option<String>,
    pub grading_company: String,
    pub purchase_date: Option<NaiveDate>,
    pub is_read: bool,
    pub rating: Option<i32>,
    pub modified: DateTime<Utc>,
    pub issue_id: i64,
    pub number: String,
    pub cover_date: NaiveDate,
    pub store_date: Option<NaiveDate>,
    pub issue_modified: DateTime<Utc>,
    pub series_name: String,
    pub series_volume: i32,
    pub series_year_began: i32,
}

#[derive(Debug, Serialize)]
pub struct CollectionListItem {
    pub id: i64,
    pub user: UserRef,
    pub issue: CollectionIssue,
    pub quantity: i32,
    pub book_format: String,
    pub grade: Option<String>,
    pub grading_company: String,
    pub purchase_date: Option<NaiveDate>,
    pub is_read: bool,
    pub rating: Option<i32>,
    pub modified: DateTime<Utc>,
}

impl From<CollectionListRow> for CollectionListItem {
    fn from(r: CollectionListRow) -> Self {
        Self {
            id: r.id,
            user: UserRef {
                id: r.user_id,
                username: r.username,
            },
            issue: CollectionIssue {
                id: r.issue_id,
                series: IssueSeriesSummary {
                    name: r.series_name,
                    volume: r.series_volume,
                    year_began: r.series_year_began,
                },
                number: r.number,
                cover_date: r.cover_date,
                store_date: r.store_date,
                modified: r.issue_modified,
            },
            quantity: r.quantity,
            book_format: book_format_label(&r.book_format),
            grade: r.grade,
            grading_company: grading_company_label(&r.grading_company),
            purchase_date: r.purchase_date,
            is_read: r.is_read,
            rating: r.rating,
            modified: r.modified,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CollectionItemResponse {
    pub id: i64,
    pub user: UserRef,
    pub issue: CollectionIssue,
    pub quantity: i32,
    pub book_format: String,
    pub grade: Option<String>,
    pub grading_company: String,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<String>,
    pub purchase_price_currency: String,
    pub purchase_store: String,
    pub storage_location: String,
    pub notes: String,
    pub is_read: bool,
    pub date_read: Option<DateTime<Utc>>,
    pub read_dates: Vec<ReadDate>,
    pub read_count: usize,
    pub rating: Option<i32>,
    pub created_on: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl CollectionItemResponse {
    pub fn new(item: CollectionItem, user: UserRef, issue: CollectionIssue, read_dates: Vec<ReadDate>) -> Self {
        Self {
            id: item.id,
            user,
            issue,
            quantity: item.quantity,
            book_format: book_format_label(&item.book_format),
            grade: item.grade,
            grading_company: grading_company_label(&item.grading_company),
            purchase_date: item.purchase_date,
            purchase_price: item.purchase_price,
            purchase_price_currency: item.purchase_price_currency,
            purchase_store: item.purchase_store,
            storage_location: item.storage_location,
            notes: item.notes,
            is_read: item.is_read,
            date_read: item.date_read,
            read_count: read_dates.len(),
            read_dates,
            rating: item.rating,
            created_on: item.created_on,
            modified: item.modified,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCollectionItemRequest {
    pub issue: i64,

    #[validate(range(min = 0, max = 32767))]
    pub quantity: Option<i32>,

    pub book_format: Option<BookFormat>,

    #[validate(custom(function = "validate_grade"))]
    pub grade: Option<String>,

    pub grading_company: Option<GradingCompany>,

    #[validate(custom(function = "validate_date_year"))]
    pub purchase_date: Option<NaiveDate>,

    #[validate(custom(function = "validate_price"))]
    pub purchase_price: Option<String>,

    #[validate(length(equal = 3, message = "Currency must be a three-letter code"))]
    pub purchase_price_currency: Option<String>,

    #[validate(length(max = 255))]
    pub purchase_store: Option<String>,

    #[validate(length(max = 255))]
    pub storage_location: Option<String>,

    pub notes: Option<String>,

    pub is_read: Option<bool>,

    pub date_read: Option<DateTime<Utc>>,

    #[validate(range(min = 1, max = 5, message = "Rating must be 1-5"))]
    pub rating: Option<i32>,
}

/// Partial update of an owned item. The issue cannot change.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCollectionItemRequest {
    #[validate(range(min = 0, max = 32767))]
    pub quantity: Option<i32>,

    pub book_format: Option<BookFormat>,

    #[validate(custom(function = "validate_grade"))]
    pub grade: Option<String>,

    pub grading_company: Option<GradingCompany>,

    #[validate(custom(function = "validate_date_year"))]
    pub purchase_date: Option<NaiveDate>,

    #[validate(custom(function = "validate_price"))]
    pub purchase_price: Option<String>,

    #[validate(length(equal = 3, message = "Currency must be a three-letter code"))]
    pub purchase_price_currency: Option<String>,

    #[validate(length(max = 255))]
    pub purchase_store: Option<String>,

    #[validate(length(max = 255))]
    pub storage_location: Option<String>,

    pub notes: Option<String>,

    pub is_read: Option<bool>,

    pub date_read: Option<DateTime<Utc>>,

    #[validate(range(min = 1, max = 5, message = "Rating must be 1-5"))]
    pub rating: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FormatCount {
    pub book_format: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct CollectionStats {
    pub total_items: i64,
    pub total_quantity: i64,
    /// Sum of purchase prices, two decimals.
    pub total_value: String,
    pub read_count: i64,
    pub unread_count: i64,
    pub by_format: Vec<FormatCount>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MissingSeriesRow {
    pub id: i64,
    pub name: String,
    pub sort_name: String,
    pub year_began: i32,
    pub year_end: Option<i32>,
    pub publisher_id: i64,
    pub publisher_name: String,
    pub series_type_id: i64,
    pub series_type_name: String,
    pub total_issues: i64,
    pub owned_issues: i64,
}

#[derive(Debug, Serialize)]
pub struct MissingSeries {
    pub id: i64,
    pub name: String,
    pub sort_name: String,
    pub year_began: i32,
    pub year_end: Option<i32>,
    pub publisher: NamedRef,
    pub series_type: NamedRef,
    pub total_issues: i64,
    pub owned_issues: i64,
    pub missing_count: i64,
    pub completion_percentage: f64,
}

/// Share of a series owned, as a percentage rounded to one decimal.
pub fn completion_percentage(owned: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (owned as f64 / total as f64 * 1000.0).round() / 10.0
}

impl From<MissingSeriesRow> for MissingSeries {
    fn from(r: MissingSeriesRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            sort_name: r.sort_name,
            year_began: r.year_began,
            year_end: r.year_end,
            publisher: NamedRef {
                id: r.publisher_id,
                name: r.publisher_name,
            },
            series_type: NamedRef {
                id: r.series_type_id,
                name: r.series_type_name,
            },
            missing_count: r.total_issues - r.owned_issues,
            completion_percentage: completion_percentage(r.owned_issues, r.total_issues),
            total_issues: r.total_issues,
            owned_issues: r.owned_issues,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MissingIssue {
    pub id: i64,
    pub series: IssueSeriesSummary,
    pub number: String,
    pub cover_date: NaiveDate,
    pub store_date: Option<NaiveDate>,
}

impl From<IssueListRow> for MissingIssue {
    fn from(r: IssueListRow) -> Self {
        Self {
            id: r.id,
            series: IssueSeriesSummary {
                name: r.series_name,
                volume: r.series_volume,
                year_began: r.series_year_began,
            },
            number: r.number,
            cover_date: r.cover_date,
            store_date: r.store_date,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ScrobbleRequest {
    pub issue_id: i64,
    /// Defaults to now.
    pub date_read: Option<DateTime<Utc>>,
    #[validate(range(min = 1, max = 5, message = "Rating must be 1-5"))]
    pub rating: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ScrobbleResponse {
    pub id: i64,
    pub issue: CollectionIssue,
    pub is_read: bool,
    pub date_read: Option<DateTime<Utc>>,
    pub rating: Option<i32>,
    /// Whether the scrobble added the issue to the collection.
    pub created: bool,
    pub modified: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_rounds_to_one_decimal() {
        assert_eq!(completion_percentage(2, 3), 66.7);
        assert_eq!(completion_percentage(1, 4), 25.0);
        assert_eq!(completion_percentage(0, 0), 0.0);
    }

    #[test]
    fn missing_count_is_total_minus_owned() {
        let row = MissingSeriesRow {
            id: 4,
            name: "Saga".into(),
            sort_name: "Saga".into(),
            year_began: 2012,
            year_end: None,
            publisher_id: 2,
            publisher_name: "Image".into(),
            series_type_id: 1,
            series_type_name: "Ongoing Series".into(),
            total_issues: 66,
            owned_issues: 60,
        };
        let series = MissingSeries::from(row);
        assert_eq!(series.missing_count, 6);
        assert_eq!(series.completion_percentage, 90.9);
        assert_eq!(series.publisher.name, "Image");
    }

    #[test]
    fn grades_follow_the_cgc_scale() {
        assert!(validate_grade("9.8").is_ok());
        assert!(validate_grade("0.5").is_ok());
        assert!(validate_grade("9.7").is_err());
        assert!(validate_grade("10").is_err());
    }

    #[test]
    fn labels_for_stored_codes() {
        assert_eq!(book_format_label("DIGITAL"), "Digital");
        assert_eq!(grading_company_label("CBCS"), "CBCS (Comic Book Certification Service)");
        assert_eq!(grading_company_label(""), "");
    }

    #[test]
    fn scrobble_rating_must_be_one_to_five() {
        for (rating, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let body = serde_json::json!({ "issue_id": 1, "rating": rating });
            let req: ScrobbleRequest = serde_json::from_value(body).unwrap();
            assert_eq!(req.validate().is_ok(), ok, "rating {rating}");
        }
    }

    #[test]
    fn scrobble_date_is_optional() {
        let req: ScrobbleRequest = serde_json::from_value(serde_json::json!({ "issue_id": 8 })).unwrap();
        assert!(req.date_read.is_none());
        assert!(req.rating.is_none());
        assert!(serde_json::from_value::<ScrobbleRequest>(
            serde_json::json!({ "issue_id": 8, "date_read": "yesterday" })
        )
        .is_err());
    }
}
