//! Issue model: a single published comic, or a collection of reprinted issues.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::common::NamedRef;
use super::credit::CreditRead;
use super::series::{series_display, series_types};
use super::variant::VariantSummary;
use crate::validation::{
    validate_date_year, validate_isbn, validate_price, validate_sku, validate_upc,
};

/// Seeded age ratings (Unknown, Everyone, Teen, Teen Plus, Mature).
pub mod ratings {
    /// Default for issues created without a rating.
    pub const UNKNOWN: i64 = 1;
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Issue {
    pub id: i64,
    pub series_id: i64,
    pub number: String,
    pub alt_number: String,
    /// Collection title; only used when the series is a collection.
    pub title: String,
    pub slug: String,
    /// Story titles, in reading order.
    pub name: Vec<String>,
    pub cover_date: NaiveDate,
    pub store_date: Option<NaiveDate>,
    pub foc_date: Option<NaiveDate>,
    pub price: Option<String>,
    pub price_currency: String,
    pub sku: String,
    pub isbn: String,
    pub upc: String,
    pub page: Option<i32>,
    #[serde(rename = "desc")]
    pub description: String,
    pub rating_id: i64,
    pub cv_id: Option<i32>,
    pub gcd_id: Option<i32>,
    pub created_by: Option<i64>,
    pub edited_by: Option<i64>,
    pub created_on: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Issue label as shown in lists: `"<series display> #<number>"`.
pub fn issue_display(series_name: &str, year_began: i32, series_type_id: i64, number: &str) -> String {
    format!(
        "{} #{number}",
        series_display(series_name, year_began, series_type_id)
    )
}

/// Issue joined with the series columns needed for display.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IssueListRow {
    pub id: i64,
    pub number: String,
    pub cover_date: NaiveDate,
    pub store_date: Option<NaiveDate>,
    pub modified: DateTime<Utc>,
    pub series_name: String,
    pub series_volume: i32,
    pub series_year_began: i32,
    pub series_type_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueSeriesSummary {
    pub name: String,
    pub volume: i32,
    pub year_began: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueListItem {
    pub id: i64,
    pub series: IssueSeriesSummary,
    pub number: String,
    pub issue: String,
    pub cover_date: NaiveDate,
    pub store_date: Option<NaiveDate>,
    pub modified: DateTime<Utc>,
}

impl From<IssueListRow> for IssueListItem {
    fn from(r: IssueListRow) -> Self {
        Self {
            id: r.id,
            issue: issue_display(&r.series_name, r.series_year_began, r.series_type_id, &r.number),
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

/// Reference to another issue by its display label.
#[derive(Debug, Clone, Serialize)]
pub struct IssueRef {
    pub id: i64,
    pub issue: String,
}

impl From<IssueListRow> for IssueRef {
    fn from(r: IssueListRow) -> Self {
        Self {
            id: r.id,
            issue: issue_display(&r.series_name, r.series_year_began, r.series_type_id, &r.number),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueSeriesDetail {
    pub id: i64,
    pub name: String,
    pub sort_name: String,
    pub volume: i32,
    pub year_began: i32,
    pub series_type: NamedRef,
}

/// Everything attached to an issue, loaded alongside the row.
#[derive(Debug, Clone, Default)]
pub struct IssueRelations {
    pub characters: Vec<NamedRef>,
    pub teams: Vec<NamedRef>,
    pub arcs: Vec<NamedRef>,
    pub universes: Vec<NamedRef>,
    pub reprints: Vec<IssueRef>,
    pub credits: Vec<CreditRead>,
    pub variants: Vec<VariantSummary>,
}

#[derive(Debug, Serialize)]
pub struct IssueResponse {
    pub id: i64,
    pub publisher: NamedRef,
    pub imprint: Option<NamedRef>,
    pub series: IssueSeriesDetail,
    pub number: String,
    pub alt_number: String,
    pub title: String,
    pub name: Vec<String>,
    pub cover_date: NaiveDate,
    pub store_date: Option<NaiveDate>,
    pub foc_date: Option<NaiveDate>,
    pub price: Option<String>,
    pub price_currency: String,
    pub rating: NamedRef,
    pub sku: String,
    pub isbn: String,
    pub upc: String,
    pub page: Option<i32>,
    #[serde(rename = "desc")]
    pub description: String,
    pub arcs: Vec<NamedRef>,
    pub credits: Vec<CreditRead>,
    pub characters: Vec<NamedRef>,
    pub teams: Vec<NamedRef>,
    pub universes: Vec<NamedRef>,
    pub reprints: Vec<IssueRef>,
    pub variants: Vec<VariantSummary>,
    pub cv_id: Option<i32>,
    pub gcd_id: Option<i32>,
    pub modified: DateTime<Utc>,
}

impl IssueResponse {
    pub fn new(
        issue: Issue,
        series: IssueSeriesDetail,
        publisher: NamedRef,
        imprint: Option<NamedRef>,
        rating: NamedRef,
        relations: IssueRelations,
    ) -> Self {
        Self {
            id: issue.id,
            publisher,
            imprint,
            series,
            number: issue.number,
            alt_number: issue.alt_number,
            title: issue.title,
            name: issue.name,
            cover_date: issue.cover_date,
            store_date: issue.store_date,
            foc_date: issue.foc_date,
            price: issue.price,
            price_currency: issue.price_currency,
            rating,
            sku: issue.sku,
            isbn: issue.isbn,
            upc: issue.upc,
            page: issue.page,
            description: issue.description,
            arcs: relations.arcs,
            credits: relations.credits,
            characters: relations.characters,
            teams: relations.teams,
            universes: relations.universes,
            reprints: relations.reprints,
            variants: relations.variants,
            cv_id: issue.cv_id,
            gcd_id: issue.gcd_id,
            modified: issue.modified,
        }
    }
}

/// Query parameters for issue lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFilter {
    pub series_id: Option<i64>,
    pub number: Option<String>,
    pub cover_year: Option<i32>,
    pub store_date: Option<NaiveDate>,
    pub modified_gt: Option<DateTime<Utc>>,
    pub cv_id: Option<i32>,
    pub gcd_id: Option<i32>,
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateIssueRequest {
    pub series: i64,

    #[validate(length(min = 1, max = 25, message = "Number must be 1-25 characters"))]
    pub number: String,

    #[validate(length(max = 25))]
    pub alt_number: Option<String>,

    #[validate(length(max = 255))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[serde(default)]
    pub name: Vec<String>,

    #[validate(custom(function = "validate_date_year"))]
    pub cover_date: NaiveDate,

    #[validate(custom(function = "validate_date_year"))]
    pub store_date: Option<NaiveDate>,

    #[validate(custom(function = "validate_date_year"))]
    pub foc_date: Option<NaiveDate>,

    #[validate(custom(function = "validate_price"))]
    pub price: Option<String>,

    #[validate(length(equal = 3, message = "Currency must be a three-letter code"))]
    pub price_currency: Option<String>,

    #[validate(length(max = 12), custom(function = "validate_sku"))]
    pub sku: Option<String>,

    #[validate(length(max = 17), custom(function = "validate_isbn"))]
    pub isbn: Option<String>,

    #[validate(length(max = 20), custom(function = "validate_upc"))]
    pub upc: Option<String>,

    #[validate(range(min = 1, max = 5000))]
    pub page: Option<i32>,

    #[serde(rename = "desc")]
    pub description: Option<String>,

    /// Age rating id; defaults to Unknown.
    pub rating: Option<i64>,

    #[serde(default)]
    pub characters: Vec<i64>,
    #[serde(default)]
    pub teams: Vec<i64>,
    #[serde(default)]
    pub arcs: Vec<i64>,
    #[serde(default)]
    pub universes: Vec<i64>,
    #[serde(default)]
    pub reprints: Vec<i64>,

    #[validate(range(min = 1))]
    pub cv_id: Option<i32>,

    #[validate(range(min = 1))]
    pub gcd_id: Option<i32>,
}

/// Partial update. Relation lists that are present replace the stored set.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateIssueRequest {
    pub series: Option<i64>,

    #[validate(length(min = 1, max = 25, message = "Number must be 1-25 characters"))]
    pub number: Option<String>,

    #[validate(length(max = 25))]
    pub alt_number: Option<String>,

    #[validate(length(max = 255))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    pub name: Option<Vec<String>>,

    #[validate(custom(function = "validate_date_year"))]
    pub cover_date: Option<NaiveDate>,

    #[validate(custom(function = "validate_date_year"))]
    pub store_date: Option<NaiveDate>,

    #[validate(custom(function = "validate_date_year"))]
    pub foc_date: Option<NaiveDate>,

    #[validate(custom(function = "validate_price"))]
    pub price: Option<String>,

    #[validate(length(equal = 3, message = "Currency must be a three-letter code"))]
    pub price_currency: Option<String>,

    #[validate(length(max = 12), custom(function = "validate_sku"))]
    pub sku: Option<String>,

    #[validate(length(max = 17), custom(function = "validate_isbn"))]
    pub isbn: Option<String>,

    #[validate(length(max = 20), custom(function = "validate_upc"))]
    pub upc: Option<String>,

    #[validate(range(min = 1, max = 5000))]
    pub page: Option<i32>,

    #[serde(rename = "desc")]
    pub description: Option<String>,

    pub rating: Option<i64>,

    pub characters: Option<Vec<i64>>,
    pub teams: Option<Vec<i64>>,
    pub arcs: Option<Vec<i64>>,
    pub universes: Option<Vec<i64>>,
    pub reprints: Option<Vec<i64>>,

    #[validate(range(min = 1))]
    pub cv_id: Option<i32>,

    #[validate(range(min = 1))]
    pub gcd_id: Option<i32>,
}

/// Rules that depend on the series the issue belongs to.
///
/// `has_arcs` is whether the issue will end up with any arcs attached.
pub fn check_issue_series_rules(
    title: &str,
    has_arcs: bool,
    series_collection: bool,
    series_type_id: i64,
) -> Result<(), ValidationError> {
    if !title.is_empty() && !series_collection {
        return Err(ValidationError::new("title").with_message(
            "Collection Title field is not allowed for this series.".into(),
        ));
    }
    if has_arcs
        && matches!(
            series_type_id,
            series_types::TRADE_PAPERBACK | series_types::HARDCOVER
        )
    {
        return Err(ValidationError::new("arcs").with_message(
            "Story arcs should not be added to Trade Paperbacks or Hardcovers.".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(number: &str, series_type_id: i64) -> IssueListRow {
        IssueListRow {
            id: 7,
            number: number.into(),
            cover_date: NaiveDate::from_ymd_opt(2008, 7, 1).unwrap(),
            store_date: None,
            modified: Utc::now(),
            series_name: "Final Crisis".into(),
            series_volume: 1,
            series_year_began: 2008,
            series_type_id,
        }
    }

    #[test]
    fn list_item_label() {
        let item = IssueListItem::from(row("1", 2));
        assert_eq!(item.issue, "Final Crisis (2008) #1");
        assert_eq!(item.series.name, "Final Crisis");

        let reprint = IssueRef::from(row("1", series_types::TRADE_PAPERBACK));
        assert_eq!(reprint.issue, "Final Crisis TPB (2008) #1");
    }

    #[test]
    fn title_requires_collection_series() {
        assert!(check_issue_series_rules("Vol. 1", false, false, 1).is_err());
        assert!(check_issue_series_rules("Vol. 1", false, true, series_types::OMNIBUS).is_ok());
        assert!(check_issue_series_rules("", false, false, 1).is_ok());
    }

    #[test]
    fn no_arcs_on_trades_or_hardcovers() {
        assert!(check_issue_series_rules("", true, true, series_types::TRADE_PAPERBACK).is_err());
        assert!(check_issue_series_rules("", true, true, series_types::HARDCOVER).is_err());
        assert!(check_issue_series_rules("", true, true, series_types::OMNIBUS).is_ok());
    }

    #[test]
    fn create_request_rejects_bad_identifiers() {
        let body = serde_json::json!({
            "series": 1,
            "number": "1",
            "cover_date": "2008-07-01",
            "sku": "JUN-08",
            "price": "3.999"
        });
        let req: CreateIssueRequest = serde_json::from_value(body).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("sku"));
        assert!(fields.contains_key("price"));
    }

    #[test]
    fn rating_is_optional_on_create() {
        let body = serde_json::json!({ "series": 1, "number": "1", "cover_date": "2008-07-01" });
        let req: CreateIssueRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.rating.unwrap_or(ratings::UNKNOWN), 1);

        let body = serde_json::json!({
            "series": 1,
            "number": "1",
            "cover_date": "2008-07-01",
            "rating": 5
        });
        let req: CreateIssueRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.rating, Some(5));
    }
}
