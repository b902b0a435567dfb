//! Reading lists: ordered, user-owned lists of issues.
//!
//! A list is visible to its owner, to everyone when public, and to staff when it belongs
//! to the Metron account. Only the owner manages a list, except that staff also manage
//! Metron's lists.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::issue::IssueSeriesSummary;
use super::user::UserRef;

/// Account that owns the curated lists.
pub const METRON_USERNAME: &str = "Metron";

/// Where a list's reading order was sourced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttributionSource {
    Cbro,
    Cmro,
    Cbh,
    Cbt,
    Mg,
    Htlc,
    Locg,
    Other,
}

impl AttributionSource {
    pub const ALL: [Self; 8] = [
        Self::Cbro,
        Self::Cmro,
        Self::Cbh,
        Self::Cbt,
        Self::Mg,
        Self::Htlc,
        Self::Locg,
        Self::Other,
    ];

    /// Stored code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cbro => "CBRO",
            Self::Cmro => "CMRO",
            Self::Cbh => "CBH",
            Self::Cbt => "CBT",
            Self::Mg => "MG",
            Self::Htlc => "HTLC",
            Self::Locg => "LOCG",
            Self::Other => "OTHER",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Cbro => "Comic Book Reading Orders",
            Self::Cmro => "Complete Marvel Reading Orders",
            Self::Cbh => "Comic Book Herald",
            Self::Cbt => "Comic Book Treasury",
            Self::Mg => "Marvel Guides",
            Self::Htlc => "How To Love Comics",
            Self::Locg => "League of ComicGeeks",
            Self::Other => "Other",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == code)
    }
}

/// Display label for a stored attribution code; empty when the list has none.
pub fn attribution_label(code: &str) -> String {
    AttributionSource::from_code(code)
        .map(|s| s.label().to_string())
        .unwrap_or_default()
}

/// An item's part in the reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Prologue,
    Core,
    TieIn,
    Epilogue,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prologue => "PROLOGUE",
            Self::Core => "CORE",
            Self::TieIn => "TIE_IN",
            Self::Epilogue => "EPILOGUE",
        }
    }
}

/// Reading list joined with its owner's username.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReadingList {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub is_private: bool,
    pub attribution_source: String,
    pub attribution_url: String,
    pub created_on: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl ReadingList {
    fn is_metrons(&self) -> bool {
        self.username == METRON_USERNAME
    }

    pub fn visible_to(&self, user_id: i64, is_staff: bool) -> bool {
        !self.is_private || self.user_id == user_id || (is_staff && self.is_metrons())
    }

    pub fn manageable_by(&self, user_id: i64, is_staff: bool) -> bool {
        self.user_id == user_id || (is_staff && self.is_metrons())
    }
}

/// Query parameters for the reading list index.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadingListFilter {
    pub name: Option<String>,
    /// Owner id.
    pub user: Option<i64>,
    /// Case-insensitive match on the owner's username.
    pub username: Option<String>,
    pub attribution_source: Option<AttributionSource>,
    pub is_private: Option<bool>,
    pub modified_gt: Option<DateTime<Utc>>,
    pub page: Option<u32>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReadingListListRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub user_id: i64,
    pub username: String,
    pub is_private: bool,
    pub attribution_source: String,
    pub issue_count: i64,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ReadingListListItem {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub user: UserRef,
    pub is_private: bool,
    pub attribution_source: String,
    pub issue_count: i64,
    pub modified: DateTime<Utc>,
}

impl From<ReadingListListRow> for ReadingListListItem {
    fn from(r: ReadingListListRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            slug: r.slug,
            user: UserRef {
                id: r.user_id,
                username: r.username,
            },
            is_private: r.is_private,
            attribution_source: r.attribution_source,
            issue_count: r.issue_count,
            modified: r.modified,
        }
    }
}

/// Issue count and cover-year span of a list.
#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub struct ReadingListSpan {
    pub issue_count: i64,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ReadingListResponse {
    pub id: i64,
    pub user: UserRef,
    pub name: String,
    pub slug: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub is_private: bool,
    /// Display label, empty when unattributed.
    pub attribution_source: String,
    pub attribution_url: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub issue_count: i64,
    pub modified: DateTime<Utc>,
}

impl ReadingListResponse {
    pub fn new(list: ReadingList, span: ReadingListSpan) -> Self {
        Self {
            id: list.id,
            user: UserRef {
                id: list.user_id,
                username: list.username,
            },
            name: list.name,
            slug: list.slug,
            description: list.description,
            is_private: list.is_private,
            attribution_source: attribution_label(&list.attribution_source),
            attribution_url: list.attribution_url,
            start_year: span.start_year,
            end_year: span.end_year,
            issue_count: span.issue_count,
            modified: list.modified,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReadingListItemRow {
    pub id: i64,
    pub order: i32,
    pub issue_type: String,
    pub issue_id: i64,
    pub number: String,
    pub cover_date: NaiveDate,
    pub store_date: Option<NaiveDate>,
    pub cv_id: Option<i32>,
    pub gcd_id: Option<i32>,
    pub modified: DateTime<Utc>,
    pub series_name: String,
    pub series_volume: i32,
    pub series_year_began: i32,
}

#[derive(Debug, Serialize)]
pub struct ReadingListIssue {
    pub id: i64,
    pub series: IssueSeriesSummary,
    pub number: String,
    pub cover_date: NaiveDate,
    pub store_date: Option<NaiveDate>,
    pub cv_id: Option<i32>,
    pub gcd_id: Option<i32>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ReadingListItemResponse {
    pub id: i64,
    pub issue: ReadingListIssue,
    pub order: i32,
    pub issue_type: String,
}

impl From<ReadingListItemRow> for ReadingListItemResponse {
    fn from(r: ReadingListItemRow) -> Self {
        Self {
            id: r.id,
            issue: ReadingListIssue {
                id: r.issue_id,
                series: IssueSeriesSummary {
                    name: r.series_name,
                    volume: r.series_volume,
                    year_began: r.series_year_began,
                },
                number: r.number,
                cover_date: r.cover_date,
                store_date: r.store_date,
                cv_id: r.cv_id,
                gcd_id: r.gcd_id,
                modified: r.modified,
            },
            order: r.order,
            issue_type: r.issue_type,
        }
    }
}

fn validate_attribution_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::new("attribution_url")
            .with_message("Attribution URL must be an http(s) address.".into()))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReadingListRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[serde(rename = "desc")]
    pub description: Option<String>,

    pub is_private: Option<bool>,

    pub attribution_source: Option<AttributionSource>,

    #[validate(length(max = 500), custom(function = "validate_attribution_url"))]
    pub attribution_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReadingListRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[serde(rename = "desc")]
    pub description: Option<String>,

    pub is_private: Option<bool>,

    pub attribution_source: Option<AttributionSource>,

    #[validate(length(max = 500), custom(function = "validate_attribution_url"))]
    pub attribution_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemsRequest {
    #[validate(length(min = 1, max = 500, message = "Give 1-500 issue ids"))]
    pub issues: Vec<i64>,
    pub issue_type: Option<ItemType>,
}

#[derive(Debug, Serialize)]
pub struct AddedItems {
    pub added: u64,
}

/// `(issue id, order)` for each requested issue not already on the list, numbered on
/// from the current last position. Repeats within the request are dropped.
pub fn append_positions(last_order: Option<i32>, on_list: &[i64], requested: &[i64]) -> Vec<(i64, i32)> {
    let mut seen: Vec<i64> = on_list.to_vec();
    let mut next = last_order.map_or(1, |last| last + 1);
    let mut planned = Vec::new();
    for &issue_id in requested {
        if seen.contains(&issue_id) {
            continue;
        }
        seen.push(issue_id);
        planned.push((issue_id, next));
        next += 1;
    }
    planned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(owner: &str, user_id: i64, is_private: bool) -> ReadingList {
        ReadingList {
            id: 1,
            user_id,
            username: owner.into(),
            name: "Crisis on Infinite Earths".into(),
            slug: "crisis-on-infinite-earths".into(),
            description: String::new(),
            is_private,
            attribution_source: "CBRO".into(),
            attribution_url: String::new(),
            created_on: Utc::now(),
            modified: Utc::now(),
        }
    }

    #[test]
    fn private_lists_are_hidden_from_other_users() {
        let private = list("bjones", 5, true);
        assert!(private.visible_to(5, false));
        assert!(!private.visible_to(6, false));
        assert!(!private.visible_to(6, true));
        assert!(list("bjones", 5, false).visible_to(6, false));
    }

    #[test]
    fn staff_see_and_manage_metron_lists() {
        let curated = list(METRON_USERNAME, 1, true);
        assert!(curated.visible_to(9, true));
        assert!(curated.manageable_by(9, true));
        assert!(!curated.visible_to(9, false));
        assert!(!curated.manageable_by(9, false));
    }

    #[test]
    fn only_owner_manages_public_lists() {
        let public = list("bjones", 5, false);
        assert!(public.manageable_by(5, false));
        assert!(!public.manageable_by(6, false));
        assert!(!public.manageable_by(6, true));
    }

    #[test]
    fn attribution_labels() {
        assert_eq!(attribution_label("CMRO"), "Complete Marvel Reading Orders");
        assert_eq!(attribution_label(""), "");
        let source: AttributionSource = serde_json::from_str("\"LOCG\"").unwrap();
        assert_eq!(source, AttributionSource::Locg);
        let item: ItemType = serde_json::from_str("\"TIE_IN\"").unwrap();
        assert_eq!(item.as_str(), "TIE_IN");
    }

    #[test]
    fn appended_items_follow_the_last_position() {
        assert_eq!(append_positions(None, &[], &[4, 9]), vec![(4, 1), (9, 2)]);
        assert_eq!(
            append_positions(Some(7), &[4], &[4, 9, 9, 12]),
            vec![(9, 8), (12, 9)]
        );
        assert!(append_positions(Some(2), &[4], &[4]).is_empty());
    }

    #[test]
    fn rejects_non_http_attribution_url() {
        let body = serde_json::json!({
            "name": "Blackest Night",
            "attribution_url": "ftp://example.com/list"
        });
        let req: CreateReadingListRequest = serde_json::from_value(body).unwrap();
        assert!(req.validate().unwrap_err().field_errors().contains_key("attribution_url"));
    }
}
