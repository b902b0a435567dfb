//! Statistics dashboard shapes.
//!
//! Aggregates are computed in the database and cached as raw rows under fixed keys. The
//! functions here turn those rows into labelled chart series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::IssueListItem;

/// Time to live for every cached statistic: 30 minutes.
pub const CACHE_TTL_SECS: u64 = 60 * 30;

/// Issues shown in the home feed.
pub const RECENTLY_EDITED_LIMIT: i64 = 12;

/// Cache keys. Values are JSON.
pub mod keys {
    pub const STATS_UPDATE_TIME: &str = "stats_update_time";
    pub const PUBLISHERS_TOTAL: &str = "publishers_total";
    pub const SERIES_TOTAL: &str = "series_total";
    pub const ISSUE_TOTAL: &str = "issue_total";
    pub const CHARACTERS_TOTAL: &str = "characters_total";
    pub const CREATORS_TOTAL: &str = "creators_total";
    pub const TEAMS_TOTAL: &str = "teams_total";
    pub const ARCS_TOTAL: &str = "arcs_total";

    pub const PUBLISHERS: &str = "publishers";
    pub const YEAR_COUNT: &str = "year_count_dict";
    pub const MONTHLY_ISSUES: &str = "monthly_issues";
    pub const DAILY_ISSUES: &str = "daily_issues";
    pub const CREATORS: &str = "creators";
    pub const CHARACTERS: &str = "characters";

    pub const HOME_UPDATED: &str = "home_updated";
    pub const RECENTLY_EDITED: &str = "recently_edited";

    /// The seven resource totals, in display order.
    pub const TOTALS: [&str; 7] = [
        PUBLISHERS_TOTAL,
        SERIES_TOTAL,
        ISSUE_TOTAL,
        CHARACTERS_TOTAL,
        CREATORS_TOTAL,
        TEAMS_TOTAL,
        ARCS_TOTAL,
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub publishers: i64,
    pub series: i64,
    pub issues: i64,
    pub characters: i64,
    pub creators: i64,
    pub teams: i64,
    pub arcs: i64,
}

impl Totals {
    /// Build from counts listed in [`keys::TOTALS`] order.
    pub fn from_counts(counts: [i64; 7]) -> Self {
        let [publishers, series, issues, characters, creators, teams, arcs] = counts;
        Self { publishers, series, issues, characters, creators, teams, arcs }
    }
}

/// Rows created in one truncated time bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CountBucket {
    pub bucket: DateTime<Utc>,
    pub count: i64,
}

/// Issue count for one publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PublisherCount {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: i64,
}

fn label_buckets<'a>(
    buckets: impl Iterator<Item = &'a CountBucket>,
    format: &str,
) -> Vec<ChartPoint> {
    buckets
        .map(|b| ChartPoint {
            label: b.bucket.format(format).to_string(),
            value: b.count,
        })
        .collect()
}

/// Yearly buckets, already oldest first.
pub fn year_series(buckets: &[CountBucket]) -> Vec<ChartPoint> {
    label_buckets(buckets.iter(), "%Y")
}

/// Monthly buckets arrive newest first; charts read oldest first.
pub fn month_series(buckets: &[CountBucket]) -> Vec<ChartPoint> {
    label_buckets(buckets.iter().rev(), "%b")
}

/// Daily buckets arrive newest first; charts read oldest first.
pub fn day_series(buckets: &[CountBucket]) -> Vec<ChartPoint> {
    label_buckets(buckets.iter().rev(), "%m/%d")
}

pub fn publisher_series(counts: &[PublisherCount]) -> Vec<ChartPoint> {
    counts
        .iter()
        .map(|p| ChartPoint {
            label: p.name.clone(),
            value: p.count,
        })
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Charts {
    /// Issues per publisher
    pub publishers: Vec<ChartPoint>,
    /// Issues added per year
    pub yearly: Vec<ChartPoint>,
    /// Issues added per month, last 12 months
    pub monthly: Vec<ChartPoint>,
    /// Issues added per day, last 30 days
    pub daily: Vec<ChartPoint>,
    pub creators: Vec<ChartPoint>,
    pub characters: Vec<ChartPoint>,
}

/// Raw cached aggregates behind [`Charts`].
#[derive(Debug, Clone, Default)]
pub struct ChartData {
    pub publishers: Vec<PublisherCount>,
    pub yearly: Vec<CountBucket>,
    pub monthly: Vec<CountBucket>,
    pub daily: Vec<CountBucket>,
    pub creators: Vec<CountBucket>,
    pub characters: Vec<CountBucket>,
}

impl From<&ChartData> for Charts {
    fn from(d: &ChartData) -> Self {
        Self {
            publishers: publisher_series(&d.publishers),
            yearly: year_series(&d.yearly),
            monthly: month_series(&d.monthly),
            daily: day_series(&d.daily),
            creators: month_series(&d.creators),
            characters: month_series(&d.characters),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsResponse {
    pub update_time: DateTime<Utc>,
    pub totals: Totals,
    pub charts: Charts,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeResponse {
    pub update_time: DateTime<Utc>,
    pub recently_edited: Vec<IssueListItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bucket(y: i32, m: u32, d: u32, count: i64) -> CountBucket {
        CountBucket {
            bucket: Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap(),
            count,
        }
    }

    #[test]
    fn months_are_reversed_to_oldest_first() {
        let rows = vec![bucket(2024, 3, 1, 5), bucket(2024, 2, 1, 8), bucket(2024, 1, 1, 2)];
        let series = month_series(&rows);
        let labels: Vec<_> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["Jan", "Feb", "Mar"]);
        assert_eq!(series[0].value, 2);
    }

    #[test]
    fn days_and_years_are_labelled() {
        let days = day_series(&[bucket(2024, 3, 2, 1), bucket(2024, 3, 1, 4)]);
        assert_eq!(days[0].label, "03/01");
        assert_eq!(days[1].label, "03/02");

        let years = year_series(&[bucket(2019, 1, 1, 10), bucket(2020, 1, 1, 20)]);
        assert_eq!(years[0].label, "2019");
        assert_eq!(years[1].value, 20);
    }

    #[test]
    fn totals_follow_key_order() {
        let t = Totals::from_counts([1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(t.publishers, 1);
        assert_eq!(t.issues, 3);
        assert_eq!(t.arcs, 7);
        assert_eq!(keys::TOTALS[2], keys::ISSUE_TOTAL);
    }

    #[test]
    fn ttl_is_thirty_minutes() {
        assert_eq!(CACHE_TTL_SECS, 1800);
    }
}
