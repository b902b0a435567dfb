//! Criterion microbenchmarks for metron-api hot paths.
//!
//! Run with:
//!   cargo bench -p metron-api
//!
//! HTML reports are written to `target/criterion/`.

use chrono::{NaiveDate, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use metron_api::auth::{generate_token_pair, validate_token};
use metron_common::models::{IssueListItem, IssueListRow, series_types};
use metron_common::reprints::{CollectionState, ReprintSource, plan_reprint_sync};
use metron_common::slug::{issue_slug, slugify, unique_slug};

// ── Slugs ─────────────────────────────────────────────────────────────────────

fn bench_slugify(c: &mut Criterion) {
    c.bench_function("slug/slugify", |b| {
        b.iter(|| slugify(black_box("The Amazing Spider-Man: Brand New Day (2008)")))
    });
}

fn bench_unique_slug(c: &mut Criterion) {
    let base = issue_slug("saga-2012", "1");
    let taken: Vec<String> = std::iter::once(base.clone())
        .chain((1..50).map(|n| format!("{base}-{n}")))
        .collect();

    c.bench_function("slug/unique_with_50_taken", |b| {
        b.iter(|| unique_slug(black_box(&base), black_box(&taken)))
    });
}

// ── Reprint sync planning ─────────────────────────────────────────────────────

fn reprints(count: usize) -> Vec<ReprintSource> {
    (0..count)
        .map(|i| ReprintSource {
            id: i as i64 + 1,
            display: format!("Saga (2012) #{}", i + 1),
            stories: if i % 7 == 0 {
                vec!["Part One".into(), "Backup".into()]
            } else {
                vec![format!("Chapter {}", i + 1)]
            },
            character_ids: (0..8).map(|c| (i as i64 + c) % 40).collect(),
            team_ids: vec![(i as i64) % 5],
        })
        .collect()
}

fn bench_reprint_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("reprints/plan");
    let state = CollectionState {
        series_type_id: series_types::OMNIBUS,
        ..Default::default()
    };

    for count in [6usize, 24, 100] {
        let sources = reprints(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &sources, |b, s| {
            b.iter(|| plan_reprint_sync(black_box(&state), black_box(s)))
        });
    }

    group.finish();
}

// ── JSON serialisation ────────────────────────────────────────────────────────

fn bench_issue_list_serialise(c: &mut Criterion) {
    let modified = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let items: Vec<IssueListItem> = (1..=100)
        .map(|n| {
            IssueListItem::from(IssueListRow {
                id: n,
                number: n.to_string(),
                cover_date: NaiveDate::from_ymd_opt(2012, 3, 1).unwrap(),
                store_date: None,
                modified,
                series_name: "Saga".into(),
                series_volume: 1,
                series_year_began: 2012,
                series_type_id: 13,
            })
        })
        .collect();

    c.bench_function("json/issue_list_page_100", |b| {
        b.iter(|| serde_json::to_string(black_box(&items)).unwrap())
    });
}

// ── JWT ───────────────────────────────────────────────────────────────────────

fn bench_jwt_roundtrip(c: &mut Criterion) {
    let secret = "bench-secret-key-32-bytes-padded!!";
    let pair = generate_token_pair(42, "editor", 3, secret, 3600, 86_400).unwrap();

    c.bench_function("auth/jwt_validate", |b| {
        b.iter(|| validate_token(black_box(&pair.access_token), secret).unwrap())
    });
}

// ── criterion entrypoints ─────────────────────────────────────────────────────

criterion_group!(slugs, bench_slugify, bench_unique_slug);
criterion_group!(reprint_sync, bench_reprint_plan);
criterion_group!(serialisation, bench_issue_list_serialise);
criterion_group!(auth, bench_jwt_roundtrip);

criterion_main!(slugs, reprint_sync, serialisation, auth);
