use chrono::NaiveDate;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use nebula_terminal::board::{RenderClock, STALE_AFTER_MINUTES, build_filtered_view_at};
use nebula_terminal::feed_fetch::parse_dictionary_json;
use nebula_terminal::state::MatchDictionary;
use nebula_terminal::time_convert::ViewerZone;

const LEAGUES: [&str; 6] = [
    "Premier League",
    "La Liga",
    "Serie A",
    "Bundesliga",
    "Ligue 1",
    "Eredivisie",
];

fn sample_feeds(n: usize) -> (MatchDictionary, MatchDictionary) {
    let mut records = MatchDictionary::with_capacity(n);
    let mut reference = MatchDictionary::with_capacity(n);
    for i in 0..n {
        let key = format!("https://fbref.example/matches/{i}");
        let market = if i % 3 == 0 { "Under" } else { "Over" };
        records.insert(
            key.clone(),
            vec![
                market.to_string(),
                "0.5".to_string(),
                format!("Home {i}"),
                format!("Away {i}"),
            ],
        );
        if i % 7 != 0 {
            let hour = i % 12 + 1;
            let period = if i % 2 == 0 { "AM" } else { "PM" };
            reference.insert(
                key,
                vec![
                    "2026-10-17".to_string(),
                    "Sat".to_string(),
                    LEAGUES[i % LEAGUES.len()].to_string(),
                    format!("{hour}:{:02} {period}", i % 60),
                ],
            );
        }
    }
    (records, reference)
}

fn records_json(n: usize) -> String {
    let rows: Vec<String> = (0..n)
        .map(|i| format!(r#""m{i}": ["Over", "0.5", "1H", "Home {i}", "Away {i}"]"#))
        .collect();
    format!("{{{}}}", rows.join(","))
}

fn bench_filtered_view(c: &mut Criterion) {
    let (records, reference) = sample_feeds(2_000);
    let clock = RenderClock {
        now: NaiveDate::from_ymd_opt(2026, 10, 17)
            .and_then(|d| d.and_hms_opt(14, 0, 0))
            .expect("valid time"),
        viewer: ViewerZone::detect(Some("Europe/London")),
        stale_after_minutes: STALE_AFTER_MINUTES,
    };

    c.bench_function("filtered_view_2000", |b| {
        b.iter(|| {
            let entries = build_filtered_view_at(
                black_box(&records),
                black_box(&reference),
                black_box("Serie A"),
                true,
                &clock,
            );
            black_box(entries.len());
        })
    });
}

fn bench_dictionary_parse(c: &mut Criterion) {
    let raw = records_json(2_000);
    c.bench_function("dictionary_parse_2000", |b| {
        b.iter(|| {
            let dict = parse_dictionary_json(black_box(&raw)).unwrap();
            black_box(dict.len());
        })
    });
}

criterion_group!(benches, bench_filtered_view, bench_dictionary_parse);
criterion_main!(benches);
