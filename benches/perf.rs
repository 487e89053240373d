use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use t20_terminal::catalog::XFactorCatalog;
use t20_terminal::model::{roster_from_value, Match, MatchStatus, RiskTier, XFactorDefinition};
use t20_terminal::session::{PredictionSession, SessionMode};

fn sample_defs(count: usize) -> Vec<XFactorDefinition> {
    (0..count)
        .map(|idx| XFactorDefinition {
            id: format!("XF_{idx:03}"),
            risk: match idx % 3 {
                0 => RiskTier::Low,
                1 => RiskTier::Medium,
                _ => RiskTier::High,
            },
            category: "batting".to_string(),
            description: format!("Condition {idx}"),
            result_description: None,
        })
        .collect()
}

fn form_session() -> PredictionSession {
    let mut session = PredictionSession::new(1);
    session.set_match(Match {
        id: 1,
        home_team: "Chennai Super Kings".to_string(),
        away_team: "Mumbai Indians".to_string(),
        venue: "MA Chidambaram Stadium".to_string(),
        start_time: "2026-04-12T14:00:00Z".parse().expect("valid timestamp"),
        status: MatchStatus::Upcoming,
        actual_toss_winner: None,
        actual_match_winner: None,
        actual_top_wicket_taker: None,
        actual_top_run_scorer: None,
        actual_highest_run_scored: None,
        actual_powerplay_runs: None,
        actual_total_wickets: None,
        actual_x_factors: Vec::new(),
    });
    session.set_prior_missing();
    assert_eq!(session.mode(), SessionMode::Form);
    session
}

fn bench_catalog_rebuild(c: &mut Criterion) {
    let defs = sample_defs(120);
    c.bench_function("catalog_rebuild", |b| {
        b.iter(|| {
            let catalog = XFactorCatalog::new(black_box(defs.clone()));
            black_box(catalog.tier(RiskTier::High).len());
        })
    });
}

fn bench_payload_serialize(c: &mut Criterion) {
    let catalog = XFactorCatalog::new(sample_defs(30));
    let mut session = form_session();
    session.set_toss_winner("Chennai Super Kings");
    session.set_match_winner("Mumbai Indians");
    for idx in 0..10 {
        session
            .add_x_factor(&format!("XF_{idx:03}"), &format!("Player {idx}"), &catalog)
            .expect("catalog id");
    }
    let payload = session.build_payload().expect("mandatory fields set");

    c.bench_function("payload_serialize", |b| {
        b.iter(|| {
            let json = serde_json::to_string(black_box(&payload)).unwrap();
            black_box(json.len());
        })
    });
}

fn bench_roster_decode(c: &mut Criterion) {
    c.bench_function("roster_decode_sectioned", |b| {
        b.iter(|| {
            let value: serde_json::Value =
                serde_json::from_str(black_box(ROSTER_JSON)).unwrap();
            let roster = roster_from_value(&value);
            black_box(roster.player_count());
        })
    });
}

criterion_group!(
    perf,
    bench_catalog_rebuild,
    bench_payload_serialize,
    bench_roster_decode
);
criterion_main!(perf);

static ROSTER_JSON: &str = include_str!("../tests/fixtures/roster_sections.json");
