use serde_json::Value;

use t20_terminal::catalog::XFactorCatalog;
use t20_terminal::model::{Match, MatchStatus, RiskTier, XFactorDefinition};
use t20_terminal::session::{PredictionSession, SessionMode};

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

fn catalog() -> XFactorCatalog {
    XFactorCatalog::new(vec![XFactorDefinition {
        id: "XF_BOWL_3_WICKETS".to_string(),
        risk: RiskTier::High,
        category: "bowling".to_string(),
        description: "Took 3 wickets".to_string(),
        result_description: Some("Took 3+ wickets".to_string()),
    }])
}

#[test]
fn unset_scalars_serialize_as_explicit_null() {
    let mut session = form_session();
    session.set_toss_winner("Chennai Super Kings");
    session.set_match_winner("Mumbai Indians");

    let payload = session.build_payload().expect("mandatory fields set");
    let value = serde_json::to_value(&payload).expect("serializes");
    let object = value.as_object().expect("object payload");

    // "No prediction for this field" is an explicit null on the wire,
    // never a missing key and never zero.
    for key in [
        "top_wicket_taker",
        "top_run_scorer",
        "highest_run_scored",
        "powerplay_runs",
        "total_wickets",
    ] {
        assert!(object.contains_key(key), "{key} must be present");
        assert!(object[key].is_null(), "{key} must be null");
    }
    assert_eq!(object["toss_winner"], "Chennai Super Kings");
    assert_eq!(object["match_winner"], "Mumbai Indians");
    assert_eq!(object["x_factors"], Value::Array(Vec::new()));
}

#[test]
fn set_fields_serialize_as_numbers_and_names() {
    let now = std::time::Instant::now();
    let mut session = form_session();
    session.set_toss_winner("Mumbai Indians");
    session.set_match_winner("Mumbai Indians");
    session.set_top_run_scorer("R. Sharma");
    session.set_highest_runs("180", now);
    session.set_total_wickets("12", now);

    let payload = session.build_payload().unwrap();
    assert_eq!(payload.top_run_scorer.as_deref(), Some("R. Sharma"));
    assert_eq!(payload.top_wicket_taker, None);
    assert_eq!(payload.highest_run_scored, Some(180));
    assert_eq!(payload.powerplay_runs, None);
    assert_eq!(payload.total_wickets, Some(12));
}

#[test]
fn picks_carry_identifier_and_player_only() {
    let catalog = catalog();
    let mut session = form_session();
    session.set_toss_winner("Chennai Super Kings");
    session.set_match_winner("Chennai Super Kings");
    session
        .add_x_factor("XF_BOWL_3_WICKETS", "M. Pathirana", &catalog)
        .unwrap();

    let value = serde_json::to_value(session.build_payload().unwrap()).unwrap();
    let picks = value["x_factors"].as_array().expect("picks array");
    assert_eq!(picks.len(), 1);
    let pick = picks[0].as_object().expect("pick object");

    // Display fields (description, risk label) are stripped before
    // transmission.
    assert_eq!(pick.len(), 2);
    assert_eq!(pick["xf_id"], "XF_BOWL_3_WICKETS");
    assert_eq!(pick["player_name"], "M. Pathirana");
}

#[test]
fn whitespace_player_fields_count_as_unset() {
    let mut session = form_session();
    session.set_toss_winner("Chennai Super Kings");
    session.set_match_winner("Chennai Super Kings");
    session.set_top_wicket_taker("   ");

    let payload = session.build_payload().unwrap();
    assert_eq!(payload.top_wicket_taker, None);
}
