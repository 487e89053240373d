use t20_terminal::catalog::XFactorCatalog;
use t20_terminal::model::{Match, MatchStatus, RiskTier, XFactorDefinition};
use t20_terminal::session::{PredictionSession, SessionMode};
use t20_terminal::xf_picker::XfPicker;

fn def(id: &str, risk: RiskTier, description: &str) -> XFactorDefinition {
    XFactorDefinition {
        id: id.to_string(),
        risk,
        category: "batting".to_string(),
        description: description.to_string(),
        result_description: None,
    }
}

fn catalog() -> XFactorCatalog {
    XFactorCatalog::new(vec![
        def("XF_FIELD_CATCH", RiskTier::Low, "Took a catch"),
        def("XF_BAT_50_RUNS", RiskTier::Medium, "Scored >= 50 runs"),
        def("XF_BOWL_9_DOTS", RiskTier::Medium, "Bowled >= 9 dot balls"),
        def("XF_BOWL_3_WICKETS", RiskTier::High, "Took 3 wickets"),
    ])
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

#[test]
fn tier_change_clears_condition_but_keeps_player() {
    let catalog = catalog();
    let mut picker = XfPicker::default();
    picker.open();

    picker.set_risk(RiskTier::Medium);
    assert!(picker.set_condition("XF_BAT_50_RUNS", &catalog));
    picker.set_player("R. Gaikwad");

    picker.set_risk(RiskTier::High);
    assert!(picker.condition().is_none());
    assert_eq!(picker.player(), "R. Gaikwad");
    assert!(!picker.can_confirm());
}

#[test]
fn reselecting_same_tier_keeps_condition() {
    let catalog = catalog();
    let mut picker = XfPicker::default();
    picker.open();
    picker.set_risk(RiskTier::Medium);
    picker.set_condition("XF_BOWL_9_DOTS", &catalog);
    picker.set_risk(RiskTier::Medium);
    assert_eq!(picker.condition(), Some("XF_BOWL_9_DOTS"));
}

#[test]
fn condition_must_belong_to_chosen_tier() {
    let catalog = catalog();
    let mut picker = XfPicker::default();
    picker.open();

    // No tier chosen yet.
    assert!(!picker.set_condition("XF_BAT_50_RUNS", &catalog));

    picker.set_risk(RiskTier::Low);
    assert!(!picker.set_condition("XF_BAT_50_RUNS", &catalog));
    assert!(!picker.set_condition("XF_UNKNOWN", &catalog));
    assert!(picker.set_condition("XF_FIELD_CATCH", &catalog));
}

#[test]
fn confirm_gating_requires_all_three_steps() {
    let catalog = catalog();
    let mut picker = XfPicker::default();
    picker.open();
    assert!(!picker.can_confirm());

    picker.set_risk(RiskTier::High);
    assert!(!picker.player_step_ready());
    assert!(!picker.can_confirm());

    picker.set_condition("XF_BOWL_3_WICKETS", &catalog);
    assert!(picker.player_step_ready());
    assert!(!picker.can_confirm());

    // Whitespace-only player names do not count.
    picker.set_player("   ");
    assert!(!picker.can_confirm());
    assert!(picker.confirm().is_none());

    picker.set_player("  M. Pathirana ");
    assert!(picker.can_confirm());
}

#[test]
fn confirm_yields_trimmed_pick_and_resets_everything() {
    let catalog = catalog();
    let mut picker = XfPicker::default();
    picker.open();
    picker.set_risk(RiskTier::High);
    picker.set_condition("XF_BOWL_3_WICKETS", &catalog);
    picker.set_player("  M. Pathirana ");

    let (xf_id, player) = picker.confirm().expect("all steps complete");
    assert_eq!(xf_id, "XF_BOWL_3_WICKETS");
    assert_eq!(player, "M. Pathirana");

    assert!(!picker.is_open());
    assert!(picker.risk().is_none());
    assert!(picker.condition().is_none());
    assert_eq!(picker.player(), "");
}

#[test]
fn draft_rejects_unknown_and_duplicate_picks() {
    let catalog = catalog();
    let mut session = form_session();

    assert!(session
        .add_x_factor("XF_NOT_IN_CATALOG", "R. Jadeja", &catalog)
        .is_err());

    session
        .add_x_factor("XF_BAT_50_RUNS", "R. Gaikwad", &catalog)
        .expect("first pick");

    // Exact repeat is a user error; same condition with another player is
    // a distinct bet.
    assert!(session
        .add_x_factor("XF_BAT_50_RUNS", "R. Gaikwad", &catalog)
        .is_err());
    session
        .add_x_factor("XF_BAT_50_RUNS", "T. Varma", &catalog)
        .expect("same condition, different player");
    session
        .add_x_factor("XF_FIELD_CATCH", "R. Gaikwad", &catalog)
        .expect("same player, different condition");

    assert_eq!(session.draft.x_factors.len(), 3);
}

#[test]
fn picks_are_removed_by_position() {
    let catalog = catalog();
    let mut session = form_session();
    session
        .add_x_factor("XF_BAT_50_RUNS", "R. Gaikwad", &catalog)
        .unwrap();
    session
        .add_x_factor("XF_FIELD_CATCH", "R. Jadeja", &catalog)
        .unwrap();

    assert!(!session.remove_x_factor(5));
    assert!(session.remove_x_factor(0));
    assert_eq!(session.draft.x_factors.len(), 1);
    assert_eq!(session.draft.x_factors[0].xf_id, "XF_FIELD_CATCH");
}
