use t20_terminal::model::{Match, MatchStatus, StoredPrediction};
use t20_terminal::session::{PredictionSession, SessionMode};
use t20_terminal::state::{apply_delta, AppState, Delta};

fn fixture_match(id: u32, status: MatchStatus) -> Match {
    Match {
        id,
        home_team: "Chennai Super Kings".to_string(),
        away_team: "Mumbai Indians".to_string(),
        venue: "MA Chidambaram Stadium".to_string(),
        start_time: "2026-04-12T14:00:00Z".parse().expect("valid timestamp"),
        status,
        actual_toss_winner: None,
        actual_match_winner: None,
        actual_top_wicket_taker: None,
        actual_top_run_scorer: None,
        actual_highest_run_scored: None,
        actual_powerplay_runs: None,
        actual_total_wickets: None,
        actual_x_factors: Vec::new(),
    }
}

fn fixture_stored(match_id: u32) -> StoredPrediction {
    StoredPrediction {
        id: 88,
        match_id,
        user_id: 3,
        toss_winner: "Chennai Super Kings".to_string(),
        match_winner: "Mumbai Indians".to_string(),
        top_wicket_taker: Some("M. Pathirana".to_string()),
        top_run_scorer: None,
        highest_run_scored: Some(185),
        powerplay_runs: None,
        total_wickets: Some(12),
        points_earned: None,
        x_factors: Vec::new(),
    }
}

#[test]
fn loading_until_both_fetches_resolve() {
    let mut session = PredictionSession::new(1);
    assert_eq!(session.mode(), SessionMode::Loading);

    session.set_match(fixture_match(1, MatchStatus::Upcoming));
    assert_eq!(session.mode(), SessionMode::Loading);

    session.set_prior_missing();
    assert_eq!(session.mode(), SessionMode::Form);
}

#[test]
fn upcoming_with_prior_locks_and_edit_reopens_form() {
    let mut session = PredictionSession::new(1);
    session.set_match(fixture_match(1, MatchStatus::Upcoming));
    session.set_prior(fixture_stored(1));
    assert_eq!(session.mode(), SessionMode::Locked);

    // The draft is seeded from the stored record for the edit path.
    assert_eq!(
        session.draft.toss_winner.as_deref(),
        Some("Chennai Super Kings")
    );
    assert_eq!(session.draft.highest_runs, "185");
    assert_eq!(session.draft.powerplay_runs, "");

    assert!(session.request_edit());
    assert_eq!(session.mode(), SessionMode::Form);
    // Editing is a client-side transition; the match itself is untouched.
    assert_eq!(
        session.match_detail().expect("match loaded").status,
        MatchStatus::Upcoming
    );
}

#[test]
fn completed_match_never_enters_form() {
    for with_prior in [false, true] {
        let mut session = PredictionSession::new(1);
        session.set_match(fixture_match(1, MatchStatus::Completed));
        if with_prior {
            session.set_prior(fixture_stored(1));
        } else {
            session.set_prior_missing();
        }
        assert_eq!(session.mode(), SessionMode::Result);
        assert!(!session.request_edit());
        assert_eq!(session.mode(), SessionMode::Result);
        assert!(session.build_payload().is_err());
    }
}

#[test]
fn result_mode_is_irreversible() {
    let mut session = PredictionSession::new(1);
    session.set_match(fixture_match(1, MatchStatus::Completed));
    session.set_prior_missing();
    assert_eq!(session.mode(), SessionMode::Result);

    // A late refetch claiming the match is upcoming again must not reopen
    // anything.
    session.set_match(fixture_match(1, MatchStatus::Upcoming));
    assert_eq!(session.mode(), SessionMode::Result);
}

#[test]
fn unverified_prior_surfaces_flag_but_keeps_screen_usable() {
    let mut session = PredictionSession::new(1);
    session.set_match(fixture_match(1, MatchStatus::Upcoming));
    session.set_prior_unverified();
    assert_eq!(session.mode(), SessionMode::Form);
    assert!(session.prior_unverified());
    assert!(session.stored().is_none());
}

#[test]
fn successful_submit_locks_and_adopts_canonical_record() {
    let mut session = PredictionSession::new(1);
    session.set_match(fixture_match(1, MatchStatus::Upcoming));
    session.set_prior_missing();
    session.set_toss_winner("Chennai Super Kings");
    session.set_match_winner("Mumbai Indians");

    session.submit_started();
    assert!(session.is_submitting());
    session.submit_finished(Ok(fixture_stored(1)));

    assert!(!session.is_submitting());
    assert_eq!(session.mode(), SessionMode::Locked);
    assert!(session.is_update());
    assert_eq!(
        session.stored().expect("stored adopted").highest_run_scored,
        Some(185)
    );
    assert!(session.message.as_deref().unwrap_or("").contains("submitted"));
}

#[test]
fn failed_submit_keeps_draft_for_retry() {
    let mut session = PredictionSession::new(1);
    session.set_match(fixture_match(1, MatchStatus::Upcoming));
    session.set_prior_missing();
    session.set_toss_winner("Chennai Super Kings");
    session.set_match_winner("Mumbai Indians");
    let now = std::time::Instant::now();
    session.set_total_wickets("12", now);

    let before = session.draft.clone();
    session.submit_started();
    session.submit_finished(Err("Predictions closed for this match".to_string()));

    assert_eq!(session.draft, before);
    assert_eq!(session.mode(), SessionMode::Form);
    assert_eq!(
        session.message.as_deref(),
        Some("Predictions closed for this match")
    );
    // Retry reuses the same draft and still serializes.
    assert!(session.build_payload().is_ok());
}

#[test]
fn stale_deltas_for_other_matches_are_dropped() {
    let mut state = AppState::new();
    state.open_match(1);

    // A response for a previously opened match arrives late.
    apply_delta(
        &mut state,
        Delta::SetMatchDetail {
            match_id: 2,
            detail: fixture_match(2, MatchStatus::Completed),
        },
    );
    apply_delta(
        &mut state,
        Delta::SetMyPrediction {
            match_id: 2,
            prediction: Some(fixture_stored(2)),
        },
    );

    let session = state.session.as_ref().expect("session open");
    assert_eq!(session.mode(), SessionMode::Loading);
    assert!(session.stored().is_none());

    // The matching responses still land.
    apply_delta(
        &mut state,
        Delta::SetMatchDetail {
            match_id: 1,
            detail: fixture_match(1, MatchStatus::Upcoming),
        },
    );
    apply_delta(
        &mut state,
        Delta::SetMyPrediction {
            match_id: 1,
            prediction: None,
        },
    );
    assert_eq!(
        state.session.as_ref().expect("session open").mode(),
        SessionMode::Form
    );
}

#[test]
fn submit_outcome_for_abandoned_match_is_ignored() {
    let mut state = AppState::new();
    state.open_match(1);
    apply_delta(
        &mut state,
        Delta::SetMatchDetail {
            match_id: 1,
            detail: fixture_match(1, MatchStatus::Upcoming),
        },
    );
    apply_delta(
        &mut state,
        Delta::SetMyPrediction {
            match_id: 1,
            prediction: None,
        },
    );

    apply_delta(
        &mut state,
        Delta::SubmitFinished {
            match_id: 7,
            outcome: Ok(fixture_stored(7)),
        },
    );
    assert!(state.session.as_ref().expect("session open").stored().is_none());
}
