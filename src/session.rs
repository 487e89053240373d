use std::time::Instant;

use serde::Serialize;

use crate::catalog::XFactorCatalog;
use crate::model::{Match, MatchStatus, StoredPrediction};
use crate::validation::DebouncedAdvisor;

/// Which view of the prediction screen is active. Derived from match
/// status and prior-prediction presence; recomputed via
/// [`PredictionSession::mode`], never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Match detail or prior prediction still outstanding.
    Loading,
    /// Editable form: match upcoming and (no stored prediction or edit
    /// requested).
    Form,
    /// Read-only summary of an existing prediction for an upcoming match.
    Locked,
    /// Match completed. One-way; submission never permitted here.
    Result,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XFactorPick {
    pub xf_id: String,
    pub player_name: String,
}

/// The locally-edited candidate prediction. Numeric fields stay as digit
/// strings until serialization so the input layer and the wire layer agree
/// on what "unset" means.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PredictionDraft {
    pub toss_winner: Option<String>,
    pub match_winner: Option<String>,
    pub top_wicket_taker: String,
    pub top_run_scorer: String,
    pub highest_runs: String,
    pub powerplay_runs: String,
    pub total_wickets: String,
    pub x_factors: Vec<XFactorPick>,
}

impl PredictionDraft {
    fn seeded_from(stored: &StoredPrediction) -> Self {
        PredictionDraft {
            toss_winner: non_empty(&stored.toss_winner),
            match_winner: non_empty(&stored.match_winner),
            top_wicket_taker: stored.top_wicket_taker.clone().unwrap_or_default(),
            top_run_scorer: stored.top_run_scorer.clone().unwrap_or_default(),
            highest_runs: stored
                .highest_run_scored
                .map(|n| n.to_string())
                .unwrap_or_default(),
            powerplay_runs: stored
                .powerplay_runs
                .map(|n| n.to_string())
                .unwrap_or_default(),
            total_wickets: stored
                .total_wickets
                .map(|n| n.to_string())
                .unwrap_or_default(),
            x_factors: stored
                .x_factors
                .iter()
                .map(|xf| XFactorPick {
                    xf_id: xf.xf_id.clone(),
                    player_name: xf.player_name.clone(),
                })
                .collect(),
        }
    }
}

/// Wire shape of a submission. Optionals serialize as explicit `null`
/// when unset — "no prediction for this field", never omitted and never
/// zero. Picks carry identifier and player only; display fields stay
/// client-side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionPayload {
    pub toss_winner: String,
    pub match_winner: String,
    pub top_wicket_taker: Option<String>,
    pub top_run_scorer: Option<String>,
    pub highest_run_scored: Option<u32>,
    pub powerplay_runs: Option<u32>,
    pub total_wickets: Option<u32>,
    pub x_factors: Vec<XFactorPickPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XFactorPickPayload {
    pub xf_id: String,
    pub player_name: String,
}

/// One match's prediction lifecycle on the client. Created fresh on every
/// match selection; selecting another match discards the whole session.
#[derive(Debug)]
pub struct PredictionSession {
    match_id: u32,
    match_detail: Option<Match>,
    stored: Option<StoredPrediction>,
    match_loaded: bool,
    prediction_loaded: bool,
    prior_unverified: bool,
    edit_requested: bool,
    completed_seen: bool,
    submitting: bool,
    pub draft: PredictionDraft,
    pub advisor: DebouncedAdvisor,
    pub message: Option<String>,
}

impl PredictionSession {
    pub fn new(match_id: u32) -> Self {
        PredictionSession {
            match_id,
            match_detail: None,
            stored: None,
            match_loaded: false,
            prediction_loaded: false,
            prior_unverified: false,
            edit_requested: false,
            completed_seen: false,
            submitting: false,
            draft: PredictionDraft::default(),
            advisor: DebouncedAdvisor::default(),
            message: None,
        }
    }

    pub fn match_id(&self) -> u32 {
        self.match_id
    }

    pub fn mode(&self) -> SessionMode {
        if self.completed_seen {
            return SessionMode::Result;
        }
        if !self.match_loaded || !self.prediction_loaded {
            return SessionMode::Loading;
        }
        if self.stored.is_none() || self.edit_requested {
            SessionMode::Form
        } else {
            SessionMode::Locked
        }
    }

    pub fn match_detail(&self) -> Option<&Match> {
        self.match_detail.as_ref()
    }

    pub fn stored(&self) -> Option<&StoredPrediction> {
        self.stored.as_ref()
    }

    pub fn prior_unverified(&self) -> bool {
        self.prior_unverified
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    // ---- fetch results -------------------------------------------------

    pub fn set_match(&mut self, detail: Match) {
        if detail.status == MatchStatus::Completed {
            // One-way projection: nothing brings the session back from
            // Result within its lifetime.
            self.completed_seen = true;
        }
        self.match_detail = Some(detail);
        self.match_loaded = true;
    }

    /// A stored prediction exists; seed the draft from it so the edit path
    /// starts from the submitted values.
    pub fn set_prior(&mut self, stored: StoredPrediction) {
        self.draft = PredictionDraft::seeded_from(&stored);
        self.stored = Some(stored);
        self.prediction_loaded = true;
        self.prior_unverified = false;
    }

    /// Not-found on the prior-prediction lookup: the normal empty case.
    pub fn set_prior_missing(&mut self) {
        self.stored = None;
        self.prediction_loaded = true;
        self.prior_unverified = false;
    }

    /// The lookup failed for some other reason. The screen stays usable as
    /// if no prediction existed, but the uncertainty is surfaced instead
    /// of being passed off as "you have no prediction".
    pub fn set_prior_unverified(&mut self) {
        self.stored = None;
        self.prediction_loaded = true;
        self.prior_unverified = true;
    }

    // ---- mode transitions ----------------------------------------------

    /// Locked -> Form, only while the match is still upcoming.
    pub fn request_edit(&mut self) -> bool {
        if self.mode() != SessionMode::Locked {
            return false;
        }
        if let Some(stored) = &self.stored {
            self.draft = PredictionDraft::seeded_from(stored);
        }
        self.edit_requested = true;
        self.message = None;
        true
    }

    // ---- draft mutation (Form mode only) -------------------------------

    fn editable(&self) -> bool {
        self.mode() == SessionMode::Form && !self.submitting
    }

    /// Toss winner must be one of the two match teams.
    pub fn set_toss_winner(&mut self, team: &str) -> bool {
        if !self.editable() || !self.is_match_team(team) {
            return false;
        }
        self.draft.toss_winner = Some(team.to_string());
        true
    }

    pub fn set_match_winner(&mut self, team: &str) -> bool {
        if !self.editable() || !self.is_match_team(team) {
            return false;
        }
        self.draft.match_winner = Some(team.to_string());
        true
    }

    pub fn set_top_wicket_taker(&mut self, player: &str) -> bool {
        if !self.editable() {
            return false;
        }
        self.draft.top_wicket_taker = player.to_string();
        true
    }

    pub fn set_top_run_scorer(&mut self, player: &str) -> bool {
        if !self.editable() {
            return false;
        }
        self.draft.top_run_scorer = player.to_string();
        true
    }

    /// Digit-gated; a change schedules the debounced plausibility check.
    pub fn set_highest_runs(&mut self, value: &str, now: Instant) -> bool {
        if !self.editable() || !is_digit_string(value) {
            return false;
        }
        self.draft.highest_runs = value.to_string();
        self.advisor
            .schedule(&self.draft.highest_runs, &self.draft.total_wickets, now);
        true
    }

    pub fn set_powerplay_runs(&mut self, value: &str) -> bool {
        if !self.editable() || !is_digit_string(value) {
            return false;
        }
        self.draft.powerplay_runs = value.to_string();
        true
    }

    pub fn set_total_wickets(&mut self, value: &str, now: Instant) -> bool {
        if !self.editable() || !is_digit_string(value) {
            return false;
        }
        self.draft.total_wickets = value.to_string();
        self.advisor
            .schedule(&self.draft.highest_runs, &self.draft.total_wickets, now);
        true
    }

    /// Append a confirmed pick. The identifier must exist in the catalog
    /// at the time of addition, and an exact (condition, player) repeat is
    /// rejected; the same condition with a different player is a distinct,
    /// valid bet.
    pub fn add_x_factor(
        &mut self,
        xf_id: &str,
        player_name: &str,
        catalog: &XFactorCatalog,
    ) -> Result<(), &'static str> {
        if !self.editable() {
            return Err("Predictions are locked for this match.");
        }
        let player_name = player_name.trim();
        if player_name.is_empty() {
            return Err("Please select risk, condition and player.");
        }
        if !catalog.contains(xf_id) {
            return Err("Unknown X-Factor condition.");
        }
        let duplicate = self
            .draft
            .x_factors
            .iter()
            .any(|pick| pick.xf_id == xf_id && pick.player_name == player_name);
        if duplicate {
            return Err("That X-Factor is already added for this player.");
        }
        self.draft.x_factors.push(XFactorPick {
            xf_id: xf_id.to_string(),
            player_name: player_name.to_string(),
        });
        Ok(())
    }

    pub fn remove_x_factor(&mut self, index: usize) -> bool {
        if !self.editable() || index >= self.draft.x_factors.len() {
            return false;
        }
        self.draft.x_factors.remove(index);
        true
    }

    // ---- submission ----------------------------------------------------

    /// Local validation plus serialization into the wire shape. Mandatory
    /// fields missing means no network call is attempted at all.
    pub fn build_payload(&self) -> Result<PredictionPayload, &'static str> {
        if self.mode() != SessionMode::Form {
            return Err("Predictions are closed for this match.");
        }
        let (Some(toss_winner), Some(match_winner)) =
            (&self.draft.toss_winner, &self.draft.match_winner)
        else {
            return Err("Please choose Toss Winner and Match Winner.");
        };
        Ok(PredictionPayload {
            toss_winner: toss_winner.clone(),
            match_winner: match_winner.clone(),
            top_wicket_taker: non_empty(&self.draft.top_wicket_taker),
            top_run_scorer: non_empty(&self.draft.top_run_scorer),
            highest_run_scored: parse_unset(&self.draft.highest_runs),
            powerplay_runs: parse_unset(&self.draft.powerplay_runs),
            total_wickets: parse_unset(&self.draft.total_wickets),
            x_factors: self
                .draft
                .x_factors
                .iter()
                .map(|pick| XFactorPickPayload {
                    xf_id: pick.xf_id.clone(),
                    player_name: pick.player_name.clone(),
                })
                .collect(),
        })
    }

    /// Whether submission goes through the update operation (a canonical
    /// record already exists) rather than create.
    pub fn is_update(&self) -> bool {
        self.stored.is_some()
    }

    pub fn submit_started(&mut self) {
        self.submitting = true;
        self.message = None;
    }

    /// The server answered the submission. Success replaces local state
    /// with the canonical record and leaves Form mode; failure keeps the
    /// draft untouched so the same submission can be retried.
    pub fn submit_finished(&mut self, outcome: Result<StoredPrediction, String>) {
        self.submitting = false;
        match outcome {
            Ok(stored) => {
                self.set_prior(stored);
                self.edit_requested = false;
                self.advisor.clear();
                self.message = Some("Prediction submitted".to_string());
            }
            Err(message) => {
                self.message = Some(message);
            }
        }
    }

    fn is_match_team(&self, team: &str) -> bool {
        self.match_detail
            .as_ref()
            .is_some_and(|m| m.teams().contains(&team))
    }
}

fn is_digit_string(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_unset(value: &str) -> Option<u32> {
    if value.is_empty() {
        None
    } else {
        value.parse().ok()
    }
}
