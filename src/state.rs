use std::collections::VecDeque;

use crate::catalog::XFactorCatalog;
use crate::model::{
    LeaderboardEntry, Match, Roster, ScoringMeta, StoredPrediction, XFactorDefinition,
};
use crate::session::{PredictionPayload, PredictionSession};

const LOG_CAPACITY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Pulse,
    Prediction,
    Leaderboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchView {
    Upcoming,
    Completed,
}

impl MatchView {
    pub fn label(self) -> &'static str {
        match self {
            MatchView::Upcoming => "Upcoming",
            MatchView::Completed => "Completed",
        }
    }
}

/// Whole-app state, mutated only on the UI thread: either directly by key
/// handlers or through [`apply_delta`] as provider results drain.
pub struct AppState {
    pub screen: Screen,
    pub view: MatchView,
    pub selected: usize,
    pub upcoming: Vec<Match>,
    pub completed: Vec<Match>,
    pub matches_loading: bool,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub leaderboard_loading: bool,
    pub catalog: XFactorCatalog,
    pub catalog_loaded: bool,
    pub scoring_meta: Option<ScoringMeta>,
    pub session: Option<PredictionSession>,
    pub roster: Option<Roster>,
    pub roster_hint: Option<String>,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            screen: Screen::Pulse,
            view: MatchView::Upcoming,
            selected: 0,
            upcoming: Vec::with_capacity(32),
            completed: Vec::with_capacity(32),
            matches_loading: false,
            leaderboard: Vec::new(),
            leaderboard_loading: false,
            catalog: XFactorCatalog::default(),
            catalog_loaded: false,
            scoring_meta: None,
            session: None,
            roster: None,
            roster_hint: None,
            help_overlay: false,
            logs: VecDeque::with_capacity(LOG_CAPACITY),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        if self.logs.len() == LOG_CAPACITY {
            self.logs.pop_front();
        }
        self.logs.push_back(msg.into());
    }

    pub fn visible_matches(&self) -> &[Match] {
        match self.view {
            MatchView::Upcoming => &self.upcoming,
            MatchView::Completed => &self.completed,
        }
    }

    pub fn selected_match(&self) -> Option<&Match> {
        self.visible_matches().get(self.selected)
    }

    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            MatchView::Upcoming => MatchView::Completed,
            MatchView::Completed => MatchView::Upcoming,
        };
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        let total = self.visible_matches().len();
        if total == 0 {
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.visible_matches().len();
        if total == 0 {
            return;
        }
        self.selected = self.selected.checked_sub(1).unwrap_or(total - 1);
    }

    /// Start a fresh prediction session for one match. Everything
    /// per-match (session, roster) resets; catalog and scoring meta are
    /// process-lifetime and survive.
    pub fn open_match(&mut self, match_id: u32) {
        self.session = Some(PredictionSession::new(match_id));
        self.roster = None;
        self.roster_hint = None;
        self.screen = Screen::Prediction;
    }

    pub fn close_match(&mut self) {
        self.session = None;
        self.roster = None;
        self.roster_hint = None;
        self.screen = Screen::Pulse;
    }

    /// Active session only if it is still about `match_id`. Late
    /// responses for an abandoned selection fall through to `None` and
    /// are dropped.
    fn session_for(&mut self, match_id: u32) -> Option<&mut PredictionSession> {
        self.session
            .as_mut()
            .filter(|session| session.match_id() == match_id)
    }
}

/// State updates posted by the provider thread, one per resolved fetch.
/// Per-match variants carry the match id so stale results can be dropped.
#[derive(Debug)]
pub enum Delta {
    SetMatches {
        view: MatchView,
        matches: Vec<Match>,
    },
    MatchesFailed {
        view: MatchView,
        error: String,
    },
    SetMatchDetail {
        match_id: u32,
        detail: Match,
    },
    MatchDetailFailed {
        match_id: u32,
        error: String,
    },
    SetRoster {
        match_id: u32,
        roster: Roster,
    },
    RosterFailed {
        match_id: u32,
        error: String,
    },
    SetMyPrediction {
        match_id: u32,
        prediction: Option<StoredPrediction>,
    },
    MyPredictionUnverified {
        match_id: u32,
        error: String,
    },
    SetCatalog(Vec<XFactorDefinition>),
    CatalogFailed(String),
    SetScoringMeta(ScoringMeta),
    ScoringMetaFailed(String),
    SetLeaderboard(Vec<LeaderboardEntry>),
    LeaderboardFailed(String),
    SubmitFinished {
        match_id: u32,
        outcome: Result<StoredPrediction, String>,
    },
    Log(String),
}

/// Requests the UI thread sends to the provider. Each runs independently;
/// one failing fetch never cancels or corrupts the others.
#[derive(Debug)]
pub enum ProviderCommand {
    HealthCheck,
    FetchMatches { view: MatchView },
    FetchMatchDetail { match_id: u32 },
    FetchRoster { match_id: u32 },
    FetchMyPrediction { match_id: u32 },
    FetchCatalog,
    FetchScoringMeta,
    FetchLeaderboard,
    Submit {
        match_id: u32,
        payload: PredictionPayload,
        update: bool,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetMatches { view, matches } => {
            state.matches_loading = false;
            match view {
                MatchView::Upcoming => state.upcoming = matches,
                MatchView::Completed => state.completed = matches,
            }
            if state.view == view && state.selected >= state.visible_matches().len() {
                state.selected = 0;
            }
        }
        Delta::MatchesFailed { view, error } => {
            state.matches_loading = false;
            state.push_log(format!("[WARN] {} matches fetch: {error}", view.label()));
        }
        Delta::SetMatchDetail { match_id, detail } => {
            if let Some(session) = state.session_for(match_id) {
                session.set_match(detail);
            }
        }
        Delta::MatchDetailFailed { match_id, error } => {
            state.push_log(format!("[WARN] Match {match_id} fetch: {error}"));
        }
        Delta::SetRoster { match_id, roster } => {
            if state
                .session
                .as_ref()
                .is_some_and(|s| s.match_id() == match_id)
            {
                state.roster_hint = roster
                    .is_empty()
                    .then(|| "No players available for this match".to_string());
                state.roster = Some(roster);
            }
        }
        Delta::RosterFailed { match_id, error } => {
            if state
                .session
                .as_ref()
                .is_some_and(|s| s.match_id() == match_id)
            {
                // Read-path degradation: empty roster plus a hint, the
                // screen never blocks on this.
                state.roster = Some(Roster::Flat(Vec::new()));
                state.roster_hint = Some("No players available for this match".to_string());
            }
            state.push_log(format!("[WARN] Roster fetch for {match_id}: {error}"));
        }
        Delta::SetMyPrediction {
            match_id,
            prediction,
        } => {
            if let Some(session) = state.session_for(match_id) {
                match prediction {
                    Some(stored) => session.set_prior(stored),
                    None => session.set_prior_missing(),
                }
            }
        }
        Delta::MyPredictionUnverified { match_id, error } => {
            if let Some(session) = state.session_for(match_id) {
                session.set_prior_unverified();
            }
            state.push_log(format!(
                "[WARN] Prior prediction lookup for {match_id}: {error}"
            ));
        }
        Delta::SetCatalog(defs) => {
            state.catalog.set_definitions(defs);
            state.catalog_loaded = true;
        }
        Delta::CatalogFailed(error) => {
            state.push_log(format!("[WARN] X-Factor catalog fetch: {error}"));
        }
        Delta::SetScoringMeta(meta) => {
            state.scoring_meta = Some(meta);
        }
        Delta::ScoringMetaFailed(error) => {
            state.push_log(format!("[WARN] Scoring meta fetch: {error}"));
        }
        Delta::SetLeaderboard(entries) => {
            state.leaderboard_loading = false;
            state.leaderboard = entries;
        }
        Delta::LeaderboardFailed(error) => {
            state.leaderboard_loading = false;
            state.push_log(format!("[WARN] Leaderboard fetch: {error}"));
        }
        Delta::SubmitFinished { match_id, outcome } => {
            if let Some(session) = state.session_for(match_id) {
                session.submit_finished(outcome);
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
