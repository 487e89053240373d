use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread;

use crate::api::ApiClient;
use crate::state::{Delta, ProviderCommand};

/// Provider worker: owns the gateway, executes commands off the UI
/// thread, posts one delta per resolved fetch. Commands fan out onto
/// their own threads so the independent fetches behind one screen open
/// run concurrently and fail in isolation.
pub fn spawn_provider(api: ApiClient, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    let api = Arc::new(api);
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            let api = Arc::clone(&api);
            let tx = tx.clone();
            thread::spawn(move || run_command(&api, &tx, cmd));
        }
    });
}

fn run_command(api: &ApiClient, tx: &Sender<Delta>, cmd: ProviderCommand) {
    match cmd {
        ProviderCommand::HealthCheck => {
            let msg = match api.health() {
                Ok(()) => "[INFO] API reachable".to_string(),
                Err(err) => format!("[WARN] API health check: {err}"),
            };
            let _ = tx.send(Delta::Log(msg));
        }
        ProviderCommand::FetchMatches { view } => {
            let result = match view {
                crate::state::MatchView::Upcoming => api.upcoming_matches(),
                crate::state::MatchView::Completed => api.completed_matches(),
            };
            let delta = match result {
                Ok(matches) => Delta::SetMatches { view, matches },
                Err(err) => Delta::MatchesFailed {
                    view,
                    error: err.to_string(),
                },
            };
            let _ = tx.send(delta);
        }
        ProviderCommand::FetchMatchDetail { match_id } => {
            let delta = match api.match_detail(match_id) {
                Ok(detail) => Delta::SetMatchDetail { match_id, detail },
                Err(err) => Delta::MatchDetailFailed {
                    match_id,
                    error: err.to_string(),
                },
            };
            let _ = tx.send(delta);
        }
        ProviderCommand::FetchRoster { match_id } => {
            let delta = match api.match_roster(match_id) {
                Ok(roster) => Delta::SetRoster { match_id, roster },
                Err(err) => Delta::RosterFailed {
                    match_id,
                    error: err.to_string(),
                },
            };
            let _ = tx.send(delta);
        }
        ProviderCommand::FetchMyPrediction { match_id } => {
            // Not-found already folded into Ok(None) by the gateway; what
            // is left here is a genuine lookup failure.
            let delta = match api.my_prediction(match_id) {
                Ok(prediction) => Delta::SetMyPrediction {
                    match_id,
                    prediction,
                },
                Err(err) => Delta::MyPredictionUnverified {
                    match_id,
                    error: err.to_string(),
                },
            };
            let _ = tx.send(delta);
        }
        ProviderCommand::FetchCatalog => {
            let delta = match api.xfactor_catalog() {
                Ok(defs) => Delta::SetCatalog(defs),
                Err(err) => Delta::CatalogFailed(err.to_string()),
            };
            let _ = tx.send(delta);
        }
        ProviderCommand::FetchScoringMeta => {
            let delta = match api.scoring_meta() {
                Ok(meta) => Delta::SetScoringMeta(meta),
                Err(err) => Delta::ScoringMetaFailed(err.to_string()),
            };
            let _ = tx.send(delta);
        }
        ProviderCommand::FetchLeaderboard => {
            let delta = match api.leaderboard() {
                Ok(entries) => Delta::SetLeaderboard(entries),
                Err(err) => Delta::LeaderboardFailed(err.to_string()),
            };
            let _ = tx.send(delta);
        }
        ProviderCommand::Submit {
            match_id,
            payload,
            update,
        } => {
            let result = if update {
                api.update_prediction(match_id, &payload)
            } else {
                api.create_prediction(match_id, &payload)
            };
            let outcome = result.map_err(|err| err.to_string());
            let _ = tx.send(Delta::SubmitFinished { match_id, outcome });
        }
    }
}
