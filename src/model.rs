use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Upcoming,
    Completed,
}

/// One fixture as served by the backend. Actuals are only populated once
/// the match is completed; the client never mutates any of this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: u32,
    pub home_team: String,
    pub away_team: String,
    pub venue: String,
    pub start_time: DateTime<Utc>,
    pub status: MatchStatus,
    #[serde(default)]
    pub actual_toss_winner: Option<String>,
    #[serde(default)]
    pub actual_match_winner: Option<String>,
    // Comma-separated for ties: "Player1, Player2".
    #[serde(default)]
    pub actual_top_wicket_taker: Option<String>,
    #[serde(default)]
    pub actual_top_run_scorer: Option<String>,
    #[serde(default)]
    pub actual_highest_run_scored: Option<u32>,
    #[serde(default)]
    pub actual_powerplay_runs: Option<u32>,
    #[serde(default)]
    pub actual_total_wickets: Option<u32>,
    #[serde(default)]
    pub actual_x_factors: Vec<ActualXFactor>,
}

impl Match {
    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn teams(&self) -> [&str; 2] {
        [&self.home_team, &self.away_team]
    }

    pub fn actual_top_wicket_takers(&self) -> Vec<String> {
        self.actual_top_wicket_taker
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActualXFactor {
    pub xf_id: String,
    pub player_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Medium, RiskTier::High];

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XFactorDefinition {
    pub id: String,
    pub risk: RiskTier,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub result_description: Option<String>,
}

/// Per-pick entry of the server's canonical prediction record. `correct`
/// stays `None` until the match is completed and scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredXFactor {
    pub xf_id: String,
    pub player_name: String,
    #[serde(default)]
    pub correct: Option<bool>,
}

/// The server's canonical prediction. Read-only on the client; replaced
/// wholesale on every fetch or successful submit, never field-merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPrediction {
    pub id: u32,
    pub match_id: u32,
    pub user_id: u32,
    pub toss_winner: String,
    pub match_winner: String,
    #[serde(default)]
    pub top_wicket_taker: Option<String>,
    #[serde(default)]
    pub top_run_scorer: Option<String>,
    #[serde(default)]
    pub highest_run_scored: Option<u32>,
    #[serde(default)]
    pub powerplay_runs: Option<u32>,
    #[serde(default)]
    pub total_wickets: Option<u32>,
    #[serde(default)]
    pub points_earned: Option<i32>,
    #[serde(default)]
    pub x_factors: Vec<StoredXFactor>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FieldPoints {
    pub correct: i32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct XfTierPoints {
    pub correct: i32,
    pub wrong: i32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct XFactorPoints {
    #[serde(rename = "LOW")]
    pub low: XfTierPoints,
    #[serde(rename = "MEDIUM")]
    pub medium: XfTierPoints,
    #[serde(rename = "HIGH")]
    pub high: XfTierPoints,
}

impl XFactorPoints {
    pub fn tier(&self, tier: RiskTier) -> XfTierPoints {
        match tier {
            RiskTier::Low => self.low,
            RiskTier::Medium => self.medium,
            RiskTier::High => self.high,
        }
    }
}

/// Point values per field and per risk tier. Display-only: never feeds
/// into validation or submission.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScoringMeta {
    pub toss_winner: FieldPoints,
    pub match_winner: FieldPoints,
    pub top_wicket_taker: FieldPoints,
    pub top_run_scorer: FieldPoints,
    pub highest_run_scored: FieldPoints,
    pub powerplay_runs: FieldPoints,
    pub total_wickets: FieldPoints,
    pub x_factor: XFactorPoints,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: u32,
    pub username: String,
    pub total_points: i32,
    pub matches_played: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSection {
    pub title: String,
    pub players: Vec<String>,
}

/// The roster endpoint answers with either a flat name list or pre-grouped
/// sections. The shape is pinned down here, at the boundary, so nothing
/// downstream branches on raw JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Roster {
    Flat(Vec<String>),
    Sectioned(Vec<RosterSection>),
}

impl Roster {
    pub fn is_empty(&self) -> bool {
        match self {
            Roster::Flat(players) => players.is_empty(),
            Roster::Sectioned(sections) => sections.iter().all(|s| s.players.is_empty()),
        }
    }

    pub fn player_count(&self) -> usize {
        match self {
            Roster::Flat(players) => players.len(),
            Roster::Sectioned(sections) => sections.iter().map(|s| s.players.len()).sum(),
        }
    }

    /// Flattened view in display order, used for cursor-based selection.
    pub fn all_players(&self) -> Vec<&str> {
        match self {
            Roster::Flat(players) => players.iter().map(String::as_str).collect(),
            Roster::Sectioned(sections) => sections
                .iter()
                .flat_map(|s| s.players.iter().map(String::as_str))
                .collect(),
        }
    }
}

/// Decode the roster response. An array of strings is a flat roster; an
/// array of `{title, data}` objects is sectioned; anything else (null,
/// empty, unrecognized) is an empty roster, not an error.
pub fn roster_from_value(value: &Value) -> Roster {
    let Some(items) = value.as_array() else {
        return Roster::Flat(Vec::new());
    };
    if items
        .first()
        .is_some_and(|entry| entry.get("data").is_some())
    {
        let sections = items
            .iter()
            .filter_map(|entry| {
                let title = entry
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or("Players")
                    .to_string();
                let players = entry
                    .get("data")?
                    .as_array()?
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect();
                Some(RosterSection { title, players })
            })
            .collect();
        return Roster::Sectioned(sections);
    }
    Roster::Flat(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wicket_taker_ties_split_and_trim() {
        let raw = serde_json::json!({
            "id": 7,
            "home_team": "CSK",
            "away_team": "MI",
            "venue": "Chepauk",
            "start_time": "2026-04-03T14:00:00Z",
            "status": "completed",
            "actual_top_wicket_taker": "J. Bumrah, M. Pathirana ",
        });
        let m: Match = serde_json::from_value(raw).unwrap();
        assert_eq!(m.actual_top_wicket_takers(), ["J. Bumrah", "M. Pathirana"]);
    }

    #[test]
    fn status_and_risk_wire_casing() {
        assert_eq!(
            serde_json::from_str::<MatchStatus>("\"upcoming\"").unwrap(),
            MatchStatus::Upcoming
        );
        assert_eq!(
            serde_json::from_str::<RiskTier>("\"HIGH\"").unwrap(),
            RiskTier::High
        );
        assert_eq!(serde_json::to_string(&RiskTier::Medium).unwrap(), "\"MEDIUM\"");
    }

    #[test]
    fn scoring_meta_round_trips_tier_keys() {
        let raw = serde_json::json!({
            "toss_winner": {"correct": 2},
            "match_winner": {"correct": 5},
            "top_wicket_taker": {"correct": 4},
            "top_run_scorer": {"correct": 4},
            "highest_run_scored": {"correct": 5},
            "powerplay_runs": {"correct": 3},
            "total_wickets": {"correct": 3},
            "x_factor": {
                "LOW": {"correct": 3, "wrong": -1},
                "MEDIUM": {"correct": 5, "wrong": -3},
                "HIGH": {"correct": 10, "wrong": -7}
            }
        });
        let meta: ScoringMeta = serde_json::from_value(raw).unwrap();
        assert_eq!(meta.x_factor.tier(RiskTier::High).wrong, -7);
        assert_eq!(meta.match_winner.correct, 5);
    }
}
