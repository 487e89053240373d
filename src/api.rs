use reqwest::blocking::RequestBuilder;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::auth::CredentialProvider;
use crate::http_client::http_client;
use crate::model::{
    roster_from_value, LeaderboardEntry, Match, RiskTier, Roster, ScoringMeta, StoredPrediction,
    XFactorDefinition,
};
use crate::session::PredictionPayload;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Normalized failure shape for every gateway call: the status taxonomy
/// the UI branches on, with the human message already extracted.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        body: Option<Value>,
    },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Human message for a non-success body: first entry of a structured
/// validation-error array, else the flat detail string, else a generic
/// code-bearing fallback.
pub fn error_message_from_body(status: u16, body: Option<&Value>) -> String {
    if let Some(detail) = body.and_then(|b| b.get("detail")) {
        if let Some(entries) = detail.as_array() {
            if let Some(msg) = entries
                .first()
                .and_then(|entry| entry.get("msg"))
                .and_then(Value::as_str)
            {
                return msg.to_string();
            }
        }
        if let Some(msg) = detail.as_str() {
            return msg.to_string();
        }
    }
    format!("Error {status}")
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

/// Thin wrapper over the remote prediction service. The credential
/// provider is injected at construction; nothing here reads ambient
/// global auth state.
pub struct ApiClient {
    base_url: String,
    creds: Box<dyn CredentialProvider>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, creds: Box<dyn CredentialProvider>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        ApiClient { base_url, creds }
    }

    /// Base URL from `T20_API_BASE_URL`, falling back to the local dev
    /// server.
    pub fn from_env(creds: Box<dyn CredentialProvider>) -> Self {
        let base_url = std::env::var("T20_API_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(base_url, creds)
    }

    pub fn health(&self) -> ApiResult<()> {
        self.request(Method::GET, "/health", None)?;
        Ok(())
    }

    pub fn login(&self, username: &str, password: &str) -> ApiResult<String> {
        let body = serde_json::json!({ "username": username, "password": password });
        let value = self.request(Method::POST, "/auth/login", Some(&body))?;
        let resp: LoginResponse = decode(value)?;
        Ok(resp.access_token)
    }

    pub fn upcoming_matches(&self) -> ApiResult<Vec<Match>> {
        decode(self.request(Method::GET, "/matches/matches?status=upcoming", None)?)
    }

    pub fn completed_matches(&self) -> ApiResult<Vec<Match>> {
        decode(self.request(Method::GET, "/matches/matches?status=completed", None)?)
    }

    pub fn match_detail(&self, match_id: u32) -> ApiResult<Match> {
        decode(self.request(Method::GET, &format!("/matches/{match_id}"), None)?)
    }

    /// Roster shape is pinned down at this boundary; emptiness means "no
    /// roster available", never an error.
    pub fn match_roster(&self, match_id: u32) -> ApiResult<Roster> {
        let value = self.request(Method::GET, &format!("/matches/{match_id}/players"), None)?;
        Ok(roster_from_value(&value))
    }

    /// Not-found is the normal "no prediction yet" outcome, folded into
    /// the Ok path; every other failure stays an error for the caller to
    /// surface.
    pub fn my_prediction(&self, match_id: u32) -> ApiResult<Option<StoredPrediction>> {
        match self.request(Method::GET, &format!("/predictions/{match_id}/me"), None) {
            Ok(value) => Ok(Some(decode(value)?)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// The catalog endpoint has served both a flat definition list and a
    /// tier-keyed grouping; both decode to the same flat list here.
    pub fn xfactor_catalog(&self) -> ApiResult<Vec<XFactorDefinition>> {
        let value = self.request(Method::GET, "/xfactors", None)?;
        catalog_from_value(value)
    }

    pub fn scoring_meta(&self) -> ApiResult<ScoringMeta> {
        decode(self.request(Method::GET, "/meta/scoring", None)?)
    }

    pub fn create_prediction(
        &self,
        match_id: u32,
        payload: &PredictionPayload,
    ) -> ApiResult<StoredPrediction> {
        let body = serde_json::to_value(payload)
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        decode(self.request(Method::POST, &format!("/predictions/{match_id}"), Some(&body))?)
    }

    pub fn update_prediction(
        &self,
        match_id: u32,
        payload: &PredictionPayload,
    ) -> ApiResult<StoredPrediction> {
        let body = serde_json::to_value(payload)
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        decode(self.request(Method::PUT, &format!("/predictions/{match_id}"), Some(&body))?)
    }

    pub fn leaderboard(&self) -> ApiResult<Vec<LeaderboardEntry>> {
        decode(self.request(Method::GET, "/leaderboard/overall", None)?)
    }

    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> ApiResult<Value> {
        let client = http_client().map_err(|err| ApiError::Transport(err.to_string()))?;
        let url = format!("{}{path}", self.base_url);
        let mut req: RequestBuilder = client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.creds.token() {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req
            .send()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        let status = resp.status();
        let text = resp
            .text()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        let parsed: Option<Value> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let code = status.as_u16();
            return Err(ApiError::Status {
                status: code,
                message: error_message_from_body(code, parsed.as_ref()),
                body: parsed,
            });
        }
        Ok(parsed.unwrap_or(Value::Null))
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
}

fn catalog_from_value(value: Value) -> ApiResult<Vec<XFactorDefinition>> {
    if value.is_array() {
        return decode(value);
    }
    let Some(groups) = value.as_object() else {
        return Err(ApiError::Decode("catalog is neither list nor grouping".into()));
    };
    let mut defs = Vec::new();
    for tier in RiskTier::ALL {
        let key = serde_json::to_value(tier).expect("tier serializes to a string");
        let key = key.as_str().expect("tier key is a string");
        let Some(entries) = groups.get(key).and_then(Value::as_array) else {
            continue;
        };
        for entry in entries {
            let id = entry
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| ApiError::Decode("catalog entry without id".into()))?;
            defs.push(XFactorDefinition {
                id: id.to_string(),
                risk: tier,
                category: entry
                    .get("category")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                description: entry
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                result_description: entry
                    .get("result_description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            });
        }
    }
    Ok(defs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prefers_validation_array() {
        let body = serde_json::json!({
            "detail": [
                {"loc": ["body", "toss_winner"], "msg": "field required"},
                {"loc": ["body", "match_winner"], "msg": "also required"}
            ]
        });
        assert_eq!(error_message_from_body(422, Some(&body)), "field required");
    }

    #[test]
    fn message_falls_back_to_detail_string_then_code() {
        let body = serde_json::json!({"detail": "Predictions closed for this match"});
        assert_eq!(
            error_message_from_body(400, Some(&body)),
            "Predictions closed for this match"
        );
        assert_eq!(error_message_from_body(500, None), "Error 500");
        let odd = serde_json::json!({"detail": {"nested": true}});
        assert_eq!(error_message_from_body(502, Some(&odd)), "Error 502");
    }

    #[test]
    fn grouped_catalog_flattens_with_tiers() {
        let raw = serde_json::json!({
            "LOW": [{"id": "XF_FIELD_CATCH", "category": "fielding", "description": "Took a catch"}],
            "MEDIUM": [],
            "HIGH": [{"id": "XF_BOWL_3_WICKETS", "category": "bowling", "description": "took 3 wickets"}]
        });
        let defs = catalog_from_value(raw).unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].risk, RiskTier::Low);
        assert_eq!(defs[1].id, "XF_BOWL_3_WICKETS");
        assert_eq!(defs[1].risk, RiskTier::High);
    }
}
