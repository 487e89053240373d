use crate::catalog::XFactorCatalog;
use crate::model::RiskTier;

/// Guided three-step X-Factor selection: risk tier, then a condition
/// offered at that tier, then a player. Lives behind the modal overlay;
/// the draft only ever sees the confirmed `(xf_id, player)` pair.
#[derive(Debug, Default)]
pub struct XfPicker {
    open: bool,
    risk: Option<RiskTier>,
    condition: Option<String>,
    player: String,
}

impl XfPicker {
    pub fn open(&mut self) {
        self.open = true;
        self.risk = None;
        self.condition = None;
        self.player.clear();
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Conditions are partitioned by tier, so changing the tier
    /// invalidates the chosen condition. The player entry survives: it is
    /// tier-independent and retyping it would be pure friction.
    pub fn set_risk(&mut self, risk: RiskTier) {
        if self.risk != Some(risk) {
            self.condition = None;
        }
        self.risk = Some(risk);
    }

    /// Accepts a condition only when a tier is chosen and `id` is offered
    /// at that tier in the current catalog.
    pub fn set_condition(&mut self, id: &str, catalog: &XFactorCatalog) -> bool {
        let Some(risk) = self.risk else {
            return false;
        };
        match catalog.get(id) {
            Some(def) if def.risk == risk => {
                self.condition = Some(def.id.clone());
                true
            }
            _ => false,
        }
    }

    pub fn set_player(&mut self, player: impl Into<String>) {
        self.player = player.into();
    }

    pub fn risk(&self) -> Option<RiskTier> {
        self.risk
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    /// The player step is only reachable once both earlier steps are done.
    pub fn player_step_ready(&self) -> bool {
        self.risk.is_some() && self.condition.is_some()
    }

    pub fn can_confirm(&self) -> bool {
        self.risk.is_some() && self.condition.is_some() && !self.player.trim().is_empty()
    }

    /// Finalize the selection: yields the `(xf_id, trimmed player)` pair,
    /// resets all three steps, and closes the modal. `None` while any step
    /// is incomplete.
    pub fn confirm(&mut self) -> Option<(String, String)> {
        if !self.can_confirm() {
            return None;
        }
        let xf_id = self.condition.take().expect("condition checked above");
        let player = std::mem::take(&mut self.player).trim().to_string();
        self.risk = None;
        self.open = false;
        Some((xf_id, player))
    }
}
