use std::collections::HashMap;

use crate::model::{RiskTier, XFactorDefinition};

/// Server-supplied X-Factor definitions plus two derived indexes. The
/// indexes are recomputed wholesale whenever the definition list is set;
/// they are never patched independently of it.
#[derive(Debug, Clone, Default)]
pub struct XFactorCatalog {
    defs: Vec<XFactorDefinition>,
    by_id: HashMap<String, usize>,
    by_tier: HashMap<RiskTier, Vec<usize>>,
}

impl XFactorCatalog {
    pub fn new(defs: Vec<XFactorDefinition>) -> Self {
        let mut catalog = Self::default();
        catalog.set_definitions(defs);
        catalog
    }

    pub fn set_definitions(&mut self, defs: Vec<XFactorDefinition>) {
        self.defs = defs;
        self.by_id = self
            .defs
            .iter()
            .enumerate()
            .map(|(idx, def)| (def.id.clone(), idx))
            .collect();
        self.by_tier.clear();
        for (idx, def) in self.defs.iter().enumerate() {
            self.by_tier.entry(def.risk).or_default().push(idx);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn get(&self, id: &str) -> Option<&XFactorDefinition> {
        self.by_id.get(id).map(|idx| &self.defs[*idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Definitions offered at one risk tier, in catalog order.
    pub fn tier(&self, tier: RiskTier) -> Vec<&XFactorDefinition> {
        self.by_tier
            .get(&tier)
            .map(|indexes| indexes.iter().map(|idx| &self.defs[*idx]).collect())
            .unwrap_or_default()
    }

    pub fn definitions(&self) -> &[XFactorDefinition] {
        &self.defs
    }
}
