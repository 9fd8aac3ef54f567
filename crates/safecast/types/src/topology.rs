//! Topology snapshots
//!
//! A snapshot maps each environment class to the tiers occupying its slots.
//! Snapshots are values: planners build new ones instead of editing in place.

use crate::environment::{EnvironmentClass, TierKind};
use crate::tier::Tier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A second tier claimed an occupied slot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("slot {class}/{kind} already held by {existing}, refusing {duplicate}")]
pub struct DuplicateSlot {
    pub class: EnvironmentClass,
    pub kind: TierKind,
    pub existing: String,
    pub duplicate: String,
}

/// Every tier of one application, at most one per (class, kind)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologySnapshot {
    pub application: String,
    pub envs: BTreeMap<EnvironmentClass, BTreeMap<TierKind, Tier>>,
}

impl TopologySnapshot {
    pub fn new(application: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            envs: BTreeMap::new(),
        }
    }

    /// Place a tier in its slot.
    pub fn insert(&mut self, tier: Tier) -> Result<(), DuplicateSlot> {
        let slot = self.envs.entry(tier.class).or_default();
        if let Some(existing) = slot.get(&tier.kind) {
            return Err(DuplicateSlot {
                class: tier.class,
                kind: tier.kind,
                existing: existing.name.clone(),
                duplicate: tier.name,
            });
        }
        slot.insert(tier.kind, tier);
        Ok(())
    }

    pub fn tier(&self, class: EnvironmentClass, kind: TierKind) -> Option<&Tier> {
        self.envs.get(&class).and_then(|tiers| tiers.get(&kind))
    }

    /// Tiers of one class in rollout order (worker first).
    pub fn rollout_tiers(&self, class: EnvironmentClass) -> impl Iterator<Item = &Tier> {
        TierKind::ROLLOUT_ORDER
            .into_iter()
            .filter_map(move |kind| self.tier(class, kind))
    }

    pub fn has_class(&self, class: EnvironmentClass) -> bool {
        self.envs.get(&class).is_some_and(|tiers| !tiers.is_empty())
    }

    pub fn tier_count(&self) -> usize {
        self.envs.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tier_count() == 0
    }
}
