//! Game state definitions: the single persisted aggregate and its upgrades.

use std::collections::BTreeMap;

use serde::Serialize;

/// Score needed for the first rebirth.
pub const REBIRTH_BASE_REQUIREMENT: f64 = 10_000.0;

/// Factor applied to the rebirth requirement and to the multiplier per rebirth.
pub const REBIRTH_FACTOR: f64 = 2.0;

/// Kinds of upgrades. Adding a variant adds an upgrade to every save on load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeKind {
    /// Adds to the base value of a click.
    Power,
    /// Adds passive income per second.
    Auto,
}

impl UpgradeKind {
    /// All upgrade kinds in display order.
    pub fn all() -> &'static [UpgradeKind] {
        &[UpgradeKind::Power, UpgradeKind::Auto]
    }

    /// Key used in the saved record.
    pub fn key(&self) -> &'static str {
        match self {
            UpgradeKind::Power => "power",
            UpgradeKind::Auto => "auto",
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            UpgradeKind::Power => "Power",
            UpgradeKind::Auto => "Auto-Clicker",
        }
    }

    /// Tuning constants for a fresh upgrade of this kind.
    pub fn default_upgrade(&self) -> Upgrade {
        match self {
            UpgradeKind::Power => Upgrade {
                level: 0,
                cost: 10.0,
                cost_mul: 1.15,
                add: 1.0,
            },
            UpgradeKind::Auto => Upgrade {
                level: 0,
                cost: 100.0,
                cost_mul: 1.18,
                add: 5.0,
            },
        }
    }
}

/// A purchasable upgrade. Only `level` changes during play.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Upgrade {
    pub level: u32,
    /// Base cost at level 0.
    pub cost: f64,
    /// Cost growth per level.
    pub cost_mul: f64,
    /// Effect per level.
    pub add: f64,
}

impl Upgrade {
    /// Cost of the next level: `ceil(cost * cost_mul ^ level)`.
    pub fn next_cost(&self) -> f64 {
        (self.cost * self.cost_mul.powf(self.level as f64)).ceil()
    }

    /// Total effect of all purchased levels.
    pub fn effect(&self) -> f64 {
        self.level as f64 * self.add
    }
}

/// Full persisted state of a game.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Spendable score.
    pub score: f64,
    /// Completed rebirths.
    pub rebirths: u32,
    /// Permanent multiplier from rebirths.
    pub multiplier: f64,
    pub permanent_click_boost: f64,
    pub permanent_auto_boost: f64,
    /// Normalized codes already redeemed. Unique; never shrinks.
    pub redeemed_codes: Vec<String>,
    pub upgrades: BTreeMap<UpgradeKind, Upgrade>,
    /// Epoch milliseconds of the last persist.
    pub last_tick: f64,
}

impl GameState {
    /// A fresh game whose clock starts at `now_ms`.
    pub fn new(now_ms: f64) -> Self {
        let upgrades = UpgradeKind::all()
            .iter()
            .map(|k| (*k, k.default_upgrade()))
            .collect();

        Self {
            score: 0.0,
            rebirths: 0,
            multiplier: 1.0,
            permanent_click_boost: 1.0,
            permanent_auto_boost: 1.0,
            redeemed_codes: Vec::new(),
            upgrades,
            last_tick: now_ms,
        }
    }

    /// The upgrade of the given kind.
    ///
    /// Every kind is always present; a missing entry (only possible if a
    /// caller bypassed the merge) reads as the kind's defaults.
    pub fn upgrade(&self, kind: UpgradeKind) -> Upgrade {
        self.upgrades
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| kind.default_upgrade())
    }

    pub fn has_redeemed(&self, code: &str) -> bool {
        self.redeemed_codes.iter().any(|c| c == code)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(0.0)
    }
}
