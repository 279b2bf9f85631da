//! The progression engine: owns the game state, answers derived-rate queries
//! and applies every state transition.
//!
//! Commands never fail with an error. A rejected command returns an outcome
//! describing why and leaves the state untouched; a successful one mutates
//! the state and persists it.

use crate::codes::{self, CodeEffect};
use crate::number::{saturating_add, saturating_multiply};
use crate::save::{self, STORAGE_KEY};
use crate::state::{GameState, UpgradeKind, REBIRTH_BASE_REQUIREMENT, REBIRTH_FACTOR};
use crate::storage::Storage;
use crate::time::Clock;

/// Offline income is credited for at most this long (7 days).
pub const MAX_OFFLINE_SECONDS: f64 = 7.0 * 24.0 * 60.0 * 60.0;

/// Runtime settings for an [`Engine`].
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Key the save is stored under.
    pub storage_key: String,
    /// Upper bound on the time credited by [`Engine::catch_up`].
    pub max_offline_seconds: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            max_offline_seconds: MAX_OFFLINE_SECONDS,
        }
    }
}

/// Result of [`Engine::buy_upgrade`].
#[derive(Clone, Debug, PartialEq)]
pub enum BuyOutcome {
    Purchased {
        kind: UpgradeKind,
        /// Level after the purchase.
        level: u32,
        /// Score spent.
        cost: f64,
    },
    InsufficientScore {
        kind: UpgradeKind,
        cost: f64,
        missing: f64,
    },
}

impl BuyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuyOutcome::Purchased { .. })
    }
}

/// Result of [`Engine::rebirth`].
#[derive(Clone, Debug, PartialEq)]
pub enum RebirthOutcome {
    Reborn { rebirths: u32, multiplier: f64 },
    /// `needed` is how much more score the rebirth requires.
    RequirementNotMet { requirement: f64, needed: f64 },
}

impl RebirthOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RebirthOutcome::Reborn { .. })
    }
}

/// Result of [`Engine::redeem_code`].
#[derive(Clone, Debug, PartialEq)]
pub enum RedeemOutcome {
    Redeemed {
        code: String,
        description: &'static str,
    },
    /// Nothing left after trimming.
    Empty,
    AlreadyRedeemed { code: String },
    Invalid { code: String },
}

impl RedeemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RedeemOutcome::Redeemed { .. })
    }

    /// Message for the player.
    pub fn message(&self) -> String {
        match self {
            RedeemOutcome::Redeemed { description, .. } => format!("コード適用: {}", description),
            RedeemOutcome::Empty => "コードを入力してください".to_string(),
            RedeemOutcome::AlreadyRedeemed { code } => {
                format!("コード「{}」は使用済みです", code)
            }
            RedeemOutcome::Invalid { code } => format!("無効なコード: {}", code),
        }
    }
}

/// Result of [`Engine::catch_up`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CatchUp {
    /// Seconds credited (after the offline cap).
    pub seconds: f64,
    pub earned: f64,
}

/// Owns the game state and its storage and clock collaborators.
pub struct Engine<S, C> {
    state: GameState,
    storage: S,
    clock: C,
    config: EngineConfig,
}

impl<S: Storage, C: Clock> Engine<S, C> {
    /// Load the saved game from `storage`, or start fresh.
    pub fn load(storage: S, clock: C) -> Self {
        Self::with_config(storage, clock, EngineConfig::default())
    }

    pub fn with_config(storage: S, clock: C, config: EngineConfig) -> Self {
        let defaults = GameState::new(clock.now_ms());
        let raw = storage.get(&config.storage_key);
        let state = save::load(&defaults, raw.as_deref());
        Self {
            state,
            storage,
            clock,
            config,
        }
    }

    /// Wrap an existing state (imports, tests). Nothing is read from storage.
    pub fn from_parts(state: GameState, storage: S, clock: C) -> Self {
        Self {
            state,
            storage,
            clock,
            config: EngineConfig::default(),
        }
    }

    /// Read-only view of the state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Derived values ──────────────────────────────────────────

    /// `1 + power.level * power.add`
    pub fn base_per_click(&self) -> f64 {
        1.0 + self.state.upgrade(UpgradeKind::Power).effect()
    }

    /// Score gained by one click.
    pub fn total_per_click(&self) -> f64 {
        let with_rebirths = saturating_multiply(self.base_per_click(), self.state.multiplier);
        saturating_multiply(with_rebirths, self.state.permanent_click_boost)
    }

    /// Passive score per second.
    pub fn auto_rate_per_second(&self) -> f64 {
        let auto = self.state.upgrade(UpgradeKind::Auto);
        saturating_multiply(auto.effect(), self.state.permanent_auto_boost)
    }

    /// Price of the next level of `kind`.
    pub fn upgrade_cost(&self, kind: UpgradeKind) -> f64 {
        self.state.upgrade(kind).next_cost()
    }

    /// Score needed to rebirth: doubles with every completed rebirth.
    pub fn rebirth_requirement(&self) -> f64 {
        REBIRTH_BASE_REQUIREMENT * REBIRTH_FACTOR.powf(self.state.rebirths as f64)
    }

    pub fn can_afford(&self, kind: UpgradeKind) -> bool {
        self.state.score >= self.upgrade_cost(kind)
    }

    pub fn can_rebirth(&self) -> bool {
        self.state.score >= self.rebirth_requirement()
    }

    // ── Commands ────────────────────────────────────────────────

    /// Add one click's worth of score. Returns the amount gained.
    pub fn click(&mut self) -> f64 {
        let gain = self.total_per_click();
        self.state.score = saturating_add(self.state.score, gain);
        self.persist();
        gain
    }

    /// Buy the next level of `kind` if the score covers it.
    pub fn buy_upgrade(&mut self, kind: UpgradeKind) -> BuyOutcome {
        let cost = self.upgrade_cost(kind);
        if self.state.score < cost {
            return BuyOutcome::InsufficientScore {
                kind,
                cost,
                missing: cost - self.state.score,
            };
        }

        self.state.score = (self.state.score - cost).max(0.0);
        let upgrade = self
            .state
            .upgrades
            .entry(kind)
            .or_insert_with(|| kind.default_upgrade());
        upgrade.level = upgrade.level.saturating_add(1);
        let level = upgrade.level;
        self.persist();

        BuyOutcome::Purchased { kind, level, cost }
    }

    /// Trade score and upgrade levels for a doubled multiplier.
    ///
    /// Code boosts and redeemed codes survive a rebirth.
    pub fn rebirth(&mut self) -> RebirthOutcome {
        let requirement = self.rebirth_requirement();
        if self.state.score < requirement {
            return RebirthOutcome::RequirementNotMet {
                requirement,
                needed: requirement - self.state.score,
            };
        }

        self.state.rebirths = self.state.rebirths.saturating_add(1);
        self.state.multiplier = saturating_multiply(self.state.multiplier, REBIRTH_FACTOR);
        self.state.score = 0.0;
        for upgrade in self.state.upgrades.values_mut() {
            upgrade.level = 0;
        }
        log::info!(
            "転生 {}回目 (倍率 x{})",
            self.state.rebirths,
            self.state.multiplier
        );
        self.persist();

        RebirthOutcome::Reborn {
            rebirths: self.state.rebirths,
            multiplier: self.state.multiplier,
        }
    }

    /// Redeem a code. Each code works once; case and surrounding
    /// whitespace are ignored.
    pub fn redeem_code(&mut self, raw: &str) -> RedeemOutcome {
        let code = codes::normalize(raw);
        if code.is_empty() {
            return RedeemOutcome::Empty;
        }
        if self.state.has_redeemed(&code) {
            return RedeemOutcome::AlreadyRedeemed { code };
        }
        let def = match codes::lookup(&code) {
            Some(d) => d,
            None => return RedeemOutcome::Invalid { code },
        };

        match def.effect {
            CodeEffect::Rebirths { count } => {
                self.state.rebirths = self.state.rebirths.saturating_add(count);
                let factor = REBIRTH_FACTOR.powf(count as f64);
                self.state.multiplier = saturating_multiply(self.state.multiplier, factor);
            }
            CodeEffect::ClickBoost(factor) => {
                self.state.permanent_click_boost =
                    saturating_multiply(self.state.permanent_click_boost, factor);
            }
            CodeEffect::AutoBoost(factor) => {
                self.state.permanent_auto_boost =
                    saturating_multiply(self.state.permanent_auto_boost, factor);
            }
        }
        self.state.redeemed_codes.push(code.clone());
        log::info!("コード「{}」を使用: {}", code, def.description);
        self.persist();

        RedeemOutcome::Redeemed {
            code,
            description: def.description,
        }
    }

    /// Credit passive income for `elapsed_seconds`. Negative or non-finite
    /// elapsed time credits nothing. Returns the amount gained.
    pub fn tick(&mut self, elapsed_seconds: f64) -> f64 {
        if !elapsed_seconds.is_finite() || elapsed_seconds <= 0.0 {
            return 0.0;
        }
        let gain = self.auto_rate_per_second() * elapsed_seconds;
        let gain = if gain.is_finite() { gain } else { f64::MAX };
        self.state.score = saturating_add(self.state.score, gain);
        log::debug!("tick {:.3}s +{}", elapsed_seconds, gain);
        self.persist();
        gain
    }

    /// Credit passive income for the time since the last save, up to
    /// `max_offline_seconds`. Call once after loading.
    pub fn catch_up(&mut self) -> CatchUp {
        let elapsed = (self.clock.now_ms() - self.state.last_tick) / 1000.0;
        let seconds = if elapsed.is_finite() {
            elapsed.clamp(0.0, self.config.max_offline_seconds)
        } else {
            0.0
        };
        let earned = self.tick(seconds);
        if earned > 0.0 {
            log::info!("オフライン収入: {:.0}秒 +{}", seconds, earned);
        }
        CatchUp { seconds, earned }
    }

    /// Throw away all progress, codes included.
    pub fn reset(&mut self) {
        self.state = GameState::new(self.clock.now_ms());
        log::info!("セーブデータをリセット");
        self.persist();
    }

    fn persist(&mut self) {
        let now = self.clock.now_ms();
        if let Err(e) = save::persist(
            &mut self.state,
            &mut self.storage,
            &self.config.storage_key,
            now,
        ) {
            log::warn!("セーブに失敗（ゲームは続行します）: {}", e);
        }
    }
}
