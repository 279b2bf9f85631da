//! Rebirth Clicker: the progression engine of an idle clicker.
//!
//! Score comes from clicks and passive income, is spent on upgrades, and is
//! periodically traded in for a permanent multiplier (a rebirth). One-time
//! codes grant permanent boosts. [`Engine`] owns the state; the binary in
//! `main.rs` is a thin ratzilla front end around it.

pub mod codes;
pub mod engine;
pub mod number;
pub mod save;
pub mod state;
pub mod storage;
pub mod time;

pub use engine::{BuyOutcome, CatchUp, Engine, EngineConfig, RebirthOutcome, RedeemOutcome};
pub use number::{format_number, saturating_multiply};
pub use state::{GameState, Upgrade, UpgradeKind};
pub use storage::{MemoryStorage, Storage, StorageError};
pub use time::{Clock, FixedClock, GameClock, SystemClock};
