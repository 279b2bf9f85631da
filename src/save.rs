//! セーブ/ロード機能。
//!
//! ## バージョニング方針
//!
//! - `SAVE_VERSION`: 現在のセーブ形式バージョン。フィールド追加時にインクリメントする。
//! - `MIN_COMPATIBLE_VERSION`: 互換性を維持できる最小バージョン。
//!   新フィールドの追加のみの場合はこの値を変えない（旧データを維持できる）。
//!   既存フィールドの意味変更や削除など破壊的変更を行った場合のみインクリメントする。
//!
//! `version` フィールドを持たないセーブ（最初期の形式）は version 1 として扱う。
//!
//! ## マージ方針
//!
//! 保存データは型付き構造体に直接デシリアライズせず、`serde_json::Value` として
//! 読み込んでからフィールド単位でデフォルト値に上書きする。1フィールドが壊れていても
//! 他のフィールドは復元され、足りないフィールドや壊れたフィールドはデフォルト値のまま残る。

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::codes;
use crate::state::{GameState, Upgrade, UpgradeKind};
use crate::storage::{Storage, StorageError};

/// セーブデータのフォーマットバージョン。
/// v2: `version` フィールド、コードブースト (`permanentClickBoost` 等) を追加。
pub const SAVE_VERSION: u32 = 2;

/// 互換性を維持できる最小バージョン。
/// この値以上のセーブデータは、不足フィールドをデフォルト値で補完して読み込む。
pub const MIN_COMPATIBLE_VERSION: u32 = 1;

/// `version` フィールドが無いセーブデータのバージョン。
const LEGACY_VERSION: u32 = 1;

/// ストレージのキー。最初期の形式と同じキーを使い続ける。
pub const STORAGE_KEY: &str = "clickerSave_v1";

/// 保存されるレコード。GameState のフィールドがそのままトップレベルに並ぶ。
#[derive(Serialize)]
struct SaveRecord<'a> {
    version: u32,
    #[serde(flatten)]
    game: &'a GameState,
}

/// Why a persist did not reach storage.
#[derive(Debug)]
pub enum SaveError {
    Serialize(serde_json::Error),
    Storage(StorageError),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Serialize(e) => write!(f, "failed to serialize save: {}", e),
            SaveError::Storage(e) => write!(f, "failed to write save: {}", e),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Serialize(e) => Some(e),
            SaveError::Storage(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Serialize(e)
    }
}

impl From<StorageError> for SaveError {
    fn from(e: StorageError) -> Self {
        SaveError::Storage(e)
    }
}

/// ゲーム状態を保存用 JSON にする。
pub fn serialize(state: &GameState) -> Result<String, serde_json::Error> {
    serde_json::to_string(&SaveRecord {
        version: SAVE_VERSION,
        game: state,
    })
}

/// `last_tick` を `now_ms` に更新してから保存する。
/// 失敗しても状態はメモリ上に残るので、呼び出し側はログを出して続行すればよい。
pub fn persist<S: Storage + ?Sized>(
    state: &mut GameState,
    storage: &mut S,
    key: &str,
    now_ms: f64,
) -> Result<(), SaveError> {
    state.last_tick = now_ms;
    let json = serialize(state)?;
    storage.set(key, &json)?;
    Ok(())
}

/// 保存されたテキストからゲーム状態を復元する。
/// 無い・壊れている・互換性が無い場合は `defaults` のコピーを返す。エラーは返さない。
pub fn load(defaults: &GameState, raw: Option<&str>) -> GameState {
    let raw = match raw {
        Some(r) => r,
        None => return defaults.clone(),
    };

    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("セーブデータのパースに失敗（破棄します）: {}", e);
            return defaults.clone();
        }
    };

    let obj = match value.as_object() {
        Some(o) => o,
        None => {
            log::warn!("セーブデータがオブジェクトではありません（破棄します）");
            return defaults.clone();
        }
    };

    let version = obj
        .get("version")
        .and_then(as_count)
        .unwrap_or(LEGACY_VERSION);

    if version < MIN_COMPATIBLE_VERSION {
        log::info!(
            "セーブバージョンが古すぎます (saved={}, min_compatible={})。新規ゲームを開始します。",
            version,
            MIN_COMPATIBLE_VERSION
        );
        return defaults.clone();
    }

    if version < SAVE_VERSION {
        log::info!(
            "旧バージョンのセーブデータをマイグレーション (saved={}, current={})。",
            version,
            SAVE_VERSION
        );
    } else if version > SAVE_VERSION {
        log::info!(
            "新しいバージョンのセーブデータ (saved={}, current={})。既知のフィールドのみ読み込みます。",
            version,
            SAVE_VERSION
        );
    }

    merge(defaults, &value)
}

/// 保存データをデフォルト値の上にフィールド単位で重ねる。
///
/// - 型が合わない・不変条件を満たさないフィールドは無視（デフォルトのまま）。
/// - `upgrades` はキーごと・フィールドごとにマージ。未知のキーは捨てる。
/// - `redeemedCodes` は文字列の配列のときだけ採用する。
pub fn merge(defaults: &GameState, persisted: &Value) -> GameState {
    let mut state = defaults.clone();
    for kind in UpgradeKind::all() {
        state
            .upgrades
            .entry(*kind)
            .or_insert_with(|| kind.default_upgrade());
    }

    let obj = match persisted.as_object() {
        Some(o) => o,
        None => return state,
    };

    if let Some(v) = obj.get("score").and_then(as_amount) {
        state.score = v;
    }
    if let Some(v) = obj.get("rebirths").and_then(as_count) {
        state.rebirths = v;
    }
    if let Some(v) = obj.get("multiplier").and_then(as_factor) {
        state.multiplier = v;
    }
    if let Some(v) = obj.get("permanentClickBoost").and_then(as_factor) {
        state.permanent_click_boost = v;
    }
    if let Some(v) = obj.get("permanentAutoBoost").and_then(as_factor) {
        state.permanent_auto_boost = v;
    }
    if let Some(codes) = obj.get("redeemedCodes") {
        state.redeemed_codes = as_codes(codes).unwrap_or_default();
    }
    if let Some(v) = obj.get("lastTick").and_then(as_amount) {
        state.last_tick = v;
    }

    if let Some(upgrades) = obj.get("upgrades").and_then(Value::as_object) {
        for kind in UpgradeKind::all() {
            if let Some(record) = upgrades.get(kind.key()).and_then(Value::as_object) {
                if let Some(slot) = state.upgrades.get_mut(kind) {
                    merge_upgrade(slot, record);
                }
            }
        }
    }

    state
}

/// アップグレード1件をフィールド単位でマージする。
fn merge_upgrade(slot: &mut Upgrade, record: &Map<String, Value>) {
    if let Some(v) = record.get("level").and_then(as_count) {
        slot.level = v;
    }
    if let Some(v) = record.get("cost").and_then(as_finite).filter(|c| *c > 0.0) {
        slot.cost = v;
    }
    if let Some(v) = record.get("costMul").and_then(as_finite).filter(|m| *m > 1.0) {
        slot.cost_mul = v;
    }
    if let Some(v) = record.get("add").and_then(as_amount) {
        slot.add = v;
    }
}

fn as_finite(v: &Value) -> Option<f64> {
    v.as_f64().filter(|n| n.is_finite())
}

/// 0 以上の有限値。
fn as_amount(v: &Value) -> Option<f64> {
    as_finite(v).filter(|n| *n >= 0.0)
}

/// 1 以上の有限値（倍率）。
fn as_factor(v: &Value) -> Option<f64> {
    as_finite(v).filter(|n| *n >= 1.0)
}

/// u32 に収まる非負の整数。`3.0` のような整数値の浮動小数も受け付ける。
fn as_count(v: &Value) -> Option<u32> {
    if let Some(n) = v.as_u64() {
        return u32::try_from(n).ok();
    }
    let n = as_amount(v)?;
    if n.fract() == 0.0 && n <= u32::MAX as f64 {
        Some(n as u32)
    } else {
        None
    }
}

/// 文字列の配列のみ受け付ける。正規化して重複を除く。
fn as_codes(v: &Value) -> Option<Vec<String>> {
    let items = v.as_array()?;
    let mut codes: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let code = codes::normalize(item.as_str()?);
        if !code.is_empty() && !codes.contains(&code) {
            codes.push(code);
        }
    }
    Some(codes)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_state() -> impl Strategy<Value = GameState> {
        (
            0.0f64..1e30,
            0u32..1_000,
            1.0f64..1e300,
            1.0f64..1e12,
            1.0f64..1e12,
            proptest::sample::subsequence(vec!["ascend", "rxchh", "booty"], 0..=3),
            0u32..500,
            0u32..500,
            0.0f64..2e12,
        )
            .prop_map(
                |(score, rebirths, multiplier, click, auto, codes, power, auto_lv, last_tick)| {
                    let mut state = GameState::new(last_tick);
                    state.score = score;
                    state.rebirths = rebirths;
                    state.multiplier = multiplier;
                    state.permanent_click_boost = click;
                    state.permanent_auto_boost = auto;
                    state.redeemed_codes = codes.into_iter().map(String::from).collect();
                    state.upgrades.get_mut(&UpgradeKind::Power).unwrap().level = power;
                    state.upgrades.get_mut(&UpgradeKind::Auto).unwrap().level = auto_lv;
                    state
                },
            )
    }

    proptest! {
        #[test]
        fn prop_serialize_then_load_is_identity(state in arb_state()) {
            let json = serialize(&state).unwrap();
            let restored = load(&GameState::default(), Some(&json));
            prop_assert_eq!(restored, state);
        }

        #[test]
        fn prop_load_never_panics_on_garbage(raw in ".*") {
            let state = load(&GameState::default(), Some(&raw));
            prop_assert!(state.score >= 0.0);
            prop_assert_eq!(state.upgrades.len(), UpgradeKind::all().len());
        }

        #[test]
        fn prop_loaded_score_is_kept(score in 0.0f64..1e300) {
            let raw = serde_json::json!({ "score": score }).to_string();
            let state = load(&GameState::default(), Some(&raw));
            prop_assert_eq!(state.score, score);
        }
    }
}
