//! Redeemable codes: a lookup table from normalized code to effect.
//!
//! New codes are added to [`CODES`]; dispatch in the engine never changes.

/// What redeeming a code does.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CodeEffect {
    /// Grants `count` rebirths, each doubling the multiplier. Score and
    /// upgrades are left alone.
    Rebirths { count: u32 },
    /// Multiplies the permanent click boost.
    ClickBoost(f64),
    /// Multiplies the permanent auto-income boost.
    AutoBoost(f64),
}

/// A known code.
#[derive(Clone, Copy, Debug)]
pub struct CodeDef {
    /// Normalized (trimmed, lower-case) code text.
    pub code: &'static str,
    pub effect: CodeEffect,
    /// Shown to the player after a successful redemption.
    pub description: &'static str,
}

pub const CODES: &[CodeDef] = &[
    CodeDef {
        code: "ascend",
        effect: CodeEffect::Rebirths { count: 100 },
        description: "転生 +100回！ 倍率 ×2^100",
    },
    CodeDef {
        code: "rxchh",
        effect: CodeEffect::ClickBoost(50.0),
        description: "永続クリックブースト ×50",
    },
    CodeDef {
        code: "booty",
        effect: CodeEffect::AutoBoost(1_000_000.0),
        description: "永続オートブースト ×1,000,000",
    },
];

/// Trim surrounding whitespace and lower-case.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Find a code by its normalized text.
pub fn lookup(normalized: &str) -> Option<&'static CodeDef> {
    CODES.iter().find(|c| c.code == normalized)
}
