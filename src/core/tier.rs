use anyhow::{Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const UNRANKED: &str = "UNRANKED";

// half-up rounding of gaps like 7.0 - 6.95 that land a hair under .x5
const ROUNDING_NUDGE: f64 = 1e-9;
const MIN_GAP: f64 = 0.1;

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})$").expect("valid hex color regex")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierStyle {
    pub color: String,
    pub gradient: String,
    pub text_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glow: Option<String>,
}

impl TierStyle {
    fn new(color: &str, from: &str, to: &str, text_color: &str, glow: Option<&str>) -> Self {
        Self {
            color: color.to_string(),
            gradient: format!("linear-gradient(135deg, {from}, {to})"),
            text_color: text_color.to_string(),
            glow: glow.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub name: String,
    pub threshold: f64,
    pub style: TierStyle,
}

impl Tier {
    fn new(name: &str, threshold: f64, style: TierStyle) -> Self {
        Self {
            name: name.to_string(),
            threshold,
            style,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextTier<'a> {
    pub tier: &'a Tier,
    pub points_needed: f64,
}

/// Ordered rank ladder, best tier first, plus the sentinel for scores below
/// the lowest threshold.
#[derive(Debug, Clone)]
pub struct Ladder {
    tiers: Vec<Tier>,
    unranked: Tier,
}

impl Ladder {
    pub fn new(mut tiers: Vec<Tier>, unranked: TierStyle) -> Result<Self> {
        if tiers.is_empty() {
            bail!("tier ladder must contain at least one tier");
        }

        for tier in &mut tiers {
            tier.name = tier.name.trim().to_string();
        }

        let mut seen = HashSet::new();
        for (idx, tier) in tiers.iter().enumerate() {
            let name = tier.name.as_str();
            if name.is_empty() {
                bail!("tier #{} has an empty name", idx + 1);
            }
            if name.eq_ignore_ascii_case(UNRANKED) {
                bail!("tier name {} is reserved for the unranked sentinel", name);
            }
            if !seen.insert(name.to_ascii_uppercase()) {
                bail!("duplicate tier name {}", name);
            }
            if !tier.threshold.is_finite() {
                bail!("tier {} has a non-finite threshold", name);
            }
            if idx > 0 && tier.threshold >= tiers[idx - 1].threshold {
                bail!(
                    "tier {} threshold {} must be below {} threshold {}",
                    name,
                    tier.threshold,
                    tiers[idx - 1].name,
                    tiers[idx - 1].threshold
                );
            }
            validate_style(name, &tier.style)?;
        }
        validate_style(UNRANKED, &unranked)?;

        Ok(Self {
            tiers,
            unranked: Tier::new(UNRANKED, f64::NEG_INFINITY, unranked),
        })
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn unranked(&self) -> &Tier {
        &self.unranked
    }

    pub fn is_unranked(&self, tier: &Tier) -> bool {
        std::ptr::eq(tier, &self.unranked)
    }

    pub fn classify(&self, score: f64) -> &Tier {
        let score = normalize_score(score);
        self.tiers
            .iter()
            .find(|tier| score >= tier.threshold)
            .unwrap_or(&self.unranked)
    }

    /// Unknown names resolve to the unranked sentinel.
    pub fn tier_metadata(&self, name: &str) -> &Tier {
        let name = name.trim();
        self.tiers
            .iter()
            .find(|tier| tier.name.eq_ignore_ascii_case(name))
            .unwrap_or(&self.unranked)
    }

    pub fn next_tier(&self, score: f64) -> Option<NextTier<'_>> {
        let score = normalize_score(score);
        let mut next = None;

        for tier in &self.tiers {
            if score >= tier.threshold {
                break;
            }
            next = Some(tier);
        }

        next.map(|tier| NextTier {
            tier,
            points_needed: round_gap(tier.threshold - score),
        })
    }

    /// 0 for the sentinel, `tiers().len()` for the top tier.
    pub fn rank_of(&self, tier: &Tier) -> usize {
        self.tiers
            .iter()
            .position(|candidate| std::ptr::eq(candidate, tier) || candidate.name == tier.name)
            .map(|idx| self.tiers.len() - idx)
            .unwrap_or(0)
    }
}

impl Default for Ladder {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
            unranked: Tier::new(UNRANKED, f64::NEG_INFINITY, default_unranked_style()),
        }
    }
}

pub fn default_tiers() -> Vec<Tier> {
    let legendary = TierStyle::new(
        "#FFD700",
        "#FFD700",
        "#FF8C00",
        "#1A1A1A",
        Some("0 0 24px #FFD700"),
    );
    let mythic = TierStyle::new(
        "#E040FB",
        "#E040FB",
        "#7C4DFF",
        "#FFFFFF",
        Some("0 0 20px #E040FB"),
    );
    let grandmaster = TierStyle::new(
        "#FF5252",
        "#FF5252",
        "#B71C1C",
        "#FFFFFF",
        Some("0 0 16px #FF5252"),
    );
    let master = TierStyle::new("#AB47BC", "#AB47BC", "#6A1B9A", "#FFFFFF", None);
    let diamond = TierStyle::new("#40C4FF", "#80D8FF", "#0091EA", "#0D1B2A", None);
    let platinum = TierStyle::new("#26A69A", "#4DB6AC", "#00796B", "#FFFFFF", None);
    let gold = TierStyle::new("#FFC107", "#FFD54F", "#FFA000", "#1A1A1A", None);
    let silver = TierStyle::new("#B0BEC5", "#CFD8DC", "#90A4AE", "#1A1A1A", None);
    let bronze = TierStyle::new("#CD7F32", "#D7A26C", "#8D5524", "#FFFFFF", None);

    vec![
        Tier::new("LEGENDARY", 9.8, legendary),
        Tier::new("MYTHIC", 9.5, mythic),
        Tier::new("GRANDMASTER", 9.2, grandmaster),
        Tier::new("MASTER", 9.0, master),
        Tier::new("DIAMOND I", 8.8, diamond.clone()),
        Tier::new("DIAMOND II", 8.6, diamond.clone()),
        Tier::new("DIAMOND III", 8.4, diamond),
        Tier::new("PLATINUM I", 8.2, platinum.clone()),
        Tier::new("PLATINUM II", 8.0, platinum.clone()),
        Tier::new("PLATINUM III", 7.8, platinum),
        Tier::new("GOLD I", 7.6, gold.clone()),
        Tier::new("GOLD II", 7.3, gold.clone()),
        Tier::new("GOLD III", 7.0, gold),
        Tier::new("SILVER I", 6.7, silver.clone()),
        Tier::new("SILVER II", 6.3, silver.clone()),
        Tier::new("SILVER III", 6.0, silver),
        Tier::new("BRONZE I", 5.7, bronze.clone()),
        Tier::new("BRONZE II", 5.3, bronze.clone()),
        Tier::new("BRONZE III", 5.0, bronze),
    ]
}

pub fn default_unranked_style() -> TierStyle {
    TierStyle::new("#616161", "#757575", "#424242", "#E0E0E0", None)
}

fn validate_style(name: &str, style: &TierStyle) -> Result<()> {
    for (field, value) in [("color", &style.color), ("text_color", &style.text_color)] {
        if !HEX_COLOR_RE.is_match(value) {
            bail!(
                "tier {} has invalid {} {:?} (expected #RGB or #RRGGBB)",
                name,
                field,
                value
            );
        }
    }
    Ok(())
}

// scores are non-negative; NaN and anything below zero count as 0.0
fn normalize_score(score: f64) -> f64 {
    if score.is_nan() || score < 0.0 {
        0.0
    } else {
        score
    }
}

fn round_gap(gap: f64) -> f64 {
    let rounded = (gap * 10.0 + ROUNDING_NUDGE).round() / 10.0;
    rounded.max(MIN_GAP)
}
