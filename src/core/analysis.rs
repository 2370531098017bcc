use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub label: String,
    pub value: f64,
    pub benchmark: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub score: f64,
    #[serde(default)]
    pub markers: Vec<Marker>,
}

pub fn read_analysis(path: &Path) -> Result<Analysis> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading analysis file {}", path.display()))?;
    parse_analysis(&raw).with_context(|| format!("invalid analysis in {}", path.display()))
}

pub fn parse_analysis(raw: &str) -> Result<Analysis> {
    let mut analysis =
        serde_json::from_str::<Analysis>(raw).context("failed parsing analysis json")?;

    let clamped = analysis.score.clamp(MIN_SCORE, MAX_SCORE);
    if clamped != analysis.score {
        tracing::warn!(
            score = analysis.score,
            clamped,
            "analysis score outside expected range"
        );
        analysis.score = clamped;
    }

    let before = analysis.markers.len();
    analysis
        .markers
        .retain(|marker| !marker.label.trim().is_empty());
    if analysis.markers.len() != before {
        tracing::warn!(
            dropped = before - analysis.markers.len(),
            "dropped markers without a label"
        );
    }

    Ok(analysis)
}
