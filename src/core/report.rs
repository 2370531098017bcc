use crate::core::analysis::Marker;
use crate::core::entitlement::{PlanPolicy, Quota, Remaining};
use crate::core::tier::{Ladder, Tier, TierStyle};
use colored::{ColoredString, Colorize};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TierView {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    pub rank: usize,
    pub style: TierStyle,
}

impl TierView {
    pub fn new(ladder: &Ladder, tier: &Tier) -> Self {
        Self {
            name: tier.name.clone(),
            threshold: tier.threshold.is_finite().then_some(tier.threshold),
            rank: ladder.rank_of(tier),
            style: tier.style.clone(),
        }
    }

    fn painted_name(&self) -> ColoredString {
        match hex_rgb(&self.style.color) {
            Some((r, g, b)) => self.name.truecolor(r, g, b).bold(),
            None => self.name.bold(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NextTierView {
    pub name: String,
    pub threshold: f64,
    pub points_needed: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifyReport {
    pub score: f64,
    pub tier: TierView,
    pub next: Option<NextTierView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LadderReport {
    pub tiers: Vec<TierView>,
    pub unranked: TierView,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuotaReport {
    pub plan: String,
    pub plan_name: String,
    pub quota: Quota,
    pub fell_back: bool,
    pub remaining: Remaining,
    pub can_scan: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkerReport {
    pub plan: String,
    pub total: u32,
    pub visible: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanCard {
    pub classification: ClassifyReport,
    pub quota: QuotaReport,
    pub markers: Vec<Marker>,
    pub locked: usize,
}

pub fn print_classification(report: &ClassifyReport) {
    println!("Score: {:.1}/10 -> {}", report.score, report.tier.painted_name());
    match &report.next {
        Some(next) => println!(
            "next: {} at {:.1} ({:.1} points to go)",
            next.name, next.threshold, next.points_needed
        ),
        None => println!("next: {}", "top of the ladder".green().bold()),
    }
}

pub fn print_tier(view: &TierView) {
    let threshold = view
        .threshold
        .map(|value| format!(">= {:.1}", value))
        .unwrap_or_else(|| "below ladder".to_string());
    println!("{} ({}, rank {})", view.painted_name(), threshold, view.rank);
    println!("color: {}", view.style.color);
    println!("gradient: {}", view.style.gradient);
    println!("text: {}", view.style.text_color);
    if let Some(glow) = &view.style.glow {
        println!("glow: {}", glow);
    }
}

pub fn print_ladder(report: &LadderReport) {
    for view in &report.tiers {
        let threshold = view.threshold.unwrap_or_default();
        println!("{:>5.1}  {}", threshold, view.painted_name());
    }
    println!("{:>5}  {}", "<", report.unranked.painted_name());
}

pub fn print_quota(report: &QuotaReport) {
    let fallback = if report.fell_back {
        format!(" {}", "(unknown plan, using lowest plan)".yellow())
    } else {
        String::new()
    };
    println!("Plan: {} [{}]{}", report.plan_name, report.quota, fallback);
    println!("remaining: {}", report.remaining);
    if report.can_scan {
        println!("scan: {}", "ALLOWED".green().bold());
    } else {
        println!("scan: {}", "DENIED".red().bold());
    }
}

pub fn print_plans(plans: &[PlanPolicy]) {
    for (idx, plan) in plans.iter().enumerate() {
        let fallback = if idx == 0 { " (fallback)" } else { "" };
        println!(
            "{:<10} {} - {}, {} markers{}",
            plan.id.bold(),
            plan.name,
            plan.quota,
            plan.markers,
            fallback.dimmed()
        );
    }
}

pub fn print_markers(report: &MarkerReport) {
    println!(
        "Plan {} unlocks {} of {} markers",
        report.plan, report.visible, report.total
    );
}

pub fn print_card(card: &ScanCard) {
    print_classification(&card.classification);

    if !card.markers.is_empty() {
        println!();
        for marker in &card.markers {
            let delta = marker.value - marker.benchmark;
            let delta = if delta >= 0.0 {
                format!("+{:.1}", delta).green()
            } else {
                format!("{:.1}", delta).red()
            };
            println!(
                "{:<16} {:>5.1} (benchmark {:.1}, {})",
                marker.label, marker.value, marker.benchmark, delta
            );
            if !marker.description.is_empty() {
                println!("  {}", marker.description.dimmed());
            }
        }
    }
    if card.locked > 0 {
        println!(
            "{}",
            format!("{} more markers locked, upgrade to reveal", card.locked).yellow()
        );
    }

    println!();
    print_quota(&card.quota);
}

fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    let expanded = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => digits.to_string(),
        _ => return None,
    };

    let channel = |idx: usize| u8::from_str_radix(expanded.get(idx..idx + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(hex_rgb("#FFD700"), Some((255, 215, 0)));
        assert_eq!(hex_rgb("#fff"), Some((255, 255, 255)));
        assert_eq!(hex_rgb("FFD700"), None);
        assert_eq!(hex_rgb("#GGGGGG"), None);
    }

    #[test]
    fn unranked_view_omits_threshold_in_json() {
        let ladder = Ladder::default();
        let view = TierView::new(&ladder, ladder.unranked());
        let json = serde_json::to_value(&view).expect("serializable view");
        assert!(json.get("threshold").is_none());
        assert_eq!(json["rank"], 0);
    }

    #[test]
    fn remaining_serializes_as_sentinel_or_count() {
        assert_eq!(
            serde_json::to_value(Remaining::Unlimited).expect("json"),
            serde_json::json!("unlimited")
        );
        assert_eq!(
            serde_json::to_value(Remaining::Scans(2)).expect("json"),
            serde_json::json!({"scans": 2})
        );
    }
}
