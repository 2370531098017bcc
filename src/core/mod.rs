pub mod analysis;
pub mod entitlement;
pub mod report;
pub mod tier;

use crate::config::Config;
use crate::core::analysis::Analysis;
use crate::core::entitlement::{PlanTable, can_scan};
use crate::core::report::{
    ClassifyReport, LadderReport, MarkerReport, NextTierView, QuotaReport, ScanCard, TierView,
};
use crate::core::tier::Ladder;
use anyhow::{Context, Result};

/// Validated ladder and plan table shared by every command.
#[derive(Debug, Clone)]
pub struct Engine {
    pub ladder: Ladder,
    pub plans: PlanTable,
    pub total_markers: u32,
}

impl Engine {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let ladder = Ladder::new(cfg.ladder.tiers.clone(), cfg.ladder.unranked.clone())
            .context("invalid [ladder] configuration")?;
        let plans = PlanTable::new(cfg.plans.clone()).context("invalid [[plans]] configuration")?;

        Ok(Self {
            ladder,
            plans,
            total_markers: cfg.general.total_markers,
        })
    }

    pub fn classify(&self, score: f64) -> ClassifyReport {
        let tier = self.ladder.classify(score);
        let next = self.ladder.next_tier(score).map(|next| NextTierView {
            name: next.tier.name.clone(),
            threshold: next.tier.threshold,
            points_needed: next.points_needed,
        });

        ClassifyReport {
            score,
            tier: TierView::new(&self.ladder, tier),
            next,
        }
    }

    pub fn describe_tier(&self, name: &str) -> TierView {
        let tier = self.ladder.tier_metadata(name);
        if self.ladder.is_unranked(tier) && !name.trim().eq_ignore_ascii_case(tier::UNRANKED) {
            tracing::debug!(name, "unknown tier name, using unranked metadata");
        }
        TierView::new(&self.ladder, tier)
    }

    pub fn ladder_report(&self) -> LadderReport {
        LadderReport {
            tiers: self
                .ladder
                .tiers()
                .iter()
                .map(|tier| TierView::new(&self.ladder, tier))
                .collect(),
            unranked: TierView::new(&self.ladder, self.ladder.unranked()),
        }
    }

    pub fn quota(&self, plan_id: &str, lifetime_used: i64, monthly_used: i64) -> QuotaReport {
        let policy = self.plans.policy_for(plan_id);
        let fell_back = self.plans.find(plan_id).is_none();
        if fell_back {
            tracing::warn!(plan = plan_id, fallback = %policy.id, "unknown plan id");
        }

        let remaining = self.plans.scans_remaining(plan_id, lifetime_used, monthly_used);
        QuotaReport {
            plan: policy.id.clone(),
            plan_name: policy.name.clone(),
            quota: policy.quota,
            fell_back,
            remaining,
            can_scan: can_scan(remaining),
        }
    }

    pub fn markers(&self, plan_id: &str, total: u32) -> MarkerReport {
        let policy = self.plans.policy_for(plan_id);
        if self.plans.find(plan_id).is_none() {
            tracing::warn!(plan = plan_id, fallback = %policy.id, "unknown plan id");
        }
        MarkerReport {
            plan: policy.id.clone(),
            total,
            visible: self.plans.visible_marker_count(plan_id, total),
        }
    }

    pub fn card(
        &self,
        analysis: &Analysis,
        plan_id: &str,
        lifetime_used: i64,
        monthly_used: i64,
    ) -> ScanCard {
        let total = u32::try_from(analysis.markers.len()).unwrap_or(u32::MAX);
        let visible = self.plans.visible_marker_count(plan_id, total) as usize;

        ScanCard {
            classification: self.classify(analysis.score),
            quota: self.quota(plan_id, lifetime_used, monthly_used),
            markers: analysis.markers[..visible].to_vec(),
            locked: analysis.markers.len() - visible,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            ladder: Ladder::default(),
            plans: PlanTable::default(),
            total_markers: crate::config::DEFAULT_TOTAL_MARKERS,
        }
    }
}
