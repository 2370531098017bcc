use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Quota {
    Lifetime { scans: u32 },
    Monthly { scans: u32 },
    Unlimited,
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lifetime { scans } => write!(f, "{} lifetime scans", scans),
            Self::Monthly { scans } => write!(f, "{} scans per month", scans),
            Self::Unlimited => write!(f, "unlimited scans"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPolicy {
    pub id: String,
    pub name: String,
    pub quota: Quota,
    pub markers: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Remaining {
    Scans(u32),
    Unlimited,
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scans(count) => write!(f, "{}", count),
            Self::Unlimited => write!(f, "unlimited"),
        }
    }
}

/// Plan policies ordered from the lowest plan to the highest. The first
/// entry is the fallback for unrecognized plan identifiers.
#[derive(Debug, Clone)]
pub struct PlanTable {
    plans: Vec<PlanPolicy>,
}

impl PlanTable {
    pub fn new(mut plans: Vec<PlanPolicy>) -> Result<Self> {
        if plans.is_empty() {
            bail!("plan table must contain at least one plan");
        }

        for plan in &mut plans {
            plan.id = plan.id.trim().to_string();
        }

        let mut seen = HashSet::new();
        for plan in &plans {
            let id = plan.id.as_str();
            if id.is_empty() {
                bail!("plan {:?} has an empty id", plan.name);
            }
            if !seen.insert(id.to_ascii_lowercase()) {
                bail!("duplicate plan id {}", id);
            }
        }

        Ok(Self { plans })
    }

    pub fn plans(&self) -> &[PlanPolicy] {
        &self.plans
    }

    // non-empty: `new` rejects empty tables and `Default` ships three plans
    pub fn lowest(&self) -> &PlanPolicy {
        &self.plans[0]
    }

    pub fn find(&self, plan_id: &str) -> Option<&PlanPolicy> {
        let plan_id = plan_id.trim();
        self.plans
            .iter()
            .find(|plan| plan.id.eq_ignore_ascii_case(plan_id))
    }

    pub fn policy_for(&self, plan_id: &str) -> &PlanPolicy {
        self.find(plan_id).unwrap_or_else(|| self.lowest())
    }

    pub fn scans_remaining(&self, plan_id: &str, lifetime_used: i64, monthly_used: i64) -> Remaining {
        scans_remaining(self.policy_for(plan_id), lifetime_used, monthly_used)
    }

    pub fn visible_marker_count(&self, plan_id: &str, total_markers: u32) -> u32 {
        self.policy_for(plan_id).markers.min(total_markers)
    }
}

impl Default for PlanTable {
    fn default() -> Self {
        Self {
            plans: default_plans(),
        }
    }
}

pub fn default_plans() -> Vec<PlanPolicy> {
    vec![
        PlanPolicy {
            id: "free".to_string(),
            name: "Free".to_string(),
            quota: Quota::Lifetime { scans: 1 },
            markers: 3,
        },
        PlanPolicy {
            id: "premium".to_string(),
            name: "Premium".to_string(),
            quota: Quota::Monthly { scans: 49 },
            markers: 6,
        },
        PlanPolicy {
            id: "pro".to_string(),
            name: "Pro".to_string(),
            quota: Quota::Unlimited,
            markers: 99,
        },
    ]
}

/// Negative usage counters count as zero.
pub fn scans_remaining(policy: &PlanPolicy, lifetime_used: i64, monthly_used: i64) -> Remaining {
    match policy.quota {
        Quota::Unlimited => Remaining::Unlimited,
        Quota::Monthly { scans } => Remaining::Scans(left_over(scans, monthly_used)),
        Quota::Lifetime { scans } => Remaining::Scans(left_over(scans, lifetime_used)),
    }
}

pub fn can_scan(remaining: Remaining) -> bool {
    match remaining {
        Remaining::Unlimited => true,
        Remaining::Scans(count) => count > 0,
    }
}

fn left_over(allowance: u32, used: i64) -> u32 {
    let used = used.max(0);
    let left = i64::from(allowance).saturating_sub(used).max(0);
    u32::try_from(left).unwrap_or(0)
}
