use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::super::domain::Money;
use super::super::period::ServiceTenure;
use super::config::LimitPolicy;

/// Closed set of reasons a category cannot be applied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IneligibleReason {
    #[serde(rename = "Requires 1 year")]
    RequiresOneYear,
    #[serde(rename = "Requires probation (90d)")]
    RequiresProbation,
    #[serde(rename = "Quota exceeded")]
    QuotaExceeded,
    #[serde(rename = "Previous not completed")]
    PreviousNotCompleted,
}

impl IneligibleReason {
    pub const fn label(self) -> &'static str {
        match self {
            IneligibleReason::RequiresOneYear => "Requires 1 year",
            IneligibleReason::RequiresProbation => "Requires probation (90d)",
            IneligibleReason::QuotaExceeded => "Quota exceeded",
            IneligibleReason::PreviousNotCompleted => "Previous not completed",
        }
    }
}

impl std::fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Seniority gates shared by every category. First failing gate wins.
pub(crate) fn tenure_gate(policy: &LimitPolicy, tenure: &ServiceTenure) -> Option<IneligibleReason> {
    if policy.requires_full_year && !tenure.one_year_completed {
        return Some(IneligibleReason::RequiresOneYear);
    }

    if policy.requires_probation_end && !tenure.probation_passed {
        return Some(IneligibleReason::RequiresProbation);
    }

    None
}

/// Quota verdict for the generic categories.
pub(crate) fn decide_verdict(
    policy: &LimitPolicy,
    tenure: &ServiceTenure,
    available: Money,
) -> Option<IneligibleReason> {
    if let Some(reason) = tenure_gate(policy, tenure) {
        return Some(reason);
    }

    if available <= Decimal::ZERO {
        return Some(IneligibleReason::QuotaExceeded);
    }

    None
}
