use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::super::domain::{Money, SubsidyCategory};

/// Shared annual cap across Training and AI tools.
pub const DEFAULT_COMBINED_CAP: Decimal = Decimal::from_parts(24_000, 0, 0, false, 0);

/// Static quota rules attached to a subsidy category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitPolicy {
    pub annual_limit: Money,
    pub requires_full_year: bool,
    pub requires_probation_end: bool,
    pub can_carry_over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_carry_over: Option<Money>,
}

impl LimitPolicy {
    pub fn standard(category: SubsidyCategory) -> Self {
        match category {
            SubsidyCategory::Laptop => Self {
                annual_limit: Decimal::from(54_000),
                requires_full_year: true,
                requires_probation_end: false,
                can_carry_over: false,
                max_carry_over: None,
            },
            SubsidyCategory::HealthCheck => Self {
                annual_limit: Decimal::from(6_000),
                requires_full_year: false,
                requires_probation_end: true,
                can_carry_over: true,
                max_carry_over: Some(Decimal::from(12_000)),
            },
            SubsidyCategory::Training => Self {
                annual_limit: Decimal::from(24_000),
                requires_full_year: false,
                requires_probation_end: true,
                can_carry_over: false,
                max_carry_over: None,
            },
            SubsidyCategory::AiTool => Self {
                annual_limit: Decimal::from(12_000),
                requires_full_year: false,
                requires_probation_end: true,
                can_carry_over: false,
                max_carry_over: None,
            },
            SubsidyCategory::Travel => Self {
                annual_limit: Decimal::from(10_000),
                requires_full_year: true,
                requires_probation_end: true,
                can_carry_over: false,
                max_carry_over: None,
            },
        }
    }
}

/// One policy per category plus the Training/AI tool combined cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTable {
    laptop: LimitPolicy,
    health_check: LimitPolicy,
    training: LimitPolicy,
    ai_tool: LimitPolicy,
    travel: LimitPolicy,
    combined_cap: Money,
}

impl PolicyTable {
    pub fn standard() -> Self {
        Self {
            laptop: LimitPolicy::standard(SubsidyCategory::Laptop),
            health_check: LimitPolicy::standard(SubsidyCategory::HealthCheck),
            training: LimitPolicy::standard(SubsidyCategory::Training),
            ai_tool: LimitPolicy::standard(SubsidyCategory::AiTool),
            travel: LimitPolicy::standard(SubsidyCategory::Travel),
            combined_cap: DEFAULT_COMBINED_CAP,
        }
    }

    pub fn policy(&self, category: SubsidyCategory) -> &LimitPolicy {
        match category {
            SubsidyCategory::Laptop => &self.laptop,
            SubsidyCategory::HealthCheck => &self.health_check,
            SubsidyCategory::Training => &self.training,
            SubsidyCategory::AiTool => &self.ai_tool,
            SubsidyCategory::Travel => &self.travel,
        }
    }

    pub fn combined_cap(&self) -> Money {
        self.combined_cap
    }

    pub fn with_combined_cap(mut self, combined_cap: Money) -> Self {
        self.combined_cap = combined_cap;
        self
    }

    pub fn with_policy(mut self, category: SubsidyCategory, policy: LimitPolicy) -> Self {
        let slot = match category {
            SubsidyCategory::Laptop => &mut self.laptop,
            SubsidyCategory::HealthCheck => &mut self.health_check,
            SubsidyCategory::Training => &mut self.training,
            SubsidyCategory::AiTool => &mut self.ai_tool,
            SubsidyCategory::Travel => &mut self.travel,
        };
        *slot = policy;
        self
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::standard()
    }
}
