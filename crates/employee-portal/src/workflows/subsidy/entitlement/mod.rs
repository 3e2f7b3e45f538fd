mod config;
mod policy;
mod rules;

pub use config::{LimitPolicy, PolicyTable, DEFAULT_COMBINED_CAP};
pub use policy::IneligibleReason;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::{
    ApplicationId, ApplicationStatus, LaptopInstallment, Money, SubsidyApplication,
    SubsidyCategory, UserId,
};
use super::period::{AnniversaryPeriod, ServiceTenure};
use super::usage::{aggregate, UsageFilter};
use policy::{decide_verdict, tenure_gate};

/// Installments received so far, keyed by laptop application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaptopInstallmentState {
    received: BTreeMap<ApplicationId, Vec<LaptopInstallment>>,
}

impl LaptopInstallmentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, application_id: ApplicationId, installments: Vec<LaptopInstallment>) {
        self.received.insert(application_id, installments);
    }

    pub fn installments(&self, application_id: &ApplicationId) -> &[LaptopInstallment] {
        self.received
            .get(application_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn received_count(&self, application_id: &ApplicationId) -> u8 {
        self.installments(application_id).len().min(usize::from(u8::MAX)) as u8
    }

    pub fn received_amount(&self, application_id: &ApplicationId) -> Money {
        self.installments(application_id)
            .iter()
            .map(|installment| installment.amount)
            .sum()
    }
}

/// True while one of the user's laptop applications is still pending or paying out.
pub fn has_ongoing_laptop(
    user_id: &UserId,
    applications: &[SubsidyApplication],
    installments: &LaptopInstallmentState,
) -> bool {
    rules::laptop_usage(user_id, applications, installments).has_ongoing
}

/// Everything the evaluator needs, fetched ahead of time by the caller.
#[derive(Debug, Clone, Copy)]
pub struct EntitlementInput<'a> {
    pub user_id: &'a UserId,
    pub hire_date: NaiveDate,
    pub applications: &'a [SubsidyApplication],
    pub laptop_installments: &'a LaptopInstallmentState,
    pub now: NaiveDate,
}

/// Quota and eligibility for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubsidyLimitDetail {
    pub category: SubsidyCategory,
    pub total_limit: Money,
    pub used_amount: Money,
    pub available_amount: Money,
    pub eligible: bool,
    pub ineligible_reason: Option<IneligibleReason>,
}

impl SubsidyLimitDetail {
    fn new(
        category: SubsidyCategory,
        total_limit: Money,
        used_amount: Money,
        available_amount: Money,
        ineligible_reason: Option<IneligibleReason>,
    ) -> Self {
        Self {
            category,
            total_limit,
            used_amount,
            available_amount,
            eligible: ineligible_reason.is_none(),
            ineligible_reason,
        }
    }

    fn mark_ineligible(&mut self, reason: IneligibleReason) {
        self.eligible = false;
        self.ineligible_reason = Some(reason);
    }
}

/// Payout progress of a single laptop application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaptopProgress {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
    pub received_count: u8,
    pub received_amount: Money,
    pub total_subsidy: Option<Money>,
    pub remaining_amount: Option<Money>,
    pub completed: bool,
}

/// Per-category entitlement for a user in their current anniversary period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSubsidyLimitStatus {
    pub user_id: UserId,
    pub evaluated_on: NaiveDate,
    pub period: AnniversaryPeriod,
    pub tenure: ServiceTenure,
    pub details: Vec<SubsidyLimitDetail>,
    pub laptop_progress: Vec<LaptopProgress>,
}

impl UserSubsidyLimitStatus {
    pub fn detail(&self, category: SubsidyCategory) -> Option<&SubsidyLimitDetail> {
        self.details
            .iter()
            .find(|detail| detail.category == category)
    }
}

/// Stateless evaluator applying the policy table to a user's history.
#[derive(Debug, Clone, Default)]
pub struct EntitlementEngine {
    policies: PolicyTable,
}

impl EntitlementEngine {
    pub fn new(policies: PolicyTable) -> Self {
        Self { policies }
    }

    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    pub fn evaluate(&self, input: &EntitlementInput<'_>) -> UserSubsidyLimitStatus {
        let period = AnniversaryPeriod::resolve(input.hire_date, input.now);
        let tenure = ServiceTenure::at(input.hire_date, input.now);
        let laptop = rules::laptop_usage(
            input.user_id,
            input.applications,
            input.laptop_installments,
        );

        let mut details: Vec<SubsidyLimitDetail> = SubsidyCategory::ordered()
            .into_iter()
            .map(|category| {
                let policy = self.policies.policy(category);
                if category == SubsidyCategory::Laptop {
                    let reason = tenure_gate(policy, &tenure).or(if laptop.has_ongoing {
                        Some(IneligibleReason::PreviousNotCompleted)
                    } else {
                        None
                    });
                    return SubsidyLimitDetail::new(
                        category,
                        Decimal::ZERO,
                        laptop.received_total,
                        Decimal::ZERO,
                        reason,
                    );
                }

                let used = self.used_in(input, category, &period, false);
                let previous_used = if policy.can_carry_over {
                    self.used_in(input, category, &period, true)
                } else {
                    Decimal::ZERO
                };
                let quota = rules::quota_for(policy, used, previous_used);
                let reason = decide_verdict(policy, &tenure, quota.available);

                SubsidyLimitDetail::new(
                    category,
                    quota.total_limit,
                    used,
                    quota.available,
                    reason,
                )
            })
            .collect();

        self.apply_combined_cap(&mut details);

        for detail in &mut details {
            detail.available_amount = detail.available_amount.max(Decimal::ZERO);
        }

        UserSubsidyLimitStatus {
            user_id: input.user_id.clone(),
            evaluated_on: input.now,
            period,
            tenure,
            details,
            laptop_progress: laptop.progress,
        }
    }

    fn used_in(
        &self,
        input: &EntitlementInput<'_>,
        category: SubsidyCategory,
        period: &AnniversaryPeriod,
        previous: bool,
    ) -> Money {
        let range = if previous {
            period.previous_range(input.hire_date)
        } else {
            period.range()
        };
        let filter = UsageFilter {
            user_id: input.user_id.clone(),
            category,
            range,
        };
        aggregate(input.applications, &filter).total_amount
    }

    fn apply_combined_cap(&self, details: &mut [SubsidyLimitDetail]) {
        let used_of = |category: SubsidyCategory| {
            details
                .iter()
                .find(|detail| detail.category == category)
                .map(|detail| detail.used_amount)
                .unwrap_or(Decimal::ZERO)
        };
        let combined = rules::combined_available(
            self.policies.combined_cap(),
            used_of(SubsidyCategory::Training),
            used_of(SubsidyCategory::AiTool),
        );

        for detail in details
            .iter_mut()
            .filter(|detail| detail.category.shares_combined_cap())
        {
            detail.available_amount = detail.available_amount.min(combined);
            if detail.eligible && detail.available_amount <= Decimal::ZERO {
                detail.mark_ineligible(IneligibleReason::QuotaExceeded);
            }
        }
    }
}
