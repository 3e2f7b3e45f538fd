use rust_decimal::Decimal;

use super::super::domain::{
    ApplicationStatus, Money, SubsidyApplication, SubsidyCategory, UserId,
};
use super::super::installments::{LaptopInstallmentPlan, MAX_INSTALLMENTS};
use super::config::LimitPolicy;
use super::{LaptopInstallmentState, LaptopProgress};

/// Quota figures before the zero floor is applied.
pub(crate) struct QuotaFigures {
    pub total_limit: Money,
    pub available: Money,
}

pub(crate) fn carry_over_amount(policy: &LimitPolicy, previous_used: Money) -> Money {
    (policy.annual_limit - previous_used).max(Decimal::ZERO)
}

pub(crate) fn quota_for(policy: &LimitPolicy, used: Money, previous_used: Money) -> QuotaFigures {
    let total_limit = if policy.can_carry_over {
        let uncapped = policy.annual_limit + carry_over_amount(policy, previous_used);
        match policy.max_carry_over {
            Some(ceiling) => uncapped.min(ceiling),
            None => uncapped,
        }
    } else {
        policy.annual_limit
    };

    QuotaFigures {
        total_limit,
        available: total_limit - used,
    }
}

pub(crate) fn combined_available(combined_cap: Money, training_used: Money, ai_tool_used: Money) -> Money {
    combined_cap - (training_used + ai_tool_used)
}

pub(crate) struct LaptopUsage {
    pub received_total: Money,
    pub has_ongoing: bool,
    pub progress: Vec<LaptopProgress>,
}

/// Lifetime laptop disbursements and whether an earlier application is still paying out.
///
/// An application stays ongoing until all 36 installments are received. Small invoices finish
/// their schedule early and never reach 36 entries, so they keep blocking new laptop claims.
pub(crate) fn laptop_usage(
    user_id: &UserId,
    applications: &[SubsidyApplication],
    installments: &LaptopInstallmentState,
) -> LaptopUsage {
    let mut received_total = Decimal::ZERO;
    let mut has_ongoing = false;
    let mut progress = Vec::new();

    for application in applications.iter().filter(|application| {
        application.user_id == *user_id && application.category == SubsidyCategory::Laptop
    }) {
        let received_count = installments.received_count(&application.id);
        let received_amount = installments.received_amount(&application.id);
        let completed = received_count >= MAX_INSTALLMENTS;

        if application.status == ApplicationStatus::Approved {
            received_total += received_amount;
        }
        if application.status != ApplicationStatus::Rejected && !completed {
            has_ongoing = true;
        }

        let total_subsidy = application
            .invoice_amount
            .map(|invoice| LaptopInstallmentPlan::calculate(invoice).total_subsidy);

        progress.push(LaptopProgress {
            application_id: application.id.clone(),
            status: application.status,
            received_count,
            received_amount,
            total_subsidy,
            remaining_amount: total_subsidy
                .map(|total| (total - received_amount).max(Decimal::ZERO)),
            completed,
        });
    }

    LaptopUsage {
        received_total,
        has_ongoing,
        progress,
    }
}
