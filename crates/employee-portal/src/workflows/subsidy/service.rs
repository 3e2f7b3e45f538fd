use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{
    ApplicationId, ApplicationStatus, DateRange, LaptopInstallment, Money, SubsidyApplication,
    SubsidyCategory, UserId,
};
use super::entitlement::{
    has_ongoing_laptop, EntitlementEngine, EntitlementInput, IneligibleReason,
    LaptopInstallmentState, LaptopProgress, PolicyTable, UserSubsidyLimitStatus,
};
use super::installments::{LaptopInstallmentPlan, MAX_INSTALLMENTS};
use super::repository::{
    ApplicationQuery, AuditAction, AuditEntry, DisbursementMonth, MonthlyDisbursement,
    RepositoryError, SubsidyRepository,
};
use super::usage::{usage_ranking, UsageRankingRow};

/// New claim as entered by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRequest {
    pub user_id: UserId,
    pub category: SubsidyCategory,
    #[serde(default)]
    pub invoice_amount: Option<Money>,
}

/// Reviewer decision on a pending application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve {
        #[serde(default)]
        approved_amount: Option<Money>,
    },
    Reject,
}

impl ReviewDecision {
    fn target_status(&self) -> ApplicationStatus {
        match self {
            ReviewDecision::Approve { .. } => ApplicationStatus::Approved,
            ReviewDecision::Reject => ApplicationStatus::Rejected,
        }
    }
}

/// Service composing the repository and the entitlement engine.
pub struct SubsidyService<R> {
    repository: Arc<R>,
    engine: Arc<EntitlementEngine>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("sub-{id:06}"))
}

impl<R> SubsidyService<R>
where
    R: SubsidyRepository + 'static,
{
    pub fn new(repository: Arc<R>, policies: PolicyTable) -> Self {
        Self {
            repository,
            engine: Arc::new(EntitlementEngine::new(policies)),
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Fetches the user's history and evaluates every category as of `today`.
    pub fn limit_status(
        &self,
        user_id: &UserId,
        today: NaiveDate,
    ) -> Result<UserSubsidyLimitStatus, SubsidyServiceError> {
        let employee = self
            .repository
            .employee(user_id)?
            .ok_or_else(|| SubsidyServiceError::UnknownEmployee(user_id.clone()))?;
        let hire_date = employee
            .hire_date
            .ok_or_else(|| SubsidyServiceError::MissingHireDate(user_id.clone()))?;

        let applications = self
            .repository
            .applications(&ApplicationQuery::for_user(user_id.clone()))?;

        let mut laptop_installments = LaptopInstallmentState::new();
        for application in applications
            .iter()
            .filter(|application| application.category == SubsidyCategory::Laptop)
        {
            let installments = self.repository.installments(&application.id)?;
            laptop_installments.insert(application.id.clone(), installments);
        }

        let status = self.engine.evaluate(&EntitlementInput {
            user_id,
            hire_date,
            applications: &applications,
            laptop_installments: &laptop_installments,
            now: today,
        });

        debug!(
            user = %user_id.0,
            fiscal_year = status.period.fiscal_year,
            eligible = status.details.iter().filter(|detail| detail.eligible).count(),
            "evaluated subsidy limits"
        );

        Ok(status)
    }

    /// Stores a pending application after checking the category is currently claimable.
    pub fn submit(
        &self,
        request: ApplicationRequest,
        today: NaiveDate,
    ) -> Result<SubsidyApplication, SubsidyServiceError> {
        if let Some(amount) = request.invoice_amount {
            if amount.is_sign_negative() {
                return Err(SubsidyServiceError::InvalidAmount(amount));
            }
        }
        if request.category == SubsidyCategory::Laptop && request.invoice_amount.is_none() {
            return Err(SubsidyServiceError::MissingInvoice);
        }

        let status = self.limit_status(&request.user_id, today)?;
        if let Some(detail) = status.detail(request.category) {
            if let Some(reason) = detail.ineligible_reason {
                warn!(
                    user = %request.user_id.0,
                    category = request.category.label(),
                    reason = reason.label(),
                    "rejected ineligible subsidy application"
                );
                return Err(SubsidyServiceError::Ineligible {
                    category: request.category,
                    reason,
                });
            }
        }

        let application = SubsidyApplication {
            id: next_application_id(),
            user_id: request.user_id,
            category: request.category,
            status: ApplicationStatus::Pending,
            application_date: today,
            approved_amount: None,
            invoice_amount: request.invoice_amount,
        };

        let stored = self.repository.transaction(|tx| -> Result<_, SubsidyServiceError> {
            if tx.application(&application.id)?.is_some() {
                return Err(RepositoryError::Conflict.into());
            }
            if application.category == SubsidyCategory::Laptop {
                // at most one ongoing laptop per user, checked against the staged store
                let laptops = tx.applications(
                    &ApplicationQuery::for_user(application.user_id.clone())
                        .with_category(SubsidyCategory::Laptop),
                )?;
                let mut received = LaptopInstallmentState::new();
                for laptop in &laptops {
                    received.insert(laptop.id.clone(), tx.installments(&laptop.id)?);
                }
                if has_ongoing_laptop(&application.user_id, &laptops, &received) {
                    return Err(SubsidyServiceError::Ineligible {
                        category: SubsidyCategory::Laptop,
                        reason: IneligibleReason::PreviousNotCompleted,
                    });
                }
            }
            tx.put_application(application.clone())?;
            tx.append_audit(AuditEntry {
                application_id: application.id.clone(),
                actor: application.user_id.clone(),
                recorded_on: today,
                action: AuditAction::Submitted,
            })?;
            Ok(application)
        })?;

        info!(
            application = %stored.id.0,
            user = %stored.user_id.0,
            category = stored.category.label(),
            "subsidy application submitted"
        );
        Ok(stored)
    }

    /// Resolves a pending application and records the change in the audit trail.
    pub fn change_status(
        &self,
        application_id: &ApplicationId,
        decision: ReviewDecision,
        actor: &UserId,
        today: NaiveDate,
    ) -> Result<SubsidyApplication, SubsidyServiceError> {
        let updated = self.repository.transaction(|tx| -> Result<_, SubsidyServiceError> {
            let mut application = tx
                .application(application_id)?
                .ok_or(RepositoryError::NotFound)?;

            let target = decision.target_status();
            if application.status.is_resolved() {
                return Err(SubsidyServiceError::InvalidTransition {
                    from: application.status,
                    to: target,
                });
            }

            if let ReviewDecision::Approve { approved_amount } = &decision {
                application.approved_amount = Some(approved_amount_for(
                    &application,
                    *approved_amount,
                )?);
            }
            let previous = application.status;
            application.status = target;

            tx.put_application(application.clone())?;
            tx.append_audit(AuditEntry {
                application_id: application.id.clone(),
                actor: actor.clone(),
                recorded_on: today,
                action: AuditAction::StatusChanged {
                    from: previous,
                    to: target,
                },
            })?;
            Ok(application)
        });

        match &updated {
            Ok(application) => info!(
                application = %application.id.0,
                status = application.status.label(),
                "subsidy application resolved"
            ),
            Err(err) => warn!(application = %application_id.0, error = %err, "status change refused"),
        }
        updated
    }

    /// Records the next laptop disbursement and bumps the month's running total.
    pub fn record_installment(
        &self,
        application_id: &ApplicationId,
        actor: &UserId,
        received_date: NaiveDate,
    ) -> Result<LaptopInstallment, SubsidyServiceError> {
        let installment = self.repository.transaction(|tx| -> Result<_, SubsidyServiceError> {
            let application = tx
                .application(application_id)?
                .ok_or(RepositoryError::NotFound)?;
            if application.category != SubsidyCategory::Laptop {
                return Err(SubsidyServiceError::NotLaptop(application.id));
            }
            if application.status != ApplicationStatus::Approved {
                return Err(SubsidyServiceError::NotApproved(application.id));
            }
            let invoice = application
                .invoice_amount
                .ok_or(SubsidyServiceError::MissingInvoice)?;

            let received = tx.installments(application_id)?;
            let next_number = received.len() as u8 + 1;
            let plan = LaptopInstallmentPlan::calculate(invoice);
            let amount = plan.amount_for(next_number);
            if next_number > MAX_INSTALLMENTS || amount <= Decimal::ZERO {
                return Err(SubsidyServiceError::InstallmentsComplete(application.id));
            }

            let installment = LaptopInstallment {
                installment_number: next_number,
                amount,
                received_date,
            };
            tx.push_installment(application_id, installment.clone())?;

            let month = DisbursementMonth::of(received_date);
            let mut monthly = tx
                .monthly_disbursement(month)?
                .unwrap_or(MonthlyDisbursement {
                    month,
                    total_amount: Decimal::ZERO,
                    installment_count: 0,
                });
            monthly.total_amount += amount;
            monthly.installment_count += 1;
            tx.put_monthly_disbursement(monthly)?;

            tx.append_audit(AuditEntry {
                application_id: application.id.clone(),
                actor: actor.clone(),
                recorded_on: received_date,
                action: AuditAction::InstallmentRecorded {
                    installment_number: next_number,
                    amount,
                },
            })?;
            Ok(installment)
        })?;

        info!(
            application = %application_id.0,
            installment = installment.installment_number,
            amount = %installment.amount,
            "laptop installment recorded"
        );
        Ok(installment)
    }

    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<SubsidyApplication, SubsidyServiceError> {
        let application = self
            .repository
            .application(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(application)
    }

    /// Payout progress of a laptop application against its schedule.
    pub fn laptop_progress(
        &self,
        application_id: &ApplicationId,
    ) -> Result<LaptopProgress, SubsidyServiceError> {
        let application = self.get(application_id)?;
        if application.category != SubsidyCategory::Laptop {
            return Err(SubsidyServiceError::NotLaptop(application.id));
        }
        let installments = self.repository.installments(application_id)?;
        let received_amount: Money = installments.iter().map(|entry| entry.amount).sum();
        let received_count = installments.len() as u8;
        let total_subsidy = application
            .invoice_amount
            .map(|invoice| LaptopInstallmentPlan::calculate(invoice).total_subsidy);

        Ok(LaptopProgress {
            application_id: application.id,
            status: application.status,
            received_count,
            received_amount,
            total_subsidy,
            remaining_amount: total_subsidy
                .map(|total| (total - received_amount).max(Decimal::ZERO)),
            completed: received_count >= MAX_INSTALLMENTS,
        })
    }

    /// Ranking of approved spend per user for the statistics view and CSV export.
    pub fn usage_report(
        &self,
        category: SubsidyCategory,
        range: DateRange,
    ) -> Result<Vec<UsageRankingRow>, SubsidyServiceError> {
        let query = ApplicationQuery::default()
            .with_category(category)
            .with_status(ApplicationStatus::Approved)
            .within(range);
        let applications = self.repository.applications(&query)?;
        Ok(usage_ranking(&applications, category, range))
    }
}

fn approved_amount_for(
    application: &SubsidyApplication,
    requested: Option<Money>,
) -> Result<Money, SubsidyServiceError> {
    if application.category == SubsidyCategory::Laptop {
        let invoice = application
            .invoice_amount
            .ok_or(SubsidyServiceError::MissingInvoice)?;
        return Ok(LaptopInstallmentPlan::calculate(invoice).total_subsidy);
    }

    let amount = requested
        .or(application.invoice_amount)
        .ok_or(SubsidyServiceError::MissingApprovedAmount)?;
    if amount.is_sign_negative() {
        return Err(SubsidyServiceError::InvalidAmount(amount));
    }
    Ok(amount)
}

/// Error raised by the subsidy service.
#[derive(Debug, thiserror::Error)]
pub enum SubsidyServiceError {
    #[error("employee {0} not found")]
    UnknownEmployee(UserId),
    #[error("employee {0} has no hire date on record")]
    MissingHireDate(UserId),
    #[error("laptop applications require an invoice amount")]
    MissingInvoice,
    #[error("approval requires an approved or invoice amount")]
    MissingApprovedAmount,
    #[error("amount {0} must not be negative")]
    InvalidAmount(Money),
    #[error("{category} is not available: {reason}")]
    Ineligible {
        category: SubsidyCategory,
        reason: IneligibleReason,
    },
    #[error("cannot move application from {from} to {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("application {0} is not a laptop application")]
    NotLaptop(ApplicationId),
    #[error("application {0} has not been approved")]
    NotApproved(ApplicationId),
    #[error("application {0} has no installments left to pay")]
    InstallmentsComplete(ApplicationId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
