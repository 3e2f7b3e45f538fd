//! Subsidy entitlement engine and the application workflow around it.
//!
//! The entitlement engine is a pure function of a user's hire date, their application history
//! and laptop payouts; the service fetches those inputs from the document store and then calls
//! it. Writes (submission, review, installment payouts) go through repository transactions that
//! update the record and its audit trail together.

pub mod domain;
pub mod entitlement;
pub mod installments;
pub mod period;
pub mod repository;
pub mod router;
pub mod service;
pub mod usage;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationStatus, DateRange, EmployeeProfile, LaptopInstallment, Money,
    SubsidyApplication, SubsidyCategory, UserId,
};
pub use entitlement::{
    has_ongoing_laptop, EntitlementEngine, EntitlementInput, IneligibleReason, LaptopInstallmentState, LaptopProgress,
    LimitPolicy, PolicyTable, SubsidyLimitDetail, UserSubsidyLimitStatus, DEFAULT_COMBINED_CAP,
};
pub use installments::{installment_amount, LaptopInstallmentPlan, MAX_INSTALLMENTS};
pub use period::{AnniversaryPeriod, ServiceTenure};
pub use repository::{
    ApplicationQuery, AuditAction, AuditEntry, DisbursementMonth, InMemorySubsidyRepository,
    MonthlyDisbursement, RepositoryError, SubsidyRepository, SubsidyTransaction,
};
pub use router::subsidy_router;
pub use service::{ApplicationRequest, ReviewDecision, SubsidyService, SubsidyServiceError};
pub use usage::{aggregate, usage_ranking, UsageFilter, UsageRankingRow, UsageSummary};
