use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationId, ApplicationStatus, DateRange, EmployeeProfile, LaptopInstallment, Money,
    SubsidyApplication, SubsidyCategory, UserId,
};

/// Filter over the application collection. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationQuery {
    pub user_id: Option<UserId>,
    pub category: Option<SubsidyCategory>,
    pub status: Option<ApplicationStatus>,
    pub range: Option<DateRange>,
}

impl ApplicationQuery {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: SubsidyCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_status(mut self, status: ApplicationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn within(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn matches(&self, application: &SubsidyApplication) -> bool {
        self.user_id
            .as_ref()
            .map_or(true, |user_id| application.user_id == *user_id)
            && self
                .category
                .map_or(true, |category| application.category == category)
            && self
                .status
                .map_or(true, |status| application.status == status)
            && self
                .range
                .map_or(true, |range| range.contains(application.application_date))
    }
}

/// What happened to an application, as recorded in the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AuditAction {
    Submitted,
    StatusChanged {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    InstallmentRecorded {
        installment_number: u8,
        amount: Money,
    },
}

/// Append-only audit record keyed by application id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub application_id: ApplicationId,
    pub actor: UserId,
    pub recorded_on: NaiveDate,
    #[serde(flatten)]
    pub action: AuditAction,
}

/// Calendar month a disbursement total is tracked under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DisbursementMonth {
    pub year: i32,
    pub month: u32,
}

impl DisbursementMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

/// Running total of laptop installments paid out in one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyDisbursement {
    pub month: DisbursementMonth,
    pub total_amount: Money,
    pub installment_count: u32,
}

/// Read-modify-write scope. Writes become visible only if the whole unit succeeds.
pub trait SubsidyTransaction {
    fn application(&self, id: &ApplicationId) -> Result<Option<SubsidyApplication>, RepositoryError>;
    fn applications(
        &self,
        query: &ApplicationQuery,
    ) -> Result<Vec<SubsidyApplication>, RepositoryError>;
    fn installments(&self, id: &ApplicationId) -> Result<Vec<LaptopInstallment>, RepositoryError>;
    fn monthly_disbursement(
        &self,
        month: DisbursementMonth,
    ) -> Result<Option<MonthlyDisbursement>, RepositoryError>;
    fn put_application(&mut self, application: SubsidyApplication) -> Result<(), RepositoryError>;
    fn push_installment(
        &mut self,
        id: &ApplicationId,
        installment: LaptopInstallment,
    ) -> Result<(), RepositoryError>;
    fn put_monthly_disbursement(
        &mut self,
        disbursement: MonthlyDisbursement,
    ) -> Result<(), RepositoryError>;
    fn append_audit(&mut self, entry: AuditEntry) -> Result<(), RepositoryError>;
}

/// Document-store contract: point reads, filtered queries, and atomic transactions.
pub trait SubsidyRepository: Send + Sync {
    fn employee(&self, user_id: &UserId) -> Result<Option<EmployeeProfile>, RepositoryError>;
    fn application(&self, id: &ApplicationId) -> Result<Option<SubsidyApplication>, RepositoryError>;
    fn applications(
        &self,
        query: &ApplicationQuery,
    ) -> Result<Vec<SubsidyApplication>, RepositoryError>;
    /// Installments ordered by installment number.
    fn installments(&self, id: &ApplicationId) -> Result<Vec<LaptopInstallment>, RepositoryError>;
    fn audit_trail(&self, id: &ApplicationId) -> Result<Vec<AuditEntry>, RepositoryError>;
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn SubsidyTransaction) -> Result<T, E>,
        E: From<RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("installment {attempted} out of sequence (expected {expected})")]
    OutOfSequence { expected: u8, attempted: u8 },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Default)]
struct Store {
    employees: HashMap<UserId, EmployeeProfile>,
    applications: BTreeMap<ApplicationId, SubsidyApplication>,
    installments: BTreeMap<ApplicationId, Vec<LaptopInstallment>>,
    disbursements: BTreeMap<DisbursementMonth, MonthlyDisbursement>,
    audit: Vec<AuditEntry>,
}

impl SubsidyTransaction for Store {
    fn application(&self, id: &ApplicationId) -> Result<Option<SubsidyApplication>, RepositoryError> {
        Ok(self.applications.get(id).cloned())
    }

    fn applications(
        &self,
        query: &ApplicationQuery,
    ) -> Result<Vec<SubsidyApplication>, RepositoryError> {
        Ok(self
            .applications
            .values()
            .filter(|application| query.matches(application))
            .cloned()
            .collect())
    }

    fn installments(&self, id: &ApplicationId) -> Result<Vec<LaptopInstallment>, RepositoryError> {
        Ok(self.installments.get(id).cloned().unwrap_or_default())
    }

    fn monthly_disbursement(
        &self,
        month: DisbursementMonth,
    ) -> Result<Option<MonthlyDisbursement>, RepositoryError> {
        Ok(self.disbursements.get(&month).cloned())
    }

    fn put_application(&mut self, application: SubsidyApplication) -> Result<(), RepositoryError> {
        self.applications.insert(application.id.clone(), application);
        Ok(())
    }

    fn push_installment(
        &mut self,
        id: &ApplicationId,
        installment: LaptopInstallment,
    ) -> Result<(), RepositoryError> {
        let received = self.installments.entry(id.clone()).or_default();
        let expected = received.len() as u8 + 1;
        if installment.installment_number != expected {
            return Err(RepositoryError::OutOfSequence {
                expected,
                attempted: installment.installment_number,
            });
        }
        received.push(installment);
        Ok(())
    }

    fn put_monthly_disbursement(
        &mut self,
        disbursement: MonthlyDisbursement,
    ) -> Result<(), RepositoryError> {
        self.disbursements.insert(disbursement.month, disbursement);
        Ok(())
    }

    fn append_audit(&mut self, entry: AuditEntry) -> Result<(), RepositoryError> {
        self.audit.push(entry);
        Ok(())
    }
}

/// Mutex-guarded store used by the demo server and tests.
///
/// Transactions run against a staged copy that replaces the live store only on success, so a
/// failed unit of work leaves no partial writes behind.
#[derive(Debug, Default, Clone)]
pub struct InMemorySubsidyRepository {
    store: Arc<Mutex<Store>>,
}

impl InMemorySubsidyRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Store>, RepositoryError> {
        self.store
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }

    pub fn upsert_employee(&self, profile: EmployeeProfile) -> Result<(), RepositoryError> {
        let mut store = self.lock()?;
        store.employees.insert(profile.user_id.clone(), profile);
        Ok(())
    }

    pub fn monthly_disbursement(
        &self,
        month: DisbursementMonth,
    ) -> Result<Option<MonthlyDisbursement>, RepositoryError> {
        let store = self.lock()?;
        SubsidyTransaction::monthly_disbursement(&*store, month)
    }
}

impl SubsidyRepository for InMemorySubsidyRepository {
    fn employee(&self, user_id: &UserId) -> Result<Option<EmployeeProfile>, RepositoryError> {
        Ok(self.lock()?.employees.get(user_id).cloned())
    }

    fn application(&self, id: &ApplicationId) -> Result<Option<SubsidyApplication>, RepositoryError> {
        Ok(self.lock()?.applications.get(id).cloned())
    }

    fn applications(
        &self,
        query: &ApplicationQuery,
    ) -> Result<Vec<SubsidyApplication>, RepositoryError> {
        let store = self.lock()?;
        SubsidyTransaction::applications(&*store, query)
    }

    fn installments(&self, id: &ApplicationId) -> Result<Vec<LaptopInstallment>, RepositoryError> {
        let store = self.lock()?;
        SubsidyTransaction::installments(&*store, id)
    }

    fn audit_trail(&self, id: &ApplicationId) -> Result<Vec<AuditEntry>, RepositoryError> {
        let store = self.lock()?;
        Ok(store
            .audit
            .iter()
            .filter(|entry| entry.application_id == *id)
            .cloned()
            .collect())
    }

    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn SubsidyTransaction) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut store = self.lock()?;
        let mut staged = store.clone();
        let result = work(&mut staged)?;
        *store = staged;
        Ok(result)
    }
}
