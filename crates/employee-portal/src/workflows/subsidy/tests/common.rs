use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::workflows::subsidy::domain::{
    ApplicationId, ApplicationStatus, EmployeeProfile, LaptopInstallment, SubsidyApplication,
    SubsidyCategory, UserId,
};
use crate::workflows::subsidy::entitlement::{
    EntitlementEngine, EntitlementInput, LaptopInstallmentState, PolicyTable,
    UserSubsidyLimitStatus,
};
use crate::workflows::subsidy::installments::LaptopInstallmentPlan;
use crate::workflows::subsidy::repository::{
    ApplicationQuery, AuditEntry, InMemorySubsidyRepository, RepositoryError, SubsidyRepository,
    SubsidyTransaction,
};
use crate::workflows::subsidy::SubsidyService;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn money(amount: i64) -> Decimal {
    Decimal::from(amount)
}

pub(super) fn user() -> UserId {
    UserId("u-100".to_string())
}

/// Hired mid-2020; on `today()` the current anniversary period began 2023-06-15.
pub(super) fn hire_date() -> NaiveDate {
    date(2020, 6, 15)
}

pub(super) fn today() -> NaiveDate {
    date(2024, 3, 1)
}

pub(super) fn approved(
    id: &str,
    category: SubsidyCategory,
    on: NaiveDate,
    amount: i64,
) -> SubsidyApplication {
    SubsidyApplication {
        id: ApplicationId(id.to_string()),
        user_id: user(),
        category,
        status: ApplicationStatus::Approved,
        application_date: on,
        approved_amount: Some(money(amount)),
        invoice_amount: Some(money(amount)),
    }
}

pub(super) fn with_status(
    mut application: SubsidyApplication,
    status: ApplicationStatus,
) -> SubsidyApplication {
    application.status = status;
    application
}

pub(super) fn laptop_application(
    id: &str,
    status: ApplicationStatus,
    invoice: i64,
) -> SubsidyApplication {
    let total = LaptopInstallmentPlan::calculate(money(invoice)).total_subsidy;
    SubsidyApplication {
        id: ApplicationId(id.to_string()),
        user_id: user(),
        category: SubsidyCategory::Laptop,
        status,
        application_date: date(2021, 9, 1),
        approved_amount: (status == ApplicationStatus::Approved).then_some(total),
        invoice_amount: Some(money(invoice)),
    }
}

/// The first `count` installments of the invoice's schedule, one per month.
pub(super) fn paid_installments(invoice: i64, count: u8) -> Vec<LaptopInstallment> {
    let plan = LaptopInstallmentPlan::calculate(money(invoice));
    (1..=count)
        .map(|number| LaptopInstallment {
            installment_number: number,
            amount: plan.amount_for(number),
            received_date: date(2021, 10, 1) + chrono::Months::new(u32::from(number) - 1),
        })
        .collect()
}

pub(super) fn engine() -> EntitlementEngine {
    EntitlementEngine::new(PolicyTable::standard())
}

pub(super) fn evaluate_at(
    hire_date: NaiveDate,
    now: NaiveDate,
    applications: &[SubsidyApplication],
    laptop_installments: &LaptopInstallmentState,
) -> UserSubsidyLimitStatus {
    let user_id = user();
    engine().evaluate(&EntitlementInput {
        user_id: &user_id,
        hire_date,
        applications,
        laptop_installments,
        now,
    })
}

pub(super) fn evaluate(applications: &[SubsidyApplication]) -> UserSubsidyLimitStatus {
    evaluate_at(
        hire_date(),
        today(),
        applications,
        &LaptopInstallmentState::new(),
    )
}

pub(super) fn employee(hire_date: Option<NaiveDate>) -> EmployeeProfile {
    EmployeeProfile {
        user_id: user(),
        display_name: "Mei Tanaka".to_string(),
        hire_date,
    }
}

pub(super) fn build_service() -> (
    SubsidyService<InMemorySubsidyRepository>,
    Arc<InMemorySubsidyRepository>,
) {
    let repository = Arc::new(InMemorySubsidyRepository::default());
    repository
        .upsert_employee(employee(Some(hire_date())))
        .expect("seed employee");
    let service = SubsidyService::new(repository.clone(), PolicyTable::standard());
    (service, repository)
}

pub(super) struct UnavailableRepository;

impl SubsidyRepository for UnavailableRepository {
    fn employee(&self, _user_id: &UserId) -> Result<Option<EmployeeProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn application(
        &self,
        _id: &ApplicationId,
    ) -> Result<Option<SubsidyApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn applications(
        &self,
        _query: &ApplicationQuery,
    ) -> Result<Vec<SubsidyApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn installments(&self, _id: &ApplicationId) -> Result<Vec<LaptopInstallment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn audit_trail(&self, _id: &ApplicationId) -> Result<Vec<AuditEntry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn transaction<T, E, F>(&self, _work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn SubsidyTransaction) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()).into())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

/// Parses a decimal the API serialises as a string.
pub(super) fn decimal_at(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("decimal serialised as string")
        .parse()
        .expect("decimal parses")
}
