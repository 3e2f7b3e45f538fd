use chrono::{Duration, NaiveDate};
use employee_portal::workflows::subsidy::{
    ApplicationId, ApplicationStatus, EmployeeProfile, InMemorySubsidyRepository,
    LaptopInstallment, LaptopInstallmentPlan, Money, RepositoryError, SubsidyApplication,
    SubsidyCategory, SubsidyRepository, UserId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, String> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|err| format!("failed to parse '{raw}' as an amount ({err})"))
}

/// Sample employee directory, with hire dates relative to `today`.
pub(crate) fn demo_directory(today: NaiveDate) -> Vec<EmployeeProfile> {
    vec![
        EmployeeProfile {
            user_id: UserId("u-001".to_string()),
            display_name: "Aiko Tanaka".to_string(),
            hire_date: Some(today - Duration::days(5 * 365 + 40)),
        },
        EmployeeProfile {
            user_id: UserId("u-002".to_string()),
            display_name: "Ben Carter".to_string(),
            hire_date: Some(today - Duration::days(45)),
        },
        EmployeeProfile {
            user_id: UserId("u-003".to_string()),
            display_name: "Chen Wei".to_string(),
            hire_date: Some(today - Duration::days(200)),
        },
    ]
}

fn demo_claim(
    id: &str,
    user: &str,
    category: SubsidyCategory,
    application_date: NaiveDate,
    amount: Money,
) -> SubsidyApplication {
    SubsidyApplication {
        id: ApplicationId(id.to_string()),
        user_id: UserId(user.to_string()),
        category,
        status: ApplicationStatus::Approved,
        application_date,
        approved_amount: Some(amount),
        invoice_amount: Some(amount),
    }
}

/// Loads the demo directory plus a year of approved claims and a laptop mid-payout.
pub(crate) fn seed_demo_store(
    repository: &InMemorySubsidyRepository,
    today: NaiveDate,
) -> Result<(), RepositoryError> {
    for profile in demo_directory(today) {
        repository.upsert_employee(profile)?;
    }

    let laptop_invoice = Decimal::from(100_000);
    let laptop_plan = LaptopInstallmentPlan::calculate(laptop_invoice);
    let laptop_id = ApplicationId("demo-laptop-001".to_string());
    let laptop_start = today - Duration::days(14 * 30 + 15);
    let laptop = SubsidyApplication {
        id: laptop_id.clone(),
        user_id: UserId("u-001".to_string()),
        category: SubsidyCategory::Laptop,
        status: ApplicationStatus::Approved,
        application_date: laptop_start,
        approved_amount: Some(laptop_plan.total_subsidy),
        invoice_amount: Some(laptop_invoice),
    };

    let history = vec![
        demo_claim(
            "demo-001",
            "u-001",
            SubsidyCategory::Training,
            today - Duration::days(30),
            Decimal::from(8_000),
        ),
        demo_claim(
            "demo-002",
            "u-001",
            SubsidyCategory::AiTool,
            today - Duration::days(20),
            Decimal::from(6_000),
        ),
        demo_claim(
            "demo-003",
            "u-001",
            SubsidyCategory::HealthCheck,
            today - Duration::days(10),
            Decimal::from(3_500),
        ),
        demo_claim(
            "demo-004",
            "u-003",
            SubsidyCategory::Training,
            today - Duration::days(60),
            Decimal::from(12_000),
        ),
        demo_claim(
            "demo-005",
            "u-003",
            SubsidyCategory::AiTool,
            today - Duration::days(5),
            Decimal::from(2_400),
        ),
    ];

    repository.transaction(|tx| -> Result<(), RepositoryError> {
        for application in history {
            tx.put_application(application)?;
        }
        tx.put_application(laptop)?;
        for number in 1..=14u8 {
            tx.push_installment(
                &laptop_id,
                LaptopInstallment {
                    installment_number: number,
                    amount: laptop_plan.amount_for(number),
                    received_date: laptop_start + Duration::days(30 * i64::from(number)),
                },
            )?;
        }
        Ok(())
    })
}
