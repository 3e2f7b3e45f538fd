use super::common::*;
use crate::workflows::subsidy::domain::{ApplicationId, ApplicationStatus, SubsidyCategory};
use crate::workflows::subsidy::entitlement::{
    IneligibleReason, LaptopInstallmentState, LimitPolicy, PolicyTable,
};
use crate::workflows::subsidy::EntitlementEngine;
use rust_decimal::Decimal;

#[test]
fn fresh_record_is_eligible_everywhere() {
    let status = evaluate(&[]);

    assert_eq!(status.details.len(), 5);
    assert!(status.details.iter().all(|detail| detail.eligible));
    let training = status
        .detail(SubsidyCategory::Training)
        .expect("training detail");
    assert_eq!(training.total_limit, money(24_000));
    assert_eq!(training.available_amount, money(24_000));
}

#[test]
fn health_check_carries_over_unused_quota() {
    let applications = vec![approved(
        "h-prev",
        SubsidyCategory::HealthCheck,
        date(2022, 9, 1),
        2_000,
    )];

    let status = evaluate(&applications);
    let health = status
        .detail(SubsidyCategory::HealthCheck)
        .expect("health check detail");

    assert_eq!(health.total_limit, money(10_000));
    assert_eq!(health.used_amount, Decimal::ZERO);
    assert_eq!(health.available_amount, money(10_000));
    assert!(health.eligible);
}

#[test]
fn health_check_carry_over_is_capped() {
    let status = evaluate(&[]);
    let health = status
        .detail(SubsidyCategory::HealthCheck)
        .expect("health check detail");
    assert_eq!(health.total_limit, money(12_000));

    let overspent = vec![
        approved("h-prev", SubsidyCategory::HealthCheck, date(2022, 9, 1), 8_000),
        approved("h-now", SubsidyCategory::HealthCheck, date(2023, 9, 1), 1_500),
    ];
    let status = evaluate(&overspent);
    let health = status
        .detail(SubsidyCategory::HealthCheck)
        .expect("health check detail");
    assert_eq!(health.total_limit, money(6_000));
    assert_eq!(health.used_amount, money(1_500));
    assert_eq!(health.available_amount, money(4_500));
}

#[test]
fn combined_cap_reclamps_training_and_ai_tools() {
    let applications = vec![
        approved("t-1", SubsidyCategory::Training, date(2023, 8, 1), 20_000),
        approved("a-1", SubsidyCategory::AiTool, date(2023, 9, 1), 10_000),
    ];

    let status = evaluate(&applications);

    for category in [SubsidyCategory::Training, SubsidyCategory::AiTool] {
        let detail = status.detail(category).expect("detail present");
        assert_eq!(detail.available_amount, Decimal::ZERO, "{category}");
        assert!(!detail.eligible);
        assert_eq!(detail.ineligible_reason, Some(IneligibleReason::QuotaExceeded));
    }
    assert!(status
        .detail(SubsidyCategory::Travel)
        .expect("travel detail")
        .eligible);
}

#[test]
fn combined_cap_binds_when_tighter_than_the_individual_quota() {
    let applications = vec![
        approved("t-1", SubsidyCategory::Training, date(2023, 8, 1), 10_000),
        approved("a-1", SubsidyCategory::AiTool, date(2023, 9, 1), 4_000),
    ];

    let status = evaluate(&applications);

    let training = status.detail(SubsidyCategory::Training).expect("training");
    let ai_tool = status.detail(SubsidyCategory::AiTool).expect("ai tool");
    assert_eq!(training.available_amount, money(10_000));
    assert_eq!(ai_tool.available_amount, money(8_000));
    assert!(training.eligible && ai_tool.eligible);
}

#[test]
fn combined_cap_keeps_earlier_ineligible_reasons() {
    let hire = date(2024, 1, 20);
    let applications = vec![approved(
        "t-1",
        SubsidyCategory::Training,
        date(2024, 2, 1),
        25_000,
    )];

    let status = evaluate_at(hire, today(), &applications, &LaptopInstallmentState::new());

    let training = status.detail(SubsidyCategory::Training).expect("training");
    assert_eq!(
        training.ineligible_reason,
        Some(IneligibleReason::RequiresProbation)
    );
    assert_eq!(training.available_amount, Decimal::ZERO);
}

#[test]
fn new_hires_see_gate_reasons_in_precedence_order() {
    let hire = today() - chrono::Duration::days(30);

    let status = evaluate_at(hire, today(), &[], &LaptopInstallmentState::new());

    let reason = |category| {
        status
            .detail(category)
            .and_then(|detail| detail.ineligible_reason)
    };
    assert_eq!(
        reason(SubsidyCategory::Travel),
        Some(IneligibleReason::RequiresOneYear)
    );
    assert_eq!(
        reason(SubsidyCategory::Laptop),
        Some(IneligibleReason::RequiresOneYear)
    );
    assert_eq!(
        reason(SubsidyCategory::HealthCheck),
        Some(IneligibleReason::RequiresProbation)
    );
    assert_eq!(
        reason(SubsidyCategory::AiTool),
        Some(IneligibleReason::RequiresProbation)
    );
}

#[test]
fn overspent_category_reports_zero_not_negative() {
    let applications = vec![approved(
        "tr-1",
        SubsidyCategory::Travel,
        date(2023, 11, 1),
        15_000,
    )];

    let status = evaluate(&applications);
    let travel = status.detail(SubsidyCategory::Travel).expect("travel");

    assert_eq!(travel.used_amount, money(15_000));
    assert_eq!(travel.available_amount, Decimal::ZERO);
    assert_eq!(travel.ineligible_reason, Some(IneligibleReason::QuotaExceeded));
    assert!(status
        .details
        .iter()
        .all(|detail| detail.available_amount >= Decimal::ZERO));
}

#[test]
fn pending_and_rejected_applications_leave_quota_untouched() {
    let applications = vec![
        with_status(
            approved("t-1", SubsidyCategory::Training, date(2023, 8, 1), 20_000),
            ApplicationStatus::Pending,
        ),
        with_status(
            approved("t-2", SubsidyCategory::Training, date(2023, 9, 1), 20_000),
            ApplicationStatus::Rejected,
        ),
    ];

    let status = evaluate(&applications);
    let training = status.detail(SubsidyCategory::Training).expect("training");

    assert_eq!(training.used_amount, Decimal::ZERO);
    assert_eq!(training.available_amount, money(24_000));
}

#[test]
fn ongoing_laptop_blocks_a_new_application() {
    let applications = vec![laptop_application("l-1", ApplicationStatus::Approved, 100_000)];
    let mut installments = LaptopInstallmentState::new();
    installments.insert(ApplicationId("l-1".to_string()), paid_installments(100_000, 14));

    let status = evaluate_at(hire_date(), today(), &applications, &installments);
    let laptop = status.detail(SubsidyCategory::Laptop).expect("laptop");

    assert_eq!(laptop.used_amount, money(15_000));
    assert_eq!(laptop.total_limit, Decimal::ZERO);
    assert_eq!(laptop.available_amount, Decimal::ZERO);
    assert_eq!(
        laptop.ineligible_reason,
        Some(IneligibleReason::PreviousNotCompleted)
    );

    let progress = &status.laptop_progress[0];
    assert_eq!(progress.received_count, 14);
    assert_eq!(progress.total_subsidy, Some(money(54_000)));
    assert_eq!(progress.remaining_amount, Some(money(39_000)));
    assert!(!progress.completed);
}

#[test]
fn completed_laptop_counts_towards_lifetime_usage_only() {
    let applications = vec![
        laptop_application("l-1", ApplicationStatus::Approved, 100_000),
        laptop_application("l-2", ApplicationStatus::Rejected, 90_000),
    ];
    let mut installments = LaptopInstallmentState::new();
    installments.insert(ApplicationId("l-1".to_string()), paid_installments(100_000, 36));

    let status = evaluate_at(hire_date(), today(), &applications, &installments);
    let laptop = status.detail(SubsidyCategory::Laptop).expect("laptop");

    assert!(laptop.eligible);
    assert_eq!(laptop.used_amount, money(54_000));
    assert!(status.laptop_progress[0].completed);
}

#[test]
fn pending_laptop_application_is_ongoing() {
    let applications = vec![laptop_application("l-1", ApplicationStatus::Pending, 60_000)];

    let status = evaluate_at(
        hire_date(),
        today(),
        &applications,
        &LaptopInstallmentState::new(),
    );
    let laptop = status.detail(SubsidyCategory::Laptop).expect("laptop");

    assert_eq!(laptop.used_amount, Decimal::ZERO);
    assert_eq!(
        laptop.ineligible_reason,
        Some(IneligibleReason::PreviousNotCompleted)
    );
}

#[test]
fn evaluation_is_idempotent() {
    let applications = vec![
        approved("t-1", SubsidyCategory::Training, date(2023, 8, 1), 9_000),
        approved("h-prev", SubsidyCategory::HealthCheck, date(2022, 9, 1), 2_000),
        laptop_application("l-1", ApplicationStatus::Approved, 70_000),
    ];
    let mut installments = LaptopInstallmentState::new();
    installments.insert(ApplicationId("l-1".to_string()), paid_installments(70_000, 5));

    let first = evaluate_at(hire_date(), today(), &applications, &installments);
    let second = evaluate_at(hire_date(), today(), &applications, &installments);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).expect("serialise"),
        serde_json::to_string(&second).expect("serialise")
    );
}

#[test]
fn reasons_serialise_to_the_closed_label_set() {
    let labels: Vec<String> = [
        IneligibleReason::RequiresOneYear,
        IneligibleReason::RequiresProbation,
        IneligibleReason::QuotaExceeded,
        IneligibleReason::PreviousNotCompleted,
    ]
    .iter()
    .map(|reason| serde_json::to_string(reason).expect("serialise"))
    .collect();

    assert_eq!(
        labels,
        vec![
            "\"Requires 1 year\"",
            "\"Requires probation (90d)\"",
            "\"Quota exceeded\"",
            "\"Previous not completed\"",
        ]
    );
}

#[test]
fn custom_policy_tables_are_honoured() {
    let policies = PolicyTable::standard()
        .with_combined_cap(money(5_000))
        .with_policy(
            SubsidyCategory::Travel,
            LimitPolicy {
                annual_limit: money(2_000),
                requires_full_year: false,
                requires_probation_end: false,
                can_carry_over: false,
                max_carry_over: None,
            },
        );
    let engine = EntitlementEngine::new(policies);
    let applications = vec![approved(
        "a-1",
        SubsidyCategory::AiTool,
        date(2023, 9, 1),
        5_000,
    )];
    let user_id = user();
    let installments = LaptopInstallmentState::new();

    let status = engine.evaluate(&crate::workflows::subsidy::EntitlementInput {
        user_id: &user_id,
        hire_date: hire_date(),
        applications: &applications,
        laptop_installments: &installments,
        now: today(),
    });

    let training = status.detail(SubsidyCategory::Training).expect("training");
    assert_eq!(training.available_amount, Decimal::ZERO);
    assert_eq!(training.ineligible_reason, Some(IneligibleReason::QuotaExceeded));
    assert_eq!(
        status
            .detail(SubsidyCategory::Travel)
            .expect("travel")
            .total_limit,
        money(2_000)
    );
}

#[test]
fn leap_day_hires_count_spend_on_february_28() {
    let hire = date(2020, 2, 29);
    let applications = vec![
        approved("t-feb28", SubsidyCategory::Training, date(2025, 2, 28), 24_000),
        approved("h-leap", SubsidyCategory::HealthCheck, date(2024, 2, 29), 6_000),
    ];

    let status = evaluate_at(
        hire,
        date(2025, 2, 28),
        &applications,
        &LaptopInstallmentState::new(),
    );
    let training = status.detail(SubsidyCategory::Training).expect("training");
    assert_eq!(training.used_amount, money(24_000));
    assert_eq!(training.available_amount, Decimal::ZERO);
    assert_eq!(training.ineligible_reason, Some(IneligibleReason::QuotaExceeded));

    // the leap-day claim opens the previous window and leaves nothing to carry over
    let next = evaluate_at(
        hire,
        date(2025, 3, 1),
        &applications,
        &LaptopInstallmentState::new(),
    );
    let health = next
        .detail(SubsidyCategory::HealthCheck)
        .expect("health check");
    assert_eq!(health.total_limit, money(6_000));
}
