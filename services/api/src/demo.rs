use crate::infra::{demo_directory, parse_amount, parse_date, seed_demo_store};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use employee_portal::error::AppError;
use employee_portal::workflows::attendance::{
    summarize_hours, AttendanceEntry, AttendanceKind, OffsetRow,
};
use employee_portal::workflows::export::to_csv_string;
use employee_portal::workflows::subsidy::{
    ApplicationRequest, DateRange, InMemorySubsidyRepository, LaptopInstallmentPlan, PolicyTable,
    ReviewDecision, SubsidyCategory, SubsidyService, SubsidyServiceError, UserId,
    UserSubsidyLimitStatus,
};
use rust_decimal::Decimal;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the evaluation date (defaults to today).
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ScheduleArgs {
    /// Laptop invoice amount
    #[arg(long, value_parser = parse_amount)]
    pub(crate) invoice_amount: Decimal,
}

pub(crate) fn run_laptop_schedule(args: ScheduleArgs) -> Result<(), AppError> {
    if args.invoice_amount.is_sign_negative() {
        return Err(SubsidyServiceError::InvalidAmount(args.invoice_amount).into());
    }

    let plan = LaptopInstallmentPlan::calculate(args.invoice_amount);
    println!("Laptop subsidy schedule");
    println!(
        "Invoice {} -> subsidy {} over {} installments",
        plan.invoice_amount,
        plan.total_subsidy,
        plan.installment_count()
    );
    for (index, amount) in plan.installment_amounts.iter().enumerate() {
        println!("  {:>2}. {}", index + 1, amount);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    println!("Subsidy entitlement demo (evaluated {today})");

    let repository = Arc::new(InMemorySubsidyRepository::default());
    seed_demo_store(&repository, today).map_err(SubsidyServiceError::from)?;
    let service = SubsidyService::new(repository, PolicyTable::standard());

    for profile in demo_directory(today) {
        let status = service.limit_status(&profile.user_id, today)?;
        render_limits(&profile.display_name, &status);
    }

    println!("\nApplication workflow");
    let request = ApplicationRequest {
        user_id: UserId("u-003".to_string()),
        category: SubsidyCategory::AiTool,
        invoice_amount: Some(Decimal::from(3_000)),
    };
    match service.submit(request, today) {
        Ok(pending) => {
            println!("- Submitted {} ({})", pending.id, pending.category);
            let approved = service.change_status(
                &pending.id,
                ReviewDecision::Approve {
                    approved_amount: None,
                },
                &UserId("hr-001".to_string()),
                today,
            )?;
            println!(
                "- {} {} for {}",
                approved.id,
                approved.status,
                approved.approved_amount.unwrap_or(Decimal::ZERO)
            );
        }
        Err(err) => println!("- Submission rejected: {err}"),
    }

    let status = service.limit_status(&UserId("u-001".to_string()), today)?;
    match serde_json::to_string_pretty(&status) {
        Ok(json) => println!("\nLimit status payload for u-001:\n{json}"),
        Err(err) => println!("\nLimit status payload unavailable: {err}"),
    }

    let year = DateRange::new(today - Duration::days(365), today + Duration::days(1));
    for category in [SubsidyCategory::Training, SubsidyCategory::AiTool] {
        let rows = service.usage_report(category, year)?;
        println!("\n{} usage ranking (CSV)", category.label());
        print!("{}", to_csv_string(&rows)?);
    }

    let month = DateRange::new(today - Duration::days(30), today + Duration::days(1));
    let attendance = demo_attendance(today);
    let rows: Vec<OffsetRow> = demo_directory(today)
        .into_iter()
        .map(|profile| OffsetRow {
            offset: summarize_hours(&attendance, &profile.user_id, month),
            user_id: profile.user_id,
        })
        .collect();
    println!("\nOvertime / personal leave offset, last 30 days (CSV)");
    print!("{}", to_csv_string(&rows)?);

    Ok(())
}

fn render_limits(display_name: &str, status: &UserSubsidyLimitStatus) {
    println!(
        "\n{} ({}) | {:.2} years of service | period {} -> {}",
        display_name,
        status.user_id,
        status.tenure.years_of_service,
        status.period.period_start,
        status.period.period_end
    );
    for detail in &status.details {
        let verdict = match detail.ineligible_reason {
            Some(reason) => format!("ineligible: {reason}"),
            None => "eligible".to_string(),
        };
        println!(
            "  - {:<11} available {:>8} of {:>8} | used {:>8} | {}",
            detail.category.label(),
            detail.available_amount.to_string(),
            detail.total_limit.to_string(),
            detail.used_amount.to_string(),
            verdict
        );
    }
    for progress in &status.laptop_progress {
        println!(
            "  Laptop {}: {} installments, {} received, {} remaining",
            progress.application_id,
            progress.received_count,
            progress.received_amount,
            progress
                .remaining_amount
                .map(|amount| amount.to_string())
                .unwrap_or_else(|| "n/a".to_string())
        );
    }
}

fn demo_attendance(today: NaiveDate) -> Vec<AttendanceEntry> {
    let entry = |user: &str, days_ago: i64, kind: AttendanceKind, hours: i64| AttendanceEntry {
        user_id: UserId(user.to_string()),
        date: today - Duration::days(days_ago),
        kind,
        hours: Decimal::from(hours),
    };
    vec![
        entry("u-001", 3, AttendanceKind::ReplaceableOvertime, 6),
        entry("u-001", 9, AttendanceKind::PersonalLeave, 4),
        entry("u-001", 12, AttendanceKind::PaidOvertime, 5),
        entry("u-003", 2, AttendanceKind::PersonalLeave, 8),
        entry("u-003", 18, AttendanceKind::ReplaceableOvertime, 3),
    ]
}
