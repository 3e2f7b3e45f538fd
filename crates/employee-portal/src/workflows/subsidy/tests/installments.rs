use super::common::*;
use crate::workflows::subsidy::installments::{
    installment_amount, tier_cap, total_subsidy, LaptopInstallmentPlan, MAX_INSTALLMENTS,
};
use rust_decimal::Decimal;

#[test]
fn capped_invoice_fills_all_three_tiers() {
    let plan = LaptopInstallmentPlan::calculate(money(100_000));

    assert_eq!(plan.total_subsidy, money(54_000));
    assert_eq!(plan.installment_amounts.len(), 36);
    assert!(plan.installment_amounts[..12].iter().all(|amount| *amount == money(1_000)));
    assert!(plan.installment_amounts[12..24].iter().all(|amount| *amount == money(1_500)));
    assert!(plan.installment_amounts[24..].iter().all(|amount| *amount == money(2_000)));
    assert_eq!(plan.paid_through(12), money(12_000));
    assert_eq!(plan.paid_through(24), money(30_000));
    assert_eq!(plan.paid_through(36), money(54_000));
}

#[test]
fn small_invoice_exhausts_early() {
    let plan = LaptopInstallmentPlan::calculate(money(10_000));

    assert_eq!(plan.total_subsidy, money(8_000));
    assert_eq!(plan.installment_count(), 8);
    assert!(plan
        .installment_amounts
        .iter()
        .all(|amount| *amount == money(1_000)));
}

#[test]
fn final_installment_carries_the_remainder() {
    let plan = LaptopInstallmentPlan::calculate(money(12_345));

    assert_eq!(plan.total_subsidy, Decimal::new(98_760, 1));
    assert_eq!(plan.installment_count(), 10);
    assert_eq!(plan.installment_amounts[9], money(876));
}

#[test]
fn schedule_always_sums_to_the_subsidy() {
    for invoice in (0..=140_000).step_by(1_337) {
        let invoice = money(invoice);
        let plan = LaptopInstallmentPlan::calculate(invoice);
        let expected = (invoice * Decimal::new(8, 1)).min(money(54_000));

        assert_eq!(plan.total_subsidy, expected, "invoice {invoice}");
        let sum: Decimal = plan.installment_amounts.iter().sum();
        assert_eq!(sum, plan.total_subsidy, "invoice {invoice}");
        assert!(plan.installment_count() <= MAX_INSTALLMENTS);
        assert!(plan
            .installment_amounts
            .iter()
            .enumerate()
            .all(|(index, amount)| *amount > Decimal::ZERO
                && *amount <= tier_cap(index as u8 + 1)));
    }
}

#[test]
fn calculation_is_deterministic() {
    let first = LaptopInstallmentPlan::calculate(money(73_210));
    let second = LaptopInstallmentPlan::calculate(money(73_210));
    assert_eq!(first, second);
}

#[test]
fn zero_and_negative_invoices_produce_an_empty_schedule() {
    assert!(LaptopInstallmentPlan::calculate(Decimal::ZERO)
        .installment_amounts
        .is_empty());
    assert_eq!(total_subsidy(money(-500)), Decimal::ZERO);
    assert!(LaptopInstallmentPlan::calculate(money(-500))
        .installment_amounts
        .is_empty());
}

#[test]
fn installment_amount_signals_nothing_left_with_zero() {
    assert_eq!(installment_amount(1, money(100_000)), money(1_000));
    assert_eq!(installment_amount(13, money(100_000)), money(1_500));
    assert_eq!(installment_amount(36, money(100_000)), money(2_000));
    assert_eq!(installment_amount(37, money(100_000)), Decimal::ZERO);
    assert_eq!(installment_amount(9, money(10_000)), Decimal::ZERO);
    assert_eq!(installment_amount(0, money(10_000)), Decimal::ZERO);
}
