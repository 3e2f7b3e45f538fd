//! Laptop subsidy amortization.
//!
//! The subsidy covers 80% of the invoice up to 54 000 and is paid out over at most 36
//! monthly installments whose per-period cap steps up every twelve periods.

use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::Money;

pub const MAX_INSTALLMENTS: u8 = 36;
pub const LAPTOP_SUBSIDY_CAP: i64 = 54_000;

/// Share of the invoice the company covers, in tenths.
const COVERAGE_TENTHS: i64 = 8;

/// Per-period cap for installment `number` (1-based).
pub fn tier_cap(number: u8) -> Money {
    match number {
        1..=12 => Decimal::from(1_000),
        13..=24 => Decimal::from(1_500),
        _ => Decimal::from(2_000),
    }
}

/// Computed subsidy and payout schedule for a single invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaptopInstallmentPlan {
    pub invoice_amount: Money,
    pub total_subsidy: Money,
    pub installment_amounts: Vec<Money>,
}

impl LaptopInstallmentPlan {
    pub fn calculate(invoice_amount: Money) -> Self {
        let total_subsidy = total_subsidy(invoice_amount);

        let mut installment_amounts = Vec::with_capacity(usize::from(MAX_INSTALLMENTS));
        let mut remaining = total_subsidy;
        for number in 1..=MAX_INSTALLMENTS {
            if remaining <= Decimal::ZERO {
                break;
            }
            let amount = tier_cap(number).min(remaining);
            installment_amounts.push(amount);
            remaining -= amount;
        }

        Self {
            invoice_amount,
            total_subsidy,
            installment_amounts,
        }
    }

    /// Amount due for installment `number`, or zero once nothing is left to pay.
    pub fn amount_for(&self, number: u8) -> Money {
        if number == 0 {
            return Decimal::ZERO;
        }
        self.installment_amounts
            .get(usize::from(number) - 1)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn installment_count(&self) -> u8 {
        self.installment_amounts.len() as u8
    }

    /// Sum of the first `received` installments.
    pub fn paid_through(&self, received: u8) -> Money {
        self.installment_amounts
            .iter()
            .take(usize::from(received))
            .sum()
    }
}

pub fn total_subsidy(invoice_amount: Money) -> Money {
    let covered = invoice_amount * Decimal::new(COVERAGE_TENTHS, 1);
    covered
        .min(Decimal::from(LAPTOP_SUBSIDY_CAP))
        .max(Decimal::ZERO)
}

pub fn installment_amount(number: u8, invoice_amount: Money) -> Money {
    LaptopInstallmentPlan::calculate(invoice_amount).amount_for(number)
}
