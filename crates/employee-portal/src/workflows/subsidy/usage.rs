use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{DateRange, Money, SubsidyApplication, SubsidyCategory, UserId};
use crate::workflows::export::CsvRecord;

/// Selects the approved applications that count towards a quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageFilter {
    pub user_id: UserId,
    pub category: SubsidyCategory,
    pub range: DateRange,
}

impl UsageFilter {
    pub fn matches(&self, application: &SubsidyApplication) -> bool {
        application.is_approved()
            && application.user_id == self.user_id
            && application.category == self.category
            && self.range.contains(application.application_date)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub total_amount: Money,
    pub count: usize,
}

/// Sums approved amounts over the applications selected by `filter`.
pub fn aggregate(applications: &[SubsidyApplication], filter: &UsageFilter) -> UsageSummary {
    applications
        .iter()
        .filter(|application| filter.matches(application))
        .fold(UsageSummary::default(), |mut summary, application| {
            summary.total_amount += application.approved_or_zero();
            summary.count += 1;
            summary
        })
}

/// One line of the per-category usage ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageRankingRow {
    pub rank: usize,
    pub user_id: UserId,
    pub category: SubsidyCategory,
    pub total_amount: Money,
    pub count: usize,
}

impl CsvRecord for UsageRankingRow {
    const HEADERS: &'static [&'static str] =
        &["rank", "user_id", "category", "total_amount", "count"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.rank.to_string(),
            self.user_id.0.clone(),
            self.category.label().to_string(),
            self.total_amount.to_string(),
            self.count.to_string(),
        ]
    }
}

/// Per-user approved totals for one category, highest spend first.
pub fn usage_ranking(
    applications: &[SubsidyApplication],
    category: SubsidyCategory,
    range: DateRange,
) -> Vec<UsageRankingRow> {
    let mut per_user: BTreeMap<&UserId, UsageSummary> = BTreeMap::new();
    for application in applications {
        if !application.is_approved()
            || application.category != category
            || !range.contains(application.application_date)
        {
            continue;
        }
        let summary = per_user.entry(&application.user_id).or_default();
        summary.total_amount += application.approved_or_zero();
        summary.count += 1;
    }

    let mut totals: Vec<(&UserId, UsageSummary)> = per_user.into_iter().collect();
    // BTreeMap order keeps ties sorted by user id under the stable sort.
    totals.sort_by(|left, right| right.1.total_amount.cmp(&left.1.total_amount));

    totals
        .into_iter()
        .enumerate()
        .map(|(index, (user_id, summary))| UsageRankingRow {
            rank: index + 1,
            user_id: user_id.clone(),
            category,
            total_amount: summary.total_amount,
            count: summary.count,
        })
        .collect()
}
