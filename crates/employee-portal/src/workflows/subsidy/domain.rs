use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Monetary amounts are kept exact so schedules and quotas sum without drift.
pub type Money = Decimal;

/// Identifier wrapper for portal employees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for subsidy applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Subsidy categories offered through the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubsidyCategory {
    Laptop,
    HealthCheck,
    Training,
    #[serde(rename = "AITool")]
    AiTool,
    Travel,
}

impl SubsidyCategory {
    pub const fn ordered() -> [SubsidyCategory; 5] {
        [
            SubsidyCategory::Laptop,
            SubsidyCategory::HealthCheck,
            SubsidyCategory::Training,
            SubsidyCategory::AiTool,
            SubsidyCategory::Travel,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            SubsidyCategory::Laptop => "Laptop",
            SubsidyCategory::HealthCheck => "HealthCheck",
            SubsidyCategory::Training => "Training",
            SubsidyCategory::AiTool => "AITool",
            SubsidyCategory::Travel => "Travel",
        }
    }

    /// Parses the label form used in URLs and exports.
    pub fn from_label(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(raw.trim()))
    }

    /// Training and AI tools draw from one shared annual pot.
    pub const fn shares_combined_cap(self) -> bool {
        matches!(self, SubsidyCategory::Training | SubsidyCategory::AiTool)
    }
}

impl fmt::Display for SubsidyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Review state of an application. Resolved states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub const fn is_resolved(self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One subsidy claim as stored in the application collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsidyApplication {
    pub id: ApplicationId,
    pub user_id: UserId,
    pub category: SubsidyCategory,
    pub status: ApplicationStatus,
    pub application_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_amount: Option<Money>,
}

impl SubsidyApplication {
    pub fn is_approved(&self) -> bool {
        self.status == ApplicationStatus::Approved
    }

    pub fn approved_or_zero(&self) -> Money {
        self.approved_amount.unwrap_or(Decimal::ZERO)
    }
}

/// Disbursement record for a laptop application, numbered 1 through 36.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaptopInstallment {
    pub installment_number: u8,
    pub amount: Money,
    pub received_date: NaiveDate,
}

/// Employee record fields the subsidy workflow depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub user_id: UserId,
    pub display_name: String,
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
}

/// Half-open calendar window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}
