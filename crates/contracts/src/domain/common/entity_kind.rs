use serde::{Deserialize, Serialize};

/// Entity types reconciled between the spreadsheet and the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    FinancialSurvey,
    Payroll,
    Loan,
    WriteOff,
}

impl EntityKind {
    pub fn all() -> [EntityKind; 4] {
        [
            EntityKind::FinancialSurvey,
            EntityKind::Payroll,
            EntityKind::Loan,
            EntityKind::WriteOff,
        ]
    }

    /// Path segment used by the HTTP API, e.g. `financial-surveys`
    pub fn slug(&self) -> &'static str {
        match self {
            EntityKind::FinancialSurvey => "financial-surveys",
            EntityKind::Payroll => "payroll",
            EntityKind::Loan => "loans",
            EntityKind::WriteOff => "write-offs",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EntityKind::FinancialSurvey => "Financial surveys",
            EntityKind::Payroll => "Payroll",
            EntityKind::Loan => "Loans",
            EntityKind::WriteOff => "Write-offs",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::all().into_iter().find(|k| k.slug() == slug)
    }
}
