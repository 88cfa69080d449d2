use serde::{Deserialize, Serialize};

use super::household::{Account, Goal, Investment, Member, Mortgage, Outgoing};
use super::summary::HouseholdSummary;

/// Root aggregate of all household finance data.
///
/// The sync coordinator owns `updated_at`: it is stamped on every mutation and
/// compared during reconciliation. Everything else is opaque to sync.
///
/// Deserialization ignores unknown fields and defaults missing ones; every
/// field is written back on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub id: String,
    pub household_name: String,
    pub members: Vec<Member>,
    pub accounts: Vec<Account>,
    pub goals: Vec<Goal>,
    pub outgoings: Vec<Outgoing>,
    pub investments: Vec<Investment>,
    pub mortgage: Option<Mortgage>,
    pub custom_outgoing_categories: Vec<String>,
    pub custom_account_types: Vec<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds, assigned by the coordinator.
    pub updated_at: i64,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            household_name: String::new(),
            members: Vec::new(),
            accounts: Vec::new(),
            goals: Vec::new(),
            outgoings: Vec::new(),
            investments: Vec::new(),
            mortgage: None,
            custom_outgoing_categories: Vec::new(),
            custom_account_types: Vec::new(),
            created_at: chrono::Utc::now().timestamp_millis(),
            updated_at: 0,
        }
    }
}

impl Snapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn summary(&self) -> HouseholdSummary {
        HouseholdSummary::from_snapshot(self)
    }

    /// Outgoing categories known to this household, custom ones last.
    pub fn outgoing_categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = DEFAULT_OUTGOING_CATEGORIES
            .iter()
            .map(|c| c.to_string())
            .collect();
        for custom in &self.custom_outgoing_categories {
            if !categories.iter().any(|c| c.eq_ignore_ascii_case(custom)) {
                categories.push(custom.clone());
            }
        }
        categories
    }
}

pub const DEFAULT_OUTGOING_CATEGORIES: &[&str] = &[
    "housing",
    "utilities",
    "groceries",
    "transport",
    "insurance",
    "subscriptions",
    "childcare",
    "entertainment",
    "other",
];
