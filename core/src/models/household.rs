//! Household records held inside a [`Snapshot`](super::Snapshot).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(default = "new_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub monthly_income: f64,
}

impl Member {
    pub fn new(name: impl Into<String>, monthly_income: f64) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            monthly_income,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default = "new_id")]
    pub id: String,
    pub name: String,
    /// Free-form type, e.g. "current", "savings", or one of the snapshot's custom account types.
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub balance: f64,
}

impl Account {
    pub fn new(name: impl Into<String>, account_type: impl Into<String>, balance: f64) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            account_type: account_type.into(),
            owner_id: None,
            balance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    #[serde(default = "new_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

impl Goal {
    pub fn new(name: impl Into<String>, target_amount: f64, current_amount: f64) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            target_amount,
            current_amount,
            target_date: None,
        }
    }

    /// Progress towards the target, clamped to 0..=100.
    pub fn progress_percent(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return if self.current_amount > 0.0 { 100.0 } else { 0.0 };
        }
        (self.current_amount / self.target_amount * 100.0).clamp(0.0, 100.0)
    }

    pub fn remaining(&self) -> f64 {
        (self.target_amount - self.current_amount).max(0.0)
    }

    pub fn is_achieved(&self) -> bool {
        self.target_amount > 0.0 && self.current_amount >= self.target_amount
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// Factor converting one payment at this frequency into a monthly amount.
    pub fn monthly_factor(self) -> f64 {
        match self {
            Self::Weekly => 52.0 / 12.0,
            Self::Monthly => 1.0,
            Self::Quarterly => 1.0 / 3.0,
            Self::Yearly => 1.0 / 12.0,
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" | "annual" | "annually" => Ok(Self::Yearly),
            other => Err(format!("unknown frequency: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outgoing {
    #[serde(default = "new_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub frequency: Frequency,
}

impl Outgoing {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        amount: f64,
        frequency: Frequency,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            category: category.into(),
            amount,
            frequency,
        }
    }

    pub fn monthly_amount(&self) -> f64 {
        self.amount * self.frequency.monthly_factor()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    #[serde(default = "new_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub amount_invested: f64,
    #[serde(default)]
    pub current_value: f64,
}

impl Investment {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        amount_invested: f64,
        current_value: f64,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            kind: kind.into(),
            amount_invested,
            current_value,
        }
    }

    pub fn gain_loss(&self) -> f64 {
        self.current_value - self.amount_invested
    }

    /// `None` when nothing has been invested yet.
    pub fn gain_loss_percent(&self) -> Option<f64> {
        if self.amount_invested == 0.0 {
            return None;
        }
        Some(self.gain_loss() / self.amount_invested * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mortgage {
    #[serde(default)]
    pub lender: String,
    #[serde(default)]
    pub property_value: f64,
    #[serde(default)]
    pub outstanding_balance: f64,
    /// Annual rate in percent.
    #[serde(default)]
    pub interest_rate: f64,
    #[serde(default)]
    pub monthly_payment: f64,
    #[serde(default)]
    pub term_months_remaining: u32,
}

impl Mortgage {
    pub fn equity(&self) -> f64 {
        self.property_value - self.outstanding_balance
    }

    pub fn loan_to_value_percent(&self) -> Option<f64> {
        if self.property_value <= 0.0 {
            return None;
        }
        Some(self.outstanding_balance / self.property_value * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_progress_is_clamped() {
        let mut goal = Goal::new("Holiday", 2_000.0, 500.0);
        assert_eq!(goal.progress_percent(), 25.0);
        assert_eq!(goal.remaining(), 1_500.0);
        assert!(!goal.is_achieved());

        goal.current_amount = 2_500.0;
        assert_eq!(goal.progress_percent(), 100.0);
        assert_eq!(goal.remaining(), 0.0);
        assert!(goal.is_achieved());
    }

    #[test]
    fn goal_without_target() {
        let goal = Goal::new("Someday", 0.0, 0.0);
        assert_eq!(goal.progress_percent(), 0.0);
        assert!(!goal.is_achieved());
    }

    #[test]
    fn outgoing_normalises_to_monthly() {
        let weekly = Outgoing::new("Food", "groceries", 120.0, Frequency::Weekly);
        assert!((weekly.monthly_amount() - 520.0).abs() < 1e-9);

        let yearly = Outgoing::new("Insurance", "insurance", 600.0, Frequency::Yearly);
        assert!((yearly.monthly_amount() - 50.0).abs() < 1e-9);

        let quarterly = Outgoing::new("Water", "utilities", 90.0, Frequency::Quarterly);
        assert!((quarterly.monthly_amount() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn frequency_from_str() {
        assert_eq!("Weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!("annual".parse::<Frequency>().unwrap(), Frequency::Yearly);
        assert!("fortnightly".parse::<Frequency>().is_err());
    }

    #[test]
    fn investment_gain_loss() {
        let inv = Investment::new("Index fund", "fund", 1_000.0, 1_250.0);
        assert_eq!(inv.gain_loss(), 250.0);
        assert_eq!(inv.gain_loss_percent(), Some(25.0));

        let empty = Investment::new("New", "fund", 0.0, 0.0);
        assert_eq!(empty.gain_loss_percent(), None);
    }

    #[test]
    fn mortgage_equity_and_ltv() {
        let m = Mortgage {
            property_value: 300_000.0,
            outstanding_balance: 180_000.0,
            ..Default::default()
        };
        assert_eq!(m.equity(), 120_000.0);
        assert_eq!(m.loan_to_value_percent(), Some(60.0));
        assert_eq!(Mortgage::default().loan_to_value_percent(), None);
    }
}
