use std::collections::BTreeMap;

use serde::Serialize;

use super::snapshot::Snapshot;

/// Derived monthly totals for a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HouseholdSummary {
    pub monthly_income: f64,
    pub monthly_outgoings: f64,
    pub monthly_surplus: f64,
    /// Surplus as a share of income; `None` without income.
    pub savings_rate_percent: Option<f64>,
    pub account_balance: f64,
    pub invested: f64,
    pub investment_value: f64,
    pub investment_gain_loss: f64,
    pub mortgage_equity: f64,
    pub net_worth: f64,
    pub goals_achieved: usize,
    pub goals_total: usize,
    pub outgoings_by_category: BTreeMap<String, f64>,
}

impl HouseholdSummary {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let monthly_income: f64 = snapshot.members.iter().map(|m| m.monthly_income).sum();

        let mut outgoings_by_category = BTreeMap::new();
        let mut monthly_outgoings = 0.0;
        for outgoing in &snapshot.outgoings {
            let monthly = outgoing.monthly_amount();
            monthly_outgoings += monthly;
            let category = if outgoing.category.trim().is_empty() {
                "other".to_string()
            } else {
                outgoing.category.trim().to_lowercase()
            };
            *outgoings_by_category.entry(category).or_insert(0.0) += monthly;
        }

        let monthly_surplus = monthly_income - monthly_outgoings;
        let savings_rate_percent =
            (monthly_income > 0.0).then(|| monthly_surplus / monthly_income * 100.0);

        let account_balance: f64 = snapshot.accounts.iter().map(|a| a.balance).sum();
        let invested: f64 = snapshot.investments.iter().map(|i| i.amount_invested).sum();
        let investment_value: f64 = snapshot.investments.iter().map(|i| i.current_value).sum();
        let mortgage_equity = snapshot.mortgage.as_ref().map(|m| m.equity()).unwrap_or(0.0);

        Self {
            monthly_income,
            monthly_outgoings,
            monthly_surplus,
            savings_rate_percent,
            account_balance,
            invested,
            investment_value,
            investment_gain_loss: investment_value - invested,
            mortgage_equity,
            net_worth: account_balance + investment_value + mortgage_equity,
            goals_achieved: snapshot.goals.iter().filter(|g| g.is_achieved()).count(),
            goals_total: snapshot.goals.len(),
            outgoings_by_category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::household::{
        Account, Frequency, Goal, Investment, Member, Mortgage, Outgoing,
    };

    fn sample() -> Snapshot {
        let mut s = Snapshot::default();
        s.members = vec![Member::new("Ann", 3_000.0), Member::new("Bob", 1_000.0)];
        s.outgoings = vec![
            Outgoing::new("Rent", "Housing", 1_500.0, Frequency::Monthly),
            Outgoing::new("Council tax", "housing", 1_200.0, Frequency::Yearly),
            Outgoing::new("Streaming", "", 10.0, Frequency::Monthly),
        ];
        s.accounts = vec![Account::new("Joint", "current", 2_000.0)];
        s.investments = vec![Investment::new("ISA", "fund", 5_000.0, 5_500.0)];
        s.mortgage = Some(Mortgage {
            property_value: 200_000.0,
            outstanding_balance: 150_000.0,
            ..Default::default()
        });
        s.goals = vec![
            Goal::new("Car", 1_000.0, 1_000.0),
            Goal::new("House", 20_000.0, 100.0),
        ];
        s
    }

    #[test]
    fn summary_totals() {
        let summary = sample().summary();
        assert_eq!(summary.monthly_income, 4_000.0);
        assert!((summary.monthly_outgoings - 1_610.0).abs() < 1e-9);
        assert!((summary.monthly_surplus - 2_390.0).abs() < 1e-9);
        let rate = summary.savings_rate_percent.unwrap();
        assert!((rate - 59.75).abs() < 1e-9);
        assert_eq!(summary.investment_gain_loss, 500.0);
        assert_eq!(summary.mortgage_equity, 50_000.0);
        assert_eq!(summary.net_worth, 2_000.0 + 5_500.0 + 50_000.0);
        assert_eq!(summary.goals_achieved, 1);
        assert_eq!(summary.goals_total, 2);
    }

    #[test]
    fn summary_groups_categories_case_insensitively() {
        let summary = sample().summary();
        assert!((summary.outgoings_by_category["housing"] - 1_600.0).abs() < 1e-9);
        assert!((summary.outgoings_by_category["other"] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn summary_of_empty_snapshot() {
        let summary = Snapshot::default().summary();
        assert_eq!(summary.savings_rate_percent, None);
        assert_eq!(summary.net_worth, 0.0);
        assert!(summary.outgoings_by_category.is_empty());
    }
}
