use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::{KeyValueStore, read_json, read_text, write_json};
use crate::validation::{ValidationError, require};

pub const BALANCE_KEY: &str = "bank:balance";
pub const EXPENSES_KEY: &str = "bank:expenses";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseItem {
    pub id: String,
    pub name: String,
    pub amount: f64,
    #[serde(with = "crate::timestamp::minute")]
    pub date: NaiveDateTime,
}

impl ExpenseItem {
    /// What is left of `balance` after this single expense.
    pub fn remaining(&self, balance: f64) -> f64 {
        balance - self.amount
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpendingSummary {
    pub today: f64,
    pub week: f64,
    pub month: f64,
}

fn validate_amount(amount: f64) -> Result<f64, ValidationError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::InvalidAmount);
    }
    Ok(amount)
}

pub struct Ledger<'s> {
    store: &'s mut dyn KeyValueStore,
}

impl<'s> Ledger<'s> {
    pub fn new(store: &'s mut dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// `None` until an initial balance has been set.
    pub fn balance(&self) -> Option<f64> {
        let raw = read_text(&*self.store, BALANCE_KEY)?;
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value),
            _ => {
                warn!(raw = %raw, "stored balance is not a number");
                None
            }
        }
    }

    pub fn set_balance(&mut self, amount: f64) -> Result<f64, ValidationError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ValidationError::InvalidBalance);
        }
        self.store.set(BALANCE_KEY, amount.to_string())?;
        Ok(amount)
    }

    /// Newest first.
    pub fn expenses(&self) -> Vec<ExpenseItem> {
        read_json(&*self.store, EXPENSES_KEY)
    }

    pub fn add_expense(
        &mut self,
        name: &str,
        amount: f64,
        now: NaiveDateTime,
    ) -> Result<ExpenseItem, ValidationError> {
        let item = ExpenseItem {
            id: uuid::Uuid::new_v4().to_string(),
            name: require("name", name)?,
            amount: validate_amount(amount)?,
            date: now,
        };

        let mut next = Vec::with_capacity(1);
        next.push(item.clone());
        next.extend(self.expenses());
        write_json(self.store, EXPENSES_KEY, &next)?;
        debug!(id = %item.id, amount, "expense added");
        Ok(item)
    }

    /// Replaces name and amount, and the date when one is given.
    pub fn edit_expense(
        &mut self,
        id: &str,
        name: &str,
        amount: f64,
        date: Option<NaiveDateTime>,
    ) -> Result<ExpenseItem, ValidationError> {
        let name = require("name", name)?;
        let amount = validate_amount(amount)?;

        let mut updated = None;
        let next: Vec<ExpenseItem> = self
            .expenses()
            .into_iter()
            .map(|item| {
                if item.id != id {
                    return item;
                }
                let edited = ExpenseItem {
                    name: name.clone(),
                    amount,
                    date: date.unwrap_or(item.date),
                    ..item
                };
                updated = Some(edited.clone());
                edited
            })
            .collect();

        let updated = updated.ok_or_else(|| ValidationError::NotFound(id.to_string()))?;
        write_json(self.store, EXPENSES_KEY, &next)?;
        Ok(updated)
    }

    pub fn delete_expense(&mut self, id: &str) -> Result<bool, ValidationError> {
        let before = self.expenses();
        let next: Vec<ExpenseItem> = before.iter().filter(|e| e.id != id).cloned().collect();
        if next.len() == before.len() {
            return Ok(false);
        }
        write_json(self.store, EXPENSES_KEY, &next)?;
        Ok(true)
    }

    pub fn summary(&self, today: NaiveDate) -> SpendingSummary {
        summarize(&self.expenses(), today)
    }
}

/// Weeks run Sunday through Saturday.
pub fn week_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = day - Duration::days(i64::from(day.weekday().num_days_from_sunday()));
    (start, start + Duration::days(6))
}

pub fn summarize(expenses: &[ExpenseItem], today: NaiveDate) -> SpendingSummary {
    let (week_start, week_end) = week_bounds(today);
    expenses
        .iter()
        .fold(SpendingSummary::default(), |mut acc, item| {
            let day = item.date.date();
            if day == today {
                acc.today += item.amount;
            }
            if day >= week_start && day <= week_end {
                acc.week += item.amount;
            }
            if day.year() == today.year() && day.month() == today.month() {
                acc.month += item.amount;
            }
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_starts_on_sunday() {
        // 2024-05-15 is a Wednesday.
        let wed = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let (start, end) = week_bounds(wed);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 5, 12).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 5, 18).unwrap());

        let sun = NaiveDate::from_ymd_opt(2024, 5, 12).unwrap();
        assert_eq!(week_bounds(sun).0, sun);
    }

    #[test]
    fn remaining_is_balance_minus_amount() {
        let item = ExpenseItem {
            id: "1".into(),
            name: "tea".into(),
            amount: 12.5,
            date: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        };
        assert_eq!(item.remaining(100.0), 87.5);
    }
}
