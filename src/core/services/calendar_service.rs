use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::domain::{Expense, MonthKey};

/// Day-level views used by the calendar.
pub struct CalendarService;

impl CalendarService {
    /// Expenses dated `date`, in snapshot order.
    pub fn on_date(expenses: &[Expense], date: NaiveDate) -> Vec<&Expense> {
        expenses.iter().filter(|expense| expense.date == date).collect()
    }

    pub fn day_total(expenses: &[Expense], date: NaiveDate) -> f64 {
        expenses
            .iter()
            .filter(|expense| expense.date == date)
            .map(Expense::countable_amount)
            .sum()
    }

    /// Distinct days carrying at least one expense, earliest first.
    pub fn expense_dates(expenses: &[Expense]) -> BTreeSet<NaiveDate> {
        expenses.iter().map(|expense| expense.date).collect()
    }

    /// Per-day totals for one month; days without spending are absent.
    pub fn month_daily_totals(expenses: &[Expense], month: MonthKey) -> BTreeMap<NaiveDate, f64> {
        let mut totals = BTreeMap::new();
        for expense in expenses.iter().filter(|expense| month.contains(expense.date)) {
            *totals.entry(expense.date).or_insert(0.0) += expense.countable_amount();
        }
        totals
    }
}
