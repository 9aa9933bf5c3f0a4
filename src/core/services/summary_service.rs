//! Dashboard statistics derived from a ledger snapshot.
//!
//! Everything here is pure and total: no I/O, no failure modes. Month windows
//! are matched on the (year, month) of each expense's calendar date.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::LedgerConfig;
use crate::domain::{Expense, ExpenseCategory, MonthKey};

/// Aggregation engine behind the dashboard, calendar and map views.
pub struct SummaryService;

/// Current and preceding calendar month totals.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MonthComparison {
    pub current_month: MonthKey,
    pub current: f64,
    pub prior: f64,
}

/// One slice of the category breakdown chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryShare {
    pub category: ExpenseCategory,
    pub label: &'static str,
    pub color: &'static str,
    pub total: f64,
    pub share_percent: f64,
}

/// Everything the dashboard renders.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardSummary {
    pub month: MonthComparison,
    pub percent_change: f64,
    pub by_category: BTreeMap<ExpenseCategory, f64>,
    pub top_category: Option<ExpenseCategory>,
    /// Recent-activity card, `recent_limit` entries.
    pub recent: Vec<Expense>,
    /// Expense list under the charts, `dashboard_list_limit` entries.
    pub listed: Vec<Expense>,
    pub total_expenses: usize,
    pub current_total_display: String,
    pub prior_total_display: String,
}

impl SummaryService {
    pub fn month_total(expenses: &[Expense], month: MonthKey) -> f64 {
        expenses
            .iter()
            .filter(|expense| month.contains(expense.date))
            .map(Expense::countable_amount)
            .sum()
    }

    pub fn current_and_prior_month_totals(expenses: &[Expense], today: NaiveDate) -> MonthComparison {
        let current_month = MonthKey::of(today);
        MonthComparison {
            current_month,
            current: Self::month_total(expenses, current_month),
            prior: Self::month_total(expenses, current_month.previous()),
        }
    }

    /// Month-over-month change in percent, rounded to one decimal place.
    /// A zero prior total yields 0 whatever the current total is.
    pub fn percent_change(current: f64, prior: f64) -> f64 {
        if prior == 0.0 {
            return 0.0;
        }
        round_one_decimal((current - prior) / prior * 100.0)
    }

    /// Summed amount per category present in the snapshot.
    pub fn by_category(expenses: &[Expense]) -> BTreeMap<ExpenseCategory, f64> {
        let mut totals = BTreeMap::new();
        for expense in expenses {
            *totals.entry(expense.category).or_insert(0.0) += expense.countable_amount();
        }
        totals
    }

    /// Category with the largest total; ties go to the earlier category in enumeration order.
    pub fn top_category(totals: &BTreeMap<ExpenseCategory, f64>) -> Option<ExpenseCategory> {
        let mut best: Option<(ExpenseCategory, f64)> = None;
        for (&category, &total) in totals {
            match best {
                Some((_, best_total)) if total <= best_total => {}
                _ => best = Some((category, total)),
            }
        }
        best.map(|(category, _)| category)
    }

    /// The first `limit` expenses of the snapshot, in snapshot order.
    pub fn recent(expenses: &[Expense], limit: usize) -> &[Expense] {
        &expenses[..limit.min(expenses.len())]
    }

    /// Non-zero category totals with their share of the overall spend, largest first.
    pub fn category_breakdown(expenses: &[Expense]) -> Vec<CategoryShare> {
        let totals = Self::by_category(expenses);
        let grand_total: f64 = totals.values().sum();
        let mut shares: Vec<CategoryShare> = totals
            .into_iter()
            .filter(|(_, total)| *total > 0.0)
            .map(|(category, total)| CategoryShare {
                category,
                label: category.label(),
                color: category.color(),
                total,
                share_percent: round_one_decimal(total / grand_total * 100.0),
            })
            .collect();
        shares.sort_by(|a, b| b.total.total_cmp(&a.total));
        shares
    }

    pub fn dashboard(
        expenses: &[Expense],
        today: NaiveDate,
        config: &LedgerConfig,
    ) -> DashboardSummary {
        let month = Self::current_and_prior_month_totals(expenses, today);
        let by_category = Self::by_category(expenses);
        DashboardSummary {
            percent_change: Self::percent_change(month.current, month.prior),
            top_category: Self::top_category(&by_category),
            by_category,
            recent: Self::recent(expenses, config.recent_limit).to_vec(),
            listed: Self::recent(expenses, config.dashboard_list_limit).to_vec(),
            total_expenses: expenses.len(),
            current_total_display: config.format_amount(month.current),
            prior_total_display: config.format_amount(month.prior),
            month,
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
