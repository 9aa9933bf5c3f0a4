use crate::domain::{Expense, ExpenseId};

/// Lookups backing the map view.
pub struct LocationService;

impl LocationService {
    /// Expenses that name a place, in snapshot order.
    pub fn with_location(expenses: &[Expense]) -> Vec<&Expense> {
        expenses.iter().filter(|expense| expense.has_location()).collect()
    }

    /// Expenses that also carry coordinates, as `(expense, (lat, lng))`.
    pub fn pinned(expenses: &[Expense]) -> Vec<(&Expense, (f64, f64))> {
        expenses
            .iter()
            .filter_map(|expense| expense.coordinates().map(|coords| (expense, coords)))
            .collect()
    }

    pub fn find(expenses: &[Expense], id: ExpenseId) -> Option<&Expense> {
        expenses.iter().find(|expense| expense.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExpenseCategory, InsertExpense, NewExpense};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn expense(location: Option<&str>) -> Expense {
        let mut input = NewExpense::new(
            18.0,
            ExpenseCategory::Food,
            NaiveDate::from_ymd_opt(2024, 10, 5).unwrap(),
        );
        input.location_name = location.map(str::to_string);
        InsertExpense::new(Uuid::nil(), input).into_expense(Uuid::new_v4(), Utc::now())
    }

    #[test]
    fn keeps_only_named_locations() {
        let expenses = vec![expense(Some("Market Hall")), expense(None), expense(Some("  "))];
        let located = LocationService::with_location(&expenses);
        assert_eq!(located.len(), 1);
        assert_eq!(located[0].location_name.as_deref(), Some("Market Hall"));
    }

    #[test]
    fn pinned_requires_both_coordinates() {
        let mut half = expense(Some("Harbour"));
        half.location_lat = Some(51.5);
        let mut full = expense(Some("Station"));
        full.location_lat = Some(48.85);
        full.location_lng = Some(2.35);
        let expenses = vec![half, full.clone()];
        let pins = LocationService::pinned(&expenses);
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].0.id, full.id);
        assert_eq!(pins[0].1, (48.85, 2.35));
    }

    #[test]
    fn find_by_id() {
        let expenses = vec![expense(None), expense(Some("Library"))];
        let target = expenses[1].id;
        assert_eq!(LocationService::find(&expenses, target).map(|e| e.id), Some(target));
        assert!(LocationService::find(&expenses, Uuid::new_v4()).is_none());
    }
}
