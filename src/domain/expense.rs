//! Expense records and the request shapes used to create and edit them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::category::ExpenseCategory;
use crate::domain::common::{Displayable, ExpenseId, Identifiable, OwnerId};
use crate::errors::{LedgerError, LedgerResult};

/// A persisted expense as returned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: ExpenseId,
    #[serde(rename = "user_id")]
    pub owner: OwnerId,
    pub amount: f64,
    pub category: ExpenseCategory,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub location_lat: Option<f64>,
    #[serde(default)]
    pub location_lng: Option<f64>,
    /// Link to an uploaded receipt image. Carried through untouched.
    #[serde(default)]
    pub receipt_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Amount used for summation. Non-finite values coming back from the store count as zero.
    pub fn countable_amount(&self) -> f64 {
        if self.amount.is_finite() {
            self.amount
        } else {
            0.0
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.location_lat.zip(self.location_lng)
    }

    pub fn has_location(&self) -> bool {
        self.location_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }
}

impl Identifiable for Expense {
    fn id(&self) -> ExpenseId {
        self.id
    }
}

impl Displayable for Expense {
    fn display_label(&self) -> String {
        format!("expense:{} [{} {:.2} on {}]", self.id, self.category, self.amount, self.date)
    }
}

/// User-submitted data for a new expense.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewExpense {
    pub amount: f64,
    pub category: ExpenseCategory,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_lng: Option<f64>,
}

impl NewExpense {
    pub fn new(amount: f64, category: ExpenseCategory, date: NaiveDate) -> Self {
        Self {
            amount,
            category,
            date,
            description: None,
            location_name: None,
            location_lat: None,
            location_lng: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, name: impl Into<String>) -> Self {
        self.location_name = Some(name.into());
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.location_lat = Some(lat);
        self.location_lng = Some(lng);
        self
    }

    /// Checks the input and returns it with blank text fields dropped.
    pub fn validate(mut self) -> LedgerResult<Self> {
        validate_amount(self.amount)?;
        validate_coordinates(self.location_lat, self.location_lng)?;
        self.description = normalize_text(self.description);
        self.location_name = normalize_text(self.location_name);
        Ok(self)
    }
}

/// Store insert request: the new expense tagged with its owner.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InsertExpense {
    #[serde(rename = "user_id")]
    pub owner: OwnerId,
    #[serde(flatten)]
    pub expense: NewExpense,
}

impl InsertExpense {
    pub fn new(owner: OwnerId, expense: NewExpense) -> Self {
        Self { owner, expense }
    }

    /// Materialises the stored row once the store has assigned identity and timestamps.
    pub fn into_expense(self, id: ExpenseId, timestamp: DateTime<Utc>) -> Expense {
        let NewExpense {
            amount,
            category,
            date,
            description,
            location_name,
            location_lat,
            location_lng,
        } = self.expense;
        Expense {
            id,
            owner: self.owner,
            amount,
            category,
            description,
            date,
            location_name,
            location_lat,
            location_lng,
            receipt_url: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }
}

/// Partial update of an expense.
///
/// Nullable columns use `Option<Option<_>>`: `Some(None)` clears the value.
/// There is deliberately no owner, id or timestamp field.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ExpensePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ExpenseCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_lat: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_lng: Option<Option<f64>>,
}

impl ExpensePatch {
    pub fn amount(amount: f64) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }

    pub fn category(category: ExpenseCategory) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(mut self) -> LedgerResult<Self> {
        if self.is_empty() {
            return Err(LedgerError::Validation("nothing to update".into()));
        }
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        validate_coordinates(self.location_lat.flatten(), self.location_lng.flatten())?;
        self.description = self.description.map(normalize_text);
        self.location_name = self.location_name.map(normalize_text);
        Ok(self)
    }

    /// Overwrites the fields present in the patch.
    pub fn apply_to(&self, expense: &mut Expense) {
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(category) = self.category {
            expense.category = category;
        }
        if let Some(date) = self.date {
            expense.date = date;
        }
        if let Some(description) = &self.description {
            expense.description = description.clone();
        }
        if let Some(location_name) = &self.location_name {
            expense.location_name = location_name.clone();
        }
        if let Some(lat) = self.location_lat {
            expense.location_lat = lat;
        }
        if let Some(lng) = self.location_lng {
            expense.location_lng = lng;
        }
    }
}

pub(crate) fn validate_amount(amount: f64) -> LedgerResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(LedgerError::Validation(format!(
            "amount must be a positive number, got {amount}"
        )));
    }
    Ok(())
}

fn validate_coordinates(lat: Option<f64>, lng: Option<f64>) -> LedgerResult<()> {
    if let Some(lat) = lat {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(LedgerError::Validation(format!(
                "latitude {lat} is outside [-90, 90]"
            )));
        }
    }
    if let Some(lng) = lng {
        if !(-180.0..=180.0).contains(&lng) {
            return Err(LedgerError::Validation(format!(
                "longitude {lng} is outside [-180, 180]"
            )));
        }
    }
    Ok(())
}

fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
