//! The closed set of spending categories.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Spending category attached to every expense.
///
/// Declaration order is the canonical enumeration order; it drives `Ord`, the
/// iteration order of per-category maps and tie-breaking in rankings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Food,
    Transportation,
    Entertainment,
    Shopping,
    Utilities,
    Healthcare,
    Education,
    Travel,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 9] = [
        ExpenseCategory::Food,
        ExpenseCategory::Transportation,
        ExpenseCategory::Entertainment,
        ExpenseCategory::Shopping,
        ExpenseCategory::Utilities,
        ExpenseCategory::Healthcare,
        ExpenseCategory::Education,
        ExpenseCategory::Travel,
        ExpenseCategory::Other,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ExpenseCategory::Food => "food",
            ExpenseCategory::Transportation => "transportation",
            ExpenseCategory::Entertainment => "entertainment",
            ExpenseCategory::Shopping => "shopping",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Healthcare => "healthcare",
            ExpenseCategory::Education => "education",
            ExpenseCategory::Travel => "travel",
            ExpenseCategory::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExpenseCategory::Food => "Food & Dining",
            ExpenseCategory::Transportation => "Transportation",
            ExpenseCategory::Entertainment => "Entertainment",
            ExpenseCategory::Shopping => "Shopping",
            ExpenseCategory::Utilities => "Utilities",
            ExpenseCategory::Healthcare => "Healthcare",
            ExpenseCategory::Education => "Education",
            ExpenseCategory::Travel => "Travel",
            ExpenseCategory::Other => "Other",
        }
    }

    /// Chart colour used by the category breakdown.
    pub fn color(self) -> &'static str {
        match self {
            ExpenseCategory::Food => "#f97316",
            ExpenseCategory::Transportation => "#3b82f6",
            ExpenseCategory::Entertainment => "#a855f7",
            ExpenseCategory::Shopping => "#ec4899",
            ExpenseCategory::Utilities => "#06b6d4",
            ExpenseCategory::Healthcare => "#ef4444",
            ExpenseCategory::Education => "#6366f1",
            ExpenseCategory::Travel => "#10b981",
            ExpenseCategory::Other => "#71717a",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown expense category `{0}`")]
pub struct UnknownCategory(pub String);

impl FromStr for ExpenseCategory {
    type Err = UnknownCategory;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let needle = raw.trim().to_ascii_lowercase();
        ExpenseCategory::ALL
            .into_iter()
            .find(|category| category.slug() == needle)
            .ok_or_else(|| UnknownCategory(raw.to_string()))
    }
}
