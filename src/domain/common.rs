use uuid::Uuid;

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Identifier of the authenticated user owning a ledger.
pub type OwnerId = Uuid;

/// Store-assigned expense identifier.
pub type ExpenseId = Uuid;
