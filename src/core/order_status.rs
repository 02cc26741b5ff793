//! Purchase order status progression.
//!
//! Orders move through a fixed linear sequence
//! `pre_order -> issued -> received -> paid`. There is no rollback and no
//! branching; `paid` is terminal.

use crate::entities::OrderStatus;

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const SEQUENCE: [Self; 4] = [Self::PreOrder, Self::Issued, Self::Received, Self::Paid];

    /// The status that follows this one, or `None` for `Paid`.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::PreOrder => Some(Self::Issued),
            Self::Issued => Some(Self::Received),
            Self::Received => Some(Self::Paid),
            Self::Paid => None,
        }
    }

    /// Whether the order has reached the end of its lifecycle.
    #[must_use]
    pub const fn is_final(self) -> bool {
        self.next().is_none()
    }

    /// Whether line items may still be edited.
    #[must_use]
    pub const fn allows_item_changes(self) -> bool {
        matches!(self, Self::PreOrder)
    }

    /// Label shown to users.
    #[must_use]
    pub const fn label_es(self) -> &'static str {
        match self {
            Self::PreOrder => "Pre-orden",
            Self::Issued => "Emitida",
            Self::Received => "Recibida",
            Self::Paid => "Pagada",
        }
    }
}
