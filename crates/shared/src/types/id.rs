//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `JournalId` where an `AccountId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(CompanyId, "Unique identifier for a company.");
typed_id!(
    AccountId,
    "Unique identifier for a chart of accounts entry."
);
typed_id!(AccountTypeId, "Unique identifier for an account type.");
typed_id!(AccountTagId, "Unique identifier for an account tag.");
typed_id!(JournalId, "Unique identifier for a journal.");
typed_id!(
    AnalyticAccountId,
    "Unique identifier for an analytic account."
);
typed_id!(AnalyticTagId, "Unique identifier for an analytic tag.");
typed_id!(OperatingUnitId, "Unique identifier for an operating unit.");
typed_id!(MoveId, "Unique identifier for a journal entry (move).");
typed_id!(LedgerLineId, "Unique identifier for a ledger (move) line.");
typed_id!(
    ReportLineId,
    "Unique identifier for a financial report line."
);

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
