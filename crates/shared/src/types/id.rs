//! Typed IDs for type-safe references to external records.
//!
//! The trigger source and the accounting backend both assign opaque string
//! identifiers. Typed wrappers prevent accidentally passing a `DealId` where
//! a `DocumentId` is expected.

use serde::{Deserialize, Serialize};

/// Macro to generate typed string-ID wrappers.
macro_rules! external_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Creates an ID from any string-like value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the wrapper and returns the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

external_id!(DealId, "Identifier of a deal record in the trigger source.");
external_id!(
    DocumentId,
    "Identifier of a document, assigned by the accounting backend."
);
external_id!(
    DocumentNumber,
    "Human-readable document number, assigned by the accounting backend."
);
