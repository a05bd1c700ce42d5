// [libs/domain/models/src/ids.rs]
//! Newtype identifiers, preferred over bare `String` throughout the
//! workspace so a caller can't accidentally pass an evidence id where an
//! inspector address is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(EvidenceId);
string_id!(WalletAddress);

impl EvidenceId {
    /// Extracts the monotonic counter out of `EVD-YYYY-NNNNN`.
    ///
    /// The counter is the last `-`-delimited segment; this mirrors
    /// `_make_evidence_box_key` in the original Python service, which
    /// tolerates malformed ids by falling back to `1` rather than
    /// panicking (the coordinator never constructs a malformed id
    /// itself, but box-key derivation must not panic on bad input).
    pub fn counter(&self) -> u64 {
        self.0
            .rsplit('-')
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1)
    }

    pub fn from_counter(year: i32, counter: u64) -> Self {
        Self(format!("EVD-{year}-{counter:05}"))
    }
}
