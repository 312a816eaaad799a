//! Identifiers for offerings, subscriptions and access sessions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Get the string representation.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a provider offering.
    OfferingId
);

string_id!(
    /// Unique identifier for a consumer subscription to an offering.
    SubscriptionId
);

string_id!(
    /// Unique identifier for one access session under a subscription.
    SessionId
);

impl SessionId {
    /// Create a new random session ID.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Composite key identifying a session buffer: `"{subscription}_{session}"`.
pub fn session_key(subscription_id: &SubscriptionId, session_id: &SessionId) -> String {
    format!("{}_{}", subscription_id, session_id)
}
