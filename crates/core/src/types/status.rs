//! Status enums for backend entities.

use serde::{Deserialize, Serialize};

/// Order lifecycle status as reported by the order service.
///
/// The backend enum is open-ended; statuses this client does not know about
/// are carried through verbatim rather than failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    #[serde(untagged)]
    Other(String),
}

impl OrderStatus {
    /// Whether the order has been settled.
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        matches!(self, Self::Paid)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Paid => write!(f, "PAID"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_statuses_deserialize() {
        let status: OrderStatus = serde_json::from_str(r#""PENDING""#).expect("valid");
        assert_eq!(status, OrderStatus::Pending);
        let status: OrderStatus = serde_json::from_str(r#""PAID""#).expect("valid");
        assert!(status.is_paid());
    }

    #[test]
    fn test_unknown_status_passes_through() {
        let status: OrderStatus = serde_json::from_str(r#""CANCELLED""#).expect("valid");
        assert_eq!(status, OrderStatus::Other("CANCELLED".to_string()));
        assert_eq!(status.to_string(), "CANCELLED");
    }

    #[test]
    fn test_status_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Paid).expect("serialize"),
            r#""PAID""#
        );
    }
}
