//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Moderation status of a deal.
///
/// Only `Approved` deals are visible on the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "okazje.deal_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Draft,
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for DealStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for DealStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("invalid deal status: {s}")),
        }
    }
}

/// Marketplace a product was imported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "okazje.product_source", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ProductSource {
    AliExpress,
    Manual,
}

impl std::fmt::Display for ProductSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AliExpress => write!(f, "ali_express"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deal_status_display_roundtrip() {
        for status in [
            DealStatus::Draft,
            DealStatus::Pending,
            DealStatus::Approved,
            DealStatus::Rejected,
        ] {
            assert_eq!(status.to_string().parse::<DealStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_deal_status_serde() {
        let json = serde_json::to_string(&DealStatus::Approved).expect("serialize");
        assert_eq!(json, "\"approved\"");
    }

    #[test]
    fn test_invalid_deal_status() {
        assert!("published".parse::<DealStatus>().is_err());
    }
}
