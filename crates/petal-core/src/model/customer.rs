// ── Customer domain types ──

use chrono::{DateTime, FixedOffset, Months, Utc};
use petal_api::Pagination;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::fallback::{FallbackQuery, FallbackResult};

/// Loyalty tier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CustomerStatus {
    #[default]
    Active,
    Vip,
    Inactive,
}

impl CustomerStatus {
    pub const VIP_MIN_ORDERS: u64 = 8;
    pub const VIP_MIN_SPENT: f64 = 200_000.0;
    pub const INACTIVE_AFTER_MONTHS: u32 = 3;

    /// Tier from order history: VIP by volume or spend, inactive when the
    /// last order is older than three months, active otherwise.
    pub fn derive(stats: &CustomerStats, now: DateTime<Utc>) -> Self {
        if stats.total_orders >= Self::VIP_MIN_ORDERS || stats.total_spent >= Self::VIP_MIN_SPENT {
            return Self::Vip;
        }
        let cutoff = now.checked_sub_months(Months::new(Self::INACTIVE_AFTER_MONTHS));
        match (stats.last_order_date, cutoff) {
            (Some(last), Some(cutoff)) if last < cutoff => Self::Inactive,
            _ => Self::Active,
        }
    }
}

/// Order statistics. Zeroed, never absent, when they could not be loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerStats {
    pub total_orders: u64,
    pub total_spent: f64,
    pub last_order_date: Option<DateTime<FixedOffset>>,
}

impl CustomerStats {
    /// Client-side statistics over a customer's orders.
    pub fn from_orders(orders: &[Order]) -> Self {
        Self {
            total_orders: u64::try_from(orders.len()).unwrap_or(u64::MAX),
            total_spent: orders.iter().map(|o| o.total).sum(),
            last_order_date: orders.iter().filter_map(|o| o.date).max(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub number: Option<String>,
    pub date: Option<DateTime<FixedOffset>>,
    pub total: f64,
    pub status: Option<String>,
    pub currency: Option<String>,
}

/// Identity fields plus statistics, merged from whichever source answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: u64,
    /// Best available display name.
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub login: Option<String>,
    pub member_since: Option<DateTime<FixedOffset>>,
    pub notes: Option<String>,
    pub address: Option<String>,
    pub stats: CustomerStats,
    pub status: CustomerStatus,
    /// Statistics could not be loaded and are zeroed.
    pub degraded: bool,
    /// Populated for detail lookups and the legacy path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orders: Vec<Order>,
}

/// Logical customer query served by the directory's fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerQuery {
    /// 1-based page of customers.
    Page {
        page: u32,
        limit: u32,
        only_with_orders: bool,
    },
    Detail {
        id: u64,
    },
}

impl CustomerQuery {
    pub fn is_detail(&self) -> bool {
        matches!(self, Self::Detail { .. })
    }
}

impl FallbackQuery for CustomerQuery {}

/// Customers plus pagination, when the source reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomerListing {
    pub customers: Vec<Customer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl CustomerListing {
    pub fn degraded_count(&self) -> usize {
        self.customers.iter().filter(|c| c.degraded).count()
    }
}

/// Tier counts over a sample of customers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CustomerSummary {
    pub total: usize,
    pub vip: usize,
    pub active: usize,
    pub inactive: usize,
    /// Customers counted with zeroed statistics.
    pub degraded: usize,
}

impl CustomerSummary {
    pub fn from_customers(customers: &[Customer]) -> Self {
        customers.iter().fold(
            Self {
                total: customers.len(),
                ..Self::default()
            },
            |mut acc, c| {
                match c.status {
                    CustomerStatus::Vip => acc.vip += 1,
                    CustomerStatus::Active => acc.active += 1,
                    CustomerStatus::Inactive => acc.inactive += 1,
                }
                acc.degraded += usize::from(c.degraded);
                acc
            },
        )
    }
}

impl FallbackResult for CustomerListing {
    fn is_empty_result(&self) -> bool {
        self.customers.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::timestamp::shop_offset;

    fn at(y: i32, m: u32, d: u32) -> DateTime<FixedOffset> {
        shop_offset().with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn order(id: u64, total: f64, date: Option<DateTime<FixedOffset>>) -> Order {
        Order {
            id,
            number: None,
            date,
            total,
            status: None,
            currency: None,
        }
    }

    #[test]
    fn stats_from_orders() {
        let orders = [
            order(1, 10_000.0, Some(at(2024, 1, 5))),
            order(2, 5_500.0, None),
            order(3, 7_000.0, Some(at(2024, 3, 1))),
        ];
        let stats = CustomerStats::from_orders(&orders);
        assert_eq!(stats.total_orders, 3);
        assert!((stats.total_spent - 22_500.0).abs() < f64::EPSILON);
        assert_eq!(stats.last_order_date, Some(at(2024, 3, 1)));
    }

    #[test]
    fn status_thresholds() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let by_count = CustomerStats {
            total_orders: 8,
            ..CustomerStats::default()
        };
        assert_eq!(CustomerStatus::derive(&by_count, now), CustomerStatus::Vip);

        let by_spend = CustomerStats {
            total_orders: 1,
            total_spent: 200_000.0,
            last_order_date: Some(at(2020, 1, 1)),
        };
        assert_eq!(CustomerStatus::derive(&by_spend, now), CustomerStatus::Vip);

        let lapsed = CustomerStats {
            total_orders: 2,
            total_spent: 30_000.0,
            last_order_date: Some(at(2024, 2, 1)),
        };
        assert_eq!(CustomerStatus::derive(&lapsed, now), CustomerStatus::Inactive);

        let recent = CustomerStats {
            last_order_date: Some(at(2024, 4, 1)),
            ..lapsed
        };
        assert_eq!(CustomerStatus::derive(&recent, now), CustomerStatus::Active);
        assert_eq!(
            CustomerStatus::derive(&CustomerStats::default(), now),
            CustomerStatus::Active
        );
    }

    #[test]
    fn summary_counts_tiers() {
        let customer = |id, status, degraded| Customer {
            id,
            name: format!("#{id}"),
            phone: None,
            email: None,
            login: None,
            member_since: None,
            notes: None,
            address: None,
            stats: CustomerStats::default(),
            status,
            degraded,
            orders: Vec::new(),
        };
        let customers = [
            customer(1, CustomerStatus::Vip, false),
            customer(2, CustomerStatus::Active, true),
            customer(3, CustomerStatus::Active, false),
            customer(4, CustomerStatus::Inactive, false),
        ];
        assert_eq!(
            CustomerSummary::from_customers(&customers),
            CustomerSummary {
                total: 4,
                vip: 1,
                active: 2,
                inactive: 1,
                degraded: 1,
            }
        );
    }

    #[test]
    fn status_parses_backend_text() {
        assert_eq!("vip".parse::<CustomerStatus>().unwrap(), CustomerStatus::Vip);
        assert_eq!("Inactive".parse::<CustomerStatus>().unwrap(), CustomerStatus::Inactive);
        assert!("gold".parse::<CustomerStatus>().is_err());
    }
}
