//! Customer dataset loading and merging.
//!
//! Builds the customer-360 view the analysis tools query: four source CSVs
//! (customers, orders, engagement, churn labels) merged into one record per
//! customer. Orders are aggregated per customer before the join; customers
//! with no orders get zeroed aggregates, matching a left join.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::errors::ToolError;

// ─── Source rows ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CustomerRow {
    customer_id: String,
    gender: String,
    city: String,
    signup_channel: String,
    age: f64,
}

#[derive(Debug, Deserialize)]
struct OrderRow {
    #[allow(dead_code)]
    order_id: String,
    customer_id: String,
    order_value: f64,
    delivery_days: f64,
    /// `"Yes"` / `"No"` in the source data.
    discount_applied: String,
}

#[derive(Debug, Deserialize)]
struct EngagementRow {
    customer_id: String,
    monthly_visits: f64,
}

#[derive(Debug, Deserialize)]
struct ChurnLabelRow {
    customer_id: String,
    is_churned: u8,
}

// ─── Merged view ────────────────────────────────────────────────────────────

/// One row of the merged customer-360 view.
#[derive(Debug, Clone)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub gender: String,
    pub city: String,
    pub signup_channel: String,
    pub age: f64,
    pub is_churned: bool,
    pub monthly_visits: f64,
    pub total_orders: f64,
    pub total_revenue: f64,
    pub avg_delivery_days: f64,
    pub discount_count: f64,
}

/// Names of the numeric feature columns, in the order `features()` emits them.
pub const FEATURE_NAMES: [&str; 6] = [
    "age",
    "monthly_visits",
    "total_orders",
    "total_revenue",
    "avg_delivery_days",
    "discount_count",
];

impl CustomerRecord {
    /// The numeric feature vector used by the churn model.
    pub fn features(&self) -> [f64; 6] {
        [
            self.age,
            self.monthly_visits,
            self.total_orders,
            self.total_revenue,
            self.avg_delivery_days,
            self.discount_count,
        ]
    }
}

/// Dependency-injected holder of the merged dataset.
///
/// Loading is best-effort: a failed load leaves the store empty and every
/// tool call then returns the data-unavailable error text instead of
/// failing the agent.
pub struct DataStore {
    records: Option<Vec<CustomerRecord>>,
    load_error: Option<String>,
}

impl DataStore {
    /// Load and merge the four source CSVs under `data_dir`.
    pub fn load(data_dir: &Path) -> Self {
        match load_records(data_dir) {
            Ok(records) => {
                tracing::info!(
                    customers = records.len(),
                    data_dir = %data_dir.display(),
                    "customer dataset loaded"
                );
                Self {
                    records: Some(records),
                    load_error: None,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, data_dir = %data_dir.display(), "dataset load failed");
                Self {
                    records: None,
                    load_error: Some(e.to_string()),
                }
            }
        }
    }

    /// An empty store, as if the load had failed. Test seam.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            records: None,
            load_error: Some(reason.into()),
        }
    }

    /// Build a store directly from merged records. Test seam.
    pub fn from_records(records: Vec<CustomerRecord>) -> Self {
        Self {
            records: Some(records),
            load_error: None,
        }
    }

    /// The merged records, or the load error if the dataset is unavailable.
    pub fn records(&self) -> Result<&[CustomerRecord], ToolError> {
        match &self.records {
            Some(records) => Ok(records),
            None => Err(ToolError::DataUnavailable {
                reason: self
                    .load_error
                    .clone()
                    .unwrap_or_else(|| "dataset was never loaded".to_string()),
            }),
        }
    }
}

// ─── Loading and merging ────────────────────────────────────────────────────

/// Per-customer order aggregates (count, revenue sum, mean delivery, discounts).
#[derive(Debug, Default, Clone, Copy)]
struct OrderAggregate {
    total_orders: f64,
    total_revenue: f64,
    delivery_days_sum: f64,
    discount_count: f64,
}

fn load_records(data_dir: &Path) -> Result<Vec<CustomerRecord>, ToolError> {
    let customers: Vec<CustomerRow> = read_csv(data_dir, "customers.csv")?;
    let orders: Vec<OrderRow> = read_csv(data_dir, "orders.csv")?;
    let engagement: Vec<EngagementRow> = read_csv(data_dir, "customer_engagement.csv")?;
    let labels: Vec<ChurnLabelRow> = read_csv(data_dir, "churn_labels.csv")?;

    let mut order_agg: HashMap<String, OrderAggregate> = HashMap::new();
    for order in &orders {
        let agg = order_agg.entry(order.customer_id.clone()).or_default();
        agg.total_orders += 1.0;
        agg.total_revenue += order.order_value;
        agg.delivery_days_sum += order.delivery_days;
        if order.discount_applied.eq_ignore_ascii_case("yes") {
            agg.discount_count += 1.0;
        }
    }

    let visits: HashMap<&str, f64> = engagement
        .iter()
        .map(|e| (e.customer_id.as_str(), e.monthly_visits))
        .collect();
    let churned: HashMap<&str, bool> = labels
        .iter()
        .map(|l| (l.customer_id.as_str(), l.is_churned != 0))
        .collect();

    // Inner join on labels and engagement, left join on order aggregates.
    let mut records = Vec::with_capacity(customers.len());
    for customer in customers {
        let (Some(&is_churned), Some(&monthly_visits)) = (
            churned.get(customer.customer_id.as_str()),
            visits.get(customer.customer_id.as_str()),
        ) else {
            tracing::debug!(
                customer_id = %customer.customer_id,
                "skipping customer without label or engagement row"
            );
            continue;
        };

        let agg = order_agg
            .get(customer.customer_id.as_str())
            .copied()
            .unwrap_or_default();
        let avg_delivery_days = if agg.total_orders > 0.0 {
            agg.delivery_days_sum / agg.total_orders
        } else {
            0.0
        };

        records.push(CustomerRecord {
            customer_id: customer.customer_id,
            gender: customer.gender,
            city: customer.city,
            signup_channel: customer.signup_channel,
            age: customer.age,
            is_churned,
            monthly_visits,
            total_orders: agg.total_orders,
            total_revenue: agg.total_revenue,
            avg_delivery_days,
            discount_count: agg.discount_count,
        });
    }

    Ok(records)
}

fn read_csv<T: serde::de::DeserializeOwned>(
    data_dir: &Path,
    file: &str,
) -> Result<Vec<T>, ToolError> {
    let path = data_dir.join(file);
    let mut reader = csv::Reader::from_path(&path).map_err(|e| ToolError::CsvError {
        file: file.to_string(),
        reason: e.to_string(),
    })?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: T = result.map_err(|e| ToolError::CsvError {
            file: file.to_string(),
            reason: e.to_string(),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Write a minimal but complete four-file dataset into `dir`.
    pub(crate) fn write_sample_dataset(dir: &Path) {
        std::fs::write(
            dir.join("customers.csv"),
            "customer_id,gender,city,signup_channel,age\n\
             C001,Female,Mumbai,Organic,31\n\
             C002,Male,Delhi,Paid Ads,45\n\
             C003,Female,Bangalore,Referral,27\n\
             C004,Male,Mumbai,Paid Ads,38\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("orders.csv"),
            "order_id,customer_id,order_value,delivery_days,discount_applied\n\
             O1,C001,1200,3,Yes\n\
             O2,C001,800,5,No\n\
             O3,C002,2400,9,Yes\n\
             O4,C003,400,2,No\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("customer_engagement.csv"),
            "customer_id,monthly_visits\nC001,14\nC002,3\nC003,22\nC004,6\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("churn_labels.csv"),
            "customer_id,is_churned\nC001,0\nC002,1\nC003,0\nC004,1\n",
        )
        .unwrap();
    }

    #[test]
    fn load_merges_all_four_files() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_dataset(dir.path());

        let store = DataStore::load(dir.path());
        let records = store.records().unwrap();
        assert_eq!(records.len(), 4);

        let c001 = records.iter().find(|r| r.customer_id == "C001").unwrap();
        assert_eq!(c001.total_orders, 2.0);
        assert_eq!(c001.total_revenue, 2000.0);
        assert_eq!(c001.avg_delivery_days, 4.0);
        assert_eq!(c001.discount_count, 1.0);
        assert!(!c001.is_churned);
    }

    #[test]
    fn customer_without_orders_gets_zero_aggregates() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_dataset(dir.path());

        let store = DataStore::load(dir.path());
        let records = store.records().unwrap();
        let c004 = records.iter().find(|r| r.customer_id == "C004").unwrap();
        assert_eq!(c004.total_orders, 0.0);
        assert_eq!(c004.total_revenue, 0.0);
        assert_eq!(c004.avg_delivery_days, 0.0);
        assert_eq!(c004.discount_count, 0.0);
        // Non-order fields still come through the join
        assert_eq!(c004.monthly_visits, 6.0);
        assert!(c004.is_churned);
    }

    #[test]
    fn customer_missing_label_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_dataset(dir.path());
        // Extra customer with no label or engagement row
        let mut customers =
            std::fs::read_to_string(dir.path().join("customers.csv")).unwrap();
        customers.push_str("C999,Male,Pune,Organic,50\n");
        std::fs::write(dir.path().join("customers.csv"), customers).unwrap();

        let store = DataStore::load(dir.path());
        let records = store.records().unwrap();
        assert!(records.iter().all(|r| r.customer_id != "C999"));
    }

    #[test]
    fn missing_directory_becomes_data_unavailable() {
        let store = DataStore::load(Path::new("/nonexistent/shopease/data"));
        let err = store.records().unwrap_err();
        assert!(matches!(err, ToolError::DataUnavailable { .. }));
    }

    #[test]
    fn feature_vector_matches_feature_names_order() {
        let record = CustomerRecord {
            customer_id: "C1".into(),
            gender: "Female".into(),
            city: "Mumbai".into(),
            signup_channel: "Organic".into(),
            age: 30.0,
            is_churned: false,
            monthly_visits: 10.0,
            total_orders: 4.0,
            total_revenue: 999.0,
            avg_delivery_days: 3.5,
            discount_count: 2.0,
        };
        let features = record.features();
        assert_eq!(features.len(), FEATURE_NAMES.len());
        assert_eq!(features[FEATURE_NAMES.iter().position(|&n| n == "total_revenue").unwrap()], 999.0);
    }
}
