//! The statistics tools.
//!
//! One [`StatsTool`] per analysis over the shared [`DataStore`]. Output text
//! mirrors what the rest of the agent (and its tests) expect: a short stats
//! line or table, plus a `[VISUALIZATION]: <path>` marker for the analyses
//! that render a chart. A chart render failure degrades to text-only output
//! rather than failing the tool.

use std::path::PathBuf;
use std::sync::Arc;

use super::charts::render_bar_chart;
use super::dataset::{CustomerRecord, DataStore};
use super::errors::ToolError;
use super::model::{train_churn_forest, TOP_FACTORS};
use super::AnalysisTool;

/// The closed set of statistics analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analysis {
    Summary,
    DeliveryImpact,
    ChannelPerformance,
    CityPerformance,
    Demographics,
    Engagement,
    PredictiveModel,
}

impl Analysis {
    /// Every analysis, in registry order.
    pub const ALL: [Analysis; 7] = [
        Analysis::Summary,
        Analysis::DeliveryImpact,
        Analysis::ChannelPerformance,
        Analysis::CityPerformance,
        Analysis::Demographics,
        Analysis::Engagement,
        Analysis::PredictiveModel,
    ];

    pub fn tool_name(self) -> &'static str {
        match self {
            Analysis::Summary => "get_data_summary",
            Analysis::DeliveryImpact => "analyze_delivery_impact",
            Analysis::ChannelPerformance => "analyze_channel_performance",
            Analysis::CityPerformance => "analyze_city_performance",
            Analysis::Demographics => "analyze_demographics",
            Analysis::Engagement => "analyze_engagement",
            Analysis::PredictiveModel => "train_predictive_model",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Analysis::Summary => {
                "Get high-level summary statistics of the data (churn rate, total revenue)."
            }
            Analysis::DeliveryImpact => "Analyze and visualize if delivery time impacts churn.",
            Analysis::ChannelPerformance => {
                "Analyze and visualize churn rates by acquisition channel."
            }
            Analysis::CityPerformance => "Analyze churn rates by city/region.",
            Analysis::Demographics => "Analyze impact of gender on churn.",
            Analysis::Engagement => "Analyze site visit behavior impacting churn.",
            Analysis::PredictiveModel => {
                "Train a Machine Learning model to find the top statistical drivers of churn."
            }
        }
    }
}

/// A statistics tool bound to the shared dataset and plot directory.
pub struct StatsTool {
    analysis: Analysis,
    store: Arc<DataStore>,
    plot_dir: PathBuf,
}

impl StatsTool {
    pub fn new(analysis: Analysis, store: Arc<DataStore>, plot_dir: PathBuf) -> Self {
        Self {
            analysis,
            store,
            plot_dir,
        }
    }
}

/// Build the full statistics tool set over one dataset.
pub fn standard_tools(store: Arc<DataStore>, plot_dir: PathBuf) -> Vec<Box<dyn AnalysisTool>> {
    Analysis::ALL
        .iter()
        .map(|&analysis| {
            Box::new(StatsTool::new(analysis, Arc::clone(&store), plot_dir.clone()))
                as Box<dyn AnalysisTool>
        })
        .collect()
}

impl AnalysisTool for StatsTool {
    fn name(&self) -> &'static str {
        self.analysis.tool_name()
    }

    fn description(&self) -> &'static str {
        self.analysis.description()
    }

    fn invoke(&self, _args: &serde_json::Value) -> Result<String, ToolError> {
        let records = self.store.records()?;
        match self.analysis {
            Analysis::Summary => Ok(summarize(records)),
            Analysis::DeliveryImpact => Ok(self.delivery_impact(records)),
            Analysis::ChannelPerformance => Ok(self.channel_performance(records)),
            Analysis::CityPerformance => Ok(city_performance(records)),
            Analysis::Demographics => Ok(demographics(records)),
            Analysis::Engagement => Ok(self.engagement(records)),
            Analysis::PredictiveModel => self.predictive_model(records),
        }
    }
}

impl StatsTool {
    fn delivery_impact(&self, records: &[CustomerRecord]) -> String {
        let (churned, retained) = mean_by_churn(records, |r| r.avg_delivery_days);
        let text = format!(
            "Delivery Analysis: Churned ({churned:.1} days) vs Retained ({retained:.1} days)."
        );
        self.with_chart(
            text,
            "delivery_impact",
            "Avg Delivery Days: Retained vs Churned",
            vec![
                ("Retained".to_string(), retained),
                ("Churned".to_string(), churned),
            ],
        )
    }

    fn channel_performance(&self, records: &[CustomerRecord]) -> String {
        let rates = churn_rate_by(records, |r| r.signup_channel.clone());
        let text = format!("Channel Analysis:\n{}", format_rate_table(&rates));
        self.with_chart(text, "channel_churn", "Churn Rate by Channel", rates)
    }

    fn engagement(&self, records: &[CustomerRecord]) -> String {
        let (churned, retained) = mean_by_churn(records, |r| r.monthly_visits);
        let text =
            format!("Engagement: Churned ({churned:.1}) vs Retained ({retained:.1}) visits.");
        self.with_chart(
            text,
            "engagement_impact",
            "Monthly Visits: Retained vs Churned",
            vec![
                ("Retained".to_string(), retained),
                ("Churned".to_string(), churned),
            ],
        )
    }

    fn predictive_model(&self, records: &[CustomerRecord]) -> Result<String, ToolError> {
        let ranked = train_churn_forest(records)?;
        let top: Vec<(String, f64)> = ranked.into_iter().take(TOP_FACTORS).collect();
        let text = format!("Model Trained. Top Factors:\n{}", format_rate_table(&top));
        Ok(self.with_chart(text, "feature_importance", "Top Churn Drivers", top))
    }

    /// Append the `[VISUALIZATION]` marker if the chart renders; log and
    /// degrade to text-only if it doesn't.
    fn with_chart(
        &self,
        text: String,
        file_stem: &str,
        title: &str,
        bars: Vec<(String, f64)>,
    ) -> String {
        match render_bar_chart(&self.plot_dir, file_stem, title, &bars) {
            Ok(path) => format!("{text}\n[VISUALIZATION]: {}", path.display()),
            Err(e) => {
                tracing::warn!(error = %e, tool = self.name(), "chart render failed");
                text
            }
        }
    }
}

// ─── Chartless analyses ─────────────────────────────────────────────────────

fn summarize(records: &[CustomerRecord]) -> String {
    let count = records.len();
    let churn_rate = if count > 0 {
        records.iter().filter(|r| r.is_churned).count() as f64 / count as f64 * 100.0
    } else {
        0.0
    };
    let revenue: f64 = records.iter().map(|r| r.total_revenue).sum();
    format!(
        "Summary: {count} Customers, {churn_rate:.2}% Churn Rate, Total Revenue: INR {}",
        group_thousands(revenue)
    )
}

fn city_performance(records: &[CustomerRecord]) -> String {
    let rates = churn_rate_by(records, |r| r.city.clone());
    format!("Churn by City:\n{}", format_rate_table(&rates))
}

fn demographics(records: &[CustomerRecord]) -> String {
    let rates = churn_rate_by(records, |r| r.gender.clone());
    format!("Churn by Gender:\n{}", format_rate_table(&rates))
}

// ─── Aggregation helpers ────────────────────────────────────────────────────

/// Mean of `value` over churned and retained customers, in that order.
/// An empty group yields 0.0 rather than NaN.
fn mean_by_churn(
    records: &[CustomerRecord],
    value: impl Fn(&CustomerRecord) -> f64,
) -> (f64, f64) {
    let mut sums = [0.0_f64; 2];
    let mut counts = [0usize; 2];
    for record in records {
        let slot = usize::from(!record.is_churned);
        sums[slot] += value(record);
        counts[slot] += 1;
    }
    let mean = |slot: usize| {
        if counts[slot] > 0 {
            sums[slot] / counts[slot] as f64
        } else {
            0.0
        }
    };
    (mean(0), mean(1))
}

/// Churn rate per group value, sorted descending by rate.
fn churn_rate_by(
    records: &[CustomerRecord],
    key: impl Fn(&CustomerRecord) -> String,
) -> Vec<(String, f64)> {
    let mut counts: std::collections::BTreeMap<String, (usize, usize)> =
        std::collections::BTreeMap::new();
    for record in records {
        let entry = counts.entry(key(record)).or_default();
        entry.0 += 1;
        if record.is_churned {
            entry.1 += 1;
        }
    }
    let mut rates: Vec<(String, f64)> = counts
        .into_iter()
        .map(|(name, (total, churned))| (name, churned as f64 / total as f64))
        .collect();
    rates.sort_by(|a, b| b.1.total_cmp(&a.1));
    rates
}

fn format_rate_table(rows: &[(String, f64)]) -> String {
    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(name, value)| format!("{name:<width$}  {value:.4}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `1234567.0` → `"1,234,567"`.
fn group_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> Arc<DataStore> {
        let dir = tempfile::tempdir().unwrap();
        crate::tools::dataset::tests::write_sample_dataset(dir.path());
        Arc::new(DataStore::load(dir.path()))
    }

    fn tool(analysis: Analysis, store: Arc<DataStore>) -> StatsTool {
        let plot_dir = tempfile::tempdir().unwrap().keep();
        StatsTool::new(analysis, store, plot_dir)
    }

    #[test]
    fn summary_reports_count_rate_and_revenue() {
        let out = tool(Analysis::Summary, sample_store())
            .invoke(&serde_json::json!({}))
            .unwrap();
        // 4 customers, 2 churned, 4400 total revenue
        assert_eq!(out, "Summary: 4 Customers, 50.00% Churn Rate, Total Revenue: INR 4,400");
    }

    #[test]
    fn delivery_impact_compares_means_and_links_chart() {
        let out = tool(Analysis::DeliveryImpact, sample_store())
            .invoke(&serde_json::json!({}))
            .unwrap();
        // Churned: C002 (9 days) + C004 (0, no orders) → 4.5; retained: C001 4.0 + C003 2.0 → 3.0
        assert!(out.starts_with("Delivery Analysis: Churned (4.5 days) vs Retained (3.0 days)."));
        assert!(out.contains("[VISUALIZATION]: "));
        assert!(out.contains("delivery_impact.svg"));
    }

    #[test]
    fn channel_performance_sorts_descending() {
        let out = tool(Analysis::ChannelPerformance, sample_store())
            .invoke(&serde_json::json!({}))
            .unwrap();
        // Paid Ads churn 1.0, Organic 0.0, Referral 0.0
        let paid = out.find("Paid Ads").unwrap();
        let organic = out.find("Organic").unwrap();
        assert!(paid < organic, "highest churn channel should come first");
        assert!(out.contains("1.0000"));
    }

    #[test]
    fn city_performance_has_no_chart() {
        let out = tool(Analysis::CityPerformance, sample_store())
            .invoke(&serde_json::json!({}))
            .unwrap();
        assert!(out.starts_with("Churn by City:"));
        assert!(!out.contains("[VISUALIZATION]"));
    }

    #[test]
    fn demographics_groups_by_gender() {
        let out = tool(Analysis::Demographics, sample_store())
            .invoke(&serde_json::json!({}))
            .unwrap();
        assert!(out.starts_with("Churn by Gender:"));
        assert!(out.contains("Male"));
        assert!(out.contains("Female"));
    }

    #[test]
    fn unavailable_data_is_an_error_not_a_panic() {
        let store = Arc::new(DataStore::unavailable("disk gone"));
        let err = tool(Analysis::Summary, store)
            .invoke(&serde_json::json!({}))
            .unwrap_err();
        assert!(err.to_string().starts_with("Error: Data not loaded."));
    }

    #[test]
    fn chart_failure_degrades_to_text_only() {
        let store = sample_store();
        // /dev/null/... is not creatable as a directory on any platform we run on
        let tool = StatsTool::new(
            Analysis::DeliveryImpact,
            store,
            PathBuf::from("/dev/null/plots"),
        );
        let out = tool.invoke(&serde_json::json!({})).unwrap();
        assert!(out.starts_with("Delivery Analysis:"));
        assert!(!out.contains("[VISUALIZATION]"));
    }

    #[test]
    fn group_thousands_groups_western_style() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(4400.0), "4,400");
        assert_eq!(group_thousands(1234567.4), "1,234,567");
    }

    #[test]
    fn mean_by_churn_handles_empty_group() {
        let records: Vec<CustomerRecord> = Vec::new();
        let (churned, retained) = mean_by_churn(&records, |r| r.monthly_visits);
        assert_eq!((churned, retained), (0.0, 0.0));
    }
}
