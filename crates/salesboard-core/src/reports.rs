//! Month-scoped aggregate reports: statistics, price histogram and category breakdown.

use std::collections::BTreeMap;

use futures::future::try_join_all;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::error::RepositoryError;
use crate::filter::{Filter, Month};
use crate::repository::TransactionRepository;

/// Key under which records with a null category are counted.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Half-open price range `[min, max)`; `max: None` is unbounded above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBucket {
    pub min: f64,
    pub max: Option<f64>,
    pub label: &'static str,
}

impl PriceBucket {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && self.max.map_or(true, |max| price < max)
    }

    fn filter(&self, month: Month) -> Filter {
        Filter::for_month(month).price_range(self.min, self.max)
    }
}

// Prices in (100, 101) fall between the first two buckets and are not counted.
pub static PRICE_BUCKETS: &[PriceBucket] = &[
    PriceBucket { min: 0.0, max: Some(100.0), label: "0-100" },
    PriceBucket { min: 101.0, max: Some(200.0), label: "101-200" },
    PriceBucket { min: 201.0, max: Some(300.0), label: "201-300" },
    PriceBucket { min: 301.0, max: Some(400.0), label: "301-400" },
    PriceBucket { min: 401.0, max: Some(500.0), label: "401-500" },
    PriceBucket { min: 501.0, max: Some(600.0), label: "501-600" },
    PriceBucket { min: 601.0, max: Some(700.0), label: "601-700" },
    PriceBucket { min: 701.0, max: Some(800.0), label: "701-800" },
    PriceBucket { min: 801.0, max: Some(900.0), label: "801-900" },
    PriceBucket { min: 901.0, max: None, label: "901-above" },
];

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesStatistics {
    pub total_sale_amount: f64,
    pub total_sold_items: i64,
    pub total_not_sold_items: i64,
}

/// Bucket counts in [`PRICE_BUCKETS`] order; serializes as a JSON object keyed by label.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    buckets: Vec<(&'static str, i64)>,
}

impl BarChart {
    pub fn get(&self, label: &str) -> Option<i64> {
        self.buckets
            .iter()
            .find(|(bucket, _)| *bucket == label)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, i64)> + '_ {
        self.buckets.iter().copied()
    }

    pub fn total(&self) -> i64 {
        self.buckets.iter().map(|(_, count)| count).sum()
    }
}

impl Serialize for BarChart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (label, count) in &self.buckets {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

/// Record counts per category, ordered by category name.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct PieChart(BTreeMap<String, i64>);

impl PieChart {
    pub fn get(&self, category: &str) -> Option<i64> {
        self.0.get(category).copied()
    }

    pub fn total(&self) -> i64 {
        self.0.values().sum()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedReport {
    pub pie_chart: PieChart,
    pub bar_chart: BarChart,
    pub statistics: SalesStatistics,
}

pub async fn statistics<R>(repository: &R, month: Month) -> Result<SalesStatistics, RepositoryError>
where
    R: TransactionRepository + ?Sized,
{
    let sold = Filter::for_month(month).sold(true);
    let not_sold = Filter::for_month(month).sold(false);

    let (total_sale_amount, total_sold_items, total_not_sold_items) = futures::try_join!(
        repository.sum_price(&sold),
        repository.count(&sold),
        repository.count(&not_sold),
    )?;

    Ok(SalesStatistics {
        total_sale_amount,
        total_sold_items,
        total_not_sold_items,
    })
}

/// One count query per bucket, issued concurrently.
pub async fn bar_chart<R>(repository: &R, month: Month) -> Result<BarChart, RepositoryError>
where
    R: TransactionRepository + ?Sized,
{
    let counts = try_join_all(PRICE_BUCKETS.iter().map(|bucket| {
        let filter = bucket.filter(month);
        async move { repository.count(&filter).await }
    }))
    .await?;

    let buckets = PRICE_BUCKETS
        .iter()
        .zip(counts)
        .map(|(bucket, count)| (bucket.label, count))
        .collect();
    debug!(%month, "computed price histogram");
    Ok(BarChart { buckets })
}

pub async fn pie_chart<R>(repository: &R, month: Month) -> Result<PieChart, RepositoryError>
where
    R: TransactionRepository + ?Sized,
{
    let rows = repository.category_counts(&Filter::for_month(month)).await?;

    let mut counts = BTreeMap::new();
    for (category, count) in rows {
        let key = category.unwrap_or_else(|| UNCATEGORIZED.to_string());
        *counts.entry(key).or_insert(0) += count;
    }
    Ok(PieChart(counts))
}

/// All three reports from independent passes over the month.
pub async fn combined<R>(repository: &R, month: Month) -> Result<CombinedReport, RepositoryError>
where
    R: TransactionRepository + ?Sized,
{
    let (pie_chart, bar_chart, statistics) = futures::try_join!(
        pie_chart(repository, month),
        bar_chart(repository, month),
        statistics(repository, month),
    )?;

    Ok(CombinedReport {
        pie_chart,
        bar_chart,
        statistics,
    })
}
