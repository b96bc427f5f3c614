//! Third-party product feed: the upstream item shape and the HTTP adapter that fetches it.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;
use serde::{de, Deserialize, Deserializer};
use tracing::debug;

pub use reqwest::Url;

use crate::error::FeedError;
use crate::model::NewSaleRecord;

pub const DEFAULT_FEED_URL: &str = "https://s3.amazonaws.com/roxiler.com/product_transaction.json";

/// One item as published by the feed. Fields outside the sale model are dropped on decode.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "coerce_price")]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "coerce_bool")]
    pub sold: Option<bool>,
    #[serde(default, deserialize_with = "coerce_timestamp")]
    pub date_of_sale: Option<DateTime<Utc>>,
}

impl From<SourceItem> for NewSaleRecord {
    fn from(item: SourceItem) -> Self {
        NewSaleRecord {
            title: item.title,
            description: item.description,
            category: item.category,
            price: item.price,
            image: item.image,
            sold: item.sold,
            date_of_sale: item.date_of_sale,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Number(f64),
    Text(String),
}

fn coerce_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Number(value)) => Ok(Some(value)),
        Some(Scalar::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Scalar::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid price '{text}'"))),
        Some(Scalar::Bool(value)) => Err(de::Error::custom(format!("invalid price '{value}'"))),
    }
}

fn coerce_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Bool(value)) => Ok(Some(value)),
        Some(Scalar::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            "" => Ok(None),
            _ => Err(de::Error::custom(format!("invalid sold flag '{text}'"))),
        },
        Some(Scalar::Number(value)) => Err(de::Error::custom(format!("invalid sold flag '{value}'"))),
    }
}

fn coerce_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if text.trim().is_empty() {
        return Ok(None);
    }
    parse_timestamp(&text)
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("invalid dateOfSale '{text}'")))
}

/// Accepts RFC 3339 (any offset, normalised to UTC), a naive date-time taken as
/// UTC, or a bare date at midnight UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn decode_items(body: &[u8]) -> Result<Vec<SourceItem>, FeedError> {
    Ok(serde_json::from_slice(body)?)
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<SourceItem>, FeedError>;
}

/// Fetches the feed with a single HTTP GET.
pub struct HttpFeed {
    client: Client,
    url: Url,
}

impl HttpFeed {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn fetch(&self) -> Result<Vec<SourceItem>, FeedError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        debug!(url = %self.url, bytes = body.len(), "fetched feed body");
        decode_items(&body)
    }
}
