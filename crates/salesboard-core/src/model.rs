use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A single sale row as stored in the `transactions` table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub sold: Option<bool>,
    pub date_of_sale: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insert-side shape of a sale; identity and creation time are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewSaleRecord {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub sold: Option<bool>,
    pub date_of_sale: Option<DateTime<Utc>>,
}

impl NewSaleRecord {
    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> SaleRecord {
        SaleRecord {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            price: self.price,
            image: self.image,
            sold: self.sold,
            date_of_sale: self.date_of_sale,
            created_at,
        }
    }
}
