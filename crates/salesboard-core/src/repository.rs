//! Persistence seam for sale records.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::db::{self, DbPool};
use crate::error::RepositoryError;
use crate::filter::{Filter, ListQuery};
use crate::model::{NewSaleRecord, SaleRecord};

/// Rows per bulk `INSERT`; keeps bind parameters well under the Postgres limit of 65535.
const INSERT_CHUNK_SIZE: usize = 1000;

const SELECT_RECORDS: &str = "SELECT id, title, description, category, price, image, sold, date_of_sale, created_at FROM transactions";

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Replace every stored record with `records` as one unit; returns the number inserted.
    async fn replace_all(&self, records: &[NewSaleRecord]) -> Result<u64, RepositoryError>;

    /// One page of the month's records, optionally narrowed by a search term.
    async fn list(&self, query: &ListQuery) -> Result<Vec<SaleRecord>, RepositoryError>;

    /// Sum of `price` over matching records; zero when nothing matches.
    async fn sum_price(&self, filter: &Filter) -> Result<f64, RepositoryError>;

    async fn count(&self, filter: &Filter) -> Result<i64, RepositoryError>;

    /// Record counts grouped by category; `None` stands for a null category.
    async fn category_counts(
        &self,
        filter: &Filter,
    ) -> Result<Vec<(Option<String>, i64)>, RepositoryError>;
}

#[derive(Clone)]
pub struct PostgresRepository {
    pool: DbPool,
}

impl PostgresRepository {
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, RepositoryError> {
        let pool = db::connect(database_url, max_connections).await?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        db::run_migrations(&self.pool).await
    }
}

#[async_trait]
impl TransactionRepository for PostgresRepository {
    async fn replace_all(&self, records: &[NewSaleRecord]) -> Result<u64, RepositoryError> {
        let created_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("TRUNCATE TABLE transactions")
            .execute(&mut *tx)
            .await?;

        let mut inserted = 0;
        for (index, chunk) in records.chunks(INSERT_CHUNK_SIZE).enumerate() {
            let first_seq = (index * INSERT_CHUNK_SIZE) as i64;
            let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
                "INSERT INTO transactions (id, seq, title, description, category, price, image, sold, date_of_sale, created_at) ",
            );
            builder.push_values(chunk.iter().zip(first_seq..), |mut row, (record, seq)| {
                row.push_bind(Uuid::new_v4())
                    .push_bind(seq)
                    .push_bind(record.title.clone())
                    .push_bind(record.description.clone())
                    .push_bind(record.category.clone())
                    .push_bind(record.price)
                    .push_bind(record.image.clone())
                    .push_bind(record.sold)
                    .push_bind(record.date_of_sale)
                    .push_bind(created_at);
            });
            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        debug!(inserted, "committed transactional replace");
        Ok(inserted)
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<SaleRecord>, RepositoryError> {
        let filter = query.filter();
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(SELECT_RECORDS);
        filter.push_where(&mut builder);
        builder
            .push(" ORDER BY seq, id LIMIT ")
            .push_bind(query.pagination.limit())
            .push(" OFFSET ")
            .push_bind(query.pagination.offset());

        let records = builder
            .build_query_as::<SaleRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn sum_price(&self, filter: &Filter) -> Result<f64, RepositoryError> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COALESCE(SUM(price), 0) FROM transactions");
        filter.push_where(&mut builder);

        let total = builder
            .build_query_scalar::<f64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn count(&self, filter: &Filter) -> Result<i64, RepositoryError> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM transactions");
        filter.push_where(&mut builder);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn category_counts(
        &self,
        filter: &Filter,
    ) -> Result<Vec<(Option<String>, i64)>, RepositoryError> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT category, COUNT(*) AS item_count FROM transactions");
        filter.push_where(&mut builder);
        builder.push(" GROUP BY category ORDER BY category");

        let rows = builder
            .build_query_as::<(Option<String>, i64)>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
