//! Typed predicates over sale records.
//!
//! A [`Filter`] is an ordered list of [`Clause`] values joined with `AND`. The
//! same filter renders to a parameterised SQL `WHERE` clause for Postgres and
//! evaluates in process through [`Filter::matches`], so both paths share one
//! definition of what a clause means.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use sqlx::{Postgres, QueryBuilder};

use crate::error::ParamError;
use crate::model::SaleRecord;

/// SQL expression extracting the calendar month of a sale, evaluated in UTC.
const SALE_MONTH_SQL: &str = "CAST(EXTRACT(MONTH FROM date_of_sale AT TIME ZONE 'UTC') AS INTEGER)";

/// Calendar month, 1 through 12, irrespective of year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month(u32);

impl Month {
    pub fn new(value: u32) -> Result<Self, ParamError> {
        if (1..=12).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ParamError::InvalidMonth(value.to_string()))
        }
    }

    pub fn number(self) -> u32 {
        self.0
    }

    pub fn contains(self, timestamp: &DateTime<Utc>) -> bool {
        timestamp.month() == self.0
    }
}

impl FromStr for Month {
    type Err = ParamError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let number = trimmed
            .parse::<u32>()
            .map_err(|_| ParamError::InvalidMonth(trimmed.to_string()))?;
        Self::new(number)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const DEFAULT_PER_PAGE: i64 = 10;

/// One-based page window.
///
/// Page numbers below one are clamped to the first page and a non-positive
/// page size falls back to [`DEFAULT_PER_PAGE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    per_page: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let per_page = match per_page {
            Some(size) if size > 0 => size,
            _ => DEFAULT_PER_PAGE,
        };
        Self { page, per_page }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Free-text search input, normalised once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTerm {
    raw: String,
    lowered: String,
    numeric: Option<f64>,
}

impl SearchTerm {
    /// Returns `None` for blank input, which means "no search".
    pub fn parse(input: &str) -> Option<Self> {
        let raw = input.trim();
        if raw.is_empty() {
            return None;
        }
        Some(Self {
            raw: raw.to_string(),
            lowered: raw.to_lowercase(),
            numeric: raw.parse::<f64>().ok().filter(|value| value.is_finite()),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn numeric(&self) -> Option<f64> {
        self.numeric
    }

    fn text_pattern(&self) -> String {
        format!("%{}%", escape_like(&self.lowered))
    }

    fn price_pattern(&self) -> String {
        format!("%{}%", escape_like(&self.raw))
    }

    fn matches(&self, record: &SaleRecord) -> bool {
        let text_hit = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|value| value.to_lowercase().contains(&self.lowered))
        };
        if text_hit(&record.title) || text_hit(&record.description) {
            return true;
        }
        match record.price {
            Some(price) => {
                price.to_string().contains(&self.raw) || self.numeric == Some(price)
            }
            None => false,
        }
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Month(Month),
    Sold(bool),
    /// `min <= price < max`; an absent `max` leaves the range open above.
    PriceRange { min: f64, max: Option<f64> },
    Search(SearchTerm),
}

impl Clause {
    fn push_sql(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Clause::Month(month) => {
                builder
                    .push(SALE_MONTH_SQL)
                    .push(" = ")
                    .push_bind(month.number() as i32);
            }
            Clause::Sold(sold) => {
                builder.push("sold = ").push_bind(*sold);
            }
            Clause::PriceRange { min, max } => {
                builder.push("price >= ").push_bind(*min);
                if let Some(max) = max {
                    builder.push(" AND price < ").push_bind(*max);
                }
            }
            Clause::Search(term) => {
                builder
                    .push(r"(LOWER(title) LIKE ")
                    .push_bind(term.text_pattern())
                    .push(r" ESCAPE '\' OR LOWER(description) LIKE ")
                    .push_bind(term.text_pattern())
                    .push(r" ESCAPE '\' OR CAST(price AS TEXT) LIKE ")
                    .push_bind(term.price_pattern())
                    .push(r" ESCAPE '\'");
                if let Some(value) = term.numeric() {
                    builder.push(" OR price = ").push_bind(value);
                }
                builder.push(")");
            }
        }
    }

    fn matches(&self, record: &SaleRecord) -> bool {
        match self {
            Clause::Month(month) => record
                .date_of_sale
                .as_ref()
                .is_some_and(|sold_at| month.contains(sold_at)),
            Clause::Sold(sold) => record.sold == Some(*sold),
            Clause::PriceRange { min, max } => record.price.is_some_and(|price| {
                price >= *min && max.map_or(true, |upper| price < upper)
            }),
            Clause::Search(term) => term.matches(record),
        }
    }
}

/// Conjunction of clauses, built up fluently and compiled once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_month(month: Month) -> Self {
        Self::new().with(Clause::Month(month))
    }

    pub fn with(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn sold(self, sold: bool) -> Self {
        self.with(Clause::Sold(sold))
    }

    pub fn price_range(self, min: f64, max: Option<f64>) -> Self {
        self.with(Clause::PriceRange { min, max })
    }

    pub fn search(self, term: Option<SearchTerm>) -> Self {
        match term {
            Some(term) => self.with(Clause::Search(term)),
            None => self,
        }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Appends ` WHERE a AND b ...` to `builder`; appends nothing for an empty filter.
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        for (index, clause) in self.clauses.iter().enumerate() {
            builder.push(if index == 0 { " WHERE " } else { " AND " });
            clause.push_sql(builder);
        }
    }

    pub fn matches(&self, record: &SaleRecord) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }
}

/// A listing request: one month, one page, optional search.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub month: Month,
    pub pagination: Pagination,
    pub search: Option<SearchTerm>,
}

impl ListQuery {
    pub fn new(month: Month) -> Self {
        Self {
            month,
            pagination: Pagination::default(),
            search: None,
        }
    }

    pub fn filter(&self) -> Filter {
        Filter::for_month(self.month).search(self.search.clone())
    }
}
