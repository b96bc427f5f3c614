use salesboard_core::error::ParamError;
use salesboard_core::filter::{ListQuery, Month, Pagination, SearchTerm};
use serde::Deserialize;

/// Raw `?month=` query string. Values stay strings so malformed input is
/// reported through the envelope instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct MonthParams {
    pub month: Option<String>,
}

impl MonthParams {
    pub fn month(&self) -> Result<Month, ParamError> {
        parse_month(self.month.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub month: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub search_input: Option<String>,
}

impl ListParams {
    pub fn into_query(self) -> Result<ListQuery, ParamError> {
        let month = parse_month(self.month.as_deref())?;
        let page = parse_integer("page", self.page.as_deref())?;
        let per_page = parse_integer("perPage", self.per_page.as_deref())?;

        Ok(ListQuery {
            month,
            pagination: Pagination::new(page, per_page),
            search: self.search_input.as_deref().and_then(SearchTerm::parse),
        })
    }
}

fn parse_month(raw: Option<&str>) -> Result<Month, ParamError> {
    match raw.map(str::trim) {
        None | Some("") => Err(ParamError::MissingMonth),
        Some(value) => value.parse(),
    }
}

fn parse_integer(name: &'static str, raw: Option<&str>) -> Result<Option<i64>, ParamError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ParamError::InvalidNumber {
                name,
                value: value.to_string(),
            }),
    }
}
