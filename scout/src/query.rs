use serde_json::{json, Value};

use crate::SearchError;

/// Hits returned per search.
pub const MAX_RESULTS: usize = 3;

const RANGE_SEPARATOR: &str = " to ";
const TIMESTAMP_FIELD: &str = "date";
const TEXT_FIELDS: [&str; 2] = ["title", "description"];
const SOURCE_FIELDS: [&str; 3] = ["title", "date", "description"];

/// An inclusive date interval, kept as the strings the caller supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    /// Parses either `YYYY-MM-DD` or `YYYY-MM-DD to YYYY-MM-DD`.
    ///
    /// Only the shape is checked: bounds are not validated as calendar dates
    /// and a reversed range is passed through as is.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidDateFormat`] when the expression has more than one separator.
    pub fn parse(expression: &str) -> Result<Self, SearchError> {
        let parts = expression.split(RANGE_SEPARATOR).collect::<Vec<_>>();

        match parts.as_slice() {
            [date] => Ok(Self {
                start: (*date).to_string(),
                end: (*date).to_string(),
            }),
            [start, end] => Ok(Self {
                start: (*start).to_string(),
                end: (*end).to_string(),
            }),
            _ => Err(SearchError::InvalidDateFormat(expression.to_string())),
        }
    }

    fn to_filter(&self) -> Value {
        json!({
            "range": {
                TIMESTAMP_FIELD: {
                    "gte": self.start,
                    "lte": self.end,
                }
            }
        })
    }
}

/// Builds the `_search` body for a product query, optionally bounded to a date range.
///
/// # Errors
///
/// Fails if the query is blank or the date expression is malformed.
pub fn build_search_request(query: &str, date: Option<&str>) -> Result<Value, SearchError> {
    if query.trim().is_empty() {
        return Err(SearchError::EmptyQuery);
    }

    let filter = date
        .map(DateRange::parse)
        .transpose()?
        .map(|range| vec![range.to_filter()])
        .unwrap_or_default();

    Ok(json!({
        "size": MAX_RESULTS,
        "_source": SOURCE_FIELDS,
        "query": {
            "bool": {
                "must": [{
                    "multi_match": {
                        "query": query,
                        "fields": TEXT_FIELDS,
                    }
                }],
                "filter": filter,
            }
        }
    }))
}
