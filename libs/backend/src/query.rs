//! Typed query descriptors for list operations
//!
//! The closed set of filter/sort/pagination primitives the database service
//! accepts, replacing stringly-typed query parameters.

use common::error::{Error, Result};
use serde_json::{Value, json};

/// A single list-query primitive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Equality filter on an attribute
    Equal { attribute: String, value: String },
    /// Descending order by an attribute
    OrderDesc(String),
    /// Cap the number of returned documents
    Limit(u32),
    /// Return documents strictly after the given document id
    CursorAfter(String),
    /// Full-text search on an attribute
    Search { attribute: String, term: String },
}

impl Query {
    pub fn equal(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Query::Equal {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn order_desc(attribute: impl Into<String>) -> Self {
        Query::OrderDesc(attribute.into())
    }

    pub fn limit(limit: u32) -> Self {
        Query::Limit(limit)
    }

    /// Cursor for pagination; the id comes from data, so an empty one is
    /// rejected here rather than on the wire
    pub fn cursor_after(document_id: &str) -> Result<Self> {
        if document_id.is_empty() {
            return Err(Error::Validation("empty pagination cursor".to_string()));
        }
        Ok(Query::CursorAfter(document_id.to_string()))
    }

    pub fn search(attribute: impl Into<String>, term: impl Into<String>) -> Self {
        Query::Search {
            attribute: attribute.into(),
            term: term.into(),
        }
    }

    /// Wire encoding understood by the backend REST API
    pub fn to_wire(&self) -> Value {
        match self {
            Query::Equal { attribute, value } => {
                json!({ "method": "equal", "attribute": attribute, "values": [value] })
            }
            Query::OrderDesc(attribute) => {
                json!({ "method": "orderDesc", "attribute": attribute })
            }
            Query::Limit(limit) => json!({ "method": "limit", "values": [limit] }),
            Query::CursorAfter(document_id) => {
                json!({ "method": "cursorAfter", "values": [document_id] })
            }
            Query::Search { attribute, term } => {
                json!({ "method": "search", "attribute": attribute, "values": [term] })
            }
        }
    }
}
