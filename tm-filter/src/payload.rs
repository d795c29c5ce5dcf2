//! Wire forms exchanged with the trademark search backend.
//!
//! The nested [`SearchRequest`] is canonical: it is what `/api/combined_search` reads from
//! `filter_tree`. The flattened [`FlatSearchRequest`] is kept as an alternate entry point
//! and is always converted to the nested form before it is sent.

use crate::errors::QueryError;
use crate::flat::FlatQuery;
use crate::tree::FilterTree;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 10;

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub filter_tree: FilterTree,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl SearchRequest {
    pub fn new(filter_tree: FilterTree, page: u32, per_page: u32) -> Self {
        Self {
            filter_tree,
            page,
            per_page,
        }
    }

    pub fn to_flat(&self) -> Result<FlatSearchRequest, QueryError> {
        Ok(FlatSearchRequest {
            conditions: FlatQuery::from_tree(&self.filter_tree)?,
            page: self.page,
            per_page: self.per_page,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatSearchRequest {
    pub conditions: FlatQuery,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl FlatSearchRequest {
    pub fn into_canonical(self) -> Result<SearchRequest, QueryError> {
        Ok(SearchRequest {
            filter_tree: self.conditions.to_tree()?,
            page: self.page,
            per_page: self.per_page,
        })
    }
}

/// A request in whichever form it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyRequest {
    Nested(SearchRequest),
    Flat(FlatSearchRequest),
}

impl AnyRequest {
    pub fn into_canonical(self) -> Result<SearchRequest, QueryError> {
        match self {
            AnyRequest::Nested(request) => Ok(request),
            AnyRequest::Flat(request) => request.into_canonical(),
        }
    }
}

pub fn serialize_tree(request: &SearchRequest) -> Result<String, QueryError> {
    Ok(serde_json::to_string_pretty(request)?)
}

pub fn serialize_flat(request: &FlatSearchRequest) -> Result<String, QueryError> {
    Ok(serde_json::to_string_pretty(request)?)
}

/// Parse either wire form. A bare `{operator, operands}` group is accepted as a nested
/// request with default paging.
pub fn parse_request(json: &str) -> Result<AnyRequest, QueryError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let object = value
        .as_object()
        .ok_or_else(|| QueryError::InvalidPayload("expected a JSON object".to_string()))?;

    if object.contains_key("conditions") {
        Ok(AnyRequest::Flat(serde_json::from_value(value)?))
    } else if object.contains_key("filter_tree") {
        Ok(AnyRequest::Nested(serde_json::from_value(value)?))
    } else if object.contains_key("operands") {
        let filter_tree: FilterTree = serde_json::from_value(value)?;
        Ok(AnyRequest::Nested(SearchRequest::new(
            filter_tree,
            DEFAULT_PAGE,
            DEFAULT_PER_PAGE,
        )))
    } else {
        Err(QueryError::InvalidPayload(
            "expected `filter_tree`, `conditions` or `operands`".to_string(),
        ))
    }
}

pub fn parse_canonical(json: &str) -> Result<SearchRequest, QueryError> {
    parse_request(json)?.into_canonical()
}

/// One matching case file as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub serial_number: u64,
    pub registration_number: Option<String>,
    #[serde(default)]
    pub mark_identification: String,
    #[serde(default)]
    pub status_code: String,
    pub filing_date: Option<String>,
    pub registration_date: Option<String>,
    pub attorney_name: Option<String>,
    #[serde(
        default,
        alias = "similarity_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub combined_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_quality: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: DEFAULT_PAGE,
            total_pages: 0,
            total_results: 0,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub pagination: Pagination,
}
