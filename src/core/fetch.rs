//! Paginated collection retrieval.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::transport::{ApiRequest, ApiTransport};

const PAGE_PARAM: &str = "page";
const PAGE_SIZE_PARAM: &str = "page-size";

/// A paged list endpoint: path plus the fixed query every page carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub label: String,
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Endpoint {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Repeated `section=` parameters selecting inventory sections.
    pub fn with_sections(mut self, sections: &[String]) -> Self {
        self.query.extend(
            sections
                .iter()
                .map(|section| ("section".to_string(), section.clone())),
        );
        self
    }

    fn page_request(&self, page: usize, page_size: usize) -> ApiRequest {
        ApiRequest::get(&self.label, &self.path)
            .with_query(&self.query)
            .query_param(PAGE_PARAM, page.to_string())
            .query_param(PAGE_SIZE_PARAM, page_size.to_string())
    }
}

/// Retrieves complete collections page by page.
pub struct PaginatedFetcher<'a, T: ApiTransport + ?Sized> {
    transport: &'a T,
    page_size: usize,
}

impl<'a, T: ApiTransport + ?Sized> PaginatedFetcher<'a, T> {
    pub fn new(transport: &'a T, page_size: usize) -> Self {
        Self {
            transport,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Request pages 0, 1, 2, ... until one comes back short, concatenating
    /// items in page order. Any failed page fails the whole fetch.
    #[instrument(skip(self, endpoint), fields(endpoint = %endpoint.label, page_size = self.page_size))]
    pub async fn fetch_all(&self, endpoint: &Endpoint) -> Result<Vec<Value>, ApiError> {
        let mut items = Vec::new();
        let mut page = 0;

        loop {
            let response = self
                .transport
                .execute(endpoint.page_request(page, self.page_size))
                .await?;
            let batch = page_items(&endpoint.label, response)?;
            let received = batch.len();
            debug!(page, received, "fetched page");
            items.extend(batch);

            if received < self.page_size {
                break;
            }
            page += 1;
        }

        debug!(total = items.len(), pages = page + 1, "collection complete");
        Ok(items)
    }
}

/// A page is either a bare array or an object carrying a `results` array.
fn page_items(label: &str, response: Value) -> Result<Vec<Value>, ApiError> {
    match response {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(ApiError::decode(
                label,
                format!("`results` is not an array: {other}"),
            )),
            None => Err(ApiError::decode(label, "page has no `results` array")),
        },
        Value::Null => Ok(Vec::new()),
        other => Err(ApiError::decode(
            label,
            format!("expected a list page, got {other}"),
        )),
    }
}
