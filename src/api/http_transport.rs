use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::{HistoryQuery, HistoryTransport, RawHistoryPage};
use crate::error::{HistoryError, PlotError, PlotResult};

use super::ExpressionSink;

const HISTORY_PATH: &str = "/api/plot/history";
const PERSIST_PATH: &str = "/api/plot";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(12);

#[derive(Debug, Serialize)]
struct PersistBody<'a> {
    expression: &'a str,
}

/// Blocking HTTP client for the plot history and persistence endpoints.
#[derive(Debug, Clone)]
pub struct ReqwestHistoryTransport {
    base_url: String,
    client: Client,
}

impl ReqwestHistoryTransport {
    pub fn new(base_url: impl Into<String>) -> PlotResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PlotError::Backend(format!("http client error: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { base_url, client })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn history_url(&self, query: &HistoryQuery) -> String {
        format!(
            "{}{HISTORY_PATH}?{}",
            self.base_url,
            query.to_query_string()
        )
    }
}

fn status_error(status: StatusCode) -> HistoryError {
    if status == StatusCode::UNAUTHORIZED {
        HistoryError::Unauthorized
    } else {
        HistoryError::BadResponse {
            status: status.as_u16(),
        }
    }
}

impl HistoryTransport for ReqwestHistoryTransport {
    fn get_history(&self, query: &HistoryQuery) -> Result<RawHistoryPage, HistoryError> {
        let url = self.history_url(query);
        debug!(%url, "fetching plot history");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| HistoryError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }
        response.json::<RawHistoryPage>().map_err(|e| {
            warn!(error = %e, "history response did not decode");
            HistoryError::BadResponse {
                status: status.as_u16(),
            }
        })
    }
}

impl ExpressionSink for ReqwestHistoryTransport {
    fn persist(&self, expression: &str) -> Result<(), HistoryError> {
        let response = self
            .client
            .post(format!("{}{PERSIST_PATH}", self.base_url))
            .json(&PersistBody { expression })
            .send()
            .map_err(|e| HistoryError::Network(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(status_error(status))
        }
    }
}
