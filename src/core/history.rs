//! Local cache of the remote plot history with an in-memory selection set.

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::HistoryError;

pub const DEFAULT_HISTORY_PAGE_SIZE: usize = 20;

/// Query for `GET /api/plot/history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub q: String,
    pub limit: usize,
    pub offset: usize,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            q: String::new(),
            limit: DEFAULT_HISTORY_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl HistoryQuery {
    #[must_use]
    pub fn new(q: impl Into<String>, limit: usize, offset: usize) -> Self {
        Self {
            q: q.into(),
            limit,
            offset,
        }
    }

    /// Query for the page following this one.
    #[must_use]
    pub fn next_page(&self) -> Self {
        Self {
            q: self.q.clone(),
            limit: self.limit,
            offset: self.offset + self.limit,
        }
    }

    /// URL-encoded query string without the leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        format!(
            "q={}&limit={}&offset={}",
            urlencoding::encode(self.q.trim()),
            self.limit,
            self.offset
        )
    }
}

/// History entry as sent by the server; `id` is optional and may be numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHistoryItem {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub expression: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawHistoryPage {
    #[serde(default)]
    pub items: Vec<RawHistoryItem>,
    #[serde(default)]
    pub total: usize,
}

/// History entry with a guaranteed string id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub expression: String,
    pub created_at: Option<String>,
}

impl HistoryItem {
    /// Normalizes a server item. A missing id falls back to
    /// `"<expression>-<index>"`, which can collide across pages.
    #[must_use]
    pub fn from_raw(raw: RawHistoryItem, index: usize) -> Self {
        let id = match raw.id {
            Some(serde_json::Value::String(id)) if !id.is_empty() => id,
            Some(serde_json::Value::Number(id)) => id.to_string(),
            _ => format!("{}-{index}", raw.expression),
        };
        Self {
            id,
            expression: raw.expression,
            created_at: raw.created_at,
        }
    }

    #[must_use]
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|time| time.with_timezone(&Utc))
            .ok()
    }
}

/// Transport for the history API.
pub trait HistoryTransport {
    fn get_history(&self, query: &HistoryQuery) -> Result<RawHistoryPage, HistoryError>;
}

/// Reports whether an authenticated session is present.
pub trait SessionProbe {
    fn has_session(&self) -> bool;
}

impl<F: Fn() -> bool> SessionProbe for F {
    fn has_session(&self) -> bool {
        self()
    }
}

/// Handle for one in-flight history query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    query: HistoryQuery,
}

impl FetchTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn query(&self) -> &HistoryQuery {
        &self.query
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryCache {
    items: Vec<HistoryItem>,
    total: usize,
    last_query: Option<HistoryQuery>,
    selection: IndexSet<String>,
    generation: u64,
}

impl HistoryCache {
    #[must_use]
    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn last_query(&self) -> Option<&HistoryQuery> {
        self.last_query.as_ref()
    }

    /// Whether the server reports more items past the last fetched page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.last_query
            .as_ref()
            .is_some_and(|query| query.offset + self.items.len() < self.total)
    }

    /// Starts a query. Any ticket issued earlier becomes stale.
    pub fn begin_fetch(&mut self, query: HistoryQuery) -> FetchTicket {
        self.generation += 1;
        FetchTicket {
            generation: self.generation,
            query,
        }
    }

    /// Applies a transport result for `ticket`.
    ///
    /// Stale tickets and failures leave the cached page untouched. Success
    /// replaces the page and clears the selection.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<RawHistoryPage, HistoryError>,
    ) -> Result<&[HistoryItem], HistoryError> {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "dropping superseded history response"
            );
            return Err(HistoryError::Stale);
        }

        let page = result.inspect_err(|err| {
            warn!(kind = err.kind(), error = %err, "history fetch failed");
        })?;

        self.items = page
            .items
            .into_iter()
            .enumerate()
            .map(|(index, raw)| HistoryItem::from_raw(raw, index))
            .collect();
        self.total = page.total.max(ticket.query.offset + self.items.len());
        self.last_query = Some(ticket.query);
        self.selection.clear();
        debug!(items = self.items.len(), total = self.total, "history page loaded");
        Ok(&self.items)
    }

    /// Fetches one page through `transport`, failing fast without a session.
    pub fn fetch<T, S>(
        &mut self,
        transport: &T,
        session: &S,
        query: HistoryQuery,
    ) -> Result<&[HistoryItem], HistoryError>
    where
        T: HistoryTransport + ?Sized,
        S: SessionProbe + ?Sized,
    {
        if !session.has_session() {
            return Err(HistoryError::Unauthorized);
        }
        let ticket = self.begin_fetch(query);
        let result = transport.get_history(ticket.query());
        self.complete_fetch(ticket, result)
    }

    /// Adds or removes `id` from the selection. Unknown ids are ignored.
    pub fn select(&mut self, id: &str, selected: bool) -> bool {
        if !self.items.iter().any(|item| item.id == id) {
            return false;
        }
        if selected {
            self.selection.insert(id.to_owned());
        } else {
            self.selection.shift_remove(id);
        }
        true
    }

    pub fn select_all(&mut self) {
        self.selection = self.items.iter().map(|item| item.id.clone()).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected ids in selection order.
    #[must_use]
    pub fn selection(&self) -> Vec<&str> {
        self.selection.iter().map(String::as_str).collect()
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    /// Expressions of selected items, in list order.
    #[must_use]
    pub fn selected_expressions(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| self.selection.contains(&item.id))
            .map(|item| item.expression.as_str())
            .collect()
    }
}
