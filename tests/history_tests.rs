use std::cell::RefCell;
use std::collections::VecDeque;

use ecuplot::HistoryError;
use ecuplot::core::{
    HistoryCache, HistoryQuery, HistoryTransport, PlotModel, RawHistoryItem, RawHistoryPage,
};
use serde_json::json;

#[derive(Default)]
struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<RawHistoryPage, HistoryError>>>,
    queries: RefCell<Vec<HistoryQuery>>,
}

impl ScriptedTransport {
    fn with(responses: Vec<Result<RawHistoryPage, HistoryError>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            queries: RefCell::new(Vec::new()),
        }
    }
}

impl HistoryTransport for ScriptedTransport {
    fn get_history(&self, query: &HistoryQuery) -> Result<RawHistoryPage, HistoryError> {
        self.queries.borrow_mut().push(query.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(HistoryError::Network("no scripted response".to_owned())))
    }
}

fn item(id: Option<serde_json::Value>, expression: &str) -> RawHistoryItem {
    RawHistoryItem {
        id,
        expression: expression.to_owned(),
        created_at: Some("2025-03-01T12:00:00Z".to_owned()),
    }
}

fn page(items: Vec<RawHistoryItem>, total: usize) -> RawHistoryPage {
    RawHistoryPage { items, total }
}

fn signed_in() -> bool {
    true
}

fn signed_out() -> bool {
    false
}

#[test]
fn page_items_get_string_ids() {
    let transport = ScriptedTransport::with(vec![Ok(page(
        vec![
            item(Some(json!("a1")), "x^2"),
            item(Some(json!(42)), "sin(x)"),
            item(None, "cos(x)"),
        ],
        3,
    ))]);
    let mut model = PlotModel::default();

    let items = model
        .fetch_history(&transport, &signed_in, HistoryQuery::default())
        .expect("fetch");
    let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["a1", "42", "cos(x)-2"]);
    assert!(items[0].created_at_utc().is_some());
    assert!(!model.history().has_more());
}

#[test]
fn missing_session_fails_fast_without_a_request() {
    let transport = ScriptedTransport::default();
    let mut cache = HistoryCache::default();

    let err = cache
        .fetch(&transport, &signed_out, HistoryQuery::default())
        .expect_err("no session");
    assert_eq!(err, HistoryError::Unauthorized);
    assert!(transport.queries.borrow().is_empty());
}

#[test]
fn failures_keep_previous_page_and_selection() {
    let transport = ScriptedTransport::with(vec![
        Ok(page(vec![item(Some(json!("a")), "x")], 1)),
        Err(HistoryError::BadResponse { status: 500 }),
        Err(HistoryError::Network("connection reset".to_owned())),
    ]);
    let mut cache = HistoryCache::default();
    cache
        .fetch(&transport, &signed_in, HistoryQuery::default())
        .expect("first page");
    assert!(cache.select("a", true));

    let bad = cache
        .fetch(&transport, &signed_in, HistoryQuery::new("x", 20, 0))
        .expect_err("server error");
    assert_eq!(bad.kind(), "bad-response");
    let network = cache
        .fetch(&transport, &signed_in, HistoryQuery::default())
        .expect_err("network error");
    assert_eq!(network.kind(), "network");

    assert_eq!(cache.items().len(), 1);
    assert_eq!(cache.selection(), vec!["a"]);
}

#[test]
fn successful_fetch_clears_selection() {
    let transport = ScriptedTransport::with(vec![
        Ok(page(vec![item(Some(json!("a")), "x"), item(Some(json!("b")), "2x")], 2)),
        Ok(page(vec![item(Some(json!("a")), "x")], 1)),
    ]);
    let mut cache = HistoryCache::default();
    cache
        .fetch(&transport, &signed_in, HistoryQuery::default())
        .expect("fetch");
    cache.select_all();
    assert_eq!(cache.selected_expressions(), vec!["x", "2x"]);

    cache
        .fetch(&transport, &signed_in, HistoryQuery::default())
        .expect("refetch");
    assert!(cache.selection().is_empty());
}

#[test]
fn superseded_response_is_rejected() {
    let mut cache = HistoryCache::default();
    let slow = cache.begin_fetch(HistoryQuery::new("sin", 20, 0));
    let fast = cache.begin_fetch(HistoryQuery::new("cos", 20, 0));

    cache
        .complete_fetch(fast, Ok(page(vec![item(Some(json!("c")), "cos(x)")], 1)))
        .expect("latest query wins");
    let err = cache
        .complete_fetch(slow, Ok(page(vec![item(Some(json!("s")), "sin(x)")], 1)))
        .expect_err("stale response");

    assert_eq!(err, HistoryError::Stale);
    assert_eq!(cache.items()[0].expression, "cos(x)");
    assert_eq!(cache.last_query().map(|q| q.q.as_str()), Some("cos"));
}

#[test]
fn selection_ignores_unknown_ids_and_keeps_list_order() {
    let transport = ScriptedTransport::with(vec![Ok(page(
        vec![
            item(Some(json!("a")), "x"),
            item(Some(json!("b")), "x^2"),
            item(Some(json!("c")), "x^3"),
        ],
        10,
    ))]);
    let mut model = PlotModel::default();
    model
        .fetch_history(&transport, &signed_in, HistoryQuery::default())
        .expect("fetch");

    assert!(!model.select_history("zzz", true));
    assert!(model.select_history("c", true));
    assert!(model.select_history("a", true));
    assert_eq!(model.history_selection(), vec!["c", "a"]);
    assert_eq!(model.selected_history_expressions(), vec!["x", "x^3"]);

    assert!(model.select_history("c", false));
    assert_eq!(model.history_selection(), vec!["a"]);
    model.clear_history_selection();
    assert!(model.history_selection().is_empty());
    assert!(model.history().has_more());
}

#[test]
fn raw_page_decodes_server_json() {
    let raw: RawHistoryPage = serde_json::from_value(json!({
        "items": [
            {"id": 7, "expression": "x^2", "created_at": "2025-01-01T00:00:00Z"},
            {"expression": "1/x"}
        ],
        "total": 2
    }))
    .expect("decode");
    assert_eq!(raw.items.len(), 2);
    assert_eq!(raw.items[1].id, None);
}
