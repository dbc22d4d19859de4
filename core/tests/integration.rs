//! Case client operations against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port in a background thread
//! and talks to it over real HTTP through the default `UreqTransport`. The
//! server's store is shared with the test so it can finish analyses or
//! inject failures between calls.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use mock_server::{Db, Store};
use serde_json::json;
use signifyd_core::{status, ClientConfig, SignifydClient};
use tokio::sync::RwLock;

const KEY: &str = "integration-key";

/// Start the mock server and return its address with a handle to its store.
fn start_server() -> (String, Db) {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let db: Db = Arc::new(RwLock::new(Store::default()));
    let app = mock_server::app_with_store(KEY, db.clone());

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, app).await
        })
        .unwrap();
    });

    (format!("http://{addr}"), db)
}

fn client(base_url: &str, key: &str) -> SignifydClient {
    SignifydClient::new(ClientConfig::new(key).unwrap().with_base_url(base_url))
}

#[test]
fn case_lifecycle() {
    let (addr, db) = start_server();
    let client = client(&format!("{addr}/v2"), KEY);

    // Step 1: create a case.
    let created = client
        .create_case(&json!({"purchase": {"orderId": "ORDER-7", "totalPrice": 74.99}}))
        .unwrap();
    assert_eq!(created.status_code, 201);
    assert_eq!(created.status_message, status::CREATED);
    assert!(created.success);
    let case_id = created.body.as_ref().unwrap()["investigationId"].as_u64().unwrap();

    // Step 2: fetch it by case id and by order id.
    let by_case = client.get_case_by_case_id(case_id).unwrap();
    assert!(by_case.success);
    assert_eq!(by_case.status_message, status::OK);
    assert_eq!(by_case.body.as_ref().unwrap()["orderId"], "ORDER-7");

    let by_order = client.get_case_by_order_id("ORDER-7").unwrap();
    assert_eq!(by_order.body, by_case.body);

    // Step 3: analysis is still processing.
    let analysis = client.get_case_analysis_by_case_id(case_id).unwrap();
    assert_eq!(analysis.status_code, 202);
    assert_eq!(analysis.status_message, status::PROCESSING);
    assert!(!analysis.success);
    assert!(analysis.body.is_none());
    assert!(analysis.raw_body.contains("PROCESSING"));

    let full = client.get_full_case_data_by_case_id(case_id).unwrap();
    assert!(!full.success);
    assert!(full.case_basic.is_some());
    assert!(full.case_analysis.is_none());
    assert!(full.case_entries.is_some());

    // Step 4: scoring finishes and entries arrive.
    {
        let mut store = db.blocking_write();
        store.set_analysis(case_id, json!({"score": 655, "recommendation": "APPROVE"}));
        store.add_entry(case_id, json!({"type": "ITEM", "sku": "SKU-1"}));
    }

    let analysis = client.get_case_analysis_by_order_id("ORDER-7").unwrap();
    assert!(analysis.success);
    assert_eq!(analysis.body.unwrap()["score"], 655);

    let entries = client.get_case_entries_by_order_id("ORDER-7").unwrap();
    assert_eq!(entries.body.unwrap()["entries"][0]["sku"], "SKU-1");

    let entries = client.get_case_entries_by_case_id(case_id).unwrap();
    assert!(entries.success);

    // Step 5: full case data is now complete.
    let full = client.get_full_case_data_by_case_id(case_id).unwrap();
    assert!(full.success);
    assert_eq!(full.case_basic.unwrap()["caseId"], case_id);
    assert_eq!(full.case_analysis.unwrap()["recommendation"], "APPROVE");
    assert_eq!(full.case_entries.unwrap()["entries"].as_array().unwrap().len(), 1);
}

#[test]
fn full_case_data_with_missing_analysis() {
    let (addr, db) = start_server();
    let case_id = {
        let mut store = db.blocking_write();
        let id = store.insert("O-404", json!({"orderId": "O-404"}));
        store.set_analysis(id, json!({"score": 100}));
        store.fail_path(&format!("/v2/cases/{id}/analysis"), 404);
        id
    };

    let full = client(&format!("{addr}/v2"), KEY)
        .get_full_case_data_by_case_id(case_id)
        .unwrap();
    assert!(!full.success);
    assert!(full.case_basic.is_some());
    assert!(full.case_analysis.is_none());
    assert!(full.case_entries.is_some());
}

#[test]
fn unknown_case_is_not_found() {
    let (addr, _db) = start_server();
    let res = client(&format!("{addr}/v2"), KEY).get_case_by_case_id(12345).unwrap();
    assert_eq!(res.status_code, 404);
    assert_eq!(res.status_message, status::NOT_FOUND);
    assert!(!res.success);
    assert!(res.body.is_none());
    assert!(res.raw_body.contains("case not found"));
}

#[test]
fn wrong_key_is_unauthorized() {
    let (addr, _db) = start_server();
    let res = client(&format!("{addr}/v2"), "not-the-key")
        .get_case_by_order_id("ANY")
        .unwrap();
    assert_eq!(res.status_code, 401);
    assert_eq!(res.status_message, status::UNAUTHORIZED);
    assert!(!res.success);
}

#[test]
fn invalid_create_payload_is_bad_request() {
    let (addr, _db) = start_server();
    let res = client(&format!("{addr}/v2"), KEY)
        .create_case(&json!({"totalPrice": 1}))
        .unwrap();
    assert_eq!(res.status_code, 400);
    assert_eq!(res.status_message, status::BAD_REQUEST);
    assert!(!res.success);
}

#[test]
fn server_errors_collapse_to_one_message() {
    let (addr, db) = start_server();
    let client = client(&format!("{addr}/v2"), KEY);

    for (code, order) in [(500, "A"), (502, "B"), (503, "C"), (504, "D"), (402, "E")] {
        db.blocking_write().fail_path(&format!("/v2/orders/{order}/case"), code);
        let res = client.get_case_by_order_id(order).unwrap();
        assert_eq!(res.status_code, code);
        assert!(!res.success);
        assert!(res.body.is_none());
        let expected = if code == 402 { status::REQUEST_FAILED } else { status::SERVER_ERROR };
        assert_eq!(res.status_message, expected, "status {code}");
    }
}

#[test]
fn create_case_round_trips_through_echo() {
    let (addr, _db) = start_server();
    let client = client(&format!("{addr}/echo"), KEY);
    let payload = json!({
        "purchase": {"orderId": "O123", "currency": "EUR", "products": [{"title": "Crème brûlée", "qty": 2}]},
        "recipient": {"fullName": "Ada Lovelace"},
    });

    let sent = client.build_create_case(&payload).unwrap();
    let res = client.create_case(&payload).unwrap();
    assert!(res.success);

    let echo = res.body.unwrap();
    assert_eq!(echo["payload"], payload);
    assert_eq!(echo["contentType"], "application/json");
    assert_eq!(echo["accept"], "application/json");
    let body_len = sent.body.as_deref().unwrap().len();
    assert_eq!(echo["contentLength"], body_len);
    assert_eq!(echo["bodyLength"], body_len);

    let header = echo["authorization"].as_str().unwrap();
    let decoded = STANDARD.decode(header.strip_prefix("Basic ").unwrap()).unwrap();
    assert_eq!(decoded, format!("{KEY}:").into_bytes());
}

#[test]
fn closed_port_is_a_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let err = client(&format!("http://127.0.0.1:{port}/v2"), KEY)
        .get_case_by_case_id(1)
        .unwrap_err();
    assert!(matches!(err, signifyd_core::ApiError::Transport(_)));
}

#[test]
fn bodies_over_ten_megabytes_are_read() {
    let (addr, db) = start_server();
    let case_id = {
        let mut store = db.blocking_write();
        let id = store.insert("O-BIG", json!({"orderId": "O-BIG"}));
        store.add_entry(id, json!({"blob": "x".repeat(11 * 1024 * 1024)}));
        id
    };

    let res = client(&format!("{addr}/v2"), KEY)
        .get_case_entries_by_case_id(case_id)
        .unwrap();
    assert!(res.success);
    assert!(res.raw_body.len() > 10 * 1024 * 1024);
    assert_eq!(res.body.unwrap()["entries"][0]["blob"].as_str().unwrap().len(), 11 * 1024 * 1024);
}
