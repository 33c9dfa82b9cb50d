mod common;

use axum::http::{StatusCode, header};
use invoicer_types::models::Invoice;

use common::*;

const SAMPLE: &str = r#"{"amount":500,"charges":[{"type":"fee","amount":5.0,"description":"<b>x</b>"}]}"#;

#[tokio::test]
async fn create_then_fetch_escapes_charge_text() {
    let (app, _state) = test_app();

    let resp = send_json(&app, "POST", "/invoice", SAMPLE).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_string(resp).await, "created invoice 1");

    let resp = get(&app, "/invoice/1").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let json = body_json(resp).await;
    assert_eq!(json["id"], 1);
    assert_eq!(json["amount"], 500);
    assert_eq!(json["is_paid"], false);
    assert_eq!(json["charges"][0]["type"], "fee");
    assert_eq!(json["charges"][0]["amount"], 5.0);
    assert_eq!(json["charges"][0]["description"], "&lt;b&gt;x&lt;/b&gt;");
}

#[tokio::test]
async fn script_tags_never_come_back_raw() {
    let (app, _state) = test_app();

    let body = r#"{"charges":[{"type":"<script>alert(1)</script>","description":"<script>document.cookie</script>"}]}"#;
    let resp = send_json(&app, "POST", "/invoice", body).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let invoice: Invoice = serde_json::from_value(body_json(get(&app, "/invoice/1").await).await).unwrap();
    for charge in &invoice.charges {
        for text in [&charge.charge_type, &charge.description] {
            assert!(!text.contains('<'), "raw '<' in {}", text);
            assert!(!text.contains('>'), "raw '>' in {}", text);
        }
    }
    assert!(invoice.charges[0].charge_type.starts_with("&lt;script&gt;"));
}

#[tokio::test]
async fn created_ids_are_positive_and_unique() {
    let (app, _state) = test_app();

    let mut seen = Vec::new();
    for _ in 0..5 {
        let resp = send_json(&app, "POST", "/invoice", r#"{"amount":1}"#).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let text = body_string(resp).await;
        let id: i64 = text.strip_prefix("created invoice ").unwrap().parse().unwrap();
        assert!(id > 0);
        assert!(!seen.contains(&id));
        seen.push(id);
    }
}

#[tokio::test]
async fn client_supplied_ids_are_discarded() {
    let (app, state) = test_app();

    let body = r#"{
        "id": 77,
        "amount": 10,
        "charges": [
            {"id": 5, "invoice_id": 999, "type": "fee", "amount": 1.0, "description": "a"},
            {"id": 5, "invoice_id": 998, "type": "tax", "amount": 2.0, "description": "b"}
        ]
    }"#;
    let resp = send_json(&app, "POST", "/invoice", body).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_string(resp).await, "created invoice 1");

    assert_eq!(get(&app, "/invoice/77").await.status(), StatusCode::NOT_FOUND);

    let invoice: Invoice = serde_json::from_value(body_json(get(&app, "/invoice/1").await).await).unwrap();
    assert_eq!(invoice.id, 1);
    assert_eq!(invoice.charges.len(), 2);
    assert!(invoice.charges.iter().all(|c| c.invoice_id == 1));
    assert_ne!(invoice.charges[0].id, invoice.charges[1].id);

    assert!(state.db.get_charges_for_invoice(999).unwrap().is_empty());
    assert!(state.db.get_charges_for_invoice(998).unwrap().is_empty());
}

#[tokio::test]
async fn missing_invoice_is_404() {
    let (app, _state) = test_app();

    let resp = get(&app, "/invoice/42").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(resp).await, "No invoice id 42");
}

#[tokio::test]
async fn non_numeric_id_is_400() {
    let (app, _state) = test_app();
    assert_eq!(get(&app, "/invoice/abc").await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_create_bodies_are_400() {
    let (app, state) = test_app();

    for body in [
        "not json",
        r#"{"amount":"five hundred"}"#,
        r#"{"amount":1,"customer":"acme"}"#,
        r#"{"charges":[{"type":"fee","colour":"red"}]}"#,
        r#"{"due_date":"next tuesday"}"#,
    ] {
        let resp = send_json(&app, "POST", "/invoice", body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        assert!(body_string(resp).await.starts_with("failed to parse request body"));
    }

    assert!(state.db.get_invoice(1).unwrap().is_none());
}

#[tokio::test]
async fn update_merges_present_fields() {
    let (app, _state) = test_app();

    let body = r#"{"amount":500,"due_date":"2026-12-01T00:00:00Z","charges":[{"type":"fee","amount":5.0}]}"#;
    send_json(&app, "POST", "/invoice", body).await;

    let resp = send_json(&app, "PUT", "/invoice/1", r#"{"is_paid":true}"#).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(body_string(resp).await, "updated invoice 1");

    let invoice: Invoice = serde_json::from_value(body_json(get(&app, "/invoice/1").await).await).unwrap();
    assert!(invoice.is_paid);
    assert_eq!(invoice.amount, 500);
    assert_eq!(
        invoice.due_date,
        Some("2026-12-01T00:00:00Z".parse::<chrono::DateTime<chrono::Utc>>().unwrap())
    );
    assert!(invoice.payment_date.is_none());
    assert_eq!(invoice.charges.len(), 1);
    assert!(invoice.updated_at >= invoice.created_at);
}

#[tokio::test]
async fn update_null_clears_a_date() {
    let (app, _state) = test_app();

    send_json(&app, "POST", "/invoice", r#"{"amount":1,"due_date":"2026-12-01T00:00:00Z"}"#).await;
    let resp = send_json(&app, "PUT", "/invoice/1", r#"{"due_date":null,"amount":2}"#).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    let invoice: Invoice = serde_json::from_value(body_json(get(&app, "/invoice/1").await).await).unwrap();
    assert!(invoice.due_date.is_none());
    assert_eq!(invoice.amount, 2);
}

#[tokio::test]
async fn update_accepts_a_fetched_record_echo() {
    let (app, _state) = test_app();

    send_json(&app, "POST", "/invoice", r#"{"amount":1}"#).await;
    let mut json = body_json(get(&app, "/invoice/1").await).await;
    json.as_object_mut().unwrap().remove("charges");
    json["amount"] = 99.into();
    json["deleted_at"] = serde_json::Value::Null;

    let resp = send_json(&app, "PUT", "/invoice/1", &json.to_string()).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    let json = body_json(get(&app, "/invoice/1").await).await;
    assert_eq!(json["amount"], 99);

    // A deleted_at echo is ignored rather than deleting the invoice.
    let resp = send_json(
        &app,
        "PUT",
        "/invoice/1",
        r#"{"is_paid":true,"deleted_at":"2026-01-01T00:00:00Z"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let resp = get(&app, "/invoice/1").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["is_paid"], true);
}

#[tokio::test]
async fn update_missing_invoice_is_404() {
    let (app, _state) = test_app();

    let resp = send_json(&app, "PUT", "/invoice/9", r#"{"is_paid":true}"#).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(resp).await, "No invoice id 9");

    // The lookup happens before the body is parsed.
    let resp = send_json(&app, "PUT", "/invoice/9", "garbage").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_rejects_bad_bodies_without_writing() {
    let (app, state) = test_app();

    send_json(&app, "POST", "/invoice", r#"{"amount":7}"#).await;

    for body in [
        "{",
        r#"{"is_paid":"yes"}"#,
        r#"{"charges":[{"type":"fee"}]}"#,
        r#"{"owner":"mallory"}"#,
    ] {
        let resp = send_json(&app, "PUT", "/invoice/1", body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {}", body);
    }

    let row = state.db.get_invoice(1).unwrap().unwrap();
    assert_eq!(row.amount, 7);
    assert!(!row.is_paid);
}

#[tokio::test]
async fn delete_without_valid_token_changes_nothing() {
    let (app, state) = test_app();

    send_json(&app, "POST", "/invoice", SAMPLE).await;
    let bogus = format!("{}$AAAA", state.csrf.create().split('$').next().unwrap());

    for token in [None, Some(""), Some("garbage"), Some(bogus.as_str())] {
        let resp = delete_with_token(&app, "/invoice/1", token).await;
        assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(body_string(resp).await, "Invalid CSRF Token");
    }

    let resp = get(&app, "/invoice/delete/1").await;
    assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);

    assert!(state.db.get_invoice(1).unwrap().is_some());
    assert_eq!(state.db.get_charges_for_invoice(1).unwrap().len(), 1);
}

#[tokio::test]
async fn token_from_another_key_is_rejected() {
    let (app, state) = test_app();

    send_json(&app, "POST", "/invoice", SAMPLE).await;
    let foreign = invoicer_crypto::CsrfService::generate().create();

    let resp = delete_with_token(&app, "/invoice/1", Some(foreign.as_str())).await;
    assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);
    assert!(state.db.get_invoice(1).unwrap().is_some());
}

#[tokio::test]
async fn delete_removes_invoice_and_charges() {
    let (app, state) = test_app();

    send_json(&app, "POST", "/invoice", SAMPLE).await;
    send_json(&app, "POST", "/invoice", SAMPLE).await;
    let token = state.csrf.create();

    let resp = delete_with_token(&app, "/invoice/1", Some(token.as_str())).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(body_string(resp).await, "deleted invoice 1");

    assert_eq!(get(&app, "/invoice/1").await.status(), StatusCode::NOT_FOUND);
    assert!(state.db.get_charges_for_invoice(1).unwrap().is_empty());

    // The other invoice is untouched.
    assert_eq!(get(&app, "/invoice/2").await.status(), StatusCode::OK);
    assert_eq!(state.db.get_charges_for_invoice(2).unwrap().len(), 1);
}

#[tokio::test]
async fn delete_via_get_alias() {
    let (app, state) = test_app();

    send_json(&app, "POST", "/invoice", SAMPLE).await;
    let req = axum::http::Request::builder()
        .uri("/invoice/delete/1")
        .header("X-CSRF-Token", state.csrf.create())
        .body(axum::body::Body::empty())
        .unwrap();

    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(body_string(resp).await, "deleted invoice 1");
    assert_eq!(get(&app, "/invoice/1").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_missing_invoice_is_not_an_error() {
    let (app, state) = test_app();

    let token = state.csrf.create();
    let resp = delete_with_token(&app, "/invoice/31", Some(token.as_str())).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(body_string(resp).await, "deleted invoice 31");

    // Tokens are not single-use.
    let resp = delete_with_token(&app, "/invoice/31", Some(token.as_str())).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
}
