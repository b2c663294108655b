//! Route-level tests over in-memory dependencies.
//!
//! The AI service is wired without providers here, which is exactly the
//! degraded mode the handlers must survive: AI endpoints answer empty
//! payloads while the ticket CRUD flow stays fully available.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use api::{AppState, router};
use ticket_ai::{AiConfig, AiService};
use ticket_store::{InMemoryTicketStore, TicketRepository};

fn test_app() -> Router {
    let repo: Arc<dyn TicketRepository> = Arc::new(InMemoryTicketStore::new());
    let ai = Arc::new(AiService::new(
        AiConfig::default(),
        None,
        None,
        None,
        repo.clone(),
    ));
    router(Arc::new(AppState { repo, ai }))
}

fn ticket_payload(description: &str) -> Value {
    json!({
        "systemSource": "OMS",
        "category": "SYSTEM_FAILURE",
        "description": description,
        "handleType": "DEV",
        "handleDetail": "",
        "priority": "P1",
    })
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn create_then_fetch_ticket() {
    let app = test_app();

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/tickets",
        Some(ticket_payload("order sync fails")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);

    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("AS-"));
    assert_eq!(body["data"]["status"], "OPEN");

    let (status, body) = send_json(&app, "GET", &format!("/api/tickets/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "order sync fails");
}

#[tokio::test]
async fn unknown_ticket_is_404() {
    let app = test_app();
    let (status, body) = send_json(&app, "GET", "/api/tickets/AS-19990101-01", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn list_reports_pagination() {
    let app = test_app();
    for i in 0..3 {
        send_json(
            &app,
            "POST",
            "/api/tickets",
            Some(ticket_payload(&format!("issue {i}"))),
        )
        .await;
    }

    let (status, body) = send_json(&app, "GET", "/api/tickets?page=1&pageSize=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["totalPages"], 2);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn close_marks_completed() {
    let app = test_app();
    let (_, body) = send_json(
        &app,
        "POST",
        "/api/tickets",
        Some(ticket_payload("to be closed")),
    )
    .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send_json(&app, "POST", &format!("/api/tickets/{id}/close"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "COMPLETED");
    assert!(body["data"]["closedAt"].is_string());
}

#[tokio::test]
async fn delete_then_fetch_is_404() {
    let app = test_app();
    let (_, body) = send_json(
        &app,
        "POST",
        "/api/tickets",
        Some(ticket_payload("to be deleted")),
    )
    .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send_json(&app, "DELETE", &format!("/api/tickets/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(&app, "GET", &format!("/api/tickets/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn similar_tickets_degrade_to_empty_without_providers() {
    let app = test_app();
    let (_, body) = send_json(
        &app,
        "POST",
        "/api/tickets",
        Some(ticket_payload("order sync fails")),
    )
    .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) =
        send_json(&app, "GET", &format!("/api/tickets/{id}/similar?limit=5"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["results"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn recommendation_degrades_to_null_but_unknown_id_is_404() {
    let app = test_app();
    let (_, body) = send_json(
        &app,
        "POST",
        "/api/tickets",
        Some(ticket_payload("order sync fails")),
    )
    .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send_json(
        &app,
        "GET",
        &format!("/api/tickets/{id}/recommendation"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["recommendation"].is_null());

    let (status, _) = send_json(&app, "GET", "/api/tickets/AS-19990101-01/recommendation", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tags_degrade_to_empty_list() {
    let app = test_app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/ai/tags",
        Some(json!({
            "description": "order sync fails",
            "category": "SYSTEM_FAILURE",
            "systemSource": "OMS",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tags"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn reindex_reports_counts() {
    let app = test_app();
    send_json(
        &app,
        "POST",
        "/api/tickets",
        Some(ticket_payload("order sync fails")),
    )
    .await;

    let (status, body) = send_json(&app, "POST", "/api/ai/reindex", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    // No providers configured, so nothing can be indexed.
    assert_eq!(body["data"]["indexed"], 0);
    assert_eq!(body["data"]["failed"], 1);
}
