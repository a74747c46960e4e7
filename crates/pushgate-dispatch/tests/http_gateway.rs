use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pushgate_core::{DeviceToken, NotificationFields, PushError};
use pushgate_dispatch::{BatchDispatcher, BatchStatus, Gateway, HttpGateway};

fn gateway(server: &MockServer, devices: &[&str]) -> HttpGateway {
    HttpGateway::new(
        1,
        "test",
        format!("{}/push", server.uri()).parse().unwrap(),
        devices.iter().map(|d| DeviceToken::from(*d)).collect(),
    )
}

fn hello() -> pushgate_core::Notification {
    NotificationFields {
        message: "Hello".to_string(),
        ..Default::default()
    }
    .build()
    .unwrap()
}

#[tokio::test]
async fn posts_payload_and_tokens_to_push_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/push"))
        .and(body_partial_json(json!({
            "gateway": 1,
            "device_tokens": ["a", "b"],
            "payload": {"aps": {"alert": "Hello"}},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway(&server, &["a", "b"]);
    let payload = hello().serialize().unwrap();
    let devices = gw.list_devices().await.unwrap();
    let receipt = gw.deliver(&payload, &devices).await.unwrap();
    assert!(receipt.rejected.is_empty());
}

#[tokio::test]
async fn rejected_tokens_in_response_become_per_device_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/push"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rejected": [{"token": "b", "reason": "stale token"}]
        })))
        .mount(&server)
        .await;

    let gw = gateway(&server, &["a", "b"]);
    let payload = hello().serialize().unwrap();
    let devices = gw.list_devices().await.unwrap();
    let receipt = gw.deliver(&payload, &devices).await.unwrap();

    assert_eq!(receipt.rejected.len(), 1);
    assert_eq!(receipt.rejected[0].token.as_ref().unwrap().as_str(), "b");
    assert_eq!(receipt.rejected[0].reason, "stale token");
}

#[tokio::test]
async fn empty_success_body_means_no_rejections() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/push"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let gw = gateway(&server, &["a"]);
    let payload = hello().serialize().unwrap();
    let devices = gw.list_devices().await.unwrap();
    let receipt = gw.deliver(&payload, &devices).await.unwrap();
    assert!(receipt.rejected.is_empty());
}

#[tokio::test]
async fn unreadable_receipt_is_a_transport_failure_not_a_delivery() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/push"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"rejected": "oops"}"#))
        .mount(&server)
        .await;

    let gw = gateway(&server, &["a"]);
    let payload = hello().serialize().unwrap();
    let devices = gw.list_devices().await.unwrap();
    let err = gw.deliver(&payload, &devices).await.unwrap_err();
    assert!(matches!(err, PushError::Transport(_)));
    assert!(err.to_string().contains("unreadable delivery receipt"));
}

#[tokio::test]
async fn http_error_maps_to_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/push"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream busy"))
        .mount(&server)
        .await;

    let gw = gateway(&server, &["a"]);
    let payload = hello().serialize().unwrap();
    let devices = gw.list_devices().await.unwrap();
    let err = gw.deliver(&payload, &devices).await.unwrap_err();
    assert!(matches!(err, PushError::Transport(_)));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn dispatch_through_http_gateway_isolates_batch_failures() {
    let server = MockServer::start().await;
    // First batch rejected at transport level, the rest accepted.
    Mock::given(method("POST"))
        .and(path("/push"))
        .and(body_partial_json(json!({"device_tokens": ["a", "b"]})))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/push"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let gw = gateway(&server, &["a", "b", "c", "d", "e"]);
    let report = BatchDispatcher::new()
        .dispatch(&hello(), &gw, 2)
        .await
        .unwrap();

    let statuses: Vec<BatchStatus> = report.outcomes.iter().map(|o| o.status).collect();
    assert_eq!(
        statuses,
        vec![
            BatchStatus::Failed,
            BatchStatus::Delivered,
            BatchStatus::Delivered
        ]
    );
    assert_eq!(report.devices_attempted, 5);
    assert_eq!(report.devices_delivered, 3);
}
