// Fake gateway and helpers shared by the unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::mpsc;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use crate::frontend::hub::SignalingHub;
use crate::frontend::messages::ServerMessage;
use crate::gateway::{GatewayClient, GatewaySettings};
use crate::rooms::RoomPolicy;

/// Janus-shaped responder: hands out increasing ids for create/attach,
/// answers offers, acks everything else.
pub(crate) async fn fake_gateway() -> MockServer {
    let server = MockServer::start().await;
    let next_id = Arc::new(AtomicU64::new(1000));

    Mock::given(method("POST"))
        .respond_with(move |request: &Request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
            ResponseTemplate::new(200).set_body_json(janus_reply(&body, &next_id))
        })
        .mount(&server)
        .await;

    server
}

/// Gateway that refuses everything with `reason`.
pub(crate) async fn rejecting_gateway(reason: &str) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "janus": "error",
            "error": { "code": 490, "reason": reason }
        })))
        .mount(&server)
        .await;

    server
}

pub(crate) fn hub_for(server: &MockServer) -> Arc<SignalingHub> {
    let gateway = GatewayClient::new(GatewaySettings {
        base_url: format!("{}/janus", server.uri()),
        api_secret: None,
        request_timeout: Duration::from_secs(5),
        accept_invalid_certs: false,
    })
    .unwrap();

    Arc::new(SignalingHub::new(gateway, RoomPolicy::default()))
}

pub(crate) fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(message) = rx.try_recv() {
        out.push(message);
    }
    out
}

/// Gateway requests received so far whose plugin body has `request` set to
/// `name` (or whose `janus` is `name` for non-plugin calls).
pub(crate) async fn gateway_calls(server: &MockServer, name: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
        .filter(|body| body["janus"] == name || body["body"]["request"] == name)
        .collect()
}

fn janus_reply(body: &Value, next_id: &AtomicU64) -> Value {
    let transaction = body["transaction"].clone();

    match body["janus"].as_str() {
        Some("create") | Some("attach") => json!({
            "janus": "success",
            "transaction": transaction,
            "data": { "id": next_id.fetch_add(1, Ordering::SeqCst) }
        }),
        Some("message") => {
            let mut reply = json!({
                "janus": "success",
                "transaction": transaction,
                "plugindata": {
                    "plugin": "janus.plugin.videoroom",
                    "data": {
                        "videoroom": body["body"]["request"],
                        "room": body["body"]["room"]
                    }
                }
            });
            if body.get("jsep").is_some_and(|j| !j.is_null()) {
                reply["jsep"] = json!({ "type": "answer", "sdp": "v=0 answer" });
            }
            reply
        }
        _ => json!({ "janus": "ack", "transaction": transaction }),
    }
}
