use std::{
    net::{SocketAddr, TcpListener},
    process::Command,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use callbridge::{AppState, GatewayClient, GatewaySettings, SignalingHub, api::ApiSettings};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::{net::TcpStream, time::sleep, time::timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use wiremock::{Mock, MockServer, Request, ResponseTemplate, matchers::method};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

// -----------------------------------------------------------------------------
// ----- Fake gateway ----------------------------------------------------------

/// Janus-shaped HTTP endpoint: increasing ids for create/attach, an answer
/// for every offer, acks for everything else.
pub async fn fake_gateway() -> MockServer {
    let server = MockServer::start().await;
    let next_id = Arc::new(AtomicU64::new(5000));

    Mock::given(method("POST"))
        .respond_with(move |request: &Request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
            ResponseTemplate::new(200).set_body_json(reply_to(&body, &next_id))
        })
        .mount(&server)
        .await;

    server
}

/// Parsed bodies of every gateway request whose `janus` verb is `verb`.
#[allow(dead_code)]
pub async fn gateway_requests(server: &MockServer, verb: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
        .filter(|body| body["janus"] == verb)
        .collect()
}

fn reply_to(body: &Value, next_id: &AtomicU64) -> Value {
    let transaction = body["transaction"].clone();

    match body["janus"].as_str() {
        Some("create") | Some("attach") => json!({
            "janus": "success",
            "transaction": transaction,
            "data": { "id": next_id.fetch_add(1, Ordering::SeqCst) }
        }),
        Some("message") => json!({
            "janus": "success",
            "transaction": transaction,
            "plugindata": {
                "plugin": "janus.plugin.videoroom",
                "data": { "videoroom": body["body"]["request"], "room": body["body"]["room"] }
            }
        }),
        _ => json!({ "janus": "ack", "transaction": transaction }),
    }
}

// -----------------------------------------------------------------------------
// ----- In-process bridge -----------------------------------------------------

/// Starts the bridge on an ephemeral port, talking to `gateway`.
#[allow(dead_code)]
pub async fn spawn_bridge(gateway: &MockServer) -> (SocketAddr, Arc<SignalingHub>) {
    let client = GatewayClient::new(GatewaySettings {
        base_url: format!("{}/janus", gateway.uri()),
        api_secret: None,
        request_timeout: Duration::from_secs(5),
        accept_invalid_certs: false,
    })
    .expect("gateway client");

    let hub = Arc::new(SignalingHub::new(client, Default::default()));
    let state = AppState::new(
        hub.clone(),
        ApiSettings {
            gateway_url: format!("{}/janus", gateway.uri()),
            gateway_ws_url: "ws://127.0.0.1:8188".into(),
            public_ip: "127.0.0.1".into(),
            session_timeout: Duration::from_secs(1_800),
            recording_enabled: false,
            recording_dir: "./recordings".into(),
            recordings_dir: "./recordings".into(),
        },
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(callbridge::serve(listener, state, std::future::pending()));

    (addr, hub)
}

/// Polls `check` until it holds or a few seconds pass.
#[allow(dead_code)]
pub async fn eventually(mut check: impl FnMut() -> bool, what: &str) {
    for _ in 0..100 {
        if check() {
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("timed out waiting for: {what}");
}

// -----------------------------------------------------------------------------
// ----- Browser stand-in ------------------------------------------------------

pub struct Browser {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[allow(dead_code)]
impl Browser {
    pub async fn connect(addr: SocketAddr) -> Self {
        let (ws, _) = connect_async(format!("ws://{addr}/ws"))
            .await
            .expect("websocket connect");
        Self { ws }
    }

    pub async fn send(&mut self, frame: Value) {
        self.ws
            .send(Message::text(frame.to_string()))
            .await
            .expect("websocket send");
    }

    pub async fn send_raw(&mut self, frame: &str) {
        self.ws
            .send(Message::text(frame))
            .await
            .expect("websocket send");
    }

    /// Next JSON message from the bridge.
    pub async fn recv(&mut self) -> Value {
        loop {
            let next = timeout(RECV_TIMEOUT, self.ws.next())
                .await
                .expect("no message from bridge")
                .expect("socket closed")
                .expect("websocket read");

            if let Message::Text(text) = next {
                return serde_json::from_str(text.as_str()).expect("bridge sent invalid JSON");
            }
        }
    }

    /// Next message, which must have `type` == `kind`.
    pub async fn expect(&mut self, kind: &str) -> Value {
        let message = self.recv().await;
        assert_eq!(message["type"], kind, "unexpected message: {message}");
        message
    }

    /// Asserts nothing arrives for a short while.
    pub async fn expect_silence(&mut self) {
        if let Ok(Some(Ok(Message::Text(text)))) =
            timeout(Duration::from_millis(300), self.ws.next()).await
        {
            panic!("expected no message, got {text}");
        }
    }

    /// create-session, attach-plugin and join-room in one go.
    pub async fn join(&mut self, room: &str, display: &str, role: &str) -> Value {
        self.send(json!({ "type": "create-session" })).await;
        self.expect("session-created").await;
        self.send(json!({ "type": "attach-plugin" })).await;
        self.expect("plugin-attached").await;
        self.send(json!({
            "type": "join-room",
            "roomId": room,
            "display": display,
            "role": role
        }))
        .await;
        self.expect("joined-room").await
    }

    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}

// -----------------------------------------------------------------------------
// ----- Spawned binary --------------------------------------------------------

#[allow(dead_code)]
pub fn reserve_port(host: &str) -> u16 {
    let addr = format!("{host}:0");
    let listener = TcpListener::bind(&addr).expect("bind ephemeral port");
    listener.local_addr().unwrap().port()
}

#[allow(dead_code)]
pub fn spawn_callbridge(host: &str, port: u16, gateway_url: &str) -> std::process::Child {
    let exe = env!("CARGO_BIN_EXE_callbridge");

    Command::new(exe)
        .env("CALLBRIDGE_HOST", host)
        .env("PORT", port.to_string())
        .env("JANUS_URL", gateway_url)
        .env_remove("CALLBRIDGE_CONFIG_FILE")
        .env_remove("JANUS_API_SECRET")
        .spawn()
        .expect("spawn callbridge")
}

#[allow(dead_code)]
pub async fn wait_for_listen(host: &str, port: u16) {
    let addr = format!("{host}:{port}");
    for _ in 0..100 {
        if std::net::TcpStream::connect(&addr).is_ok() {
            return;
        }
        sleep(Duration::from_millis(50)).await;
    }
    panic!("callbridge did not start listening on {addr}");
}
