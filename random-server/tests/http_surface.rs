use std::{net::SocketAddr, sync::Arc};

use random_server::{
    config::{parse_config, ConfigFormat},
    http::{router, AppState},
    service::RandomService,
};
use random_telemetry::TelemetryHandle;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

const CONFIG: &str = r#"
[server]
http-listen = "127.0.0.1:0"
max-probabilities-chars = 40

[selection]
seed-hex = "9912f3bcf715a55ae5c9d47f9f65625900000000000000000000000000000000"
"#;

async fn spawn_server() -> (SocketAddr, TelemetryHandle) {
    let config = parse_config(CONFIG, ConfigFormat::Toml).unwrap();
    config.validate().unwrap();
    let telemetry = TelemetryHandle::from_config(config.telemetry.clone());
    let service = RandomService::new(config.seed().unwrap(), telemetry.clone()).unwrap();
    let app = router(AppState::new(
        Arc::new(service),
        config.server.max_probabilities_chars,
    ));
    let listener = TcpListener::bind(config.server.http_listen.as_str())
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, telemetry)
}

async fn request(addr: SocketAddr, method: &str, target: &str, body: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let raw = format!(
        "{method} {target} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    let status = response
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap();
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_owned())
        .unwrap_or_default();
    (status, body)
}

#[tokio::test]
async fn deterministic_route_serves_known_vector() {
    let (addr, telemetry) = spawn_server().await;
    let mut indices = Vec::new();
    for sequence in 0..10 {
        let target = format!("/getDeterministicRandom?s={sequence}&p=0.2,0.2,0.2,0.2,0.2");
        let (status, body) = request(addr, "GET", &target, "").await;
        assert_eq!(status, 200, "{body}");
        indices.push(body.parse::<usize>().unwrap());
    }
    assert_eq!(indices, vec![2, 1, 4, 0, 2, 1, 1, 3, 4, 1]);
    assert_eq!(telemetry.flush().counters["random.deterministic"], 10);
}

#[tokio::test]
async fn query_errors_are_plain_text_bad_requests() {
    let (addr, _) = spawn_server().await;

    let (status, body) = request(addr, "GET", "/getDeterministicRandom?p=1", "").await;
    assert_eq!((status, body.as_str()), (400, "sequence is missing"));

    let long = "0.1,".repeat(20);
    let target = format!("/getDeterministicRandom?s=1&p={long}");
    let (status, body) = request(addr, "GET", &target, "").await;
    assert_eq!(status, 400);
    assert_eq!(body, "string of probabilities must be less than 40 characters");

    let (status, body) = request(addr, "GET", "/getRandomInt64?min=1", "").await;
    assert_eq!((status, body.as_str()), (400, "max is missing"));
}

#[tokio::test]
async fn rpc_route_answers_over_the_wire() {
    let (addr, _) = spawn_server().await;

    let call = r#"{"jsonrpc":"2.0","id":7,"method":"random_getDeterministicRandom","params":{"sequence":0,"probabilities":[0.2,0.2,0.2,0.2,0.2]}}"#;
    let (status, body) = request(addr, "POST", "/rpc", call).await;
    assert_eq!(status, 200);
    let reply: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(reply["result"]["index"], 2);
    assert_eq!(reply["id"], 7);

    let (status, _) = request(addr, "POST", "/rpc", r#"{"id":1}"#).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn ping_answers() {
    let (addr, _) = spawn_server().await;
    let (status, body) = request(addr, "GET", "/ping", "").await;
    assert_eq!(status, 200);
    assert!(body.starts_with("pong @ "), "{body}");
}
