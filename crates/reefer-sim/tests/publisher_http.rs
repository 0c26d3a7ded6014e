//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "tests"
//! ems_type: "source"
//! ems_scope: "test"
//! ems_description: "HTTP publisher against an in-process device endpoint."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use reefer_common::config::ThingsboardConfig;
use reefer_sim::{HttpTelemetryPublisher, PublishError, SensorState, TelemetrySink};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[derive(Clone)]
struct Device {
    reply: StatusCode,
    reply_body: &'static str,
    delay: Duration,
    received: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Device {
    fn answering(reply: StatusCode, reply_body: &'static str) -> Self {
        Self {
            reply,
            reply_body,
            delay: Duration::ZERO,
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

async fn telemetry(
    State(device): State<Device>,
    Path(token): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, &'static str) {
    device.received.lock().unwrap().push((token, body));
    if !device.delay.is_zero() {
        tokio::time::sleep(device.delay).await;
    }
    (device.reply, device.reply_body)
}

async fn spawn_device(device: Device) -> SocketAddr {
    let app = Router::new()
        .route("/api/v1/:token/telemetry", post(telemetry))
        .with_state(device);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn publisher_for(addr: SocketAddr, timeout: Duration) -> HttpTelemetryPublisher {
    HttpTelemetryPublisher::from_config(&ThingsboardConfig {
        host: addr.to_string(),
        access_token: "A1_TEST_TOKEN".into(),
        request_timeout: timeout,
    })
    .unwrap()
}

#[tokio::test]
async fn posts_reading_to_device_endpoint() {
    let device = Device::answering(StatusCode::OK, "");
    let received = device.received.clone();
    let addr = spawn_device(device).await;
    let publisher = publisher_for(addr, Duration::from_secs(5));

    publisher
        .publish(&SensorState::new(28.5, 79.0).payload())
        .await
        .unwrap();

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].0, "A1_TEST_TOKEN");
    assert_eq!(received[0].1, json!({"temperatura": 28.5, "umidade": 79.0}));
}

#[tokio::test]
async fn non_200_status_is_reported_with_body() {
    let addr = spawn_device(Device::answering(
        StatusCode::UNAUTHORIZED,
        "Invalid access token",
    ))
    .await;
    let publisher = publisher_for(addr, Duration::from_secs(5));

    let err = publisher
        .publish(&SensorState::new(20.0, 50.0).payload())
        .await
        .unwrap_err();
    match err {
        PublishError::Rejected { status, body } => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body, "Invalid access token");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn other_success_codes_still_count_as_failures() {
    let addr = spawn_device(Device::answering(StatusCode::ACCEPTED, "queued")).await;
    let publisher = publisher_for(addr, Duration::from_secs(5));

    let err = publisher
        .publish(&SensorState::new(20.0, 50.0).payload())
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::Rejected { status, .. } if status == StatusCode::ACCEPTED));
}

/// Answers 503 with a body shorter than its declared length, then hangs up.
async fn spawn_truncating_device() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.ends_with(b"}") {
            let read = socket.read(&mut chunk).await.unwrap();
            if read == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..read]);
        }
        socket
            .write_all(b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 64\r\n\r\npartial")
            .await
            .unwrap();
        socket.flush().await.unwrap();
    });
    addr
}

#[tokio::test]
async fn unreadable_rejection_body_is_described() {
    let addr = spawn_truncating_device().await;
    let publisher = publisher_for(addr, Duration::from_secs(5));

    let err = publisher
        .publish(&SensorState::new(20.0, 50.0).payload())
        .await
        .unwrap_err();
    match err {
        PublishError::Rejected { status, body } => {
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert!(body.starts_with("<unreadable body:"), "{body}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unresponsive_endpoint_times_out() {
    let mut device = Device::answering(StatusCode::OK, "");
    device.delay = Duration::from_secs(5);
    let addr = spawn_device(device).await;
    let publisher = publisher_for(addr, Duration::from_millis(200));

    let err = publisher
        .publish(&SensorState::new(20.0, 50.0).payload())
        .await
        .unwrap_err();
    match err {
        PublishError::Transport(inner) => assert!(inner.is_timeout()),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let publisher = publisher_for(addr, Duration::from_secs(2));

    let err = publisher
        .publish(&SensorState::new(20.0, 50.0).payload())
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::Transport(_)));
}
