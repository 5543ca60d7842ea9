use super::*;
use axum::{http::StatusCode, routing::get, Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;

async fn spawn_echo_server() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route(
            "/meta",
            get(|| async { Json(serde_json::json!({ "name": "demo", "files": 2 })) }),
        )
        .route(
            "/conflict",
            get(|| async { (StatusCode::CONFLICT, "project already exists") }),
        )
        .route("/teapot", get(|| async { StatusCode::IM_A_TEAPOT }));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

#[derive(Debug, Deserialize)]
struct Meta {
    name: String,
    files: u32,
}

#[tokio::test]
async fn decodes_json_only_when_declared() {
    let base = spawn_echo_server().await;
    let gateway = RemoteGateway::new(&base).expect("gateway");

    let text = gateway.call(GatewayRequest::get("/health")).await.expect("health");
    assert_eq!(text, ResponseBody::Text("OK".to_string()));

    let meta = gateway.call(GatewayRequest::get("/meta")).await.expect("meta");
    assert!(matches!(meta, ResponseBody::Json(_)));
    let meta: Meta = meta.into_json().expect("typed meta");
    assert_eq!(meta.name, "demo");
    assert_eq!(meta.files, 2);
}

#[tokio::test]
async fn non_success_carries_body_text_or_generic_message() {
    let base = spawn_echo_server().await;
    let gateway = RemoteGateway::new(&base).expect("gateway");

    let err = gateway
        .call(GatewayRequest::get("/conflict"))
        .await
        .expect_err("conflict");
    match err {
        GatewayError::Remote { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "project already exists");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = gateway
        .call(GatewayRequest::get("/teapot"))
        .await
        .expect_err("teapot");
    match err {
        GatewayError::Remote { status, message } => {
            assert_eq!(status, 418);
            assert_eq!(message, "HTTP 418");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = gateway
        .call(GatewayRequest::get("/missing"))
        .await
        .expect_err("missing");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let gateway = RemoteGateway::new(&format!("http://{addr}")).expect("gateway");
    let err = gateway
        .call(GatewayRequest::get("/health"))
        .await
        .expect_err("nothing listening");
    assert!(matches!(err, GatewayError::Transport(_)));
    assert_eq!(err.status(), None);
}

#[test]
fn api_path_encodes_each_segment() {
    assert_eq!(api_path(&["api", "projects"]), "/api/projects");
    assert_eq!(
        api_path(&["api", "projects", "a b/c", "files"]),
        "/api/projects/a%20b%2Fc/files"
    );
}

#[test]
fn endpoint_url_keeps_base_prefix() {
    let gateway = RemoteGateway::new("http://example.test/workspace/").expect("gateway");
    assert_eq!(
        gateway
            .endpoint_url("/api/projects/p1/export.zip")
            .expect("url")
            .as_str(),
        "http://example.test/workspace/api/projects/p1/export.zip"
    );
    assert!(RemoteGateway::new("not a url").is_err());
}

#[test]
fn text_bodies_holding_json_still_decode() {
    let body = ResponseBody::Text(r#"{"name":"x","files":0}"#.to_string());
    let meta: Meta = body.into_json().expect("decode");
    assert_eq!(meta.name, "x");
    assert!(ResponseBody::Text("nope".to_string())
        .into_json::<Meta>()
        .is_err());
}
