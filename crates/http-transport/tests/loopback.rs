//! Drives a real client through `ReqwestTransport` against a loopback
//! HTTP/1.1 responder.

use std::sync::Arc;

use binding::{
    args, Args, ClientConfig, HttpMethod, InvocationError, MethodMetadata, RequestTemplate,
    Transport, TransportError,
};
use dispatch::ServiceClient;
use http_transport::{HttpTransportConfig, JsonCodec, ReqwestTransport};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// One request as seen on the wire.
#[derive(Debug)]
struct Captured {
    head: String,
    body: Vec<u8>,
}

impl Captured {
    fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }
}

async fn read_request(stream: &mut TcpStream) -> anyhow::Result<Captured> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let head_end = loop {
        let n = stream.read(&mut chunk).await?;
        anyhow::ensure!(n > 0, "connection closed before headers completed");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8(buf[..head_end].to_vec())?;
    let mut captured = Captured {
        head,
        body: buf[head_end..].to_vec(),
    };
    let length: usize = captured
        .header("content-length")
        .map(str::parse::<usize>)
        .transpose()?
        .unwrap_or(0);
    while captured.body.len() < length {
        let n = stream.read(&mut chunk).await?;
        anyhow::ensure!(n > 0, "connection closed before body completed");
        captured.body.extend_from_slice(&chunk[..n]);
    }
    Ok(captured)
}

/// Serves exactly one request with `status` and a JSON `body`, reporting
/// what was received.
async fn respond_once(
    status: &'static str,
    body: &'static str,
) -> anyhow::Result<(String, oneshot::Receiver<Captured>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}/", listener.local_addr()?);
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await?;
        let captured = read_request(&mut stream).await?;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await?;
        stream.shutdown().await?;
        let _ = tx.send(captured);
        anyhow::Ok(())
    });

    Ok((base_url, rx))
}

fn client(base_url: &str, config: &HttpTransportConfig) -> anyhow::Result<ServiceClient> {
    let transport = ReqwestTransport::new(config)?;
    let client = ServiceClient::builder(
        ClientConfig::new(base_url)?,
        Arc::new(transport),
        Arc::new(JsonCodec),
    )
    .endpoint(MethodMetadata::get("repos", "users/{user}/repos").path("user"))
    .endpoint(MethodMetadata::post("form", "post").field("arg1").form_encoded())
    .endpoint(
        MethodMetadata::put("update", "items/{id}")
            .path("id")
            .body()
            .required()
            .structured_body(),
    )
    .build()?;
    Ok(client)
}

#[tokio::test]
async fn get_sends_expanded_path_and_decodes_json() -> anyhow::Result<()> {
    let (base_url, received) = respond_once("200 OK", r#"[{"name": "courier"}]"#).await?;
    let client = client(&base_url, &HttpTransportConfig::default())?;

    let repos = client
        .invoke("repos", args!["czp3009"])?
        .into_response()
        .expect("repos returns a value")
        .await?;

    assert_eq!(repos, json!([{"name": "courier"}]));
    let captured = received.await?;
    assert_eq!(captured.request_line(), "GET /users/czp3009/repos HTTP/1.1");
    assert!(captured
        .header("user-agent")
        .is_some_and(|ua| ua.starts_with("courier/")));
    Ok(())
}

#[tokio::test]
async fn form_body_arrives_with_length_and_media_type() -> anyhow::Result<()> {
    let (base_url, received) = respond_once("200 OK", "{}").await?;
    let client = client(&base_url, &HttpTransportConfig::default())?;

    client
        .invoke("form", args!["01"])?
        .into_response()
        .expect("form returns a value")
        .await?;

    let captured = received.await?;
    assert_eq!(captured.request_line(), "POST /post HTTP/1.1");
    assert_eq!(captured.body, b"arg1=01");
    assert_eq!(captured.header("content-length"), Some("7"));
    assert_eq!(
        captured.header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
    Ok(())
}

#[tokio::test]
async fn structured_body_is_sent_as_json() -> anyhow::Result<()> {
    let (base_url, received) = respond_once("200 OK", r#"{"ok": true}"#).await?;
    let client = client(&base_url, &HttpTransportConfig::default())?;

    let reply = client
        .invoke("update", args![5, json!({"name": "widget"})])?
        .into_response()
        .expect("update returns a value")
        .await?;

    assert_eq!(reply, json!({"ok": true}));
    let captured = received.await?;
    assert_eq!(captured.request_line(), "PUT /items/5 HTTP/1.1");
    assert_eq!(captured.header("content-type"), Some("application/json"));
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&captured.body)?,
        json!({"name": "widget"})
    );
    Ok(())
}

#[tokio::test]
async fn error_status_is_reported_with_its_body() -> anyhow::Result<()> {
    let (base_url, _received) = respond_once("404 Not Found", r#"{"message": "Not Found"}"#).await?;
    let client = client(&base_url, &HttpTransportConfig::default())?;

    let outcome = client
        .invoke("repos", args!["nobody"])?
        .into_response()
        .expect("repos returns a value")
        .await;

    assert_eq!(
        outcome,
        Err(InvocationError::Status {
            status: 404,
            body: r#"{"message": "Not Found"}"#.into()
        })
    );
    Ok(())
}

#[tokio::test]
async fn refused_connection_is_a_connection_error() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}/", listener.local_addr()?);
    drop(listener);
    let client = client(&base_url, &HttpTransportConfig::default())?;

    let outcome = client
        .invoke("repos", args!["czp3009"])?
        .into_response()
        .expect("repos returns a value")
        .await;

    assert!(matches!(
        outcome,
        Err(InvocationError::Transport(TransportError::Connection { .. }))
    ));
    Ok(())
}

#[tokio::test]
async fn silent_server_times_out() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}/", listener.local_addr()?);
    let _server = tokio::spawn(async move {
        // Accept and hold the connection without answering.
        let (stream, _) = listener.accept().await?;
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        drop(stream);
        anyhow::Ok(())
    });

    let config = HttpTransportConfig {
        timeout_ms: Some(200),
        ..HttpTransportConfig::default()
    };
    let client = client(&base_url, &config)?;

    let outcome = client
        .invoke("repos", Args::new().with("czp3009"))?
        .into_response()
        .expect("repos returns a value")
        .await;

    assert_eq!(outcome, Err(InvocationError::Transport(TransportError::Timeout)));
    Ok(())
}

#[tokio::test]
async fn shutdown_closes_the_client() -> anyhow::Result<()> {
    let client = client("http://127.0.0.1:9/", &HttpTransportConfig::default())?;
    client.shutdown().await;

    let outcome = client
        .invoke("repos", args!["czp3009"])?
        .into_response()
        .expect("repos returns a value")
        .await;

    assert_eq!(outcome, Err(InvocationError::Closed));
    Ok(())
}

#[tokio::test]
async fn released_transport_refuses_to_send() -> anyhow::Result<()> {
    let (base_url, received) = respond_once("200 OK", "{}").await?;
    let transport = ReqwestTransport::new(&HttpTransportConfig::default())?;
    let get = || RequestTemplate::new(HttpMethod::Get, format!("{base_url}ping"), Vec::new(), None);

    let response = transport.send(get()).await?;
    assert_eq!(response.status, 200);
    assert_eq!(received.await?.request_line(), "GET /ping HTTP/1.1");

    transport.shutdown().await;

    assert!(matches!(
        transport.send(get()).await,
        Err(TransportError::Connection { .. })
    ));
    Ok(())
}
