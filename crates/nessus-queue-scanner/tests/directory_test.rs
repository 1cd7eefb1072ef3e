use nessus_queue_core::{ApiConfig, Credentials, ScanId};
use nessus_queue_scanner::{NessusClient, ScanDirectory, ScanError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve a single canned HTTP response and hand back the raw request.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.expect("read request");
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream
            .write_all(response.as_bytes())
            .await
            .expect("write response");
        String::from_utf8_lossy(&request).into_owned()
    });

    (format!("http://{addr}"), handle)
}

fn client(base_url: &str) -> NessusClient {
    let base_url = base_url.to_string();
    let credentials = Credentials::from_lookup(|key| {
        Some(match key {
            "ACCESS_KEY" => "ak-123".to_string(),
            "SECRET_KEY" => "sk-456".to_string(),
            "NESSUS_BASE_URL" => base_url.clone(),
            _ => "user".to_string(),
        })
    })
    .expect("build credentials");

    NessusClient::new(&credentials, &ApiConfig::default()).expect("build client")
}

#[tokio::test]
async fn test_list_scans_sends_api_keys_and_parses_body() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"scans": [{"id": 5, "name": "DMZ", "status": "empty"}, {"id": 6, "name": "LAN", "status": "completed"}]}"#,
    )
    .await;

    let scans = client(&base_url).list_scans().await.expect("list scans");
    let request = server.await.expect("server task");

    assert!(request.starts_with("GET /scans HTTP/1.1"));
    let request = request.to_ascii_lowercase();
    assert!(request.contains("x-apikeys: accesskey=ak-123; secretkey=sk-456"));
    assert!(request.contains("content-type: application/json"));

    assert_eq!(scans.len(), 2);
    assert_eq!(scans[0].id, ScanId::new(5));
    assert_eq!(scans[0].name, "DMZ");
    assert_eq!(scans[0].status, "empty");
    assert_eq!(scans[1].status, "completed");
}

#[tokio::test]
async fn test_list_scans_non_success_status() {
    let (base_url, server) = serve_once("401 Unauthorized", r#"{"error": "Invalid Credentials"}"#).await;

    let result = client(&base_url).list_scans().await;
    server.await.expect("server task");

    assert!(matches!(result, Err(ScanError::RemoteApi { status: 401 })));
}

#[tokio::test]
async fn test_list_scans_null_scans() {
    let (base_url, server) = serve_once("200 OK", r#"{"folders": [], "scans": null}"#).await;

    let scans = client(&base_url).list_scans().await.expect("list scans");
    server.await.expect("server task");

    assert!(scans.is_empty());
}
