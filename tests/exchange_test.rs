//! Interception-host boundary, end to end

use pagefuse::{InlineConfig, InterceptedResponse, rewrite_response};
use url::Url;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn response_from(server_url: &str, content_type: &str, body: &[u8]) -> InterceptedResponse {
    let parsed = Url::parse(server_url).expect("mock server URL must parse");
    InterceptedResponse {
        scheme: parsed.scheme().to_string(),
        host: parsed.host_str().expect("mock server has a host").to_string(),
        port: parsed.port().unwrap_or(80),
        content_type: content_type.to_string(),
        body: body.to_vec(),
    }
}

#[tokio::test]
async fn intercepted_html_comes_back_self_contained() {
    init_logging();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/logo.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(vec![0x01u8, 0x02])
        .create_async()
        .await;

    let html = r#"<html><body><img src="logo.png"></body></html>"#;
    let outcome = rewrite_response(
        response_from(&server.url(), "text/html; charset=utf-8", html.as_bytes()),
        &InlineConfig::default(),
    )
    .await;

    let body = String::from_utf8(outcome.body).expect("rewritten body is UTF-8");
    assert!(body.contains("data:image/png;base64,AQI="));
    assert_eq!(outcome.successes, 1);
    // The origin the host substitutes with its listener address.
    assert_eq!(outcome.origin.to_string(), server.url());
}

#[tokio::test]
async fn fetch_failures_surface_in_the_outcome_not_the_body() {
    init_logging();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/gone.png")
        .with_status(404)
        .create_async()
        .await;

    let html = r#"<html><body><img src="gone.png"></body></html>"#;
    let outcome = rewrite_response(
        response_from(&server.url(), "text/html", html.as_bytes()),
        &InlineConfig::default(),
    )
    .await;

    let body = String::from_utf8(outcome.body).expect("rewritten body is UTF-8");
    assert_eq!(body, html);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].uri, "gone.png");
}

#[tokio::test]
async fn non_html_content_passes_through() {
    init_logging();
    let payload = br#"{"not": "html"}"#;
    let outcome = rewrite_response(
        response_from("http://origin.example:8080", "application/json", payload),
        &InlineConfig::default(),
    )
    .await;

    assert_eq!(outcome.body, payload);
    assert_eq!(outcome.origin.to_string(), "http://origin.example:8080");
}
