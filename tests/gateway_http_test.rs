use promptpress::config::PromptpressConfig;
use tokio::time::{Duration, sleep};

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind ephemeral")
        .local_addr()
        .expect("local addr")
        .port()
}

fn loopback_config(port: u16) -> PromptpressConfig {
    let mut config = PromptpressConfig::default();
    config.gateway.bind = "127.0.0.1".to_string();
    config.gateway.port = port;
    config
}

async fn wait_for_health(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{port}/health");

    for _ in 0..80 {
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        sleep(Duration::from_millis(50)).await;
    }

    panic!("gateway did not become healthy at {url}");
}

#[tokio::test]
async fn run_rejects_non_loopback_without_token() {
    let mut config = PromptpressConfig::default();
    config.gateway.bind = "0.0.0.0".to_string();
    config.gateway.port = free_port();

    let err = promptpress::gateway::run(config, None)
        .await
        .expect_err("non-loopback run without token must fail");
    assert!(err.to_string().contains("Auth token required"));
}

#[tokio::test]
async fn health_and_ping_endpoints_answer() {
    let port = free_port();
    let config = loopback_config(port);
    let gateway = tokio::spawn(async move {
        let _ = promptpress::gateway::run(config, None).await;
    });

    wait_for_health(port).await;

    let body = reqwest::get(format!("http://127.0.0.1:{port}/health"))
        .await
        .expect("health response")
        .text()
        .await
        .expect("health body");
    assert_eq!(body, "ok");

    let body = reqwest::get(format!("http://127.0.0.1:{port}/ping"))
        .await
        .expect("ping response")
        .text()
        .await
        .expect("ping body");
    assert_eq!(body, "pong");

    gateway.abort();
    let _ = gateway.await;
}

#[tokio::test]
async fn root_serves_the_embedded_chat_page() {
    let port = free_port();
    let config = loopback_config(port);
    let gateway = tokio::spawn(async move {
        let _ = promptpress::gateway::run(config, None).await;
    });

    wait_for_health(port).await;

    let response = reqwest::get(format!("http://127.0.0.1:{port}/"))
        .await
        .expect("index response");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"), "{content_type}");
    let body = response.text().await.expect("index body");
    assert!(body.contains("promptpress"));

    gateway.abort();
    let _ = gateway.await;
}

#[tokio::test]
async fn chat_without_prompt_is_a_bad_request() {
    let port = free_port();
    let config = loopback_config(port);
    let gateway = tokio::spawn(async move {
        let _ = promptpress::gateway::run(config, None).await;
    });

    wait_for_health(port).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://127.0.0.1:{port}/chat"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .expect("chat response");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.expect("chat body");
    assert_eq!(body["ok"], false);
    assert!(
        body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("prompt")
    );

    gateway.abort();
    let _ = gateway.await;
}

#[tokio::test]
async fn chat_with_blank_prompt_is_a_bad_request() {
    let port = free_port();
    let config = loopback_config(port);
    let gateway = tokio::spawn(async move {
        let _ = promptpress::gateway::run(config, None).await;
    });

    wait_for_health(port).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://127.0.0.1:{port}/chat"))
        .json(&serde_json::json!({ "prompt": "   " }))
        .send()
        .await
        .expect("chat response");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    gateway.abort();
    let _ = gateway.await;
}

#[tokio::test]
async fn chat_requires_the_configured_token() {
    let port = free_port();
    let config = loopback_config(port);
    let gateway = tokio::spawn(async move {
        let _ = promptpress::gateway::run(config, Some("sekrit".into())).await;
    });

    wait_for_health(port).await;

    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{port}/chat");

    let response = client
        .post(&url)
        .json(&serde_json::json!({ "prompt": "hello" }))
        .send()
        .await
        .expect("chat response");
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    let response = client
        .post(&url)
        .header("authorization", "Bearer wrong")
        .json(&serde_json::json!({ "prompt": "hello" }))
        .send()
        .await
        .expect("chat response");
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    gateway.abort();
    let _ = gateway.await;
}

#[tokio::test]
async fn chat_without_api_key_reports_a_server_error() {
    let port = free_port();
    let mut config = loopback_config(port);
    config.model.api_key = None;
    let gateway = tokio::spawn(async move {
        let _ = promptpress::gateway::run(config, None).await;
    });

    wait_for_health(port).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://127.0.0.1:{port}/chat"))
        .json(&serde_json::json!({ "prompt": "hello" }))
        .send()
        .await
        .expect("chat response");
    assert_eq!(
        response.status(),
        reqwest::StatusCode::INTERNAL_SERVER_ERROR
    );
    let body: serde_json::Value = response.json().await.expect("chat body");
    assert_eq!(body["ok"], false);

    gateway.abort();
    let _ = gateway.await;
}
