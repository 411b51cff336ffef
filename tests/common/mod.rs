//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use redirector::config::{parse_config, RedirectorConfig};
use redirector::{HttpServer, Shutdown};
use tokio::net::TcpListener;

/// Rule file used across the integration tests.
pub const SCENARIO: &str = r#"
[redirect]
new_origin = "https://new.example"
lowercase = true
trailing_slash = "strip"
gone = ["/old-image.jpg", "/projects/tickerdex"]

[[redirect.exact]]
from = "/Posts"
to = "/blog"

[[redirect.patterns]]
pattern = "/lab/:rest*"
to = "/projects/lab/:rest"

[[redirect.patterns]]
pattern = "/lab/:slug"
to = "/never/:slug"
"#;

pub fn scenario_config() -> RedirectorConfig {
    parse_config(SCENARIO).expect("scenario config is valid")
}

/// Start the redirector on an ephemeral port.
pub async fn start_redirector(config: RedirectorConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config).expect("rules compile");
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Give the accept loop a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    (addr, shutdown)
}

/// HTTP client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
