//! Shared utilities for end-to-end tests.

use std::net::SocketAddr;

use phone_inventory::config::AppConfig;
use phone_inventory::observability::Logger;
use phone_inventory::{Application, Shutdown};

/// A server running on an ephemeral port. Dropping it stops the server.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server with default config and an empty in-memory store.
pub async fn spawn_server() -> TestServer {
    spawn_with(|_| {}).await
}

#[allow(dead_code)]
/// Start a server after letting `configure` adjust the defaults.
pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> TestServer {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    configure(&mut config);

    let app = Application::build(config, Logger::new()).await.unwrap();
    let addr = app.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(app.run(receiver));

    TestServer {
        addr,
        client: reqwest::Client::new(),
        shutdown,
    }
}
