//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use xframe_filter::{HttpServer, PolicyStore, ServiceConfig, Shutdown};

pub const ADMIN_KEY: &str = "test-admin-key";

pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<PolicyStore>,
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

/// Serve `store` on an ephemeral port with the admin API enabled.
pub async fn start_server(store: Arc<PolicyStore>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = ServiceConfig::default();
    config.listener.bind_address = addr.to_string();
    config.admin.enabled = true;
    config.admin.api_key = ADMIN_KEY.to_string();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, store.clone());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        addr,
        store,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// `X-Frame-Options` on a plain GET, `None` when absent.
pub async fn frame_header(server: &TestServer, path: &str) -> Option<String> {
    let res = client().get(server.url(path)).send().await.expect("server unreachable");
    let values: Vec<_> = res.headers().get_all("x-frame-options").iter().collect();
    assert!(values.len() <= 1, "duplicate X-Frame-Options: {:?}", values);
    values
        .first()
        .map(|v| v.to_str().unwrap().to_string())
}

/// Submit the admin form the way a browser would.
pub async fn submit_form(server: &TestServer, fields: &[(&str, &str)]) -> reqwest::Response {
    client()
        .post(server.url("/admin/xframe"))
        .bearer_auth(ADMIN_KEY)
        .form(fields)
        .send()
        .await
        .expect("server unreachable")
}
