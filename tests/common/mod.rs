//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use managed_server::{ManagedServer, ServerError};
use tokio::task::JoinHandle;

/// Reserve an ephemeral loopback port and release it.
#[allow(dead_code)]
pub fn free_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Run `listen` on its own task.
pub fn spawn_listen(server: &Arc<ManagedServer>) -> JoinHandle<Result<(), ServerError>> {
    let server = Arc::clone(server);
    tokio::spawn(async move { server.listen().await })
}

/// Poll readiness until the server reports ready.
pub async fn wait_ready(server: &ManagedServer) {
    for _ in 0..200 {
        if server.is_ready().is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("server {} never became ready", server.name());
}

/// HTTP client that neither pools connections nor honours proxy settings.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
