//! Shared utilities for integration testing.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use fileserver::config::ServerConfig;
use fileserver::lifecycle::{LifecycleServer, Shutdown, StateWatch};
use fileserver::ServerError;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    #[allow(dead_code)]
    pub state: StateWatch,
    pub handle: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Config bound to 127.0.0.1 on an ephemeral port.
#[allow(dead_code)]
pub fn local_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.address = "127.0.0.1".into();
    config.listener.port = 0;
    config
}

/// Build the tree:
///
/// ```text
/// a.txt
/// sub/b.txt
/// sub/deeper/c.txt
/// empty/
/// ```
pub fn sample_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "alpha").unwrap();
    fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
    fs::write(dir.path().join("sub/b.txt"), "bravo").unwrap();
    fs::write(dir.path().join("sub/deeper/c.txt"), "charlie").unwrap();
    fs::create_dir(dir.path().join("empty")).unwrap();
    dir
}

pub async fn start_server(root: &Path) -> TestServer {
    start_server_with(local_config(), root).await
}

#[allow(dead_code)]
pub async fn start_server_with(config: ServerConfig, root: &Path) -> TestServer {
    let root = root.canonicalize().unwrap();
    let running = LifecycleServer::new(config, root).start().await.unwrap();

    TestServer {
        addr: running.local_addr(),
        shutdown: running.shutdown_handle(),
        state: running.state(),
        handle: tokio::spawn(running.wait()),
    }
}

/// Body lines, sorted, without the trailing newline.
#[allow(dead_code)]
pub fn sorted_lines(body: &str) -> Vec<String> {
    let mut lines: Vec<String> = body.lines().map(str::to_string).collect();
    lines.sort();
    lines
}
