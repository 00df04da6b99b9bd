use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use wiremock::MockServer;

use pawfect::api::{ClientConfig, PawfectClient};
use pawfect::config::{Config, SessionBackendKind};
use pawfect::session::{FileBackend, SessionStore};
use pawfect::ConversationController;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// File-backed session store inside a fresh temp dir
#[allow(dead_code)]
pub fn temp_session_store() -> (SessionStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = SessionStore::new(Box::new(FileBackend::with_path(
        tmp.path().join("session.json"),
    )));
    (store, tmp)
}

/// Config pointing at the mock server with a session file in `dir`
#[allow(dead_code)]
pub fn config_for(server: &MockServer, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.timeout_seconds = 5;
    config.session.backend = SessionBackendKind::File;
    config.session.file_path = Some(dir.path().join("session.json"));
    config
}

/// Client against the mock server, optionally carrying a token
#[allow(dead_code)]
pub fn client_for(server: &MockServer, token: Option<&str>) -> PawfectClient {
    let client = PawfectClient::new(ClientConfig {
        base_url: server.uri(),
        timeout_secs: 5,
    })
    .expect("failed to build client");
    match token {
        Some(token) => client.with_token(token),
        None => client,
    }
}

/// Controller over a client against the mock server
#[allow(dead_code)]
pub fn controller_for(server: &MockServer) -> ConversationController {
    ConversationController::new(Arc::new(client_for(server, Some("test-token"))))
}
