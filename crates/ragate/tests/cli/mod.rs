//! Startup integration tests (spec §6 "exit codes").
//!
//! These drive [`ragate::serve`] directly rather than spawning the
//! compiled binary, since config misconfiguration is caught before any
//! socket is bound.

use ragate::{serve, Cli};
use std::io::Write;
use std::sync::OnceLock;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

/// `GATEWAY_CONFIG` is process-global; serializes tests that set it so
/// they don't race each other.
fn env_guard() -> &'static Mutex<()> {
    static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
    GUARD.get_or_init(|| Mutex::new(()))
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create tempfile");
    write!(file, "{contents}").expect("write config");
    file
}

#[tokio::test]
async fn serve_fails_fast_when_required_fields_are_missing() {
    let _guard = env_guard().lock().await;
    let file = config_file("[vector_store]\nbackend = \"memory\"\n");

    let cli = Cli::parse_from(["ragate", "--config", file.path().to_str().expect("utf8 path"), "--bind", "127.0.0.1:0"]);
    let result = serve(cli).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn serve_fails_fast_on_unknown_embedding_provider() {
    let _guard = env_guard().lock().await;
    let file = config_file(
        "[embedding]\nprovider = \"does-not-exist\"\nmodel = \"m\"\nbase_url = \"http://localhost\"\napi_key_env = \"\"\ndimensions = 2\n\n[vector_store]\nbackend = \"memory\"\n",
    );

    let cli = Cli::parse_from(["ragate", "--config", file.path().to_str().expect("utf8 path"), "--bind", "127.0.0.1:0"]);
    let result = serve(cli).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn serve_fails_fast_when_milvus_backend_lacks_settings() {
    let _guard = env_guard().lock().await;
    let file = config_file(
        "[embedding]\nprovider = \"caikit\"\nmodel = \"m\"\nbase_url = \"http://localhost\"\napi_key_env = \"\"\ndimensions = 2\n\n[vector_store]\nbackend = \"milvus\"\n",
    );

    let cli = Cli::parse_from(["ragate", "--config", file.path().to_str().expect("utf8 path"), "--bind", "127.0.0.1:0"]);
    let result = serve(cli).await;
    assert!(result.is_err());
}
