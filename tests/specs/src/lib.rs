// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end binary smoke tests.
//!
//! Spawns the real `cloud-run-invoker` binary as a subprocess with an
//! isolated credential environment and exercises it over HTTP.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Once;
use std::time::Duration;

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Resolve the path to the compiled `cloud-run-invoker` binary.
pub fn invoker_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("cloud-run-invoker")
}

/// Find a free TCP port by binding to :0 then releasing.
pub fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// A running `cloud-run-invoker` process that is killed on drop.
pub struct InvokerProcess {
    child: Child,
    port: u16,
    _home: tempfile::TempDir,
}

/// Builder for the credential environment handed to the process.
#[derive(Default)]
pub struct InvokerBuilder {
    credentials_file: Option<PathBuf>,
    metadata_host: Option<String>,
    extra_args: Vec<String>,
}

impl InvokerBuilder {
    /// Point `GOOGLE_APPLICATION_CREDENTIALS` at `path`.
    pub fn credentials_file(mut self, path: &Path) -> Self {
        self.credentials_file = Some(path.to_path_buf());
        self
    }

    /// Set `GCE_METADATA_HOST` so the metadata tier skips the link-local probe.
    pub fn metadata_host(mut self, host: &str) -> Self {
        self.metadata_host = Some(host.to_owned());
        self
    }

    /// Append raw command-line arguments.
    pub fn arg(mut self, arg: &str) -> Self {
        self.extra_args.push(arg.to_owned());
        self
    }

    pub fn spawn(self) -> anyhow::Result<InvokerProcess> {
        ensure_crypto();
        let binary = invoker_binary();
        anyhow::ensure!(binary.exists(), "invoker binary not found at {}", binary.display());

        let port = free_port()?;
        let home = tempfile::tempdir()?;

        let mut args: Vec<String> = vec![
            "--port".into(),
            port.to_string(),
            "--host".into(),
            "127.0.0.1".into(),
        ];
        args.extend(self.extra_args);

        let mut cmd = Command::new(&binary);
        cmd.args(&args)
            .env_remove("GOOGLE_APPLICATION_CREDENTIALS")
            .env_remove("GCE_METADATA_HOST")
            .env("LOG_FORMAT", "text")
            .env("LOG_LEVEL", "warn")
            .env("HOME", home.path())
            .env("CLOUDSDK_CONFIG", home.path().join("gcloud"))
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(ref path) = self.credentials_file {
            cmd.env("GOOGLE_APPLICATION_CREDENTIALS", path);
        }
        if let Some(ref host) = self.metadata_host {
            cmd.env("GCE_METADATA_HOST", host);
        }

        Ok(InvokerProcess { child: cmd.spawn()?, port, _home: home })
    }
}

impl InvokerProcess {
    pub fn build() -> InvokerBuilder {
        InvokerBuilder::default()
    }

    /// Spawn with an empty credential environment.
    pub fn start() -> anyhow::Result<Self> {
        Self::build().spawn()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL for HTTP requests.
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Poll the banner route until the listener answers.
    pub async fn wait_ready(&self, timeout: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        let client = reqwest::Client::new();
        let url = format!("{}/", self.base_url());
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("invoker did not become ready within {timeout:?}");
            }
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Send SIGTERM to the process.
    pub fn terminate(&self) -> anyhow::Result<()> {
        let status = Command::new("kill").arg("-TERM").arg(self.child.id().to_string()).status()?;
        anyhow::ensure!(status.success(), "kill -TERM failed: {status}");
        Ok(())
    }

    /// Wait for the process to exit within `timeout`.
    pub async fn wait_exit(
        &mut self,
        timeout: Duration,
    ) -> anyhow::Result<std::process::ExitStatus> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("invoker did not exit within {timeout:?}");
            }
            if let Some(status) = self.child.try_wait()? {
                return Ok(status);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

impl Drop for InvokerProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
