use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub struct TestContext {
    pub bin_path: PathBuf,
    pub tmp_root: PathBuf,
    runtime: Runtime,
}

pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestContext {
    pub fn new() -> Result<Self, String> {
        let bin_path = if let Some(path) = std::env::var_os("CARGO_BIN_EXE_taxicheck") {
            PathBuf::from(path)
        } else {
            let manifest_dir = std::env::var_os("CARGO_MANIFEST_DIR")
                .map(PathBuf::from)
                .ok_or_else(|| "CARGO_MANIFEST_DIR not set".to_string())?;
            let candidate = manifest_dir.join("target").join("debug").join("taxicheck");
            if !candidate.exists() {
                let status = Command::new("cargo")
                    .arg("build")
                    .current_dir(&manifest_dir)
                    .status()
                    .map_err(|e| format!("Failed to run cargo build: {}", e))?;
                if !status.success() {
                    return Err("cargo build failed".to_string());
                }
            }
            candidate
        };

        let tmp_root = std::env::temp_dir().join("taxicheck-e2e");
        fs::create_dir_all(&tmp_root).map_err(|e| format!("Failed to create temp root: {}", e))?;

        let runtime =
            Runtime::new().map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        Ok(Self {
            bin_path,
            tmp_root,
            runtime,
        })
    }

    /// Run a future on the harness runtime (mock setup, server start)
    pub fn block_on<F: Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    /// Start a mock backend; it keeps serving on the runtime's worker
    /// threads while the binary under test talks to it.
    pub fn start_backend(&self) -> MockServer {
        self.block_on(MockServer::start())
    }

    /// Mock backend whose root answers the expected health payload
    pub fn start_healthy_backend(&self) -> MockServer {
        let server = self.start_backend();
        self.block_on(
            Mock::given(method("GET"))
                .and(path("/"))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!({"message": "Hello World"})),
                )
                .mount(&server),
        );
        server
    }

    /// Run the binary with an isolated config dir so host configuration
    /// never leaks into a scenario.
    pub fn run_taxicheck(&self, args: &[&str]) -> Result<CommandOutput, String> {
        self.run_taxicheck_with_config(args, None)
    }

    /// Same, but seed the isolated config dir with a config.json first
    pub fn run_taxicheck_with_config(
        &self,
        args: &[&str],
        config_json: Option<&str>,
    ) -> Result<CommandOutput, String> {
        let config_home = self.unique_temp_dir("config")?;
        if let Some(content) = config_json {
            write_file(&config_home.join("taxicheck").join("config.json"), content)?;
        }
        let output = Command::new(&self.bin_path)
            .args(args)
            .env("XDG_CONFIG_HOME", &config_home)
            .output()
            .map_err(|e| format!("Failed to run taxicheck: {}", e))?;
        Ok(CommandOutput::from_output(output))
    }

    fn unique_temp_dir(&self, name: &str) -> Result<PathBuf, String> {
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::SeqCst);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| e.to_string())?
            .as_nanos();
        let dir = self.tmp_root.join(format!("{}-{}-{}", name, nanos, counter));
        fs::create_dir_all(&dir).map_err(|e| format!("Failed to create temp dir: {}", e))?;
        Ok(dir)
    }
}

impl CommandOutput {
    pub fn from_output(output: Output) -> Self {
        let status = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        Self {
            status,
            stdout,
            stderr,
        }
    }

    pub fn assert_success(&self) -> Result<(), String> {
        if self.status == 0 {
            Ok(())
        } else {
            Err(format!(
                "Expected success, got exit {}.\nstdout: {}\nstderr: {}",
                self.status, self.stdout, self.stderr
            ))
        }
    }

    pub fn assert_failure(&self) -> Result<(), String> {
        if self.status != 0 {
            Ok(())
        } else {
            Err(format!("Expected failure, got success.\nstdout: {}", self.stdout))
        }
    }

    pub fn assert_stdout_contains(&self, needle: &str) -> Result<(), String> {
        if self.stdout.contains(needle) {
            Ok(())
        } else {
            Err(format!(
                "Expected stdout to contain '{}'.\nstdout: {}",
                needle, self.stdout
            ))
        }
    }

    pub fn assert_stdout_not_contains(&self, needle: &str) -> Result<(), String> {
        if !self.stdout.contains(needle) {
            Ok(())
        } else {
            Err(format!(
                "Expected stdout to not contain '{}'.\nstdout: {}",
                needle, self.stdout
            ))
        }
    }

    pub fn assert_stderr_contains(&self, needle: &str) -> Result<(), String> {
        if self.stderr.contains(needle) {
            Ok(())
        } else {
            Err(format!(
                "Expected stderr to contain '{}'.\nstderr: {}",
                needle, self.stderr
            ))
        }
    }
}

pub fn write_file(path: &Path, content: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create parent dirs: {}", e))?;
    }
    fs::write(path, content).map_err(|e| format!("Failed to write file: {}", e))
}
