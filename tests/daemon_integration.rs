//! Integration tests for the unitdeck daemon.
//!
//! These tests start a real daemon instance with a scripted command runner
//! and communicate with it over the Unix socket to verify end-to-end
//! behavior without touching the host's service manager.

use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nix::unistd::getuid;
use serde_json::{json, Value};
use tempfile::TempDir;

use unitdeck::config::{
    LimitsConfig, LoggingConfig, RunnerConfig, SecurityConfig, Settings, SocketConfig, WriteConfig,
};
use unitdeck::error::{CommandErrorKind, PanelError, PanelResult};
use unitdeck::runner::{CommandOutput, CommandRunner};
use unitdeck::socket::SocketListener;

/// Canned answer for one argv token: `(exit_code, stdout, stderr)`, or a
/// typed timeout.
enum Scripted {
    Output(i32, String, String),
    Timeout,
}

/// Runner that answers from a fixed script instead of spawning processes.
struct ScriptedRunner {
    script: Vec<(&'static str, Scripted)>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, argv: &[&str], _elevate: bool, _stdin: Option<&str>) -> PanelResult<CommandOutput> {
        self.calls
            .lock()
            .unwrap()
            .push(argv.iter().map(|s| s.to_string()).collect());

        let entry = self
            .script
            .iter()
            .find(|(key, _)| argv.iter().any(|a| a == key))
            .unwrap_or_else(|| panic!("unscripted command: {:?}", argv));

        match &entry.1 {
            Scripted::Output(exit_code, stdout, stderr) => Ok(CommandOutput {
                exit_code: Some(*exit_code),
                stdout: stdout.clone(),
                stderr: stderr.clone(),
            }),
            Scripted::Timeout => Err(PanelError::Command {
                kind: CommandErrorKind::Timeout { timeout_secs: 20 },
            }),
        }
    }

    // Tests write into the temp directory directly
    fn needs_elevation(&self) -> bool {
        false
    }
}

/// Test daemon instance.
struct TestDaemon {
    socket_path: PathBuf,
    _temp_dir: TempDir,
    shutdown: Arc<tokio::sync::Notify>,
}

impl TestDaemon {
    /// Start a daemon whose runner answers from the given script.
    async fn start(script: Vec<(&'static str, Scripted)>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let units_dir = temp_dir.path().join("units");
        std::fs::create_dir_all(&units_dir).expect("Failed to create units dir");
        Self::start_in(temp_dir, units_dir, script).await
    }

    /// Start a daemon over an existing temp layout.
    ///
    /// Used when the script must reference paths under the allowed directory
    /// before the daemon exists.
    async fn start_in(
        temp_dir: TempDir,
        units_dir: PathBuf,
        script: Vec<(&'static str, Scripted)>,
    ) -> Self {
        let socket_path = temp_dir.path().join("daemon.sock");

        let settings = Settings {
            socket: SocketConfig {
                path: socket_path.clone(),
                permissions: "0600".to_string(),
            },
            security: SecurityConfig {
                // Fail-closed peer check requires the test user explicitly
                allowed_peer_uids: vec![getuid().as_raw()],
            },
            runner: RunnerConfig::default(),
            write: WriteConfig {
                allowed_dirs: vec![units_dir],
                max_unit_file_bytes: 4096,
            },
            limits: LimitsConfig {
                max_message_size: 1_048_576,
                max_concurrent_requests: 16,
                socket_timeout_seconds: 30,
            },
            logging: LoggingConfig {
                level: "warn".to_string(),
                format: "pretty".to_string(),
            },
        };
        settings.validate().expect("Test settings should be valid");

        let runner = Arc::new(ScriptedRunner {
            script,
            calls: Mutex::new(Vec::new()),
        });

        let listener = SocketListener::bind_with_runner(Arc::new(settings), runner)
            .await
            .expect("Failed to bind socket");

        let shutdown = Arc::new(tokio::sync::Notify::new());
        let shutdown_for_run = Arc::clone(&shutdown);

        tokio::spawn(async move {
            if let Err(e) = listener.run(shutdown_for_run).await {
                eprintln!("Listener error: {}", e);
            }
        });

        // Wait for socket to be ready
        tokio::time::sleep(Duration::from_millis(100)).await;

        Self {
            socket_path,
            _temp_dir: temp_dir,
            shutdown,
        }
    }

    /// Send a request to the daemon and get the response.
    fn send_request(&self, command: &str, params: Value) -> Result<Value, String> {
        let request = json!({
            "command": command,
            "params": params,
        });
        let request_bytes =
            serde_json::to_vec(&request).map_err(|e| format!("Failed to serialize: {}", e))?;
        self.send_frame(&request_bytes)
    }

    /// Send a raw payload frame and get the response.
    fn send_frame(&self, payload: &[u8]) -> Result<Value, String> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .map_err(|e| format!("Failed to connect: {}", e))?;

        stream
            .set_read_timeout(Some(Duration::from_secs(30)))
            .map_err(|e| format!("Failed to set read timeout: {}", e))?;
        stream
            .set_write_timeout(Some(Duration::from_secs(30)))
            .map_err(|e| format!("Failed to set write timeout: {}", e))?;

        let length = payload.len() as u32;
        stream
            .write_all(&length.to_be_bytes())
            .map_err(|e| format!("Failed to write length: {}", e))?;
        stream
            .write_all(payload)
            .map_err(|e| format!("Failed to write request: {}", e))?;
        stream
            .flush()
            .map_err(|e| format!("Failed to flush: {}", e))?;

        let mut length_bytes = [0u8; 4];
        stream
            .read_exact(&mut length_bytes)
            .map_err(|e| format!("Failed to read response length: {}", e))?;
        let response_length = u32::from_be_bytes(length_bytes) as usize;

        let mut response_bytes = vec![0u8; response_length];
        stream
            .read_exact(&mut response_bytes)
            .map_err(|e| format!("Failed to read response: {}", e))?;

        serde_json::from_slice(&response_bytes).map_err(|e| format!("Failed to parse: {}", e))
    }

    /// Stop the test daemon.
    async fn stop(self) {
        self.shutdown.notify_waiters();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

const UNIT_LIST: &str = "\
  UNIT                LOAD   ACTIVE SUB     DESCRIPTION
  cron.service        loaded active running Regular background program processing daemon
● broken.service      loaded failed failed  A unit that lost its mind
  ssh.service         loaded active running OpenBSD Secure Shell server
garbage line

LOAD   = Reflects whether the unit definition was properly loaded.
ACTIVE = The high-level unit activation state.

3 loaded units listed.
";

const UNIT_FILES: &str = "\
UNIT FILE           STATE
cron.service        enabled
ssh.service         enabled
broken.service      disabled

3 unit files listed.
";

// ============================================================================
// Socket Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_socket_connection() {
    let daemon = TestDaemon::start(vec![]).await;
    assert!(daemon.socket_path.exists(), "Socket file should exist");
    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ping_round_trip() {
    let daemon = TestDaemon::start(vec![]).await;

    let response = daemon.send_request("system.ping", json!({})).unwrap();
    assert_eq!(response["success"], true, "Response: {:?}", response);
    assert_eq!(response["data"]["pong"], true);

    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_multiple_requests() {
    let daemon = TestDaemon::start(vec![]).await;

    for i in 0..5 {
        let response = daemon.send_request("system.ping", json!({})).unwrap();
        assert_eq!(response["success"], true, "Request {}: {:?}", i, response);
    }

    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_malformed_json_gets_error_response() {
    let daemon = TestDaemon::start(vec![]).await;

    let response = daemon.send_frame(b"this is not json").unwrap();
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["code"], "PROTOCOL_ERROR");

    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unknown_command() {
    let daemon = TestDaemon::start(vec![]).await;

    let response = daemon.send_request("nginx.enable_site", json!({})).unwrap();
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["code"], "UNKNOWN_COMMAND");

    daemon.stop().await;
}

// ============================================================================
// Service Inventory Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_service_list_end_to_end() {
    let daemon = TestDaemon::start(vec![
        (
            "list-units",
            Scripted::Output(0, UNIT_LIST.to_string(), String::new()),
        ),
        (
            "list-unit-files",
            Scripted::Output(0, UNIT_FILES.to_string(), String::new()),
        ),
    ])
    .await;

    let response = daemon.send_request("service.list", json!({})).unwrap();
    assert_eq!(response["success"], true, "Response: {:?}", response);

    let services = response["data"]["services"].as_array().unwrap();
    assert_eq!(services.len(), 3);

    // Bullet-prefixed line parses like any other
    let broken = services
        .iter()
        .find(|s| s["unit"] == "broken.service")
        .unwrap();
    assert_eq!(broken["active"], "failed");
    assert_eq!(broken["enabled"], "disabled");

    let cron = services
        .iter()
        .find(|s| s["unit"] == "cron.service")
        .unwrap();
    assert_eq!(cron["enabled"], "enabled");
    assert_eq!(
        cron["description"],
        "Regular background program processing daemon"
    );

    // The garbage line was skipped, not fatal
    assert_eq!(response["data"]["skipped_lines"], 1);

    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_service_status_inactive_unit() {
    let daemon = TestDaemon::start(vec![(
        "status",
        Scripted::Output(
            3,
            "● cron.service - Cron daemon\n   Active: inactive (dead)\n".to_string(),
            String::new(),
        ),
    )])
    .await;

    let response = daemon
        .send_request("service.status", json!({"unit": "cron.service"}))
        .unwrap();
    assert_eq!(response["success"], true, "Response: {:?}", response);
    assert_eq!(response["data"]["exit_code"], 3);
    assert!(response["data"]["status_output"]
        .as_str()
        .unwrap()
        .contains("inactive"));

    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_command_timeout_surfaces_as_typed_code() {
    let daemon = TestDaemon::start(vec![("status", Scripted::Timeout)]).await;

    let response = daemon
        .send_request("service.status", json!({"unit": "cron.service"}))
        .unwrap();
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["code"], "COMMAND_TIMEOUT");

    daemon.stop().await;
}

// ============================================================================
// Validation Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_invalid_action_rejected() {
    let daemon = TestDaemon::start(vec![]).await;

    let response = daemon
        .send_request(
            "service.control",
            json!({"action": "mask", "unit": "cron.service"}),
        )
        .unwrap();
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["code"], "VALIDATION_ERROR");

    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_invalid_unit_name_rejected() {
    let daemon = TestDaemon::start(vec![]).await;

    let response = daemon
        .send_request(
            "service.control",
            json!({"action": "start", "unit": "cron.service; rm -rf /"}),
        )
        .unwrap();
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["code"], "VALIDATION_ERROR");

    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_service_control_dispatches_action() {
    let daemon = TestDaemon::start(vec![(
        "restart",
        Scripted::Output(0, String::new(), String::new()),
    )])
    .await;

    let response = daemon
        .send_request(
            "service.control",
            json!({"action": "restart", "unit": "cron.service"}),
        )
        .unwrap();
    assert_eq!(response["success"], true, "Response: {:?}", response);
    assert_eq!(response["data"]["action"], "restart");
    assert_eq!(response["data"]["unit"], "cron.service");

    daemon.stop().await;
}

// ============================================================================
// Unit File Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unit_file_write_applied() {
    let temp_dir = TempDir::new().unwrap();
    let units_dir = temp_dir.path().join("units");
    std::fs::create_dir_all(&units_dir).unwrap();
    let target = units_dir.join("app.service");

    let daemon = TestDaemon::start_in(
        temp_dir,
        units_dir,
        vec![
            (
                "show",
                Scripted::Output(0, format!("{}\n", target.display()), String::new()),
            ),
            (
                "daemon-reload",
                Scripted::Output(0, String::new(), String::new()),
            ),
        ],
    )
    .await;

    let response = daemon
        .send_request(
            "unit_file.write",
            json!({"unit": "app.service", "content": "[Unit]\nDescription=App\n"}),
        )
        .unwrap();
    assert_eq!(response["success"], true, "Response: {:?}", response);
    assert_eq!(response["data"]["status"], "applied");

    assert_eq!(
        std::fs::read_to_string(&target).unwrap(),
        "[Unit]\nDescription=App\n"
    );

    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unit_file_write_reload_failure_is_degraded_success() {
    let temp_dir = TempDir::new().unwrap();
    let units_dir = temp_dir.path().join("units");
    std::fs::create_dir_all(&units_dir).unwrap();
    let target = units_dir.join("app.service");

    let daemon = TestDaemon::start_in(
        temp_dir,
        units_dir,
        vec![
            (
                "show",
                Scripted::Output(0, format!("{}\n", target.display()), String::new()),
            ),
            (
                "daemon-reload",
                Scripted::Output(1, String::new(), "Failed to reload daemon".to_string()),
            ),
        ],
    )
    .await;

    let response = daemon
        .send_request(
            "unit_file.write",
            json!({"unit": "app.service", "content": "[Unit]\n"}),
        )
        .unwrap();
    assert_eq!(response["success"], true, "Response: {:?}", response);
    assert_eq!(response["data"]["status"], "applied_reload_failed");
    assert!(response["data"]["reload_error"]
        .as_str()
        .unwrap()
        .contains("Failed to reload"));

    // Content persisted despite the failed reload
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "[Unit]\n");

    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unit_file_write_forbidden_path() {
    let daemon = TestDaemon::start(vec![(
        "show",
        Scripted::Output(0, "/etc/passwd\n".to_string(), String::new()),
    )])
    .await;

    let response = daemon
        .send_request(
            "unit_file.write",
            json!({"unit": "app.service", "content": "[Unit]\n"}),
        )
        .unwrap();
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["code"], "PATH_FORBIDDEN");

    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unit_file_write_content_too_large() {
    let daemon = TestDaemon::start(vec![]).await;

    let content = "x".repeat(8192);
    let response = daemon
        .send_request(
            "unit_file.write",
            json!({"unit": "app.service", "content": content}),
        )
        .unwrap();
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["code"], "CONTENT_TOO_LARGE");

    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unit_file_read_round_trip() {
    let daemon = TestDaemon::start(vec![(
        "cat",
        Scripted::Output(
            0,
            "# /etc/systemd/system/app.service\n[Unit]\nDescription=App\n".to_string(),
            String::new(),
        ),
    )])
    .await;

    let response = daemon
        .send_request("unit_file.read", json!({"unit": "app.service"}))
        .unwrap();
    assert_eq!(response["success"], true, "Response: {:?}", response);
    assert_eq!(response["data"]["path"], "/etc/systemd/system/app.service");
    assert_eq!(response["data"]["content"], "[Unit]\nDescription=App\n");

    daemon.stop().await;
}
