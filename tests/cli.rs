use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::process::Stdio;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn install() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{"name":"uniweb-tools","version":"2.3.1","peerDependencies":{"react":"^18"}}"#,
    )
    .unwrap();
    dir
}

fn uniweb(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("uniweb").unwrap();
    cmd.env("UNIWEB_PACKAGE_JSON", dir.path().join("package.json"))
        .env("UNIWEB_CACHE_DIR", dir.path().join("cache"))
        .env("NO_COLOR", "1")
        .env_remove("CI")
        .env_remove("RUST_LOG")
        .current_dir(dir.path());
    cmd
}

fn write_cache(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let cache = dir.path().join("cache");
    fs::create_dir_all(&cache).unwrap();
    let path = cache.join("update-notifier-uniweb-tools.json");
    fs::write(&path, body).unwrap();
    path
}

fn cached_update_now() -> String {
    format!(
        r#"{{"lastUpdateCheck":{},"update":{{"name":"uniweb-tools","current":"2.3.1","latest":"2.4.0","type":"minor"}}}}"#,
        chrono::Utc::now().timestamp_millis()
    )
}

/// Answers one registry request with `latest` after `delay`.
fn slow_registry(latest: &'static str, delay: Duration) -> (String, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        thread::sleep(delay);
        let body = format!(r#"{{"version":"{}"}}"#, latest);
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let _ = stream.write_all(response.as_bytes());
    });
    (url, server)
}

#[test]
#[serial]
fn missing_descriptor_exits_with_one_fatal_line() {
    let dir = tempfile::tempdir().unwrap();
    let output = uniweb(&dir)
        .env("NO_UPDATE_NOTIFIER", "1")
        .arg("info")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().collect();
    assert_eq!(lines.len(), 1, "stderr was: {}", stderr);
    assert!(lines[0].starts_with("Fatal error: ENOENT"));
}

#[test]
#[serial]
fn no_arguments_prints_help() {
    let dir = install();
    uniweb(&dir)
        .env("NO_UPDATE_NOTIFIER", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Manager for sites and modules"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
#[serial]
fn info_reports_package_metadata() {
    let dir = install();
    uniweb(&dir)
        .env("NO_UPDATE_NOTIFIER", "1")
        .args(["info", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""packageName": "uniweb-tools""#))
        .stdout(predicate::str::contains(r#""version": "2.3.1""#));
}

#[test]
#[serial]
fn version_flag_uses_descriptor_version() {
    let dir = install();
    uniweb(&dir)
        .env("NO_UPDATE_NOTIFIER", "1")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("2.3.1"));
}

#[test]
#[serial]
fn unknown_subcommand_is_usage_error_not_fatal() {
    let dir = install();
    uniweb(&dir)
        .env("NO_UPDATE_NOTIFIER", "1")
        .arg("deploy")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Fatal error").not());
}

#[test]
#[serial]
fn unreachable_registry_does_not_fail_the_command() {
    let dir = install();
    write_cache(&dir, r#"{"lastUpdateCheck":0}"#);

    uniweb(&dir)
        .env("UNIWEB_REGISTRY_URL", "http://127.0.0.1:9")
        .env("UNIWEB_UPDATE_CHECK_INTERVAL_MS", "0")
        .arg("peers")
        .assert()
        .success()
        .stdout(predicate::str::contains("react"));
}

#[test]
#[serial]
fn cached_update_is_announced_immediately_when_not_deferred() {
    let dir = install();
    write_cache(&dir, &cached_update_now());

    uniweb(&dir)
        .env("UNIWEB_UPDATE_DEFER", "false")
        .env("UNIWEB_UPDATE_GLOBAL", "true")
        .arg("info")
        .assert()
        .success()
        .stderr(predicate::str::contains("Update available"))
        .stderr(predicate::str::contains("npm i -g uniweb-tools"));
}

#[test]
#[serial]
fn opt_out_flag_suppresses_notice() {
    let dir = install();
    write_cache(&dir, &cached_update_now());

    uniweb(&dir)
        .args(["--no-update-notifier", "info"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Update available").not());
}

#[test]
#[serial]
fn slow_registry_answer_is_cached_before_exit() {
    let dir = install();
    let cache = write_cache(&dir, r#"{"lastUpdateCheck":0}"#);
    let (registry, server) = slow_registry("2.4.0", Duration::from_millis(150));

    uniweb(&dir)
        .env("UNIWEB_REGISTRY_URL", &registry)
        .env("UNIWEB_UPDATE_CHECK_INTERVAL_MS", "0")
        .arg("peers")
        .assert()
        .success()
        .stdout(predicate::str::contains("react"))
        .stderr(predicate::str::contains("Update available"));
    server.join().unwrap();

    let written = fs::read_to_string(&cache).unwrap();
    assert!(written.contains("2.4.0"), "cache was: {}", written);
    assert!(!written.contains(r#""lastUpdateCheck": 0"#), "cache was: {}", written);
}

#[test]
#[serial]
fn deferred_notice_follows_command_output() {
    let dir = install();
    write_cache(&dir, &cached_update_now());
    let log_path = dir.path().join("combined.log");
    let log = fs::File::create(&log_path).unwrap();

    let status = std::process::Command::new(assert_cmd::cargo::cargo_bin("uniweb"))
        .env("UNIWEB_PACKAGE_JSON", dir.path().join("package.json"))
        .env("UNIWEB_CACHE_DIR", dir.path().join("cache"))
        .env("NO_COLOR", "1")
        .env_remove("CI")
        .env_remove("RUST_LOG")
        .env_remove("UNIWEB_UPDATE_DEFER")
        .current_dir(dir.path())
        .arg("peers")
        .stdout(Stdio::from(log.try_clone().unwrap()))
        .stderr(Stdio::from(log))
        .status()
        .unwrap();
    assert!(status.success());

    let combined = fs::read_to_string(&log_path).unwrap();
    let output_at = combined.find("^18").expect("peer table missing");
    let notice_at = combined.find("Update available").expect("notice missing");
    assert!(output_at < notice_at, "output was:\n{}", combined);
    assert!(combined.contains("npm i uniweb-tools"));
}
