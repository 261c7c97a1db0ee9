#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

pub struct Sidecar {
    pub child: Child,
    pub stdin: ChildStdin,
    pub reader: BufReader<ChildStdout>,
    next_id: u64,
}

impl Drop for Sidecar {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub fn spawn_sidecar() -> Sidecar {
    spawn_sidecar_with_args(&[])
}

pub fn spawn_sidecar_with_config(config: &Path) -> Sidecar {
    let path = config.to_string_lossy().to_string();
    spawn_sidecar_with_args(&["--config", path.as_str()])
}

pub fn spawn_sidecar_with_args(args: &[&str]) -> Sidecar {
    let exe = env!("CARGO_BIN_EXE_attendanced");
    let mut child = Command::new(exe)
        .args(args)
        .env_remove("ATTENDANCED_CONFIG")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn attendanced");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    Sidecar {
        child,
        stdin,
        reader: BufReader::new(stdout),
        next_id: 0,
    }
}

impl Sidecar {
    pub fn send_line(&mut self, line: &str) -> serde_json::Value {
        writeln!(self.stdin, "{}", line).expect("write request");
        self.stdin.flush().expect("flush request");

        let mut out = String::new();
        self.reader.read_line(&mut out).expect("read response line");
        assert!(!out.trim().is_empty(), "empty response for {}", line);
        serde_json::from_str(out.trim()).expect("parse response json")
    }

    pub fn request(&mut self, method: &str, params: serde_json::Value) -> serde_json::Value {
        self.next_id += 1;
        let id = self.next_id.to_string();
        let payload = json!({
            "id": id,
            "method": method,
            "params": params,
        });
        let value = self.send_line(&payload.to_string());
        assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id.as_str()));
        value
    }

    pub fn request_ok(&mut self, method: &str, params: serde_json::Value) -> serde_json::Value {
        let value = self.request(method, params);
        assert_eq!(
            value.get("ok").and_then(|v| v.as_bool()),
            Some(true),
            "{} failed: {}",
            method,
            value
        );
        value.get("result").cloned().expect("result")
    }

    /// Returns the error code of a failed request.
    pub fn request_err(&mut self, method: &str, params: serde_json::Value) -> (String, serde_json::Value) {
        let value = self.request(method, params);
        assert_eq!(
            value.get("ok").and_then(|v| v.as_bool()),
            Some(false),
            "{} unexpectedly succeeded: {}",
            method,
            value
        );
        let error = value.get("error").cloned().expect("error");
        let code = error
            .get("code")
            .and_then(|v| v.as_str())
            .expect("error code")
            .to_string();
        (code, error)
    }
}

pub fn record(id: &str, class_section: &str, date: &str, status: &str) -> serde_json::Value {
    let (class, section) = class_section.split_once('-').expect("class-section");
    json!({
        "id": id,
        "studentId": format!("S{}", id),
        "studentName": format!("Student {}", id),
        "class": class,
        "section": section,
        "date": date,
        "status": status,
        "subject": "Mathematics",
        "teacherId": "T001",
        "timeMarked": "09:15"
    })
}

pub fn student(id: &str, name: &str, class: &str, section: &str, roll: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "class": class,
        "section": section,
        "rollNumber": roll
    })
}

pub fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("attendanced.toml");
    std::fs::write(&path, body).expect("write config");
    path
}
