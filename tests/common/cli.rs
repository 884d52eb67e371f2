use assert_cmd::Command;
use serde::Serialize;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};
use tempfile::TempDir;

#[derive(Debug)]
pub struct SselRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
    pub duration: Duration,
    pub log_path: PathBuf,
}

impl SselRun {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&extract_json_payload(&self.stdout)).expect("parse stdout json")
    }

    pub fn stderr_json(&self) -> serde_json::Value {
        serde_json::from_str(&extract_json_payload(&self.stderr)).expect("parse stderr json")
    }
}

pub struct SselWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub log_dir: PathBuf,
}

impl SselWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        let log_dir = root.join("logs");
        fs::create_dir_all(&log_dir).expect("log dir");
        Self {
            temp_dir,
            root,
            log_dir,
        }
    }

    /// Write `value` as JSON into the workspace and return its path.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> PathBuf {
        let path = self.root.join(name);
        let body = serde_json::to_string_pretty(value).expect("serialize fixture");
        fs::write(&path, body).expect("write fixture");
        path
    }

    pub fn write_file(&self, name: &str, body: &str) -> PathBuf {
        let path = self.root.join(name);
        fs::write(&path, body).expect("write file");
        path
    }
}

pub fn run_ssel<I, S>(workspace: &SselWorkspace, args: I, label: &str) -> SselRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_ssel_with_env(
        workspace,
        args,
        std::iter::empty::<(String, String)>(),
        label,
    )
}

pub fn run_ssel_with_env<I, S, E, K, V>(
    workspace: &SselWorkspace,
    args: I,
    env_vars: E,
    label: &str,
) -> SselRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ssel"));
    cmd.current_dir(&workspace.root);
    cmd.args(args);
    for key in ["SSEL_TAGS", "SSEL_SCENARIOS", "SSEL_LINES", "SSEL_SUITE_TAGS", "SSEL_GROUP"] {
        cmd.env_remove(key);
    }
    cmd.envs(env_vars);
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_LOG", "scenario_select=debug");
    cmd.env("RUST_BACKTRACE", "1");

    let start = Instant::now();
    let output = cmd.output().expect("run ssel");
    let duration = start.elapsed();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let log_path = workspace.log_dir.join(format!("{label}.log"));
    let timestamp = SystemTime::now();
    let log_body = format!(
        "label: {label}\nstarted: {:?}\nduration: {:?}\nstatus: {}\nargs: {:?}\ncwd: {}\n\nstdout:\n{}\n\nstderr:\n{}\n",
        timestamp,
        duration,
        output.status,
        cmd.get_args().collect::<Vec<_>>(),
        workspace.root.display(),
        stdout,
        stderr
    );
    fs::write(&log_path, log_body).expect("write log");

    SselRun {
        stdout,
        stderr,
        status: output.status,
        duration,
        log_path,
    }
}

/// Return the first JSON document in `text`, skipping any log lines before it.
pub fn extract_json_payload(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            return lines[idx..].join("\n").trim().to_string();
        }
    }
    text.trim().to_string()
}
