// railway cli interaction - availability checks, project listing and log fetching

use crate::utils::decode_output;
use anyhow::{Context, Result, anyhow};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};
use which::which;

const VERSION_TIMEOUT: Duration = Duration::from_secs(10);
const STATUS_TIMEOUT: Duration = Duration::from_secs(30);
const LOGS_TIMEOUT: Duration = Duration::from_secs(60);

pub const DEFAULT_SERVICE: &str = "default";

/// a project/service pair reported by `railway status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RailwayProject {
    pub name: String,
    pub service: String,
}

#[derive(Debug, Clone)]
pub struct RailwayCli {
    program: String,
    token: Option<String>,
    logs_timeout: Duration,
}

impl Default for RailwayCli {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RailwayCli {
    pub fn new(token: Option<String>) -> Self {
        Self::with_program("railway", token)
    }

    /// use a different executable name or path
    pub fn with_program(program: &str, token: Option<String>) -> Self {
        Self {
            program: program.to_string(),
            token,
            logs_timeout: LOGS_TIMEOUT,
        }
    }

    /// how long `railway logs` may run before the fetch is abandoned
    pub fn with_logs_timeout(mut self, limit: Duration) -> Self {
        self.logs_timeout = limit;
        self
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args).kill_on_drop(true);
        if let Some(token) = &self.token {
            cmd.env("RAILWAY_TOKEN", token);
        }
        cmd
    }

    async fn run(&self, args: &[&str], limit: Duration) -> Result<Output> {
        debug!(program = %self.program, ?args, "running railway cli");
        timeout(limit, self.command(args).output())
            .await
            .map_err(|_| anyhow!("railway {} timed out", args.join(" ")))?
            .with_context(|| format!("failed to execute '{}'", self.program))
    }

    /// true if the cli is on PATH and answers `--version`
    pub async fn is_available(&self) -> bool {
        if which(&self.program).is_err() {
            debug!(program = %self.program, "railway cli not found on PATH");
            return false;
        }

        match self.run(&["--version"], VERSION_TIMEOUT).await {
            Ok(output) if output.status.success() => true,
            Ok(output) => {
                warn!(status = %output.status, "railway --version failed");
                false
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "railway cli not accessible");
                false
            }
        }
    }

    /// projects the cli knows about; empty when the cli is missing or fails
    pub async fn list_projects(&self) -> Vec<RailwayProject> {
        if !self.is_available().await {
            return Vec::new();
        }

        match self.run(&["status"], STATUS_TIMEOUT).await {
            Ok(output) if output.status.success() => parse_status(&decode_output(&output.stdout)),
            Ok(output) => {
                warn!(stderr = %decode_output(&output.stderr).trim(), "railway status failed");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "error running railway status");
                Vec::new()
            }
        }
    }

    /// deployment logs for a project. never fails: problems come back as an
    /// explanatory string so the classifier always gets text to work on.
    pub async fn fetch_logs(&self, project: &str, service: &str) -> String {
        if !self.is_available().await {
            return "Railway CLI not available".to_string();
        }

        let mut args = vec!["logs", "--project", project];
        if service != DEFAULT_SERVICE {
            args.extend(["--service", service]);
        }

        let output = match timeout(self.logs_timeout, self.command(&args).output()).await {
            Err(_) => return "Log fetch timed out".to_string(),
            Ok(Err(e)) => return format!("Error running Railway CLI: {e}"),
            Ok(Ok(output)) => output,
        };

        if output.status.success() {
            decode_output(&output.stdout)
        } else {
            format!("Error fetching logs: {}", decode_output(&output.stderr))
        }
    }
}

/// service to fetch logs from for a repository: the one `railway status` lists
/// under the same project name, otherwise the default service
pub fn service_for<'a>(projects: &'a [RailwayProject], project: &str) -> &'a str {
    projects
        .iter()
        .find(|p| p.name == project)
        .map(|p| p.service.as_str())
        .unwrap_or(DEFAULT_SERVICE)
}

/// pick project/service pairs out of `railway status` output
pub fn parse_status(stdout: &str) -> Vec<RailwayProject> {
    stdout
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            lower.contains("project") && lower.contains("service")
        })
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(name), Some(service)) => Some(RailwayProject {
                    name: name.to_string(),
                    service: service.to_string(),
                }),
                _ => None,
            }
        })
        .collect()
}
