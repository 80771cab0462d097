// railway config scaffolding - railway.json, Procfile and Dockerfile generation

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_NODE_VERSION: &str = "18";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    Node,
    Python,
}

impl ProjectKind {
    fn build_command(&self) -> &'static str {
        match self {
            ProjectKind::Node => "npm run build",
            ProjectKind::Python => "pip install -r requirements.txt",
        }
    }

    pub fn start_command(&self) -> &'static str {
        match self {
            ProjectKind::Node => "npm start",
            ProjectKind::Python => "python main.py",
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectKind::Node => write!(f, "node"),
            ProjectKind::Python => write!(f, "python"),
        }
    }
}

/// contents of railway.json for a project kind
pub fn railway_json(kind: ProjectKind) -> Value {
    json!({
        "$schema": "https://railway.app/railway.schema.json",
        "build": {
            "builder": "NIXPACKS",
            "buildCommand": kind.build_command()
        },
        "deploy": {
            "startCommand": kind.start_command(),
            "healthcheckPath": "/api/health",
            "healthcheckTimeout": 100,
            "restartPolicyType": "ON_FAILURE",
            "restartPolicyMaxRetries": 10
        }
    })
}

pub fn procfile(start_command: &str) -> String {
    format!("web: {start_command}\n")
}

pub fn dockerfile(node_version: &str) -> String {
    format!(
        r#"FROM node:{node_version}-alpine

WORKDIR /app

# Copy package files
COPY package*.json ./

# Install dependencies
RUN npm ci --only=production

# Copy source code
COPY . .

# Build the application
RUN npm run build

# Expose port
EXPOSE $PORT

# Start the application
CMD ["npm", "start"]
"#
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Overwritten,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct ScaffoldedFile {
    pub path: PathBuf,
    pub outcome: WriteOutcome,
}

/// write railway deployment files into `root`. existing files are left alone unless `force`.
pub fn scaffold(
    root: &Path,
    kind: ProjectKind,
    node_version: &str,
    force: bool,
) -> Result<Vec<ScaffoldedFile>> {
    let railway = serde_json::to_string_pretty(&railway_json(kind))
        .context("failed to serialise railway.json")?;

    let mut files = vec![
        ("railway.json", railway),
        ("Procfile", procfile(kind.start_command())),
    ];
    if kind == ProjectKind::Node {
        files.push(("Dockerfile", dockerfile(node_version)));
    }

    files
        .into_iter()
        .map(|(name, content)| write_file(&root.join(name), &content, force))
        .collect()
}

fn write_file(path: &Path, content: &str, force: bool) -> Result<ScaffoldedFile> {
    let existed = path.exists();
    if existed && !force {
        info!(path = %path.display(), "keeping existing file");
        return Ok(ScaffoldedFile {
            path: path.to_path_buf(),
            outcome: WriteOutcome::Skipped,
        });
    }

    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), overwritten = existed, "wrote file");

    Ok(ScaffoldedFile {
        path: path.to_path_buf(),
        outcome: if existed {
            WriteOutcome::Overwritten
        } else {
            WriteOutcome::Created
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_config_uses_pip_and_main() {
        let config = railway_json(ProjectKind::Python);
        assert_eq!(config["build"]["buildCommand"], "pip install -r requirements.txt");
        assert_eq!(config["deploy"]["startCommand"], "python main.py");
        assert_eq!(config["deploy"]["restartPolicyMaxRetries"], 10);
    }

    #[test]
    fn procfile_declares_web_process() {
        assert_eq!(procfile("npm start"), "web: npm start\n");
    }

    #[test]
    fn dockerfile_uses_requested_node_version() {
        let content = dockerfile("20");
        assert!(content.starts_with("FROM node:20-alpine\n"));
        assert!(content.contains("EXPOSE $PORT"));
    }

    #[test]
    fn node_scaffold_writes_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let written = scaffold(dir.path(), ProjectKind::Node, DEFAULT_NODE_VERSION, false).unwrap();

        assert_eq!(written.len(), 3);
        assert!(written.iter().all(|f| f.outcome == WriteOutcome::Created));

        let config: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("railway.json")).unwrap()).unwrap();
        assert_eq!(config["build"]["builder"], "NIXPACKS");
        assert_eq!(config["deploy"]["healthcheckPath"], "/api/health");
    }

    #[test]
    fn python_scaffold_has_no_dockerfile() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path(), ProjectKind::Python, DEFAULT_NODE_VERSION, false).unwrap();

        assert!(!dir.path().join("Dockerfile").exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("Procfile")).unwrap(),
            "web: python main.py\n"
        );
    }

    #[test]
    fn existing_files_are_kept_without_force() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Procfile"), "web: custom\n").unwrap();

        let written = scaffold(dir.path(), ProjectKind::Node, DEFAULT_NODE_VERSION, false).unwrap();
        let procfile = written.iter().find(|f| f.path.ends_with("Procfile")).unwrap();
        assert_eq!(procfile.outcome, WriteOutcome::Skipped);
        assert_eq!(fs::read_to_string(dir.path().join("Procfile")).unwrap(), "web: custom\n");
    }

    #[test]
    fn force_overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Procfile"), "web: custom\n").unwrap();

        let written = scaffold(dir.path(), ProjectKind::Node, DEFAULT_NODE_VERSION, true).unwrap();
        let procfile = written.iter().find(|f| f.path.ends_with("Procfile")).unwrap();
        assert_eq!(procfile.outcome, WriteOutcome::Overwritten);
        assert_eq!(fs::read_to_string(dir.path().join("Procfile")).unwrap(), "web: npm start\n");
    }
}
