// local project checks - common railway misconfiguration in a project directory

use anyhow::{Context, Result};
use git2::Repository;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

lazy_static! {
    static ref ENV_VAR_USAGE: Regex = Regex::new(r"process\.env\.(\w+)").unwrap();
    static ref HARDCODED_PORT: Regex = Regex::new(r"listen\(\s*3000\s*\)").unwrap();
}

const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", "__pycache__"];
const COMMON_ENV_VARS: &[&str] = &["PORT", "DATABASE_URL", "NODE_ENV"];

/// files railway can use to build and start a service, with advice when absent
const RAILWAY_FILES: &[(&str, &str)] = &[
    ("railway.json", "Create railway.json for Railway configuration"),
    ("Procfile", "Create Procfile: web: npm start"),
    ("Dockerfile", "Create Dockerfile for containerized deployment"),
];

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    #[serde(default)]
    scripts: BTreeMap<String, String>,
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
}

/// summary of package.json
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSummary {
    pub start_script: Option<String>,
    pub build_script: Option<String>,
    pub dependencies: usize,
    pub dev_dependencies: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectReport {
    pub package: Option<PackageSummary>,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub env_vars: BTreeSet<String>,
    /// railway file name -> present
    pub railway_files: Vec<(String, bool)>,
    pub env_file_exposed: bool,
}

impl ProjectReport {
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

/// run every check against the project rooted at `root`
pub fn check_project(root: &Path) -> Result<ProjectReport> {
    let mut report = ProjectReport::default();

    check_package_json(root, &mut report)?;
    check_server(root, &mut report)?;

    report.env_vars = scan_env_vars(root);
    if report.env_vars.is_empty() {
        report
            .recommendations
            .push("Consider using environment variables for configuration".to_string());
    }

    for (file, advice) in RAILWAY_FILES {
        let present = root.join(file).exists();
        if !present {
            report.recommendations.push(advice.to_string());
        }
        report.railway_files.push((file.to_string(), present));
    }

    if env_file_exposed(root) {
        report.env_file_exposed = true;
        report
            .recommendations
            .push("Add .env to .gitignore and use Railway environment variables".to_string());
    }

    debug!(
        issues = report.issues.len(),
        recommendations = report.recommendations.len(),
        "project check finished"
    );
    Ok(report)
}

fn check_package_json(root: &Path, report: &mut ProjectReport) -> Result<()> {
    let path = root.join("package.json");
    if !path.exists() {
        return Ok(());
    }

    let package = read_package_json(&path)?;
    let summary = PackageSummary {
        start_script: package.scripts.get("start").cloned(),
        build_script: package.scripts.get("build").cloned(),
        dependencies: package.dependencies.len(),
        dev_dependencies: package.dev_dependencies.len(),
    };

    if summary.start_script.is_none() {
        report.issues.push("Missing 'start' script in package.json".to_string());
        report
            .recommendations
            .push("Add 'start' script: 'node server/index.js'".to_string());
    }
    if summary.build_script.is_none() {
        report.issues.push("Missing 'build' script in package.json".to_string());
        report.recommendations.push("Add 'build' script: 'vite build'".to_string());
    }

    report.package = Some(summary);
    Ok(())
}

fn read_package_json(path: &Path) -> Result<PackageJson> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn check_server(root: &Path, report: &mut ProjectReport) -> Result<()> {
    let path = server_entry(root);
    if !path.exists() {
        return Ok(());
    }

    let content =
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;

    if !content.contains("process.env.PORT") {
        report.issues.push("Server doesn't use process.env.PORT".to_string());
        report
            .recommendations
            .push("Update server to use: const PORT = process.env.PORT || 5000".to_string());
    }

    if !content.contains("app.listen(PORT") {
        report.issues.push("Server doesn't bind to PORT variable".to_string());
        report
            .recommendations
            .push("Update to: app.listen(PORT, () => { ... })".to_string());
    }

    if HARDCODED_PORT.is_match(&content) {
        report.issues.push("Hardcoded port 3000 found".to_string());
        report
            .recommendations
            .push("Replace hardcoded port with process.env.PORT".to_string());
    }

    Ok(())
}

fn server_entry(root: &Path) -> PathBuf {
    root.join("server").join("index.js")
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// every `process.env.NAME` referenced by js/ts sources under `root`
pub fn scan_env_vars(root: &Path) -> BTreeSet<String> {
    let mut found = BTreeSet::new();

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_source_file(e.path()));

    for entry in walker {
        // unreadable or non utf-8 files are skipped
        let Ok(content) = fs::read_to_string(entry.path()) else {
            continue;
        };
        for cap in ENV_VAR_USAGE.captures_iter(&content) {
            found.insert(cap[1].to_string());
        }
    }

    found
}

/// advice for common railway variables the project never reads
pub fn env_var_suggestions(found: &BTreeSet<String>) -> Vec<String> {
    COMMON_ENV_VARS
        .iter()
        .filter(|var| !found.contains(**var))
        .map(|var| format!("Consider using process.env.{var} for Railway compatibility"))
        .collect()
}

/// true if a .env file exists and git would not ignore it
fn env_file_exposed(root: &Path) -> bool {
    let env_path = root.join(".env");
    if !env_path.exists() {
        return false;
    }

    let Ok(repo) = Repository::discover(root) else {
        // not under git: nothing stops it from being committed later
        return true;
    };
    let Some(workdir) = repo.workdir() else {
        return true;
    };

    let absolute = env_path.canonicalize().unwrap_or(env_path);
    let workdir = workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf());
    match absolute.strip_prefix(&workdir) {
        Ok(relative) => !repo.status_should_ignore(relative).unwrap_or(false),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, content: &str) {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn healthy_project() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir,
            "package.json",
            r#"{"scripts":{"start":"node server/index.js","build":"vite build"},"dependencies":{"express":"^4"},"devDependencies":{"vite":"^5"}}"#,
        );
        write(
            &dir,
            "server/index.js",
            "const PORT = process.env.PORT || 5000;\napp.listen(PORT, () => {});\n",
        );
        for (file, _) in RAILWAY_FILES {
            write(&dir, file, "");
        }
        dir
    }

    #[test]
    fn healthy_project_has_no_issues() {
        let dir = healthy_project();
        let report = check_project(dir.path()).unwrap();

        assert!(report.is_healthy(), "issues: {:?}", report.issues);
        assert!(report.recommendations.is_empty(), "{:?}", report.recommendations);
        assert_eq!(
            report.package,
            Some(PackageSummary {
                start_script: Some("node server/index.js".to_string()),
                build_script: Some("vite build".to_string()),
                dependencies: 1,
                dev_dependencies: 1,
            })
        );
        assert!(report.railway_files.iter().all(|(_, present)| *present));
    }

    #[test]
    fn missing_scripts_are_issues() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "package.json", r#"{"name":"app"}"#);

        let report = check_project(dir.path()).unwrap();
        assert!(report.issues.contains(&"Missing 'start' script in package.json".to_string()));
        assert!(report.issues.contains(&"Missing 'build' script in package.json".to_string()));
    }

    #[test]
    fn hardcoded_port_is_flagged() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "server/index.js", "app.listen( 3000 );\n");

        let report = check_project(dir.path()).unwrap();
        assert_eq!(
            report.issues,
            vec![
                "Server doesn't use process.env.PORT",
                "Server doesn't bind to PORT variable",
                "Hardcoded port 3000 found",
            ]
        );
    }

    #[test]
    fn missing_railway_files_get_advice() {
        let dir = tempfile::tempdir().unwrap();
        let report = check_project(dir.path()).unwrap();

        assert!(report.is_healthy());
        assert!(report.recommendations.contains(&"Create Procfile: web: npm start".to_string()));
        assert!(report.railway_files.iter().all(|(_, present)| !*present));
    }

    #[test]
    fn env_scan_skips_node_modules() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "src/db.ts", "const url = process.env.DATABASE_URL;\n");
        write(&dir, "src/app.jsx", "process.env.API_KEY; process.env.DATABASE_URL;\n");
        write(&dir, "node_modules/lib/index.js", "process.env.SHOULD_NOT_APPEAR\n");
        write(&dir, "notes.md", "process.env.NOT_SOURCE\n");

        let found = scan_env_vars(dir.path());
        let names: Vec<&str> = found.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["API_KEY", "DATABASE_URL"]);
    }

    #[test]
    fn suggestions_cover_unused_common_vars() {
        let found: BTreeSet<String> = ["PORT".to_string()].into_iter().collect();
        assert_eq!(
            env_var_suggestions(&found),
            vec![
                "Consider using process.env.DATABASE_URL for Railway compatibility",
                "Consider using process.env.NODE_ENV for Railway compatibility",
            ]
        );
    }

    #[test]
    fn ignored_env_file_is_not_exposed() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        write(&dir, ".gitignore", ".env\n");
        write(&dir, ".env", "PORT=1\n");

        assert!(!env_file_exposed(dir.path()));
    }

    #[test]
    fn tracked_env_file_is_exposed() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        write(&dir, ".env", "PORT=1\n");

        let report = check_project(dir.path()).unwrap();
        assert!(report.env_file_exposed);
    }
}
