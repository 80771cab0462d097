// railway-doctor-core/src/lib.rs

// declare modules
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod error;
pub mod github;
pub mod project;
pub mod railway;
pub mod recommend;
pub mod report;
pub mod scaffold;
pub mod utils;

// re-export key structs/functions for external use by other crates
pub use anyhow::{Context, Result}; // re-export for convenience
pub use clap::Parser; // re-export Parser for CLI crate
pub use console::style; // re-export for the CLI crate's own printing

pub use crate::catalog::{Category, PatternCatalog, default_catalog};
pub use crate::classifier::{Findings, analyze};
pub use crate::config::Config;
pub use crate::error::DoctorError;
pub use crate::recommend::generate;
pub use crate::report::{RepositoryAnalysis, RepositoryInfo, Status, assemble};

use clap::Subcommand;
use dialoguer::Password;
use dotenv::dotenv;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::github::GithubClient;
use crate::railway::{RailwayCli, service_for};
use crate::scaffold::{DEFAULT_NODE_VERSION, ProjectKind, WriteOutcome};

// argument parsing struct - shared by the cli crate
#[derive(Parser, Debug, Clone)]
#[command(name = "railway-doctor")]
#[command(about = "diagnose railway deployment failures across your projects", long_about = None)]
pub struct CoreCliArgs {
    /// config file (defaults to ./railway-doctor.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// fetch railway logs for every github repository and write a failure report
    Analyze {
        /// github username whose repositories are analysed
        #[arg(long)]
        github_user: Option<String>,

        /// github personal access token (prompted for if not provided)
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        github_token: Option<String>,

        /// railway api token passed to the railway cli
        #[arg(long, env = "RAILWAY_TOKEN", hide_env_values = true)]
        railway_token: Option<String>,

        /// limit analysis to the first N repositories
        #[arg(long)]
        limit: Option<usize>,

        /// directory the report file is written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// check a local project for common railway deployment issues
    Check {
        /// project directory (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
    },

    /// generate railway.json, Procfile and Dockerfile for a project
    Init {
        /// project directory (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// generate config for a python project instead of node
        #[arg(long)]
        python: bool,

        /// overwrite files that already exist
        #[arg(short, long)]
        force: bool,

        /// node version for the generated Dockerfile
        #[arg(long, default_value = DEFAULT_NODE_VERSION)]
        node_version: String,
    },
}

/// analyze settings after merging command-line flags over the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeOptions {
    pub user: String,
    /// `None` means every repository
    pub limit: Option<usize>,
    pub output_dir: PathBuf,
}

/// flags win over the config file. a limit of 0 means no limit.
pub fn resolve_analyze_options(
    config: &Config,
    github_user: Option<String>,
    limit: Option<usize>,
    output_dir: Option<PathBuf>,
) -> Result<AnalyzeOptions> {
    let user = github_user
        .or_else(|| config.github_user.clone())
        .context("a github user is required: pass --github-user or set github_user in the config file")?;
    let limit = limit.or(config.limit).filter(|n| *n > 0);
    let output_dir = output_dir
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(AnalyzeOptions { user, limit, output_dir })
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["🚂 ⠋", "🚂 ⠙", "🚂 ⠹", "🚂 ⠸", "🚂 ⠼", "🚂 ⠴", "🚂 ⠦", "🚂 ⠧", "🚂 ⠇", "🚂 ⠏"])
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// run the selected subcommand. returns false when the run found problems
/// that should turn into a non-zero exit code.
pub async fn execute_doctor_flow(args: CoreCliArgs) -> Result<bool> {
    dotenv().ok();
    let config = Config::load(args.config.as_deref()).context("failed to load config")?;

    match args.command {
        Command::Analyze {
            github_user,
            github_token,
            railway_token,
            limit,
            output_dir,
        } => {
            let options = resolve_analyze_options(&config, github_user, limit, output_dir)?;
            run_analysis(&config, &options, github_token, railway_token).await?;
            Ok(true)
        }
        Command::Check { path } => run_project_check(&path),
        Command::Init {
            path,
            python,
            force,
            node_version,
        } => {
            let kind = if python { ProjectKind::Python } else { ProjectKind::Node };
            run_init(&path, kind, force, &node_version)?;
            Ok(true)
        }
    }
}

fn resolve_github_token(token: Option<String>) -> Result<String> {
    let token = match token {
        Some(t) => t,
        None => Password::new()
            .with_prompt("enter your github personal access token")
            .allow_empty_password(true)
            .interact()
            .context("failed to read github token")?,
    };

    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(anyhow::anyhow!("github token is required"));
    }
    Ok(token)
}

async fn run_analysis(
    config: &Config,
    options: &AnalyzeOptions,
    github_token: Option<String>,
    railway_token: Option<String>,
) -> Result<()> {
    let user = options.user.as_str();
    let token = resolve_github_token(github_token)?;
    let catalog = config.catalog().context("failed to build pattern catalog")?;

    println!("{}", style("\n🚀 starting railway deployment analysis").cyan().bold());
    println!("{}", style("=".repeat(50)).dim());

    let github = GithubClient::new(user, &token)?;
    let fetching = spinner(&format!("fetching repositories for {user}..."));
    let mut repos = github.list_repositories().await;
    fetching.finish_and_clear();
    println!("{}", style(format!("✅ found {} repositories", repos.len())).green());

    if let Some(limit) = options.limit {
        repos.truncate(limit);
        println!("{}", style(format!("🔍 limiting analysis to first {limit} repositories")).yellow());
    }

    let railway = RailwayCli::new(railway_token);
    if !railway.is_available().await {
        println!("{}", style("⚠️  railway cli not found or not accessible").yellow().bold());
    }
    let projects = railway.list_projects().await;

    let total = repos.len();
    let mut analyses = Vec::with_capacity(total);
    for (i, repo) in repos.into_iter().enumerate() {
        println!("\n{} {}", style(format!("[{}/{}]", i + 1, total)).dim(), style(format!("📁 {}", repo.name)).cyan().bold());
        println!("   url: {}", repo.url);
        println!("   last updated: {}", repo.last_updated);

        let logs = railway
            .fetch_logs(&repo.name, service_for(&projects, &repo.name))
            .await;
        let name = repo.name.clone();
        match RepositoryAnalysis::from_logs(repo, &logs, &catalog) {
            Ok(analysis) => {
                println!("   {}", analysis.status());
                analyses.push(analysis);
            }
            Err(e) => {
                // a malformed entry drops out of the report, the rest carry on
                eprintln!("{} {}", style(format!("❌ skipping {name}:")).red().bold(), style(e).red());
            }
        }
    }

    let generated_at = chrono::Local::now().naive_local();
    let report_text = assemble(user, &analyses, generated_at);
    let path = report::write_report(&options.output_dir, &report_text, generated_at)
        .context("failed to write report")?;
    info!(repositories = analyses.len(), "analysis complete");

    println!("\n{} {}", style("📄 report saved to:").green().bold(), path.display());
    println!("\n{}", "=".repeat(80));
    println!("{}", style("ANALYSIS COMPLETE").green().bold());
    println!("{}", "=".repeat(80));
    println!("{report_text}");

    Ok(())
}

fn run_project_check(root: &Path) -> Result<bool> {
    println!("{}", style("🔍 analysing project for railway deployment issues").cyan().bold());
    println!("{}", "=".repeat(60));

    let report = project::check_project(root)
        .with_context(|| format!("failed to check project at {}", root.display()))?;

    if let Some(package) = &report.package {
        println!("\n{}", style("📦 package.json").cyan());
        match &package.start_script {
            Some(script) => println!("   ✅ start script: {script}"),
            None => println!("   ❌ no start script"),
        }
        match &package.build_script {
            Some(script) => println!("   ✅ build script: {script}"),
            None => println!("   ❌ no build script"),
        }
        println!(
            "   📊 dependencies: {} production, {} dev",
            package.dependencies, package.dev_dependencies
        );
    }

    println!("\n{}", style("🔧 environment variables").cyan());
    if report.env_vars.is_empty() {
        println!("   ⚠️  no environment variables found");
    } else {
        let names: Vec<&str> = report.env_vars.iter().map(String::as_str).collect();
        println!("   📋 found: {}", names.join(", "));
    }

    println!("\n{}", style("🚂 railway configuration").cyan());
    for (file, present) in &report.railway_files {
        if *present {
            println!("   ✅ {file} exists");
        } else {
            println!("   ❌ {file} missing");
        }
    }
    if report.env_file_exposed {
        println!("   {}", style("⚠️  .env file found (should not be committed to git)").yellow());
    }

    println!("\n{}", "=".repeat(60));
    if report.issues.is_empty() {
        println!("{}", style("✅ no issues found!").green().bold());
    } else {
        println!("{}", style(format!("❌ issues found ({}):", report.issues.len())).red().bold());
        for (i, issue) in report.issues.iter().enumerate() {
            println!("   {}. {issue}", i + 1);
        }
    }

    if !report.recommendations.is_empty() {
        println!("\n{}", style(format!("💡 recommendations ({}):", report.recommendations.len())).yellow().bold());
        for (i, rec) in report.recommendations.iter().enumerate() {
            println!("   {}. {rec}", i + 1);
        }
    }

    println!("\n{}", style("🚀 next steps:").cyan().bold());
    println!("1. fix any issues identified above");
    println!("2. run: railway-doctor init --path {}", root.display());
    println!("3. set environment variables in the railway dashboard");
    println!("4. deploy to railway");
    println!("5. run the full analyzer: railway-doctor analyze --github-user YOUR_USERNAME");

    Ok(report.is_healthy())
}

fn run_init(root: &Path, kind: ProjectKind, force: bool, node_version: &str) -> Result<()> {
    if !root.exists() {
        return Err(anyhow::anyhow!("project path does not exist: {}", root.display()));
    }

    println!(
        "{}",
        style(format!("🔧 setting up railway configuration for {kind} project at {}", root.display())).cyan().bold()
    );

    for file in scaffold::scaffold(root, kind, node_version, force)? {
        let line = match file.outcome {
            WriteOutcome::Created => style(format!("✅ created {}", file.path.display())).green(),
            WriteOutcome::Overwritten => style(format!("✅ overwrote {}", file.path.display())).green(),
            WriteOutcome::Skipped => style(format!("⏭️  kept existing {} (use --force to overwrite)", file.path.display())).yellow(),
        };
        println!("{line}");
    }

    println!("\n{}", style("🔍 checking for common issues...").cyan());
    let env_vars = project::scan_env_vars(root);
    let suggestions = project::env_var_suggestions(&env_vars);
    if suggestions.is_empty() {
        println!("{}", style("✅ no obvious issues found").green());
    } else {
        println!("{}", style("⚠️  potential issues found:").yellow().bold());
        for suggestion in suggestions {
            println!("  • {suggestion}");
        }
    }

    println!("\n{}", style("📋 next steps:").cyan().bold());
    println!("1. review the generated configuration files");
    println!("2. set environment variables in the railway dashboard");
    println!("3. deploy your project to railway");
    println!("4. run `railway-doctor analyze` to check for issues");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_defaults() -> Config {
        Config::from_toml(
            r#"
github_user = "from-config"
limit = 5
output_dir = "reports"
"#,
        )
        .unwrap()
    }

    #[test]
    fn flags_override_config() {
        let options = resolve_analyze_options(
            &config_with_defaults(),
            Some("from-flag".to_string()),
            Some(2),
            Some(PathBuf::from("out")),
        )
        .unwrap();

        assert_eq!(
            options,
            AnalyzeOptions {
                user: "from-flag".to_string(),
                limit: Some(2),
                output_dir: PathBuf::from("out"),
            }
        );
    }

    #[test]
    fn config_fills_missing_flags() {
        let options = resolve_analyze_options(&config_with_defaults(), None, None, None).unwrap();

        assert_eq!(options.user, "from-config");
        assert_eq!(options.limit, Some(5));
        assert_eq!(options.output_dir, PathBuf::from("reports"));
    }

    #[test]
    fn output_dir_defaults_to_current_directory() {
        let options =
            resolve_analyze_options(&Config::default(), Some("octocat".to_string()), None, None).unwrap();

        assert_eq!(options.limit, None);
        assert_eq!(options.output_dir, PathBuf::from("."));
    }

    #[test]
    fn zero_limit_means_every_repository() {
        let from_flag =
            resolve_analyze_options(&config_with_defaults(), None, Some(0), None).unwrap();
        assert_eq!(from_flag.limit, None);

        let config = Config::from_toml("github_user = \"octocat\"\nlimit = 0\n").unwrap();
        let from_config = resolve_analyze_options(&config, None, None, None).unwrap();
        assert_eq!(from_config.limit, None);
    }

    #[test]
    fn missing_user_is_an_error() {
        let err = resolve_analyze_options(&Config::default(), None, Some(3), None).unwrap_err();
        assert!(err.to_string().contains("github user is required"));
    }
}
