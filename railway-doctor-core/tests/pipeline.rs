//! End-to-end checks for the log -> findings -> recommendations -> report pipeline

use chrono::NaiveDate;
use railway_doctor_core::{
    Category, RepositoryAnalysis, RepositoryInfo, Status, analyze, assemble, default_catalog,
    generate,
};

fn repo(name: &str) -> RepositoryInfo {
    RepositoryInfo {
        name: name.to_string(),
        url: format!("https://github.com/octocat/{name}"),
        last_updated: "2024-05-01T08:30:00Z".to_string(),
    }
}

#[test]
fn undefined_port_is_an_env_problem_not_a_binding_problem() {
    let logs = "Error: process.env.PORT is undefined\napp.listen(3000)";
    let findings = analyze(logs, default_catalog());

    let env = findings
        .get(Category::MissingEnvVars)
        .expect("missing_env_vars should match");
    assert!(env.iter().any(|p| p == r"process\.env\.\w+ is undefined"));

    // pattern membership decides, not what the log is about
    assert!(!findings.contains(Category::PortBinding));
}

#[test]
fn mixed_failure_log_produces_prioritized_advice() {
    let logs = "\
Build started
npm ERR! peer dependency react@18 not satisfied
Deployment limit reached for this project
Error: Missing environment variable OPENAI_API_KEY";

    let findings = analyze(logs, default_catalog());
    let categories: Vec<Category> = findings.categories().collect();
    assert_eq!(
        categories,
        vec![
            Category::MissingEnvVars,
            Category::DependencyIssues,
            Category::RailwayLimits,
        ]
    );

    let recs = generate(&findings);
    assert_eq!(recs.first().unwrap(), "🔧 Add missing environment variables in Railway dashboard");
    assert_eq!(recs.last().unwrap(), "   - Consider upgrading plan");
}

#[test]
fn full_report_for_two_repositories() {
    let generated_at = NaiveDate::from_ymd_opt(2024, 5, 2)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();

    let broken = RepositoryAnalysis::from_logs(
        repo("api"),
        "Error: listen EADDRINUSE: address already in use :::8080",
        default_catalog(),
    )
    .unwrap();
    let healthy = RepositoryAnalysis::from_logs(repo("site"), "", default_catalog()).unwrap();

    assert_eq!(broken.status(), Status::IssuesFound(1));
    assert_eq!(healthy.status(), Status::NoIssues);

    let report = assemble("octocat", &[broken, healthy], generated_at);

    let expected_api_block = "\
============================================================
REPOSITORY: api
============================================================
URL: https://github.com/octocat/api
Last Updated: 2024-05-01T08:30:00Z
Status: ❌ 1 issue categories found

🔍 ISSUES FOUND:
  • Port Binding:
    - listen EADDRINUSE
    - address already in use

💡 RECOMMENDATIONS:
  🔧 Fix port binding issues
     - Ensure your app listens on process.env.PORT
     - Add: app.listen(process.env.PORT || 3000)

📋 LOGS PREVIEW:
----------------------------------------
Error: listen EADDRINUSE: address already in use :::8080
";
    assert!(report.contains(expected_api_block), "report was:\n{report}");

    assert!(report.contains("Generated: 2024-05-02 09:00:00"));
    assert!(report.contains("Total Repositories: 2\nRepositories with Issues: 1\nHealthy Repositories: 1"));
    assert!(report.ends_with("✅ No deployment issues detected\n"));
}
