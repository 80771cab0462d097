// recommendation engine - turns findings into actionable advice

use crate::catalog::Category;
use crate::classifier::Findings;

/// category -> advice block, in priority order
pub type RecommendationTable = [(Category, &'static [&'static str])];

pub const RECOMMENDATIONS: &RecommendationTable = &[
    (
        Category::MissingEnvVars,
        &[
            "🔧 Add missing environment variables in Railway dashboard",
            "   - Check for OPENAI_API_KEY, DATABASE_URL, PORT, etc.",
            "   - Ensure all required env vars are set in production",
        ],
    ),
    (
        Category::PortBinding,
        &[
            "🔧 Fix port binding issues",
            "   - Ensure your app listens on process.env.PORT",
            "   - Add: app.listen(process.env.PORT || 3000)",
        ],
    ),
    (
        Category::BuildFailures,
        &[
            "🔧 Fix build configuration",
            "   - Check package.json scripts",
            "   - Ensure all dependencies are in package.json",
            "   - Verify build commands work locally",
        ],
    ),
    (
        Category::RuntimeErrors,
        &[
            "🔧 Fix runtime errors",
            "   - Check for undefined variables",
            "   - Add proper error handling",
            "   - Test locally before deploying",
        ],
    ),
    (
        Category::DatabaseIssues,
        &[
            "🔧 Fix database configuration",
            "   - Check DATABASE_URL environment variable",
            "   - Ensure database is accessible from Railway",
            "   - Check SQLite file permissions",
        ],
    ),
    (
        Category::MemoryIssues,
        &[
            "🔧 Optimize memory usage",
            "   - Check for memory leaks",
            "   - Optimize large data processing",
            "   - Consider upgrading Railway plan",
        ],
    ),
    (
        Category::TimeoutIssues,
        &[
            "🔧 Fix timeout issues",
            "   - Optimize build process",
            "   - Reduce bundle size",
            "   - Check for long-running operations",
        ],
    ),
    (
        Category::DependencyIssues,
        &[
            "🔧 Fix dependency issues",
            "   - Run npm install locally",
            "   - Check for version conflicts",
            "   - Update package-lock.json",
        ],
    ),
    (
        Category::RailwayConfig,
        &[
            "🔧 Fix Railway configuration",
            "   - Check railway.json configuration",
            "   - Verify build and start commands",
        ],
    ),
    (
        Category::RailwayLimits,
        &[
            "🔧 Check Railway limits",
            "   - Review resource usage",
            "   - Consider upgrading plan",
        ],
    ),
];

/// recommendations for the given findings using the built-in advice table
pub fn generate(findings: &Findings) -> Vec<String> {
    generate_with(findings, RECOMMENDATIONS)
}

/// walk `table` in order and collect the block of every category present in `findings`.
/// categories without an advice block are skipped; new patterns can ship before their prose.
pub fn generate_with(findings: &Findings, table: &RecommendationTable) -> Vec<String> {
    table
        .iter()
        .filter(|(category, _)| findings.contains(*category))
        .flat_map(|(_, lines)| lines.iter().map(|line| line.to_string()))
        .collect()
}
