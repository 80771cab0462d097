// pattern catalog - maps failure categories to the log patterns that signal them

use crate::error::{DoctorError, Result};
use crate::utils::title_case;
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// a named class of deployment failure, listed in recommendation priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MissingEnvVars,
    PortBinding,
    BuildFailures,
    RuntimeErrors,
    DatabaseIssues,
    MemoryIssues,
    TimeoutIssues,
    DependencyIssues,
    RailwayConfig,
    RailwayLimits,
}

impl Category {
    /// every category, highest priority first
    pub const ALL: [Category; 10] = [
        Category::MissingEnvVars,
        Category::PortBinding,
        Category::BuildFailures,
        Category::RuntimeErrors,
        Category::DatabaseIssues,
        Category::MemoryIssues,
        Category::TimeoutIssues,
        Category::DependencyIssues,
        Category::RailwayConfig,
        Category::RailwayLimits,
    ];

    /// stable identifier used in config files and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::MissingEnvVars => "missing_env_vars",
            Category::PortBinding => "port_binding",
            Category::BuildFailures => "build_failures",
            Category::RuntimeErrors => "runtime_errors",
            Category::DatabaseIssues => "database_issues",
            Category::MemoryIssues => "memory_issues",
            Category::TimeoutIssues => "timeout_issues",
            Category::DependencyIssues => "dependency_issues",
            Category::RailwayConfig => "railway_config",
            Category::RailwayLimits => "railway_limits",
        }
    }

    /// human readable label, e.g. "Missing Env Vars"
    pub fn label(&self) -> String {
        title_case(&self.as_str().replace('_', " "))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const GENERIC_PATTERNS: &[(Category, &[&str])] = &[
    (
        Category::MissingEnvVars,
        &[
            r"missing environment variable",
            r"undefined environment variable",
            r"process\.env\.\w+ is undefined",
            r"OPENAI_API_KEY",
            r"DATABASE_URL",
            r"PORT",
            r"RAILWAY_ENVIRONMENT",
        ],
    ),
    (
        Category::PortBinding,
        &[
            r"port binding",
            r"port not bound",
            r"listen EADDRINUSE",
            r"address already in use",
            r"bind.*port",
            r"PORT.*required",
            r"listen.*failed",
        ],
    ),
    (
        Category::BuildFailures,
        &[
            r"build failed",
            r"npm install.*failed",
            r"node_modules.*not found",
            r"package\.json.*not found",
            r"build script.*failed",
            r"webpack.*error",
            r"vite.*error",
        ],
    ),
    (
        Category::RuntimeErrors,
        &[
            r"process crashed",
            r"uncaught exception",
            r"error.*at.*line",
            r"TypeError",
            r"ReferenceError",
            r"Cannot read property",
            r"undefined is not a function",
        ],
    ),
    (
        Category::DatabaseIssues,
        &[
            r"database.*connection.*failed",
            r"sqlite.*error",
            r"database.*locked",
            r"ENOENT.*database",
            r"SQL.*error",
        ],
    ),
    (
        Category::MemoryIssues,
        &[
            r"out of memory",
            r"heap.*out of memory",
            r"memory.*limit",
            r"process.*killed",
        ],
    ),
    (
        Category::TimeoutIssues,
        &[
            r"timeout",
            r"request.*timeout",
            r"deployment.*timeout",
            r"build.*timeout",
        ],
    ),
    (
        Category::DependencyIssues,
        &[
            r"module.*not found",
            r"Cannot resolve",
            r"peer dependency",
            r"version.*conflict",
            r"npm.*error",
        ],
    ),
];

const RAILWAY_PATTERNS: &[(Category, &[&str])] = &[
    (
        Category::RailwayConfig,
        &[
            r"railway\.json.*not found",
            r"railway.*config.*error",
            r"deployment.*config.*invalid",
        ],
    ),
    (
        Category::RailwayLimits,
        &[
            r"resource.*limit",
            r"quota.*exceeded",
            r"deployment.*limit",
            r"build.*limit",
        ],
    ),
];

lazy_static! {
    static ref DEFAULT_CATALOG: PatternCatalog = PatternCatalog::builtin().unwrap();
}

/// the merged built-in catalog, compiled once per process
pub fn default_catalog() -> &'static PatternCatalog {
    &DEFAULT_CATALOG
}

/// a compiled, case-insensitive pattern that remembers its source text
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(category: Category, source: &str) -> Result<Self> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(true)
            .build()
            .map_err(|e| DoctorError::InvalidPattern {
                category,
                pattern: source.to_string(),
                source: e,
            })?;

        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// true if the pattern occurs anywhere in the text
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    category: Category,
    patterns: Vec<Pattern>,
}

/// ordered registry of category -> pattern set
#[derive(Debug, Clone, Default)]
pub struct PatternCatalog {
    entries: Vec<CatalogEntry>,
}

impl PatternCatalog {
    /// build a catalog from raw pattern sources, keeping the given order
    pub fn from_sources(sources: &[(Category, &[&str])]) -> Result<Self> {
        let mut catalog = PatternCatalog::default();
        for (category, patterns) in sources {
            let compiled = patterns
                .iter()
                .map(|p| Pattern::new(*category, p))
                .collect::<Result<Vec<_>>>()?;
            catalog.push(*category, compiled)?;
        }
        Ok(catalog)
    }

    /// generic deployment failure categories
    pub fn generic() -> Result<Self> {
        Self::from_sources(GENERIC_PATTERNS)
    }

    /// railway platform specific categories
    pub fn railway() -> Result<Self> {
        Self::from_sources(RAILWAY_PATTERNS)
    }

    /// generic categories followed by railway ones
    pub fn builtin() -> Result<Self> {
        Self::generic()?.merged(Self::railway()?)
    }

    /// append another catalog's categories after this one's
    pub fn merged(mut self, other: PatternCatalog) -> Result<Self> {
        for entry in other.entries {
            self.push(entry.category, entry.patterns)?;
        }
        Ok(self)
    }

    /// append user supplied patterns to their categories; unseen categories go last
    pub fn with_extra_patterns(mut self, extra: &BTreeMap<Category, Vec<String>>) -> Result<Self> {
        for (category, sources) in extra {
            if sources.is_empty() {
                continue;
            }
            let compiled = sources
                .iter()
                .map(|p| Pattern::new(*category, p))
                .collect::<Result<Vec<_>>>()?;

            match self.entries.iter_mut().find(|e| e.category == *category) {
                Some(entry) => entry.patterns.extend(compiled),
                None => self.push(*category, compiled)?,
            }
        }
        Ok(self)
    }

    fn push(&mut self, category: Category, patterns: Vec<Pattern>) -> Result<()> {
        if patterns.is_empty() {
            return Err(DoctorError::EmptyPatternSet(category));
        }
        if self.contains(category) {
            return Err(DoctorError::DuplicateCategory(category));
        }
        self.entries.push(CatalogEntry { category, patterns });
        Ok(())
    }

    /// categories in construction order
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.entries.iter().map(|e| e.category)
    }

    /// patterns for a category, empty if the category is not registered
    pub fn patterns_for(&self, category: Category) -> &[Pattern] {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.patterns.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, category: Category) -> bool {
        self.entries.iter().any(|e| e.category == category)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
