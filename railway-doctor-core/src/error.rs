// typed errors raised by the classification pipeline and its config layer

use crate::catalog::Category;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("invalid pattern '{pattern}' for category {category}: {source}")]
    InvalidPattern {
        category: Category,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("category {0} is defined more than once in the catalog")]
    DuplicateCategory(Category),

    #[error("category {0} has no patterns")]
    EmptyPatternSet(Category),

    #[error("repository analysis is missing required field: {0}")]
    InvalidAnalysis(&'static str),

    #[error("failed to parse config file: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DoctorError>;
