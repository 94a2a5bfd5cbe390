use thiserror::Error;

/// Main error type for Feynman operations
#[derive(Error, Debug)]
pub enum FeynmanError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Type error: {0}")]
    Type(String),

    #[error("Parse failure: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

impl FeynmanError {
    /// Caller-fixable input problem (bad path, identifier or count)
    pub fn is_validation(&self) -> bool {
        matches!(self, FeynmanError::Validation(_))
    }

    /// Value of the wrong category, e.g. a number where a name was expected
    pub fn is_type(&self) -> bool {
        matches!(self, FeynmanError::Type(_))
    }
}

pub type Result<T> = std::result::Result<T, FeynmanError>;
