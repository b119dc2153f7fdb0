use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum GlacError {
    #[error("{0}")]
    Error(String),
    #[error("Required variable '{0}' is missing from its source")]
    MissingVariable(String),
    #[error("Shape mismatch for {variable}: expected {expected}, got {found:?}")]
    ShapeMismatch {
        variable: String,
        /// Expected shape, or a description of it when only some axes are constrained
        expected: String,
        found: Vec<usize>,
    },
    #[error("Proxy temperature series unavailable: {0}")]
    ProxyUnavailable(String),
    #[error("Invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: String,
    },
    #[error("Component '{consumer}' requires '{variable}' [{expected_unit}] but {found}")]
    RequirementMismatch {
        variable: String,
        consumer: String,
        expected_unit: String,
        found: String,
    },
    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GlacError {
    pub fn shape_mismatch(variable: &str, expected: &[usize], found: &[usize]) -> Self {
        GlacError::ShapeMismatch {
            variable: variable.to_string(),
            expected: format!("{expected:?}"),
            found: found.to_vec(),
        }
    }

    pub fn dimension_mismatch(variable: &str, ndim: usize, found: &[usize]) -> Self {
        GlacError::ShapeMismatch {
            variable: variable.to_string(),
            expected: format!("{ndim} dimensions"),
            found: found.to_vec(),
        }
    }

    pub fn invalid_parameter(name: &str, value: f64, reason: &str) -> Self {
        GlacError::InvalidParameter {
            name: name.to_string(),
            value,
            reason: reason.to_string(),
        }
    }
}

/// Convenience type for `Result<T, GlacError>`.
pub type GlacResult<T> = Result<T, GlacError>;
