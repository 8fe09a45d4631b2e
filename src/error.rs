//! Error types for Suelo operations.
//!
//! Only the loading/saving boundary can fail a run; nothing inside the
//! synthesis core is fatal (shortfalls are reported, not raised).

use std::fmt;

/// Main error type for Suelo operations.
///
/// # Examples
///
/// ```
/// use suelo::error::SueloError;
///
/// let err = SueloError::MissingColumn {
///     column: "Sand %".to_string(),
/// };
/// assert!(err.to_string().contains("Sand %"));
/// ```
#[derive(Debug)]
pub enum SueloError {
    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Malformed input row or unparseable cell.
    Parse {
        /// 1-based line number in the input file
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// A column required by the declared schema is absent from the input.
    MissingColumn {
        /// Name of the missing column
        column: String,
    },

    /// Dataset is empty after cleaning (all-null rows/columns removed).
    EmptyDataset,

    /// Invalid configuration value provided.
    InvalidConfig {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for SueloError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SueloError::Io(e) => write!(f, "I/O error: {e}"),
            SueloError::Parse { line, message } => {
                write!(f, "Parse error at line {line}: {message}")
            }
            SueloError::MissingColumn { column } => {
                write!(f, "Required column not found: {column}")
            }
            SueloError::EmptyDataset => {
                write!(
                    f,
                    "Dataset is empty after removing all-null rows and columns"
                )
            }
            SueloError::InvalidConfig {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid configuration: {param} = {value}, expected {constraint}"
                )
            }
            SueloError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for SueloError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SueloError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SueloError {
    fn from(err: std::io::Error) -> Self {
        SueloError::Io(err)
    }
}

impl From<&str> for SueloError {
    fn from(msg: &str) -> Self {
        SueloError::Other(msg.to_string())
    }
}

impl From<String> for SueloError {
    fn from(msg: String) -> Self {
        SueloError::Other(msg)
    }
}

impl SueloError {
    /// Create a parse error with line context.
    #[must_use]
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid-configuration error.
    #[must_use]
    pub fn invalid_config(param: &str, value: impl fmt::Display, constraint: &str) -> Self {
        Self::InvalidConfig {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }
}

#[allow(clippy::cmp_owned)]
impl PartialEq<&str> for SueloError {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, SueloError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display() {
        let err = SueloError::parse(17, "expected number, got 'abc'");
        let msg = err.to_string();
        assert!(msg.contains("line 17"));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn test_missing_column_display() {
        let err = SueloError::MissingColumn {
            column: "Clay %".to_string(),
        };
        assert!(err.to_string().contains("Clay %"));
    }

    #[test]
    fn test_empty_dataset_display() {
        let err = SueloError::EmptyDataset;
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_invalid_config_display() {
        let err = SueloError::invalid_config("noise_fraction", -0.1, ">= 0");
        let msg = err.to_string();
        assert!(msg.contains("noise_fraction"));
        assert!(msg.contains("-0.1"));
        assert!(msg.contains(">= 0"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: SueloError = io_err.into();
        assert!(matches!(err, SueloError::Io(_)));
    }

    #[test]
    fn test_from_str() {
        let err: SueloError = "something went wrong".into();
        assert!(matches!(err, SueloError::Other(_)));
        assert!(err == "something went wrong");
    }

    #[test]
    fn test_error_source() {
        use std::error::Error;
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        assert!(SueloError::Io(io_err).source().is_some());
        assert!(SueloError::EmptyDataset.source().is_none());
    }
}
