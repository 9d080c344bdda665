use thiserror::Error;

/// Errors raised by Sigma value construction and conversion.
#[derive(Debug, Error)]
pub enum SigmaValueError {
    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("invalid type: {0}")]
    InvalidType(String),

    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unresolved placeholder '%{0}%' reached conversion")]
    UnresolvedPlaceholder(String),

    #[error("no plain string representation for {0} values")]
    NoPlainConversion(&'static str),

    #[error("string index {index} out of range for length {len}")]
    IndexOutOfRange { index: isize, len: usize },

    #[error("{0} wildcard is not supported by the target format")]
    UnsupportedWildcard(&'static str),
}

pub type Result<T> = std::result::Result<T, SigmaValueError>;
