use crate::path::NodePath;

/// Error types for building, editing and decoding filter queries
#[derive(Debug)]
pub enum QueryError {
    UnknownStrategy(String),
    EmptyValue(String),
    InvalidDate(String, String),
    InvalidPath(NodePath),
    MissingOperator(NodePath),
    NotFlattenable(NodePath),
    InvariantViolated(NodePath),
    InvalidPayload(String),
    SerdeJsonError(serde_json::Error),
    SerdeYamlError(serde_yaml_ng::Error),
}

impl QueryError {
    /// True for the errors a user fixes by correcting the value they typed.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            QueryError::EmptyValue(_) | QueryError::InvalidDate(_, _)
        )
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::SerdeJsonError(err)
    }
}

impl From<serde_yaml_ng::Error> for QueryError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        QueryError::SerdeYamlError(err)
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::UnknownStrategy(strategy) => write!(f, "Unknown strategy: {}", strategy),
            QueryError::EmptyValue(strategy) => {
                write!(f, "A value is required for strategy {}", strategy)
            }
            QueryError::InvalidDate(strategy, value) => write!(
                f,
                "Invalid date for strategy {}: {:?} (expected YYYY-MM-DD)",
                strategy, value
            ),
            QueryError::InvalidPath(path) => write!(f, "No group at path {}", path),
            QueryError::MissingOperator(path) => {
                write!(f, "An AND/OR operator is required to add at {}", path)
            }
            QueryError::NotFlattenable(path) => write!(
                f,
                "Group at {} cannot be expressed as a left-to-right condition list",
                path
            ),
            QueryError::InvariantViolated(path) => {
                write!(f, "Group at {} has fewer than two operands", path)
            }
            QueryError::InvalidPayload(msg) => write!(f, "Invalid payload: {}", msg),
            QueryError::SerdeJsonError(err) => write!(f, "Serde JSON error: {}", err),
            QueryError::SerdeYamlError(err) => write!(f, "Serde YAML error: {}", err),
        }
    }
}

impl std::error::Error for QueryError {}
