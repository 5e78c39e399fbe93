use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Failures talking to the simulation/assistant server.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} answered with status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("not an opaque hex color: {input:?}")]
pub struct ParseColorError {
    pub input: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_names_endpoint() {
        let error = ServiceError::Status {
            endpoint: "http://127.0.0.1:5000/chat".to_owned(),
            status: 503,
        };
        assert_eq!(
            error.to_string(),
            "http://127.0.0.1:5000/chat answered with status 503"
        );
    }

    #[test]
    fn config_error_quotes_value() {
        let error = ConfigError::InvalidValue {
            key: "NEUROUI_TIMEOUT_SECS",
            value: "soon".to_owned(),
        };
        assert_eq!(
            error.to_string(),
            "invalid value for NEUROUI_TIMEOUT_SECS: \"soon\""
        );
    }
}
