use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Any failed request: non-2xx, unreachable server (status 0) or an
    /// undecodable success body. All of them surface the same way.
    #[error("An error has occurred: {status} {status_text}")]
    Transport { status: u16, status_text: String },
    #[error("No file selected")]
    NoFileSelected,
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Unknown sort key: {0}")]
    UnknownSortKey(String),
}

impl ClientError {
    pub fn transport(status: u16, status_text: impl Into<String>) -> Self {
        ClientError::Transport {
            status,
            status_text: status_text.into(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ClientError::transport(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
            ),
            None => ClientError::transport(0, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_message_format() {
        let err = ClientError::transport(500, "Server Error");
        assert_eq!(err.to_string(), "An error has occurred: 500 Server Error");
    }

    #[test]
    fn test_network_failure_uses_status_zero() {
        let err = ClientError::transport(0, "connection refused");
        assert_eq!(err.to_string(), "An error has occurred: 0 connection refused");
    }
}
