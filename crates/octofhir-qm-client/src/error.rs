//! Client errors

use octofhir_qm_diagnostics::{
    QmError, QM0100, QM0103, QM0200, QM0201, QM0300, QM0301, QM0302, QM0401,
};

/// Failure talking to the FHIR server or the analytics backend
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Could not decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Invalid URL '{0}'")]
    Url(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub(crate) fn transport(url: &str, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn decode(url: &str, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.to_string(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ClientError> for QmError {
    fn from(err: ClientError) -> Self {
        let message = err.to_string();
        match err {
            ClientError::Status { status, url, .. } => {
                let code = if status == 404 { QM0302 } else { QM0300 };
                QmError::remote(code, message, Some(status), Some(url))
            }
            ClientError::Transport { url, source } => {
                let code = if source.is_timeout() { QM0201 } else { QM0200 };
                QmError::network(code, message, Some(url))
            }
            ClientError::Decode { url, .. } => QmError::remote(QM0301, message, None, Some(url)),
            ClientError::Url(_) => QmError::config(QM0100, message),
            ClientError::Config(_) => QmError::config(QM0103, message),
            ClientError::Io(_) => QmError::system(QM0401, message),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_maps_to_remote() {
        let err: QmError = ClientError::Status {
            status: 404,
            url: "http://fhir/Patient/x".into(),
            body: "not found".into(),
        }
        .into();
        assert_eq!(err.code(), QM0302);
        assert_eq!(err.status(), Some(404));

        let err: QmError = ClientError::Status {
            status: 500,
            url: "http://fhir".into(),
            body: String::new(),
        }
        .into();
        assert_eq!(err.code(), QM0300);
    }

    #[test]
    fn test_url_maps_to_config() {
        let err: QmError = ClientError::Url("ftp://x".into()).into();
        assert_eq!(err.code(), QM0100);
        assert!(err.to_string().contains("ftp://x"));
    }
}
