use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("{host} answered {status}: {message}")]
    Status {
        host: String,
        status: u16,
        message: String,
    },

    #[error("Rate limited by {host}")]
    RateLimit {
        host: String,
        retry_after_secs: Option<u64>,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("news pipeline timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("no news items could be collected from {sites}")]
    NoItems { sites: String },
}

impl Error {
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    pub fn status(host: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            host: host.into(),
            status,
            message: message.into(),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Network errors, 429 and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimit { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_server_side_statuses_are_transient() {
        assert!(Error::status("andes.org.br", 503, "").is_transient());
        assert!(!Error::status("andes.org.br", 404, "").is_transient());
        assert!(Error::http("connection reset").is_transient());
        assert!(!Error::Timeout { secs: 180 }.is_transient());
    }

    #[test]
    fn status_message_names_the_host() {
        let e = Error::status("cspconlutas.org.br", 500, "boom");
        assert_eq!(e.to_string(), "cspconlutas.org.br answered 500: boom");
    }
}
