// Error types for the Switchyard controller router

use http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The resolution chain was exhausted, or an override action does not
    /// exist. Always handled by deferring to `next()`, never by a 500.
    #[error("No action found")]
    NoAction,

    /// An application error carrying its own HTTP status code.
    #[error("{message}")]
    Status { code: u16, message: String },

    #[error("{0}")]
    Handler(String),

    /// An application error wrapping its cause.
    #[error("{message}")]
    Source {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Action panicked: {0}")]
    Panic(String),

    #[error("Unknown response mode: {0}")]
    UnknownResponseMode(String),

    #[error("Invalid status code: {0}")]
    InvalidStatus(u16),

    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    #[error("Unknown middleware: {0}")]
    UnknownMiddleware(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Error::Status {
            code,
            message: message.into(),
        }
    }

    pub fn handler(message: impl Into<String>) -> Self {
        Error::Handler(message.into())
    }

    pub fn wrap<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Source {
            message: message.into(),
            source: Box::new(source),
        }
    }

    pub fn is_no_action(&self) -> bool {
        matches!(self, Error::NoAction)
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NoAction => StatusCode::NOT_FOUND.as_u16(),
            Error::Status { code, .. } => match StatusCode::from_u16(*code) {
                Ok(status) if status.is_client_error() || status.is_server_error() => *code,
                _ => StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            },
            // Default to 500 for everything raised inside an action or by misconfiguration
            _ => StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        }
    }

    /// This error's message followed by its causes, outermost first.
    pub fn stack(&self) -> Vec<String> {
        let mut stack = vec![self.to_string()];
        stack.extend(self.source_chain());
        stack
    }

    /// The chain of underlying causes, outermost first, excluding `self`.
    pub fn source_chain(&self) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = std::error::Error::source(self);
        while let Some(cause) = current {
            chain.push(cause.to_string());
            current = cause.source();
        }
        chain
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
