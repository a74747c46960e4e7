use thiserror::Error;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("gateway not found: {0}")]
    GatewayNotFound(i64),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PushError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
