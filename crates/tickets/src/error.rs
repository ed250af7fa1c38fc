use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TicketError {
    /// Not a valid encoding, or a required field is missing or invalid.
    #[error("malformed ticket payload: {0}")]
    MalformedPayload(String),

    #[error("failed to encode ticket payload: {0}")]
    Encode(String),
}

impl TicketError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPayload(msg.into())
    }
}
