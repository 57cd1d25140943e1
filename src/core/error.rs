use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvestmentError {
    #[error("invalid input: {field} {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv export failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv export produced invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl InvestmentError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        InvestmentError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
