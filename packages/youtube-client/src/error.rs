use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors surfaced to callers of the quota-aware client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Every configured API key has hit its daily quota. Terminal for this
    /// run; the quota window resets externally, so a later run starts clean.
    #[error("all API keys exhausted; re-run after the daily quota resets")]
    AllKeysExhausted,

    /// No API keys were configured at all.
    #[error("no API keys configured")]
    NoKeys,

    /// Server-side or network failure that survived the retry budget.
    #[error("transient API failure after {attempts} attempts: {message}")]
    Transient { attempts: u32, message: String },

    /// Non-quota client error. Fatal for this single call only; the active
    /// key stays valid and no rotation happens.
    #[error("API request rejected ({status}): {message}")]
    Request { status: u16, message: String },

    #[error("failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Outcome of a single HTTP exchange, before quota and retry policy apply.
#[derive(Debug)]
pub enum CallError {
    /// 403 with a quota-related reason from the active key.
    QuotaExceeded,
    /// 5xx from the API; eligible for backoff retry on the same key.
    ServerError { status: u16, message: String },
    /// Connection, timeout or other transport-level failure.
    Network(String),
    /// Any other 4xx; the request itself is bad.
    Rejected { status: u16, message: String },
}

impl CallError {
    pub fn message(&self) -> String {
        match self {
            CallError::QuotaExceeded => "quota exceeded".to_string(),
            CallError::ServerError { status, message } => {
                format!("server error {status}: {message}")
            }
            CallError::Network(message) => format!("network error: {message}"),
            CallError::Rejected { status, message } => {
                format!("rejected {status}: {message}")
            }
        }
    }
}
