/// Failure surfaced by the simulated access layer.
///
/// There is a single kind: a dropped request. It is always safe to retry,
/// but the access layer never retries on its own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("{message}")]
    TransientNetwork { message: String },
}

/// Message carried by every injected network failure.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error: Failed to fetch data";

impl AccessError {
    pub fn transient() -> Self {
        AccessError::TransientNetwork {
            message: NETWORK_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            AccessError::TransientNetwork { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_error_message_and_retry() {
        let err = AccessError::transient();
        assert_eq!(err.to_string(), NETWORK_ERROR_MESSAGE);
        assert!(err.is_retryable());
    }
}
