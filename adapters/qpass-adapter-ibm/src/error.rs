//! Error types for IBM Quantum adapter.

use qpass_hal::HalError;
use thiserror::Error;

/// Result type for IBM operations.
pub type IbmResult<T> = Result<T, IbmError>;

/// Errors that can occur when using IBM Quantum.
#[derive(Debug, Error)]
pub enum IbmError {
    /// Missing API token.
    #[error("IBM Quantum API token not found. Set API_Key or IBM_QUANTUM_TOKEN.")]
    MissingToken,

    /// Token contains characters that cannot go into an HTTP header.
    #[error("Invalid IBM Quantum API token")]
    InvalidToken,

    /// IAM token exchange failed.
    #[error("IAM token exchange failed: {0}")]
    IamTokenExchange(String),

    /// The API key sees no IBM Quantum service instance.
    #[error("No IBM Quantum service instance found for this API key. Set IBM_SERVICE_CRN.")]
    NoServiceInstance,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error.
    #[error("IBM Quantum API error: {message}")]
    ApiError {
        /// Error code from API.
        code: Option<String>,
        /// Error message.
        message: String,
    },

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Job failed.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Job was cancelled.
    #[error("Job was cancelled: {0}")]
    JobCancelled(String),

    /// Circuit conversion error.
    #[error("Circuit conversion error: {0}")]
    CircuitError(String),

    /// Backend not available.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// No operational hardware device was listed.
    #[error("No operational IBM Quantum device available")]
    NoOperationalDevice,

    /// Results did not carry per-shot samples.
    #[error("Malformed job result: {0}")]
    MalformedResult(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Circuit too large for backend.
    #[error("Circuit requires {required} qubits but backend only has {available}")]
    TooManyQubits {
        /// Qubits needed.
        required: usize,
        /// Qubits available.
        available: usize,
    },

    /// Invalid parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<IbmError> for HalError {
    fn from(e: IbmError) -> Self {
        match e {
            IbmError::MissingToken | IbmError::InvalidToken | IbmError::IamTokenExchange(_) => {
                HalError::AuthenticationFailed(e.to_string())
            }
            IbmError::JobNotFound(id) => HalError::JobNotFound(id),
            IbmError::JobFailed(msg) => HalError::JobFailed(msg),
            IbmError::JobCancelled(_) => HalError::JobCancelled,
            IbmError::BackendUnavailable(msg) => HalError::BackendUnavailable(msg),
            IbmError::NoOperationalDevice => HalError::BackendUnavailable(e.to_string()),
            IbmError::CircuitError(msg) => HalError::InvalidCircuit(msg),
            IbmError::TooManyQubits { .. } => HalError::CircuitTooLarge(e.to_string()),
            IbmError::InvalidParameter(msg) => HalError::Configuration(msg),
            IbmError::NoServiceInstance => HalError::Configuration(e.to_string()),
            _ => HalError::Backend(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_display() {
        let err = IbmError::MissingToken;
        assert!(err.to_string().contains("API_Key"));
        assert!(err.to_string().contains("IBM_QUANTUM_TOKEN"));
    }

    #[test]
    fn test_api_error_display() {
        let err = IbmError::ApiError {
            code: Some("ERR_401".into()),
            message: "Unauthorized".into(),
        };
        assert!(err.to_string().contains("Unauthorized"));
    }

    #[test]
    fn test_too_many_qubits_display() {
        let err = IbmError::TooManyQubits {
            required: 50,
            available: 27,
        };
        let msg = err.to_string();
        assert!(msg.contains("50"));
        assert!(msg.contains("27"));
    }

    #[test]
    fn test_auth_errors_to_hal() {
        for err in [
            IbmError::MissingToken,
            IbmError::InvalidToken,
            IbmError::IamTokenExchange("401".into()),
        ] {
            let hal: HalError = err.into();
            assert!(matches!(hal, HalError::AuthenticationFailed(_)));
        }
    }

    #[test]
    fn test_job_errors_to_hal() {
        let hal: HalError = IbmError::JobNotFound("j1".into()).into();
        assert!(matches!(hal, HalError::JobNotFound(id) if id == "j1"));

        let hal: HalError = IbmError::JobFailed("boom".into()).into();
        assert!(matches!(hal, HalError::JobFailed(msg) if msg == "boom"));

        let hal: HalError = IbmError::JobCancelled("user".into()).into();
        assert!(matches!(hal, HalError::JobCancelled));
    }

    #[test]
    fn test_no_device_to_hal_unavailable() {
        let hal: HalError = IbmError::NoOperationalDevice.into();
        assert!(matches!(hal, HalError::BackendUnavailable(_)));
    }

    #[test]
    fn test_no_service_instance_to_hal_configuration() {
        let hal: HalError = IbmError::NoServiceInstance.into();
        assert!(matches!(hal, HalError::Configuration(msg) if msg.contains("IBM_SERVICE_CRN")));
    }

    #[test]
    fn test_other_errors_to_hal_backend() {
        let hal: HalError = IbmError::ApiError {
            code: None,
            message: "server error".into(),
        }
        .into();
        assert!(matches!(hal, HalError::Backend(msg) if msg.contains("server error")));

        let hal: HalError = IbmError::MalformedResult("no samples".into()).into();
        assert!(matches!(hal, HalError::Backend(_)));
    }
}
