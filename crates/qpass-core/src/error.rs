//! Error types for password generation.

use qpass_adapter_ibm::IbmError;
use qpass_compile::CompileError;
use qpass_hal::HalError;
use qpass_ir::IrError;
use thiserror::Error;

/// Errors that can occur while generating a password.
///
/// Every failure inside the quantum pipeline collapses into
/// [`Error::QuantumBackend`] carrying the underlying message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Hardware was requested but no credential is configured.
    #[error(
        "IBM Quantum credential not found. Set API_Key or IBM_QUANTUM_TOKEN (or pass --api-key)."
    )]
    MissingCredential,

    /// Circuit building, transpilation, submission, polling or decoding failed.
    #[error("Quantum Error: {0}")]
    QuantumBackend(String),

    /// Password length must be at least one character.
    #[error("Invalid password length: {0}")]
    InvalidLength(usize),

    /// At least one bit must be requested.
    #[error("Invalid bit count: {0}")]
    InvalidBitCount(u32),

    /// The entropy source disagrees with the request's hardware flag.
    #[error("Requested {requested} entropy but the source is {actual}")]
    SourceMismatch {
        /// Kind of source the request asked for.
        requested: &'static str,
        /// Name of the source that was supplied.
        actual: String,
    },

    /// An alphabet needs at least one character.
    #[error("Alphabet must contain at least one character")]
    InvalidAlphabet,

    /// A bit string may only contain '0' and '1'.
    #[error("Invalid bit string: {found:?} at position {position}")]
    InvalidBitString {
        /// Offending character position.
        position: usize,
        /// The offending character.
        found: char,
    },
}

/// Result type for password generation.
pub type CoreResult<T> = Result<T, Error>;

impl From<HalError> for Error {
    fn from(e: HalError) -> Self {
        Error::QuantumBackend(e.to_string())
    }
}

impl From<CompileError> for Error {
    fn from(e: CompileError) -> Self {
        Error::QuantumBackend(format!("transpilation failed: {e}"))
    }
}

impl From<IrError> for Error {
    fn from(e: IrError) -> Self {
        Error::QuantumBackend(format!("circuit construction failed: {e}"))
    }
}

impl From<IbmError> for Error {
    fn from(e: IbmError) -> Self {
        match e {
            IbmError::MissingToken => Error::MissingCredential,
            other => Error::QuantumBackend(other.to_string()),
        }
    }
}
