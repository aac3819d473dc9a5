//! Error types for the QASM3 emitter.

use qpass_ir::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur while emitting QASM.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EmitError {
    /// An instruction references a qubit the circuit does not declare.
    #[error("Undeclared qubit: {0}")]
    UndeclaredQubit(QubitId),

    /// An instruction references a classical bit the circuit does not declare.
    #[error("Undeclared classical bit: {0}")]
    UndeclaredClbit(ClbitId),
}

/// Result type for emission.
pub type EmitResult<T> = Result<T, EmitError>;
