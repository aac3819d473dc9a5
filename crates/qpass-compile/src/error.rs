//! Error types for the compilation crate.

use thiserror::Error;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] qpass_ir::IrError),

    /// Missing basis gates.
    #[error("Missing basis gates for translation")]
    MissingBasisGates,

    /// Gate not in target basis.
    #[error("Gate '{0}' not in target basis")]
    GateNotInBasis(String),

    /// The target basis has no known decomposition rules.
    #[error("Unsupported target basis: {0}")]
    UnsupportedBasis(String),

    /// Device has fewer qubits than the circuit.
    #[error("Circuit requires {required} qubits but target only has {available}")]
    LayoutTooSmall { required: usize, available: u32 },
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CompileError::LayoutTooSmall {
            required: 2,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "Circuit requires 2 qubits but target only has 1"
        );
        assert_eq!(
            CompileError::GateNotInBasis("h".into()).to_string(),
            "Gate 'h' not in target basis"
        );
    }
}
