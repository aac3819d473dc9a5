//! Quantum gate types.

use serde::{Deserialize, Serialize};

/// Single-qubit gates with known semantics.
///
/// Rotation angles are concrete radians; entropy circuits carry no symbolic
/// parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Clifford and phase gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,

    // Rotation gates
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
}

impl StandardGate {
    /// Get the OpenQASM name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
        }
    }

    /// Get the rotation angle, if this gate has one.
    pub fn angle(&self) -> Option<f64> {
        match self {
            StandardGate::Rx(theta) | StandardGate::Ry(theta) | StandardGate::Rz(theta) => {
                Some(*theta)
            }
            _ => None,
        }
    }

    /// Whether the gate is diagonal in the computational basis.
    ///
    /// Diagonal gates only change phases, so they cannot affect the outcome
    /// of a measurement that directly follows them.
    pub fn is_diagonal(&self) -> bool {
        matches!(
            self,
            StandardGate::I
                | StandardGate::Z
                | StandardGate::S
                | StandardGate::Sdg
                | StandardGate::T
                | StandardGate::Tdg
                | StandardGate::Rz(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.name(), "h");
        assert_eq!(StandardGate::SX.name(), "sx");
        assert_eq!(StandardGate::I.name(), "id");
        assert_eq!(StandardGate::Rz(PI).name(), "rz");
    }

    #[test]
    fn test_angle() {
        assert_eq!(StandardGate::Rz(0.5).angle(), Some(0.5));
        assert_eq!(StandardGate::H.angle(), None);
    }

    #[test]
    fn test_diagonal_gates() {
        assert!(StandardGate::Rz(1.0).is_diagonal());
        assert!(StandardGate::T.is_diagonal());
        assert!(!StandardGate::H.is_diagonal());
        assert!(!StandardGate::SX.is_diagonal());
        assert!(!StandardGate::Rx(1.0).is_diagonal());
    }

    #[test]
    fn test_gate_serde() {
        let json = serde_json::to_string(&StandardGate::Rz(0.25)).unwrap();
        let back: StandardGate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StandardGate::Rz(0.25));
    }
}
