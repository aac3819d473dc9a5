//! Backend capability descriptions.

use serde::{Deserialize, Serialize};

/// Static description of what a backend can run.
///
/// Backends build this once at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate set (OpenQASM 3 naming convention).
    pub gate_set: GateSet,
    /// Maximum number of shots per job.
    pub max_shots: u32,
    /// Whether this is a simulator (`true`) or real hardware (`false`).
    pub is_simulator: bool,
}

impl Capabilities {
    /// Create capabilities for a local simulator.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            gate_set: GateSet::universal(),
            max_shots: 100_000,
            is_simulator: true,
        }
    }

    /// Create capabilities for an IBM device.
    pub fn ibm(name: impl Into<String>, num_qubits: u32, gate_set: GateSet) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set,
            max_shots: 100_000,
            is_simulator: false,
        }
    }
}

/// Gates a backend accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSet {
    /// Single-qubit gates supported.
    pub single_qubit: Vec<String>,
    /// Two-qubit gates supported.
    pub two_qubit: Vec<String>,
    /// Native gates (execute without decomposition on this backend).
    pub native: Vec<String>,
}

impl GateSet {
    fn from_names(single: &[&str], two: &[&str], native: &[&str]) -> Self {
        let owned = |names: &[&str]| names.iter().map(|n| (*n).to_string()).collect();
        Self {
            single_qubit: owned(single),
            two_qubit: owned(two),
            native: owned(native),
        }
    }

    /// Every gate of the circuit IR.
    pub fn universal() -> Self {
        let single = [
            "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "sx", "rx", "ry", "rz",
        ];
        Self::from_names(&single, &[], &single)
    }

    /// IBM CX-era gate set: `rz, sx, x, cx`.
    pub fn ibm() -> Self {
        Self::from_names(
            &["rz", "sx", "x", "id"],
            &["cx"],
            &["rz", "sx", "x", "cx"],
        )
    }

    /// IBM Eagle gate set: `rz, sx, x, ecr`.
    pub fn ibm_eagle() -> Self {
        Self::from_names(
            &["rz", "sx", "x", "id"],
            &["ecr"],
            &["rz", "sx", "x", "ecr"],
        )
    }

    /// IBM Heron gate set: `rz, sx, x, cz`.
    pub fn ibm_heron() -> Self {
        Self::from_names(
            &["rz", "sx", "x", "id", "rx"],
            &["cz", "rzz"],
            &["rz", "sx", "x", "cz"],
        )
    }

    /// Build a gate set from a device's reported basis gate names.
    ///
    /// Names that are not gates (`measure`, `reset`, `delay`, ...) are skipped.
    pub fn from_basis(basis: &[String]) -> Self {
        const TWO_QUBIT: [&str; 4] = ["cx", "cz", "ecr", "rzz"];
        const NON_GATES: [&str; 6] = ["measure", "reset", "barrier", "delay", "if_else", "init"];

        let mut set = Self {
            single_qubit: vec![],
            two_qubit: vec![],
            native: vec![],
        };
        for gate in basis {
            if NON_GATES.contains(&gate.as_str()) {
                continue;
            }
            if TWO_QUBIT.contains(&gate.as_str()) {
                set.two_qubit.push(gate.clone());
            } else {
                set.single_qubit.push(gate.clone());
            }
            set.native.push(gate.clone());
        }
        set
    }

    /// Whether a gate is accepted.
    pub fn contains(&self, gate: &str) -> bool {
        self.single_qubit.iter().any(|g| g == gate) || self.two_qubit.iter().any(|g| g == gate)
    }

    /// Whether a gate runs without decomposition.
    pub fn is_native(&self, gate: &str) -> bool {
        self.native.iter().any(|g| g == gate)
    }
}
