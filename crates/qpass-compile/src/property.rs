//! `PropertySet` and related types for pass communication.
//!
//! During compilation the layout pass decides which physical qubit each
//! virtual qubit lands on, and the translation pass needs the device's
//! native gate names. The [`PropertySet`] carries that shared context
//! through every pass.
//!
//! ```
//! use qpass_compile::{BasisGates, PropertySet};
//!
//! let props = PropertySet::new().with_target(127, BasisGates::eagle());
//!
//! assert_eq!(props.num_physical_qubits, Some(127));
//! assert!(props.basis_gates.as_ref().unwrap().contains("ecr"));
//! ```

use serde::{Deserialize, Serialize};

use qpass_ir::QubitId;

/// A mapping from virtual qubits to physical qubits.
///
/// Entry `i` holds the physical qubit for virtual qubit `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    physical: Vec<u32>,
}

impl Layout {
    /// Create a new empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a trivial layout (virtual qubit i -> physical qubit i).
    pub fn trivial(num_qubits: u32) -> Self {
        Self {
            physical: (0..num_qubits).collect(),
        }
    }

    /// Create a layout from an explicit physical qubit list.
    pub fn from_physical(physical: impl IntoIterator<Item = u32>) -> Self {
        Self {
            physical: physical.into_iter().collect(),
        }
    }

    /// Get the physical qubit for a virtual qubit.
    pub fn get_physical(&self, virtual_qubit: QubitId) -> Option<u32> {
        self.physical.get(virtual_qubit.0 as usize).copied()
    }

    /// The physical qubits indexed by virtual qubit.
    pub fn as_slice(&self) -> &[u32] {
        &self.physical
    }

    /// Get the number of mapped qubits.
    pub fn len(&self) -> usize {
        self.physical.len()
    }

    /// Check if the layout is empty.
    pub fn is_empty(&self) -> bool {
        self.physical.is_empty()
    }
}

/// Native gate names of a target device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasisGates {
    /// List of gate names in the basis.
    gates: Vec<String>,
}

impl BasisGates {
    /// Create a new basis gates set.
    pub fn new(gates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            gates: gates.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if a gate is in the basis.
    pub fn contains(&self, gate: &str) -> bool {
        self.gates.iter().any(|g| g == gate)
    }

    /// Get the basis gates.
    pub fn gates(&self) -> &[String] {
        &self.gates
    }

    /// Create IBM basis gates (RZ + SX + X + CX).
    pub fn ibm() -> Self {
        Self::new(["rz", "sx", "x", "cx", "measure", "barrier", "id"])
    }

    /// Create IBM Heron basis gates (RZ + SX + X + CZ).
    pub fn heron() -> Self {
        Self::new([
            "rz", "sx", "x", "cz", "id", "rx", "rzz", "measure", "barrier",
        ])
    }

    /// Create IBM Eagle basis gates (RZ + SX + X + ECR).
    pub fn eagle() -> Self {
        Self::new(["rz", "sx", "x", "ecr", "measure", "barrier", "id"])
    }
}

/// Properties shared between compilation passes.
///
/// | Field | Set by | Used by |
/// |-------|--------|---------|
/// | `layout` | `TrivialLayout` | `ApplyLayout` |
/// | `num_physical_qubits` | caller (`with_target`) | `TrivialLayout`, `ApplyLayout` |
/// | `basis_gates` | caller (`with_target`) | `BasisTranslation`, `BasisVerification` |
#[derive(Debug, Clone, Default)]
pub struct PropertySet {
    /// Virtual to physical qubit mapping.
    pub layout: Option<Layout>,

    /// Number of qubits on the target device.
    pub num_physical_qubits: Option<u32>,

    /// Target basis gates for gate decomposition.
    pub basis_gates: Option<BasisGates>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a property set with target configuration.
    #[must_use]
    pub fn with_target(mut self, num_qubits: u32, basis_gates: BasisGates) -> Self {
        self.num_physical_qubits = Some(num_qubits);
        self.basis_gates = Some(basis_gates);
        self
    }

    /// Set the layout.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }
}
