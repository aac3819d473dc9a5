//! qpass Compilation Framework
//!
//! Remote devices only execute their native instruction set, so every
//! circuit sent to hardware is first transpiled. This crate implements
//! that step as a sequence of passes over a [`qpass_ir::Circuit`].
//!
//! ```text
//! Circuit (virtual qubits, any gates)
//!       │
//!       ├── TrivialLayout / ApplyLayout
//!       ├── BasisTranslation
//!       ├── Optimize1qGates / RemoveDiagonalBeforeMeasure   (level ≥ 1)
//!       └── BasisVerification
//!       │
//!       ▼
//! Circuit (physical qubits, native gates)
//! ```
//!
//! # Example
//!
//! ```rust
//! use qpass_compile::{BasisGates, PassManagerBuilder};
//! use qpass_ir::Circuit;
//!
//! let (pm, mut props) = PassManagerBuilder::new()
//!     .with_optimization_level(1)
//!     .with_target(127, BasisGates::ibm())
//!     .build();
//!
//! let mut circuit = Circuit::coin_flip().unwrap();
//! pm.run(&mut circuit, &mut props).unwrap();
//!
//! assert!(circuit.is_physical());
//! assert!(circuit
//!     .instructions()
//!     .iter()
//!     .filter_map(|i| i.as_gate())
//!     .all(|g| BasisGates::ibm().contains(g.name())));
//! ```

pub mod error;
pub mod manager;
pub mod pass;
pub mod passes;
pub mod property;

pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use property::{BasisGates, Layout, PropertySet};

use qpass_ir::Circuit;

/// Transpile a circuit for a device with the preset pass pipeline.
pub fn transpile(
    circuit: &Circuit,
    num_qubits: u32,
    basis_gates: BasisGates,
    optimization_level: u8,
) -> CompileResult<Circuit> {
    let (pm, mut props) = PassManagerBuilder::new()
        .with_optimization_level(optimization_level)
        .with_target(num_qubits, basis_gates)
        .build();

    let mut compiled = circuit.clone();
    pm.run(&mut compiled, &mut props)?;
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use qpass_ir::QubitId;

    #[test]
    fn test_transpile_leaves_input_untouched() {
        let circuit = Circuit::coin_flip().unwrap();
        let compiled = transpile(&circuit, 5, BasisGates::heron(), 1).unwrap();

        assert!(!circuit.is_physical());
        assert!(compiled.is_physical());
        assert_eq!(compiled.num_clbits(), 1);
    }

    #[test]
    fn test_transpile_device_too_small() {
        let circuit = Circuit::coin_flip().unwrap();
        let result = transpile(&circuit, 0, BasisGates::ibm(), 1);
        assert!(matches!(result, Err(CompileError::LayoutTooSmall { .. })));
    }

    fn gate_strategy() -> impl Strategy<Value = u8> {
        0u8..12
    }

    proptest! {
        #[test]
        fn transpiled_gates_are_native(gates in proptest::collection::vec(gate_strategy(), 0..24), theta in -6.3f64..6.3) {
            let mut circuit = Circuit::with_size("random", 1, 0);
            let q = QubitId(0);
            for g in gates {
                let applied = match g {
                    0 => circuit.h(q),
                    1 => circuit.x(q),
                    2 => circuit.y(q),
                    3 => circuit.z(q),
                    4 => circuit.s(q),
                    5 => circuit.sdg(q),
                    6 => circuit.t(q),
                    7 => circuit.tdg(q),
                    8 => circuit.sx(q),
                    9 => circuit.rx(theta, q),
                    10 => circuit.ry(theta, q),
                    _ => circuit.rz(theta, q),
                };
                applied.unwrap();
            }
            circuit.measure_all().unwrap();

            let basis = BasisGates::ibm();
            let compiled = transpile(&circuit, 3, basis.clone(), 1).unwrap();

            for gate in compiled.instructions().iter().filter_map(|i| i.as_gate()) {
                prop_assert!(basis.contains(gate.name()));
            }
            prop_assert_eq!(compiled.num_clbits(), 1);
            prop_assert!(compiled.instructions().last().unwrap().is_measure());
        }
    }
}
