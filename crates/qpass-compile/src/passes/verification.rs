//! Verification passes for ensuring compilation correctness.

use qpass_ir::Circuit;
use tracing::debug;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Final check that every gate is native to the target.
///
/// Measurements, resets and barriers are not gates and are not checked.
pub struct BasisVerification;

impl Pass for BasisVerification {
    fn name(&self) -> &'static str {
        "BasisVerification"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let basis = properties
            .basis_gates
            .as_ref()
            .ok_or(CompileError::MissingBasisGates)?;

        if let Some(gate) = circuit
            .instructions()
            .iter()
            .filter_map(|inst| inst.as_gate())
            .find(|gate| !basis.contains(gate.name()))
        {
            return Err(CompileError::GateNotInBasis(gate.name().to_string()));
        }

        debug!(
            "BasisVerification passed for {} instructions",
            circuit.instructions().len()
        );
        Ok(())
    }

    fn should_run(&self, _circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.basis_gates.is_some()
    }
}
