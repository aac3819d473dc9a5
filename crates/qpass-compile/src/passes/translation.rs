//! Basis translation pass.

use std::f64::consts::PI;

use qpass_ir::{Circuit, Instruction, InstructionKind, QubitId, StandardGate};
use tracing::debug;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{BasisGates, PropertySet};

/// Basis translation pass.
///
/// Rewrites every gate outside the target basis into `rz`, `sx` and `x`,
/// the single-qubit core shared by the IBM, Heron and Eagle bases.
/// Decompositions hold up to global phase.
pub struct BasisTranslation;

impl Pass for BasisTranslation {
    fn name(&self) -> &'static str {
        "BasisTranslation"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let basis = properties
            .basis_gates
            .as_ref()
            .ok_or(CompileError::MissingBasisGates)?;

        let mut translated = Vec::with_capacity(circuit.instructions().len());
        let mut rewritten = 0usize;

        for inst in circuit.instructions() {
            match &inst.kind {
                InstructionKind::Gate(gate) if !basis.contains(gate.name()) => {
                    if !supports_rz_sx(basis) {
                        return Err(CompileError::UnsupportedBasis(basis.gates().join(", ")));
                    }
                    let qubit = inst.qubits.first().copied().ok_or_else(|| {
                        CompileError::GateNotInBasis(gate.name().to_string())
                    })?;
                    translated.extend(translate_to_rz_sx(gate, qubit));
                    rewritten += 1;
                }
                _ => translated.push(inst.clone()),
            }
        }

        debug!("BasisTranslation rewrote {rewritten} gates");
        circuit.replace_instructions(translated)?;
        Ok(())
    }

    fn should_run(&self, _circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.basis_gates.is_some()
    }
}

/// Whether the basis carries the gates every decomposition below targets.
fn supports_rz_sx(basis: &BasisGates) -> bool {
    basis.contains("rz") && basis.contains("sx") && basis.contains("x")
}

fn rz(theta: f64, qubit: QubitId) -> Instruction {
    Instruction::single_qubit_gate(StandardGate::Rz(theta), qubit)
}

fn sx(qubit: QubitId) -> Instruction {
    Instruction::single_qubit_gate(StandardGate::SX, qubit)
}

/// Translate a single-qubit gate into `rz`/`sx`/`x`, in execution order.
fn translate_to_rz_sx(gate: &StandardGate, q: QubitId) -> Vec<Instruction> {
    match gate {
        // Identity
        StandardGate::I => vec![],

        StandardGate::X => vec![Instruction::single_qubit_gate(StandardGate::X, q)],

        // Y = X · Z
        StandardGate::Y => vec![
            rz(PI, q),
            Instruction::single_qubit_gate(StandardGate::X, q),
        ],

        StandardGate::Z => vec![rz(PI, q)],

        // H = Rz(π/2) · SX · Rz(π/2)
        StandardGate::H => vec![rz(PI / 2.0, q), sx(q), rz(PI / 2.0, q)],

        StandardGate::S => vec![rz(PI / 2.0, q)],
        StandardGate::Sdg => vec![rz(-PI / 2.0, q)],
        StandardGate::T => vec![rz(PI / 4.0, q)],
        StandardGate::Tdg => vec![rz(-PI / 4.0, q)],

        StandardGate::SX => vec![sx(q)],

        // Rx(θ) = H · Rz(θ) · H
        StandardGate::Rx(theta) => vec![
            rz(PI / 2.0, q),
            sx(q),
            rz(theta + PI, q),
            sx(q),
            rz(PI / 2.0, q),
        ],

        // Ry(θ) = S · Rx(θ) · Sdg
        StandardGate::Ry(theta) => vec![sx(q), rz(theta + PI, q), sx(q), rz(PI, q)],

        StandardGate::Rz(theta) => vec![rz(*theta, q)],
    }
}
